//! Intent -> Tool Front-End — classifies free-text operator queries
//! into a category and platform hint, and extracts typed entities.

pub mod classifier;
pub mod entities;

pub use classifier::{classify, Category, Classification};
pub use entities::extract;
