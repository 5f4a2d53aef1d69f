pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config, load_static_fallback};
pub use schema::Config;
