//! Event Correlation & Reasoning Engine — ingest buffer, correlation,
//! RCA matching, anomaly detection, prediction, and risk scoring.

pub mod anomaly;
pub mod correlation;
pub mod ingest_buffer;
pub mod predictor;
pub mod rca;
pub mod risk;

pub use ingest_buffer::IngestBuffer;
