//! PDF text extraction service.
//!
//! Thin HTTP surface over the extraction pipeline: routes accept a
//! storage reference or a direct upload, run the pipeline, and answer
//! with structured JSON. All extraction logic lives in `pdf-pipeline`.

pub mod config;
pub mod kernel;
pub mod server;

pub use config::Config;
