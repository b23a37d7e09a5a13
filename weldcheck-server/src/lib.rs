//! weldcheck-server: thin HTTP shell around the inspection pipeline
//!
//! Upload a weld photograph, get back a downloadable PDF inspection
//! report. All decision logic lives in the pipeline crates; this crate
//! only moves bytes and maps failures to status codes.

pub mod config;
pub mod http;

pub use config::ServerConfig;
pub use http::{create_router, AppState};
