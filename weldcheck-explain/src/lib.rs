//! weldcheck-explain: defect knowledge base and explanation generation
//!
//! Turns a chosen defect label and confidence into human-readable
//! prose. The `ExplanationBackend` trait is the capability seam: a
//! static knowledge-table formatter and a generative Ollama client are
//! interchangeable implementations of the same total-function contract
//! (always return some string, never fail on unknown input).

pub mod backend;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod ollama;

pub use backend::{ExplanationBackend, StaticExplainer, FALLBACK_EXPLANATION};
pub use config::OllamaConfig;
pub use error::{ExplainError, Result};
pub use knowledge::{DefectInfo, KnowledgeBase};
pub use ollama::OllamaExplainer;
