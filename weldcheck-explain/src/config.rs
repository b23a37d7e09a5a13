//! Configuration for the generative explanation backend

use serde::{Deserialize, Serialize};

/// Ollama backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server.
    pub base_url: String,
    /// Model name passed to the generate endpoint.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            timeout_secs: 60,
        }
    }
}

impl OllamaConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("Base URL must start with http:// or https://".to_string());
        }

        if self.model.is_empty() {
            return Err("Model name must not be empty".to_string());
        }

        if self.timeout_secs == 0 || self.timeout_secs > 600 {
            return Err("Timeout must be between 1 and 600 seconds".to_string());
        }

        Ok(())
    }
}
