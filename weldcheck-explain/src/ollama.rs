//! Generative explanation backend over the Ollama HTTP API
//!
//! Drop-in replacement for the static explainer. The total-function
//! contract is preserved by degrading to static knowledge-base text on
//! any transport or response failure.

use crate::backend::{ExplanationBackend, StaticExplainer, FALLBACK_EXPLANATION};
use crate::config::OllamaConfig;
use crate::error::{ExplainError, Result};
use crate::knowledge::{DefectInfo, KnowledgeBase};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct OllamaExplainer {
    client: Client,
    config: OllamaConfig,
    knowledge: Arc<KnowledgeBase>,
    fallback: StaticExplainer,
}

impl OllamaExplainer {
    pub fn new(knowledge: Arc<KnowledgeBase>, config: OllamaConfig) -> Result<Self> {
        config.validate().map_err(ExplainError::Config)?;
        Ok(Self {
            client: Client::new(),
            config,
            fallback: StaticExplainer::new(knowledge.clone()),
            knowledge,
        })
    }

    fn build_prompt(&self, label: &str, confidence: Option<f32>, info: &DefectInfo) -> String {
        let confidence = match confidence {
            Some(c) => c.to_string(),
            None => "N/A".to_string(),
        };
        format!(
            "You are a welding quality inspector writing for a defect report.\n\
             A weld image was classified as \"{label}\" with confidence {confidence}.\n\
             Reference notes:\n\
             - What it means: {meaning}\n\
             - Why it occurs: {cause}\n\
             - Weld acceptability: {acceptability}\n\
             Write a short plain-text explanation of this defect for the report. \
             Keep the meaning, cause and acceptability from the reference notes intact.",
            label = label,
            confidence = confidence,
            meaning = info.meaning,
            cause = info.cause,
            acceptability = info.acceptability,
        )
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
        });

        let url = format!("{}/api/generate", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .timeout(std::time::Duration::from_secs(self.config.timeout_secs))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text: String = text.chars().take(500).collect();
            return Err(ExplainError::InvalidResponse(format!(
                "HTTP {}: {}",
                status, text
            )));
        }

        let json: serde_json::Value = response.json().await?;
        let text = json
            .get("response")
            .and_then(|r| r.as_str())
            .ok_or_else(|| {
                ExplainError::InvalidResponse(
                    "Invalid response format: no response field".to_string(),
                )
            })?;

        Ok(text.to_string())
    }
}

#[async_trait]
impl ExplanationBackend for OllamaExplainer {
    async fn explain(&self, label: &str, confidence: Option<f32>) -> String {
        // Unknown label is a knowledge gap, not an error; there is
        // nothing trustworthy to prompt with.
        let Some(info) = self.knowledge.lookup(label) else {
            debug!("No knowledge entry for defect {:?}", label);
            return FALLBACK_EXPLANATION.to_string();
        };

        let prompt = self.build_prompt(label, confidence, info);
        match self.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("Ollama returned an empty explanation; using static text");
                self.fallback.format(label, confidence)
            }
            Err(e) => {
                warn!("Ollama explanation failed ({}); using static text", e);
                self.fallback.format(label, confidence)
            }
        }
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explainer() -> OllamaExplainer {
        OllamaExplainer::new(Arc::new(KnowledgeBase::builtin()), OllamaConfig::default())
            .unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = OllamaConfig::default();
        config.model = String::new();
        let result = OllamaExplainer::new(Arc::new(KnowledgeBase::builtin()), config);
        assert!(result.is_err());
    }

    #[test]
    fn test_prompt_contains_knowledge_fields() {
        let explainer = explainer();
        let kb = KnowledgeBase::builtin();
        let info = kb.lookup("Porosity").unwrap();
        let prompt = explainer.build_prompt("Porosity", Some(0.91), info);
        assert!(prompt.contains("Porosity"));
        assert!(prompt.contains("0.91"));
        assert!(prompt.contains(&info.meaning));
        assert!(prompt.contains(&info.cause));
        assert!(prompt.contains(&info.acceptability));
    }

    #[test]
    fn test_prompt_absent_confidence() {
        let explainer = explainer();
        let kb = KnowledgeBase::builtin();
        let info = kb.lookup("Crack").unwrap();
        let prompt = explainer.build_prompt("Crack", None, info);
        assert!(prompt.contains("confidence N/A"));
    }

    #[tokio::test]
    async fn test_unknown_label_short_circuits_to_fallback() {
        // No HTTP call is made for labels with no knowledge entry.
        let text = explainer().explain("Warping", Some(0.40)).await;
        assert_eq!(text, FALLBACK_EXPLANATION);
    }
}
