//! Explanation capability seam and the static implementation

use crate::knowledge::KnowledgeBase;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Fixed degraded output for labels absent from the knowledge base.
pub const FALLBACK_EXPLANATION: &str =
    "No detailed explanation available for this defect.";

/// Capability contract: turn a defect label and confidence into prose.
///
/// Total function: implementations always return some string and
/// never fail, even for unknown labels. An unknown label is a
/// knowledge gap, not an error.
#[async_trait]
pub trait ExplanationBackend: Send + Sync {
    async fn explain(&self, label: &str, confidence: Option<f32>) -> String;

    fn name(&self) -> &'static str;
}

/// Explanation generator backed purely by the static knowledge base.
pub struct StaticExplainer {
    knowledge: Arc<KnowledgeBase>,
}

impl StaticExplainer {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }

    /// Synchronous formatting core, shared with backends that degrade
    /// to static text.
    pub fn format(&self, label: &str, confidence: Option<f32>) -> String {
        let Some(info) = self.knowledge.lookup(label) else {
            debug!("No knowledge entry for defect {:?}", label);
            return FALLBACK_EXPLANATION.to_string();
        };

        let confidence = match confidence {
            Some(c) => c.to_string(),
            None => "N/A".to_string(),
        };

        format!(
            "Detected Defect: {label}\n\
             Confidence: {confidence}\n\
             \n\
             What it means:\n\
             {meaning}\n\
             \n\
             Why it occurs:\n\
             {cause}\n\
             \n\
             Weld acceptability:\n\
             {acceptability}\n",
            label = label,
            confidence = confidence,
            meaning = info.meaning,
            cause = info.cause,
            acceptability = info.acceptability,
        )
    }
}

#[async_trait]
impl ExplanationBackend for StaticExplainer {
    async fn explain(&self, label: &str, confidence: Option<f32>) -> String {
        self.format(label, confidence)
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
