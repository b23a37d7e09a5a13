//! Static defect knowledge base
//!
//! The single authoritative mapping from defect label to descriptive
//! fields. Built once at startup and shared read-only for the process
//! lifetime.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Knowledge entry for one defect label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefectInfo {
    pub meaning: String,
    pub cause: String,
    pub acceptability: String,
}

/// Read-only table of weld-defect knowledge, keyed by detection label.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: HashMap<String, DefectInfo>,
}

impl KnowledgeBase {
    /// The built-in weld-defect entries.
    pub fn builtin() -> Self {
        let mut kb = Self::default();
        kb.insert(
            "Porosity",
            DefectInfo {
                meaning: "Small gas pockets trapped in the weld metal".to_string(),
                cause: "Poor shielding gas or contaminated surface".to_string(),
                acceptability: "Not acceptable – reduces strength".to_string(),
            },
        );
        kb.insert(
            "Crack",
            DefectInfo {
                meaning: "Visible fracture in the weld".to_string(),
                cause: "High cooling rate or residual stress".to_string(),
                acceptability: "Unacceptable – critical defect".to_string(),
            },
        );
        kb.insert(
            "Lack of Fusion",
            DefectInfo {
                meaning: "Weld metal did not properly fuse with base metal".to_string(),
                cause: "Low heat input or incorrect welding angle".to_string(),
                acceptability: "Unacceptable – weak joint".to_string(),
            },
        );
        kb.insert(
            "Undercut",
            DefectInfo {
                meaning: "Groove melted into the base metal along the weld toe".to_string(),
                cause: "Improper welding angle or speed".to_string(),
                acceptability: "Unacceptable beyond code limits – stress concentrator"
                    .to_string(),
            },
        );
        kb
    }

    pub fn insert(&mut self, label: impl Into<String>, info: DefectInfo) {
        self.entries.insert(label.into(), info);
    }

    /// Look up a defect label. Absent labels are legal; callers
    /// degrade gracefully.
    pub fn lookup(&self, label: &str) -> Option<&DefectInfo> {
        self.entries.get(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_entries() {
        let kb = KnowledgeBase::builtin();
        assert_eq!(kb.len(), 4);
        for label in ["Porosity", "Crack", "Lack of Fusion", "Undercut"] {
            assert!(kb.lookup(label).is_some(), "missing entry for {}", label);
        }
    }

    #[test]
    fn test_lookup_unknown_label() {
        let kb = KnowledgeBase::builtin();
        assert!(kb.lookup("Warping").is_none());
        assert!(kb.lookup("None").is_none());
        assert!(kb.lookup("").is_none());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let kb = KnowledgeBase::builtin();
        assert!(kb.lookup("porosity").is_none());
    }

    #[test]
    fn test_porosity_fields() {
        let kb = KnowledgeBase::builtin();
        let info = kb.lookup("Porosity").unwrap();
        assert_eq!(info.meaning, "Small gas pockets trapped in the weld metal");
        assert_eq!(info.cause, "Poor shielding gas or contaminated surface");
        assert_eq!(info.acceptability, "Not acceptable – reduces strength");
    }

    #[test]
    fn test_insert_custom_entry() {
        let mut kb = KnowledgeBase::builtin();
        kb.insert(
            "Spatter",
            DefectInfo {
                meaning: "Droplets of molten metal around the weld".to_string(),
                cause: "Excessive current or arc length".to_string(),
                acceptability: "Cosmetic unless excessive".to_string(),
            },
        );
        assert_eq!(kb.len(), 5);
        assert!(kb.lookup("Spatter").is_some());
    }
}
