//! Static narrative content.
//!
//! Commentary is written offline by a content owner and versioned on its
//! own. It is attached to sections verbatim and is never derived from, or
//! checked against, the figures computed in the current run.
//!
//! Stored as JSON on disk:
//! ```json
//! {
//!   "version": "2024-07-it",
//!   "sections": {
//!     "brand-price": [
//!       { "heading": "Premium and Luxury Branding", "body": "..." }
//!     ]
//!   }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeBlock {
    #[serde(default)]
    pub heading: Option<String>,
    pub body: String,
}

/// Supplies narrative blocks by section id.
pub trait NarrativeSource {
    /// Version label of the content, if it has one.
    fn version(&self) -> Option<&str>;

    fn blocks(&self, section_id: &str) -> Vec<NarrativeBlock>;
}

/// Narrative loaded from a JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NarrativeBundle {
    pub version: String,
    #[serde(default)]
    pub sections: HashMap<String, Vec<NarrativeBlock>>,
}

impl NarrativeBundle {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read narrative {}", path.display()))?;
        let bundle = serde_json::from_str(&content)
            .with_context(|| format!("invalid narrative {}", path.display()))?;
        Ok(bundle)
    }

    /// Section ids that have content, sorted.
    pub fn section_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.sections.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl NarrativeSource for NarrativeBundle {
    fn version(&self) -> Option<&str> {
        Some(&self.version)
    }

    fn blocks(&self, section_id: &str) -> Vec<NarrativeBlock> {
        self.sections.get(section_id).cloned().unwrap_or_default()
    }
}

/// Used when no narrative document is supplied.
pub struct NoNarrative;

impl NarrativeSource for NoNarrative {
    fn version(&self) -> Option<&str> {
        None
    }

    fn blocks(&self, _section_id: &str) -> Vec<NarrativeBlock> {
        Vec::new()
    }
}
