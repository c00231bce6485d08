use nutrank_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// A medical condition and its dietary guideline text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuidelineRecord {
    pub condition: String,
    #[serde(alias = "guideline")]
    pub text: String,
}

impl GuidelineRecord {
    pub fn new(condition: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            text: text.into(),
        }
    }
}

/// Read the guideline corpus, a JSON array of `{condition, guideline}` objects.
///
/// A missing, malformed or empty corpus is a reference data error.
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<GuidelineRecord>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        Error::ReferenceData(format!("cannot read guideline corpus {}: {}", path.display(), e))
    })?;
    let records: Vec<GuidelineRecord> = serde_json::from_str(&raw).map_err(|e| {
        Error::ReferenceData(format!("malformed guideline corpus {}: {}", path.display(), e))
    })?;
    if records.is_empty() {
        return Err(Error::ReferenceData(format!(
            "guideline corpus {} is empty",
            path.display()
        )));
    }
    info!("Loaded {} guideline records from {:?}", records.len(), path);
    Ok(records)
}
