use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A recipe row from the reference dataset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateItem {
    pub id: CandidateId,
    pub title: String,
    /// Nutrient values aligned to the dataset's `NutrientSchema`
    pub nutrients: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Dietary category flags such as `vegan` or `pescetarian`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub flags: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CandidateId {
    Integer(u64),
    String(String),
}

impl std::fmt::Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateId::String(s) => write!(f, "{}", s),
            CandidateId::Integer(i) => write!(f, "{}", i),
        }
    }
}

impl From<String> for CandidateId {
    fn from(s: String) -> Self {
        CandidateId::String(s)
    }
}

impl From<u64> for CandidateId {
    fn from(i: u64) -> Self {
        CandidateId::Integer(i)
    }
}

impl CandidateItem {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<CandidateId>, title: impl Into<String>, nutrients: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            nutrients,
            region: None,
            flags: BTreeMap::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_flag(mut self, flag: impl Into<String>, value: bool) -> Self {
        self.flags.insert(flag.into(), value);
        self
    }

    /// Flag value, `None` when the dataset carries no such column for this row
    #[inline]
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.flags.get(name).copied()
    }
}
