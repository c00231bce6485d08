//! Constraint sets
//!
//! Ingredient avoidances and nutrient upper bounds aggregated from several
//! sources: the static medical-condition table, retrieved guidelines, user
//! allergies and dietary-preference avoidance lists.

use crate::error::{Error, Result};
use crate::schema::NutrientSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Plural-stripped, lower-cased matching stem of an ingredient term
pub fn ingredient_stem(term: &str) -> String {
    let lower = term.trim().to_lowercase();
    match lower.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => lower,
    }
}

/// Case-insensitive, duplicate-free list of ingredient terms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct AvoidList {
    terms: Vec<String>,
}

impl AvoidList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a term unless an equal one (ignoring case) is already present.
    /// Returns whether the term was added.
    pub fn insert(&mut self, term: impl AsRef<str>) -> bool {
        let term = term.as_ref().trim();
        if term.is_empty() || self.contains(term) {
            return false;
        }
        self.terms.push(term.to_string());
        true
    }

    pub fn contains(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.terms.iter().any(|t| t.to_lowercase() == term)
    }

    pub fn extend<I, S>(&mut self, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for term in terms {
            self.insert(term);
        }
    }

    /// First term whose stem occurs in `text` (case-insensitive)
    pub fn first_match(&self, text: &str) -> Option<&str> {
        let haystack = text.to_lowercase();
        self.terms
            .iter()
            .find(|t| haystack.contains(&ingredient_stem(t)))
            .map(String::as_str)
    }

    pub fn matches(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl From<Vec<String>> for AvoidList {
    fn from(terms: Vec<String>) -> Self {
        let mut list = AvoidList::new();
        list.extend(terms);
        list
    }
}

impl From<AvoidList> for Vec<String> {
    fn from(list: AvoidList) -> Self {
        list.terms
    }
}

/// Limits from the static medical-condition table.
///
/// These carry their own penalty tier, separate from guideline-derived
/// nutrient thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicalLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_sugar: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_sodium: Option<f64>,
}

impl MedicalLimits {
    /// Combine two limit sets, keeping the lower bound where both are set
    pub fn merge(&mut self, other: &MedicalLimits) {
        self.max_sugar = tighter(self.max_sugar, other.max_sugar);
        self.max_sodium = tighter(self.max_sodium, other.max_sodium);
    }

    pub fn is_empty(&self) -> bool {
        self.max_sugar.is_none() && self.max_sodium.is_none()
    }
}

fn tighter(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

/// Aggregated avoidances and nutrient upper bounds for one request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSet {
    #[serde(default)]
    pub avoid_ingredients: AvoidList,
    /// Nutrient name → upper bound
    #[serde(default)]
    pub nutrient_thresholds: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "MedicalLimits::is_empty")]
    pub medical_limits: MedicalLimits,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a nutrient upper bound; when the key already has one, the most
    /// restrictive (lowest) bound wins.
    pub fn add_threshold(&mut self, nutrient: impl Into<String>, limit: f64) {
        self.nutrient_thresholds
            .entry(nutrient.into())
            .and_modify(|current| *current = current.min(limit))
            .or_insert(limit);
    }

    /// Union another constraint set into this one
    pub fn merge(&mut self, other: &ConstraintSet) {
        self.avoid_ingredients.extend(other.avoid_ingredients.iter());
        for (nutrient, limit) in &other.nutrient_thresholds {
            self.add_threshold(nutrient.clone(), *limit);
        }
        self.medical_limits.merge(&other.medical_limits);
    }

    #[must_use]
    pub fn merged(mut self, other: &ConstraintSet) -> Self {
        self.merge(other);
        self
    }

    /// Resolve every threshold key to a schema position.
    ///
    /// Keys resolve by exact name, then by simplified keyword. Unknown keys
    /// are rejected rather than ignored.
    pub fn resolve_thresholds(&self, schema: &NutrientSchema) -> Result<Vec<(usize, f64)>> {
        self.nutrient_thresholds
            .iter()
            .map(|(name, limit)| {
                schema
                    .resolve(name)
                    .map(|idx| (idx, *limit))
                    .ok_or_else(|| Error::UnknownNutrient(name.clone()))
            })
            .collect()
    }
}
