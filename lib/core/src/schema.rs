//! Nutrient schema
//!
//! The canonical, ordered list of nutrient features. Every nutrient vector in
//! the system (targets, weights, candidates, synthetic profiles) is aligned to
//! this order, so the schema is fixed once the reference dataset is loaded.

use crate::error::{Error, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Ordered nutrient feature names
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct NutrientSchema {
    names: Vec<String>,
    positions: AHashMap<String, usize>,
}

impl NutrientSchema {
    /// Build a schema from nutrient names in alignment order.
    ///
    /// Duplicate names are rejected since they would make keyed lookups ambiguous.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(Error::ReferenceData("nutrient schema cannot be empty".to_string()));
        }

        let mut positions = AHashMap::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            if positions.insert(name.clone(), idx).is_some() {
                return Err(Error::ReferenceData(format!("duplicate nutrient column: {}", name)));
            }
        }

        Ok(Self { names, positions })
    }

    /// Derive the schema from dataset columns, keeping numeric columns that
    /// are not metadata or dietary flags. Column order is preserved.
    pub fn from_columns<'a, I>(columns: I, excluded: &[&str]) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let names: Vec<&str> = columns
            .into_iter()
            .filter(|c| !excluded.iter().any(|e| e.eq_ignore_ascii_case(c)))
            .collect();
        Self::new(names)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Exact position of a nutrient name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Position by exact name, then by equal simplified keyword, then by the
    /// first column whose keyword starts with the singular form of `name`'s.
    ///
    /// `"Sodium, Na (mg)"` resolves against `"Sodium (mg)"`, and both
    /// `"sugar"` and `"Sugars, total (g)"` resolve against `"Sugar (g)"`.
    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.position(name).or_else(|| {
            let keyword = simplify_keyword(name);
            if keyword.is_empty() {
                return None;
            }
            self.names
                .iter()
                .position(|n| simplify_keyword(n) == keyword)
                .or_else(|| {
                    let singular = keyword.strip_suffix('s').filter(|k| !k.is_empty()).unwrap_or(&keyword);
                    self.find_by_keyword(singular)
                })
        })
    }

    /// First nutrient whose simplified keyword starts with `prefix`
    pub fn find_by_keyword(&self, prefix: &str) -> Option<usize> {
        let prefix = prefix.to_lowercase();
        self.names
            .iter()
            .position(|n| simplify_keyword(n).starts_with(&prefix))
    }

    /// Check a dense vector's alignment with this schema
    pub fn check_dim(&self, actual: usize) -> Result<()> {
        if actual != self.names.len() {
            return Err(Error::InvalidDimension {
                expected: self.names.len(),
                actual,
            });
        }
        Ok(())
    }

    /// Simplified keywords in schema order
    pub fn keywords(&self) -> Vec<String> {
        self.names.iter().map(|n| simplify_keyword(n)).collect()
    }
}

impl TryFrom<Vec<String>> for NutrientSchema {
    type Error = Error;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::new(names)
    }
}

impl From<NutrientSchema> for Vec<String> {
    fn from(schema: NutrientSchema) -> Self {
        schema.names
    }
}

/// Reduce a nutrient column name to the keyword used for guideline matching:
/// parenthetical unit suffixes and anything after the first comma are dropped.
///
/// `"Sodium, Na (mg)"` → `"sodium"`, `"Energy (kcal)"` → `"energy"`,
/// `"Total lipid (fat) (g)"` → `"total lipid"`.
pub fn simplify_keyword(name: &str) -> String {
    let head = name.split('(').next().unwrap_or(name);
    let head = head.split(',').next().unwrap_or(head);
    head.trim().to_lowercase()
}
