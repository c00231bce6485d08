//! Search query payloads
//!
//! The self-describing request document handed to a downstream ranking
//! service: raw-unit targets, weights and constraints keyed by nutrient name.

use nutrank_core::{ConstraintSet, NutrientMap, NutrientSchema, PopulationStats, Result};
use serde::{Deserialize, Serialize};

pub const SCORING_MODE: &str = "adaptive_relu_cosine";
pub const NORMALIZATION: &str = "population_zscore";
pub const PAYLOAD_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PayloadMetadata {
    pub scoring_mode: String,
    pub normalization: String,
    pub version: u32,
}

impl Default for PayloadMetadata {
    fn default() -> Self {
        Self {
            scoring_mode: SCORING_MODE.to_string(),
            normalization: NORMALIZATION.to_string(),
            version: PAYLOAD_VERSION,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchQueryPayload {
    pub target_nutrients: NutrientMap,
    pub weights: NutrientMap,
    #[serde(default)]
    pub constraints: ConstraintSet,
    #[serde(default)]
    pub dietary_preference: String,
    #[serde(default)]
    pub metadata: PayloadMetadata,
}

/// Assembles payloads for one reference dataset
#[derive(Debug, Clone, Copy)]
pub struct QueryPayloadBuilder<'a> {
    schema: &'a NutrientSchema,
    stats: &'a PopulationStats,
}

impl<'a> QueryPayloadBuilder<'a> {
    pub fn new(schema: &'a NutrientSchema, stats: &'a PopulationStats) -> Self {
        Self { schema, stats }
    }

    /// Build a payload from a standardized target.
    ///
    /// The target is mapped back to raw units before it is keyed by name.
    pub fn build(
        &self,
        standardized_target: &[f64],
        weights: &[f64],
        constraints: &ConstraintSet,
        dietary_preference: &str,
    ) -> Result<SearchQueryPayload> {
        let raw_target = self.stats.denormalize(standardized_target)?;

        Ok(SearchQueryPayload {
            target_nutrients: NutrientMap::from_dense(self.schema, &raw_target)?,
            weights: NutrientMap::from_dense(self.schema, weights)?,
            constraints: constraints.clone(),
            dietary_preference: dietary_preference.to_string(),
            metadata: PayloadMetadata::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> (NutrientSchema, PopulationStats) {
        let schema = NutrientSchema::new(["Energy (kcal)", "Sodium (mg)"]).unwrap();
        let stats = PopulationStats::from_parts(vec![400.0, 300.0], vec![100.0, 0.0]).unwrap();
        (schema, stats)
    }

    #[test]
    fn test_build_denormalizes_target() {
        let (schema, stats) = fixtures();
        let mut constraints = ConstraintSet::new();
        constraints.avoid_ingredients.insert("salt");
        constraints.add_threshold("Sodium (mg)", 1500.0);

        let payload = QueryPayloadBuilder::new(&schema, &stats)
            .build(&[2.0, 5.0], &[1.0, 0.2], &constraints, "vegan")
            .unwrap();

        assert_eq!(payload.target_nutrients.get("Energy (kcal)"), Some(600.0));
        // zero std scales by 1
        assert_eq!(payload.target_nutrients.get("Sodium (mg)"), Some(305.0));
        assert_eq!(payload.weights.get("Sodium (mg)"), Some(0.2));
        assert_eq!(payload.dietary_preference, "vegan");
        assert_eq!(payload.metadata, PayloadMetadata::default());
    }

    #[test]
    fn test_payload_json_shape() {
        let (schema, stats) = fixtures();
        let payload = QueryPayloadBuilder::new(&schema, &stats)
            .build(&[0.0, 0.0], &[1.0, 1.0], &ConstraintSet::new(), "")
            .unwrap();

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["metadata"]["scoring_mode"], "adaptive_relu_cosine");
        assert_eq!(json["metadata"]["normalization"], "population_zscore");
        assert_eq!(json["metadata"]["version"], 1);
        let keys: Vec<&String> = json["target_nutrients"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["Energy (kcal)", "Sodium (mg)"]);

        let back: SearchQueryPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_dimension_mismatch() {
        let (schema, stats) = fixtures();
        let result = QueryPayloadBuilder::new(&schema, &stats).build(&[0.0], &[1.0, 1.0], &ConstraintSet::new(), "");
        assert!(result.is_err());
    }
}
