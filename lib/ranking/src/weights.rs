//! Adaptive nutrient weights
//!
//! Base weights follow population variability: nutrients that vary more
//! across the dataset discriminate better and weigh more. Retrieved
//! guidelines then double the weight of every nutrient they mention.

use nutrank_core::{NutrientSchema, Result};
use nutrank_guideline::GuidelineRecord;
use tracing::debug;

/// Lower bound on any base weight
pub const MIN_WEIGHT: f64 = 0.1;

/// Multiplier for nutrients mentioned by a retrieved guideline
pub const PRIORITY_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct AdaptiveWeightEngine;

impl AdaptiveWeightEngine {
    pub fn new() -> Self {
        Self
    }

    /// `max(0.1, std_i / max(std))`, or all 1.0 when nothing varies
    pub fn base_weights(&self, population_std: &[f64]) -> Vec<f64> {
        let max_std = population_std.iter().copied().fold(0.0_f64, f64::max);
        if max_std <= 0.0 {
            return vec![1.0; population_std.len()];
        }
        population_std
            .iter()
            .map(|std| (std / max_std).max(MIN_WEIGHT))
            .collect()
    }

    /// Boost weights for nutrients named in any retrieved guideline
    pub fn apply_priority<'a, I>(
        &self,
        base: &[f64],
        retrieved: I,
        schema: &NutrientSchema,
    ) -> Result<Vec<f64>>
    where
        I: IntoIterator<Item = &'a GuidelineRecord>,
    {
        schema.check_dim(base.len())?;

        let texts: Vec<String> = retrieved.into_iter().map(|r| r.text.to_lowercase()).collect();
        let mut weights = base.to_vec();
        for (weight, keyword) in weights.iter_mut().zip(schema.keywords()) {
            if !keyword.is_empty() && texts.iter().any(|t| t.contains(&keyword)) {
                debug!("Prioritizing nutrient {:?}", keyword);
                *weight *= PRIORITY_MULTIPLIER;
            }
        }
        Ok(weights)
    }
}
