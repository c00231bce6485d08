//! Synthetic profile generation
//!
//! Perturbs the best-ranked candidates in standardized space to propose
//! nutrient profiles near what already scores well. A boosted surrogate is fit
//! over the same population so its quality can be reported alongside.

use crate::rank::ScoredCandidate;
use crate::surrogate::{BoostingConfig, GradientBoostedRegressor};
use nutrank_core::{CandidateId, NutrientMap, NutrientSchema, PopulationStats, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    /// Fewer ranked candidates than this yields `InsufficientData`
    pub min_candidates: usize,
    /// How many of the top candidates seed perturbations
    pub seed_candidates: usize,
    pub perturbations_per_seed: usize,
    /// Std of the Gaussian noise, in standardized units
    pub noise_std: f64,
    pub boosting: BoostingConfig,
    /// Fixed RNG seed; `None` draws from the OS
    pub seed: Option<u64>,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            min_candidates: 5,
            seed_candidates: 3,
            perturbations_per_seed: 2,
            noise_std: 0.05,
            boosting: BoostingConfig::default(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyntheticProfile {
    /// Candidate the profile was perturbed from
    pub seed_id: CandidateId,
    pub nutrients: NutrientMap,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SynthesisOutcome {
    Profiles {
        profiles: Vec<SyntheticProfile>,
        /// Training error of the surrogate on the normalized energy attribute
        surrogate_mse: f64,
    },
    InsufficientData {
        available: usize,
        required: usize,
    },
}

impl SynthesisOutcome {
    pub fn profiles(&self) -> &[SyntheticProfile] {
        match self {
            SynthesisOutcome::Profiles { profiles, .. } => profiles,
            SynthesisOutcome::InsufficientData { .. } => &[],
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, SynthesisOutcome::InsufficientData { .. })
    }
}

pub struct ProfileSynthesizer<'a> {
    schema: &'a NutrientSchema,
    stats: &'a PopulationStats,
    config: SynthesizerConfig,
}

impl<'a> ProfileSynthesizer<'a> {
    pub fn new(schema: &'a NutrientSchema, stats: &'a PopulationStats, config: SynthesizerConfig) -> Self {
        Self { schema, stats, config }
    }

    /// Column the surrogate predicts: energy if present, else the first
    pub fn target_column(&self) -> usize {
        self.schema
            .find_by_keyword("energy")
            .or_else(|| self.schema.find_by_keyword("calories"))
            .unwrap_or(0)
    }

    /// Synthesize profiles from a ranked, filtered candidate list (best first)
    pub fn synthesize(&self, ranked: &[ScoredCandidate]) -> Result<SynthesisOutcome> {
        if ranked.len() < self.config.min_candidates {
            debug!(
                "Skipping synthesis: {} candidates, {} required",
                ranked.len(),
                self.config.min_candidates
            );
            return Ok(SynthesisOutcome::InsufficientData {
                available: ranked.len(),
                required: self.config.min_candidates,
            });
        }

        let normalized = ranked
            .iter()
            .map(|c| self.stats.normalize(&c.item.nutrients))
            .collect::<Result<Vec<_>>>()?;

        let surrogate_mse = self.fit_surrogate(&normalized)?;

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut profiles =
            Vec::with_capacity(self.config.seed_candidates * self.config.perturbations_per_seed);
        for (candidate, z) in ranked.iter().zip(&normalized).take(self.config.seed_candidates) {
            for _ in 0..self.config.perturbations_per_seed {
                let perturbed: Vec<f64> = z
                    .iter()
                    .map(|v| {
                        let noise: f64 = rng.sample(StandardNormal);
                        v + self.config.noise_std * noise
                    })
                    .collect();
                let raw: Vec<f64> = self
                    .stats
                    .denormalize(&perturbed)?
                    .into_iter()
                    .map(|v| v.max(0.0))
                    .collect();

                profiles.push(SyntheticProfile {
                    seed_id: candidate.item.id.clone(),
                    nutrients: NutrientMap::from_dense(self.schema, &raw)?,
                });
            }
        }

        debug!("Synthesized {} profiles", profiles.len());
        Ok(SynthesisOutcome::Profiles {
            profiles,
            surrogate_mse,
        })
    }

    /// Fit the surrogate from the remaining columns to the target column
    fn fit_surrogate(&self, normalized: &[Vec<f64>]) -> Result<f64> {
        let target_col = self.target_column();
        let features: Vec<Vec<f64>> = normalized
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(i, _)| *i != target_col)
                    .map(|(_, v)| *v)
                    .collect()
            })
            .collect();
        let targets: Vec<f64> = normalized.iter().map(|row| row[target_col]).collect();

        let model = GradientBoostedRegressor::fit(&features, &targets, self.config.boosting)?;
        let mse = model.mse(&features, &targets)?;
        debug!(
            "Fit surrogate with {} stumps, training mse {:.6}",
            model.stumps().len(),
            mse
        );
        Ok(mse)
    }
}

/// Per-nutrient `[min, max]` over a set of synthetic profiles
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientRanges {
    pub min: NutrientMap,
    pub max: NutrientMap,
}

impl NutrientRanges {
    pub fn from_profiles(profiles: &[SyntheticProfile]) -> Self {
        let mut ranges = NutrientRanges::default();
        for profile in profiles {
            for (name, value) in profile.nutrients.iter() {
                match ranges.min.get(name) {
                    Some(current) if current <= value => {}
                    _ => ranges.min.insert(name, value),
                }
                match ranges.max.get(name) {
                    Some(current) if current >= value => {}
                    _ => ranges.max.insert(name, value),
                }
            }
        }
        ranges
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutrank_core::CandidateItem;

    fn fixtures() -> (NutrientSchema, PopulationStats) {
        let schema = NutrientSchema::new(["Protein (g)", "Energy (kcal)", "Sodium (mg)"]).unwrap();
        let stats = PopulationStats::from_parts(vec![20.0, 400.0, 500.0], vec![10.0, 100.0, 200.0]).unwrap();
        (schema, stats)
    }

    fn ranked(n: usize) -> Vec<ScoredCandidate> {
        (0..n)
            .map(|i| {
                let v = i as f64;
                ScoredCandidate {
                    item: CandidateItem::new(i as u64, format!("Dish {}", i), vec![10.0 + v, 300.0 + 40.0 * v, 100.0 * v]),
                    score: 1.0 - 0.1 * v,
                    score_min: 0.0,
                    score_max: 1.0,
                    fuzzy_nutrient_ranges: Vec::new(),
                }
            })
            .collect()
    }

    fn seeded() -> SynthesizerConfig {
        SynthesizerConfig { seed: Some(7), ..SynthesizerConfig::default() }
    }

    #[test]
    fn test_insufficient_data() {
        let (schema, stats) = fixtures();
        let synth = ProfileSynthesizer::new(&schema, &stats, seeded());
        let outcome = synth.synthesize(&ranked(4)).unwrap();
        assert_eq!(outcome, SynthesisOutcome::InsufficientData { available: 4, required: 5 });
        assert!(outcome.profiles().is_empty());
    }

    #[test]
    fn test_profiles_from_top_three() {
        let (schema, stats) = fixtures();
        let synth = ProfileSynthesizer::new(&schema, &stats, seeded());
        let outcome = synth.synthesize(&ranked(8)).unwrap();
        let profiles = outcome.profiles();

        assert_eq!(profiles.len(), 6);
        let seeds: Vec<String> = profiles.iter().map(|p| p.seed_id.to_string()).collect();
        assert_eq!(seeds, vec!["0", "0", "1", "1", "2", "2"]);

        for profile in profiles {
            assert_eq!(profile.nutrients.len(), 3);
            let keys: Vec<&str> = profile.nutrients.iter().map(|(k, _)| k).collect();
            assert_eq!(keys, vec!["Protein (g)", "Energy (kcal)", "Sodium (mg)"]);
            assert!(profile.nutrients.iter().all(|(_, v)| v >= 0.0));
        }

        // noise of 0.05 std units stays within 1 std unit of the seed
        let energy = profiles[2].nutrients.get("Energy (kcal)").unwrap();
        assert!((energy - 340.0).abs() < 100.0);
    }

    #[test]
    fn test_clipped_at_zero() {
        let (schema, stats) = fixtures();
        let synth = ProfileSynthesizer::new(&schema, &stats, seeded());
        // the top seed has zero sodium, so half its perturbations would go negative
        let outcome = synth.synthesize(&ranked(5)).unwrap();
        for profile in &outcome.profiles()[..2] {
            assert!(profile.nutrients.get("Sodium (mg)").unwrap() >= 0.0);
        }
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let (schema, stats) = fixtures();
        let a = ProfileSynthesizer::new(&schema, &stats, seeded()).synthesize(&ranked(6)).unwrap();
        let b = ProfileSynthesizer::new(&schema, &stats, seeded()).synthesize(&ranked(6)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_target_column_falls_back_to_first() {
        let schema = NutrientSchema::new(["Protein (g)", "Sodium (mg)"]).unwrap();
        let stats = PopulationStats::from_parts(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();
        let synth = ProfileSynthesizer::new(&schema, &stats, seeded());
        assert_eq!(synth.target_column(), 0);

        let (schema, stats) = fixtures();
        assert_eq!(ProfileSynthesizer::new(&schema, &stats, seeded()).target_column(), 1);
    }

    #[test]
    fn test_outcome_json() {
        let json = serde_json::to_value(SynthesisOutcome::InsufficientData { available: 2, required: 5 }).unwrap();
        assert_eq!(json["status"], "insufficient_data");
        assert_eq!(json["available"], 2);
    }

    #[test]
    fn test_nutrient_ranges() {
        let profile = |a: f64, b: f64| SyntheticProfile {
            seed_id: CandidateId::Integer(1),
            nutrients: [("Energy (kcal)", a), ("Sodium (mg)", b)].into_iter().collect(),
        };
        let ranges = NutrientRanges::from_profiles(&[profile(300.0, 50.0), profile(250.0, 80.0), profile(320.0, 60.0)]);
        assert_eq!(ranges.min.get("Energy (kcal)"), Some(250.0));
        assert_eq!(ranges.max.get("Energy (kcal)"), Some(320.0));
        assert_eq!(ranges.min.get("Sodium (mg)"), Some(50.0));
        assert_eq!(ranges.max.get("Sodium (mg)"), Some(80.0));

        assert!(NutrientRanges::from_profiles(&[]).is_empty());
    }
}
