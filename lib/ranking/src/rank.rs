//! Candidate ranking
//!
//! Scores every candidate that survives the hard filters against a target
//! nutrient vector:
//!
//! 1. z-score target and candidate with population statistics
//! 2. half-rectify (optional, on by default)
//! 3. multiply by the adaptive weights
//! 4. cosine similarity, blended with a region preference score
//! 5. multiplicative penalties for medical limits, nutrient thresholds and
//!    avoided ingredients
//!
//! Each result also carries an uncertainty band derived from the spread of
//! scores over the filtered set.

use crate::distance::{cosine_similarity, population_std, region_preference};
use crate::payload::SearchQueryPayload;
use crate::profile::UserProfile;
use nutrank_core::{
    rectify, AvoidList, CandidateItem, ConstraintSet, Error, Filter, FilterCondition,
    NutrientSchema, PopulationStats, ReferenceDataset, Result,
};
use nutrank_guideline::diet_avoidance;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::{debug, warn};

/// Score multiplier for sugar above `max_sugar`
pub const SUGAR_LIMIT_PENALTY: f64 = 0.5;
/// Score multiplier for sodium above `max_sodium`
pub const SODIUM_LIMIT_PENALTY: f64 = 0.3;
/// Score multiplier per exceeded nutrient threshold
pub const THRESHOLD_PENALTY: f64 = 0.1;
/// Score multiplier for a title containing an avoided ingredient
pub const AVOID_PENALTY: f64 = 0.001;

/// Band spread used when fewer than two candidates are scored
const FALLBACK_SCORE_STD: f64 = 0.05;

/// Ranker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    /// Number of results returned by `rank`
    pub top_n: usize,
    pub similarity_weight: f64,
    pub preference_weight: f64,
    /// Clamp below-average normalized components to zero before weighting
    pub rectify: bool,
    /// Drop candidates matching an avoided ingredient instead of penalizing them
    pub hard_filter_avoided: bool,
    /// Score band half-width as a fraction of the score spread
    pub score_band: f64,
    /// Nutrient band half-width as a fraction of the value
    pub nutrient_band: f64,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            top_n: 5,
            similarity_weight: 0.7,
            preference_weight: 0.3,
            rectify: true,
            hard_filter_avoided: false,
            score_band: 0.1,
            nutrient_band: 0.05,
        }
    }
}

/// Request-scoped hard filters and preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserFilters {
    /// Dietary flag that must not be false on a candidate
    #[serde(default)]
    pub dietary_preference: Option<String>,
    /// Region allow-list
    #[serde(default)]
    pub regions: Option<Vec<String>>,
    #[serde(default)]
    pub preferred_region: Option<String>,
    #[serde(default)]
    pub allergies: AvoidList,
}

impl UserFilters {
    pub fn from_profile(profile: &UserProfile) -> Self {
        let diet = profile.dietary_preference.trim().to_lowercase();
        Self {
            dietary_preference: (!diet.is_empty()).then_some(diet),
            regions: profile.regions.clone(),
            preferred_region: profile.preferred_region.clone(),
            allergies: AvoidList::from(profile.allergies.clone()),
        }
    }

    /// Compose the hard filters into a single condition
    pub fn to_condition(&self) -> FilterCondition {
        let mut conditions = Vec::new();
        if let Some(flag) = &self.dietary_preference {
            conditions.push(FilterCondition::DietaryFlag { flag: flag.clone() });
        }
        if let Some(regions) = &self.regions {
            conditions.push(FilterCondition::RegionIn(regions.clone()));
        }
        if !self.allergies.is_empty() {
            conditions.push(FilterCondition::TitleExcludes(self.allergies.clone()));
        }
        FilterCondition::And(conditions)
    }
}

/// A candidate with its final score and uncertainty bands
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub item: CandidateItem,
    pub score: f64,
    pub score_min: f64,
    pub score_max: f64,
    /// `[low, high]` per nutrient, aligned to the schema
    pub fuzzy_nutrient_ranges: Vec<[f64; 2]>,
}

/// Penalty inputs resolved to schema positions.
///
/// Medical limits and guideline thresholds both go through
/// [`NutrientSchema::resolve`].
#[derive(Debug, Default)]
struct ResolvedPenalties<'c> {
    max_sugar: Option<(usize, f64)>,
    max_sodium: Option<(usize, f64)>,
    thresholds: Vec<(usize, f64)>,
    avoid: Option<&'c AvoidList>,
}

impl ResolvedPenalties<'_> {
    fn factor(&self, item: &CandidateItem) -> f64 {
        let mut penalty = 1.0;
        if let Some((idx, limit)) = self.max_sugar {
            if item.nutrients[idx] > limit {
                penalty *= SUGAR_LIMIT_PENALTY;
            }
        }
        if let Some((idx, limit)) = self.max_sodium {
            if item.nutrients[idx] > limit {
                penalty *= SODIUM_LIMIT_PENALTY;
            }
        }
        for &(idx, limit) in &self.thresholds {
            if item.nutrients[idx] > limit {
                penalty *= THRESHOLD_PENALTY;
            }
        }
        if let Some(avoid) = self.avoid {
            if avoid.matches(&item.title) {
                penalty *= AVOID_PENALTY;
            }
        }
        penalty
    }
}

/// Ranks candidates against one reference population
#[derive(Debug, Clone)]
pub struct CandidateRanker<'a> {
    schema: &'a NutrientSchema,
    stats: &'a PopulationStats,
    config: RankerConfig,
}

impl<'a> CandidateRanker<'a> {
    pub fn new(schema: &'a NutrientSchema, stats: &'a PopulationStats, config: RankerConfig) -> Self {
        Self { schema, stats, config }
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    /// Top `top_n` candidates, best first
    pub fn rank(
        &self,
        target: &[f64],
        weights: &[f64],
        constraints: &ConstraintSet,
        filters: &UserFilters,
        candidates: &[CandidateItem],
    ) -> Result<Vec<ScoredCandidate>> {
        let mut ranked = self.rank_all(target, weights, constraints, filters, candidates)?;
        ranked.truncate(self.config.top_n);
        Ok(ranked)
    }

    /// Every candidate that survives filtering, best first.
    ///
    /// `target` is in raw nutrient units. Ties keep dataset order.
    pub fn rank_all(
        &self,
        target: &[f64],
        weights: &[f64],
        constraints: &ConstraintSet,
        filters: &UserFilters,
        candidates: &[CandidateItem],
    ) -> Result<Vec<ScoredCandidate>> {
        self.schema.check_dim(target.len())?;
        self.schema.check_dim(weights.len())?;
        self.schema.check_dim(self.stats.dim())?;
        if let Some(bad) = candidates.iter().find(|c| c.nutrients.len() != self.schema.len()) {
            return Err(Error::InvalidDimension {
                expected: self.schema.len(),
                actual: bad.nutrients.len(),
            });
        }

        let query = self.project(target, weights)?;
        let penalties = self.resolve_penalties(constraints);
        let filter = filters.to_condition();
        let hard_avoid = self.config.hard_filter_avoided.then_some(&constraints.avoid_ingredients);
        let preferred = filters.preferred_region.as_deref();

        let mut scored: Vec<(f64, &CandidateItem)> = candidates
            .par_iter()
            .filter(|item| filter.matches(item))
            .filter(|item| hard_avoid.map_or(true, |avoid| !avoid.matches(&item.title)))
            .map(|item| {
                let projected = self.project(&item.nutrients, weights)?;
                // unrectified vectors can point away from the target
                let similarity = cosine_similarity(&query, &projected).max(0.0);
                let preference = region_preference(item.region.as_deref(), preferred);
                let blended = self.config.similarity_weight * similarity
                    + self.config.preference_weight * preference;
                let score = (blended * penalties.factor(item)).clamp(0.0, 1.0);
                Ok::<_, Error>((score, item))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Scored {} of {} candidates after filtering",
            scored.len(),
            candidates.len()
        );
        if scored.is_empty() {
            return Ok(Vec::new());
        }

        scored.sort_by_key(|(score, _)| Reverse(OrderedFloat(*score)));

        let scores: Vec<f64> = scored.iter().map(|(score, _)| *score).collect();
        let spread = if scores.len() < 2 {
            FALLBACK_SCORE_STD
        } else {
            population_std(&scores)
        };
        let half_width = self.config.score_band * spread;

        Ok(scored
            .into_iter()
            .map(|(score, item)| ScoredCandidate {
                score,
                score_min: (score - half_width).clamp(0.0, 1.0),
                score_max: (score + half_width).clamp(score, 1.0),
                fuzzy_nutrient_ranges: self.nutrient_bands(&item.nutrients),
                item: item.clone(),
            })
            .collect())
    }

    /// Standardize, optionally rectify, then weight
    pub fn project(&self, raw: &[f64], weights: &[f64]) -> Result<Vec<f64>> {
        let mut z = self.stats.normalize(raw)?;
        if self.config.rectify {
            rectify(&mut z);
        }
        for (v, w) in z.iter_mut().zip(weights) {
            *v *= w;
        }
        Ok(z)
    }

    fn nutrient_bands(&self, nutrients: &[f64]) -> Vec<[f64; 2]> {
        let band = self.config.nutrient_band;
        nutrients
            .iter()
            .map(|v| {
                let a = v * (1.0 - band);
                let b = v * (1.0 + band);
                [a.min(b), a.max(b)]
            })
            .collect()
    }

    fn resolve_penalties<'c>(&self, constraints: &'c ConstraintSet) -> ResolvedPenalties<'c> {
        let limits = &constraints.medical_limits;
        let max_sugar = limits
            .max_sugar
            .and_then(|limit| self.schema.resolve("sugar").map(|idx| (idx, limit)));
        let max_sodium = limits
            .max_sodium
            .and_then(|limit| self.schema.resolve("sodium").map(|idx| (idx, limit)));

        let mut thresholds = Vec::with_capacity(constraints.nutrient_thresholds.len());
        for (name, limit) in &constraints.nutrient_thresholds {
            match self.schema.resolve(name) {
                Some(idx) => thresholds.push((idx, *limit)),
                None => warn!("Threshold on {:?} does not match any dataset nutrient", name),
            }
        }

        let avoid = (!self.config.hard_filter_avoided && !constraints.avoid_ingredients.is_empty())
            .then_some(&constraints.avoid_ingredients);

        ResolvedPenalties {
            max_sugar,
            max_sodium,
            thresholds,
            avoid,
        }
    }
}

/// A ranking request expressed entirely in a [`SearchQueryPayload`].
///
/// The payload's target keys define the schema; candidates must be aligned to
/// it. Statistics are fit over the candidate pool itself.
#[derive(Debug, Clone)]
pub struct RankRequest {
    pub schema: NutrientSchema,
    pub target: Vec<f64>,
    pub weights: Vec<f64>,
    pub constraints: ConstraintSet,
    pub filters: UserFilters,
}

impl RankRequest {
    pub fn from_payload(payload: &SearchQueryPayload) -> Result<Self> {
        let schema = NutrientSchema::new(payload.target_nutrients.iter().map(|(name, _)| name))?;
        let target = payload.target_nutrients.to_dense(&schema)?;
        let weights = payload.weights.to_dense(&schema)?;

        // Payload thresholds come from the caller: reject unknown keys up front
        payload.constraints.resolve_thresholds(&schema)?;

        let mut constraints = payload.constraints.clone();
        constraints
            .avoid_ingredients
            .extend(diet_avoidance(&payload.dietary_preference).iter());

        let diet = payload.dietary_preference.trim().to_lowercase();
        let filters = UserFilters {
            dietary_preference: (!diet.is_empty()).then_some(diet),
            ..UserFilters::default()
        };

        Ok(Self {
            schema,
            target,
            weights,
            constraints,
            filters,
        })
    }

    /// Re-project a dataset's candidates onto the payload's nutrient order.
    ///
    /// Every payload nutrient must resolve to a dataset column.
    pub fn align(&self, dataset: &ReferenceDataset) -> Result<Vec<CandidateItem>> {
        let columns = self
            .schema
            .iter()
            .map(|name| {
                dataset
                    .schema()
                    .resolve(name)
                    .ok_or_else(|| Error::UnknownNutrient(name.to_string()))
            })
            .collect::<Result<Vec<usize>>>()?;

        Ok(dataset
            .candidates()
            .iter()
            .map(|item| CandidateItem {
                nutrients: columns.iter().map(|&c| item.nutrients[c]).collect(),
                ..item.clone()
            })
            .collect())
    }

    /// Rank `candidates`, fitting normalization over the pool
    pub fn rank(&self, candidates: &[CandidateItem], config: RankerConfig) -> Result<Vec<ScoredCandidate>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let stats = PopulationStats::fit(
            candidates.iter().map(|c| c.nutrients.as_slice()),
            self.schema.len(),
        )?;
        CandidateRanker::new(&self.schema, &stats, config).rank(
            &self.target,
            &self.weights,
            &self.constraints,
            &self.filters,
            candidates,
        )
    }
}
