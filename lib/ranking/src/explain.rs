//! Explainability for ranking results
//!
//! Breaks a candidate's similarity down per nutrient and summarizes a result
//! list, so callers can see which nutrients drove a recommendation.

use crate::rank::{CandidateRanker, ScoredCandidate};
use nutrank_core::{CandidateItem, NutrientMap, NutrientSchema, Result};
use serde::{Deserialize, Serialize};

/// Per-nutrient share of the cosine similarity between target and candidate.
///
/// Contributions sum to the raw similarity (before preference blending and
/// penalties). All zero when either projected vector is zero.
pub fn nutrient_contributions(
    ranker: &CandidateRanker<'_>,
    schema: &NutrientSchema,
    target: &[f64],
    weights: &[f64],
    item: &CandidateItem,
) -> Result<NutrientMap> {
    let query = ranker.project(target, weights)?;
    let candidate = ranker.project(&item.nutrients, weights)?;

    let norm = |v: &[f64]| v.iter().map(|x| x * x).sum::<f64>().sqrt();
    let denom = norm(&query) * norm(&candidate);
    let contributions: Vec<f64> = query
        .iter()
        .zip(&candidate)
        .map(|(q, c)| if denom > 0.0 { q * c / denom } else { 0.0 })
        .collect();

    NutrientMap::from_dense(schema, &contributions)
}

/// Summary statistics for one ranking
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingSummary {
    /// Candidates in the dataset before filtering
    pub candidates_count: usize,
    /// Candidates that survived filtering
    pub filtered_count: usize,
    pub results_count: usize,
    pub avg_score: f64,
    pub best_score: f64,
    /// Nutrient contributing most to the best result's similarity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_contributing_nutrient: Option<String>,
}

impl RankingSummary {
    pub fn compute(
        results: &[ScoredCandidate],
        candidates_count: usize,
        filtered_count: usize,
        best_contributions: Option<&NutrientMap>,
    ) -> Self {
        if results.is_empty() {
            return Self {
                candidates_count,
                filtered_count,
                ..Self::default()
            };
        }

        let avg_score = results.iter().map(|r| r.score).sum::<f64>() / results.len() as f64;
        let top_contributing_nutrient = best_contributions.and_then(|contributions| {
            contributions
                .iter()
                .filter(|(_, v)| *v > 0.0)
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(name, _)| name.to_string())
        });

        Self {
            candidates_count,
            filtered_count,
            results_count: results.len(),
            avg_score,
            // results are sorted
            best_score: results[0].score,
            top_contributing_nutrient,
        }
    }
}
