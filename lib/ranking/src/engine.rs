//! Recommendation engine
//!
//! `ReferenceData` is built once per process and shared through an `Arc`;
//! `Recommender::recommend` runs the whole pipeline for one user profile.

use crate::explain::{nutrient_contributions, RankingSummary};
use crate::payload::{QueryPayloadBuilder, SearchQueryPayload};
use crate::profile::UserProfile;
use crate::rank::{CandidateRanker, RankerConfig, ScoredCandidate, UserFilters};
use crate::synth::{NutrientRanges, ProfileSynthesizer, SynthesisOutcome, SynthesizerConfig};
use crate::target::TargetProfileBuilder;
use crate::weights::AdaptiveWeightEngine;
use nutrank_core::{ConstraintSet, NutrientSchema, PopulationStats, ReferenceDataset, Result};
use nutrank_guideline::{
    condition_constraints, diet_avoidance, load_corpus, CachedEmbedder, ConstraintExtractor, Embedder,
    GuidelineIndex, GuidelineRecord, HashEmbedder, DEFAULT_TOP_K,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Query embeddings kept by the default embedder
const QUERY_CACHE_CAPACITY: usize = 1024;

/// Immutable per-process reference state
pub struct ReferenceData {
    dataset: ReferenceDataset,
    base_weights: Vec<f64>,
    index: GuidelineIndex,
    extractor: ConstraintExtractor,
}

impl ReferenceData {
    pub fn new(
        dataset: ReferenceDataset,
        corpus: Vec<GuidelineRecord>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let index = GuidelineIndex::build(corpus, embedder)?;
        let base_weights = AdaptiveWeightEngine::new().base_weights(dataset.stats().stds());

        info!(
            "Reference data ready: {} candidates, {} nutrients, {} guidelines",
            dataset.len(),
            dataset.schema().len(),
            index.len()
        );
        Ok(Self {
            dataset,
            base_weights,
            index,
            extractor: ConstraintExtractor::default(),
        })
    }

    /// Load both files and embed the corpus with the default hash embedder
    pub fn load(dataset_path: impl AsRef<Path>, corpus_path: impl AsRef<Path>) -> Result<Self> {
        let dataset = ReferenceDataset::load(dataset_path)?;
        let corpus = load_corpus(corpus_path)?;
        let embedder = CachedEmbedder::new(HashEmbedder::default(), QUERY_CACHE_CAPACITY);
        Self::new(dataset, corpus, Arc::new(embedder))
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: ConstraintExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn dataset(&self) -> &ReferenceDataset {
        &self.dataset
    }

    pub fn schema(&self) -> &NutrientSchema {
        self.dataset.schema()
    }

    pub fn stats(&self) -> &PopulationStats {
        self.dataset.stats()
    }

    pub fn base_weights(&self) -> &[f64] {
        &self.base_weights
    }

    pub fn index(&self) -> &GuidelineIndex {
        &self.index
    }
}

impl std::fmt::Debug for ReferenceData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceData")
            .field("candidates", &self.dataset.len())
            .field("schema", self.dataset.schema())
            .field("index", &self.index)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Guidelines retrieved per request
    pub k: usize,
    pub ranker: RankerConfig,
    pub synthesizer: SynthesizerConfig,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_TOP_K,
            ranker: RankerConfig::default(),
            synthesizer: SynthesizerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub user_id: String,
    /// Conditions of the guidelines retrieved for this user
    pub retrieved_guidelines: Vec<String>,
    pub payload: SearchQueryPayload,
    pub top_candidates: Vec<ScoredCandidate>,
    pub summary: RankingSummary,
    pub synthesis: SynthesisOutcome,
    pub nutrient_ranges: NutrientRanges,
}

#[derive(Debug, Clone)]
pub struct Recommender {
    data: Arc<ReferenceData>,
    config: RecommenderConfig,
}

impl Recommender {
    pub fn new(data: Arc<ReferenceData>, config: RecommenderConfig) -> Self {
        Self { data, config }
    }

    pub fn data(&self) -> &Arc<ReferenceData> {
        &self.data
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// All constraints that apply to `profile`: the static condition table,
    /// rules over the retrieved guidelines, allergies and diet avoidances.
    pub fn constraints_for<'a, I>(&self, profile: &UserProfile, retrieved: I) -> ConstraintSet
    where
        I: IntoIterator<Item = &'a GuidelineRecord>,
    {
        let rag = self.data.extractor.extract(retrieved);
        let mut constraints = condition_constraints(&profile.medical_history).merged(&rag);
        constraints.avoid_ingredients.extend(&profile.allergies);
        constraints
            .avoid_ingredients
            .extend(diet_avoidance(&profile.dietary_preference));
        constraints
    }

    /// Run the pipeline for one user
    pub fn recommend(&self, profile: &UserProfile) -> Result<Recommendation> {
        let biometrics = profile.biometrics()?;
        let data = &*self.data;
        let schema = data.schema();
        let stats = data.stats();

        let retrieved = data.index.retrieve(&profile.medical_history, self.config.k)?;
        let constraints = self.constraints_for(profile, retrieved.iter().copied());
        debug!(
            "User {}: {} guidelines, {} avoid terms, {} thresholds",
            profile.user_id,
            retrieved.len(),
            constraints.avoid_ingredients.len(),
            constraints.nutrient_thresholds.len()
        );

        let target = TargetProfileBuilder::new().build(&biometrics, schema, stats.means())?;
        let weights = AdaptiveWeightEngine::new().apply_priority(
            &data.base_weights,
            retrieved.iter().copied(),
            schema,
        )?;

        let standardized = stats.normalize(&target)?;
        let payload = QueryPayloadBuilder::new(schema, stats).build(
            &standardized,
            &weights,
            &constraints,
            &profile.dietary_preference,
        )?;

        let filters = UserFilters::from_profile(profile);
        let ranker = CandidateRanker::new(schema, stats, self.config.ranker.clone());
        let ranked = ranker.rank_all(
            &target,
            &weights,
            &constraints,
            &filters,
            data.dataset.candidates(),
        )?;

        let synthesis = ProfileSynthesizer::new(schema, stats, self.config.synthesizer.clone())
            .synthesize(&ranked)?;
        let nutrient_ranges = NutrientRanges::from_profiles(synthesis.profiles());

        let filtered_count = ranked.len();
        let mut top_candidates = ranked;
        top_candidates.truncate(self.config.ranker.top_n);

        let best_contributions = top_candidates
            .first()
            .map(|best| nutrient_contributions(&ranker, schema, &target, &weights, &best.item))
            .transpose()?;
        let summary = RankingSummary::compute(
            &top_candidates,
            data.dataset.len(),
            filtered_count,
            best_contributions.as_ref(),
        );

        info!(
            "Recommended {} of {} candidates for user {}",
            top_candidates.len(),
            filtered_count,
            profile.user_id
        );

        Ok(Recommendation {
            user_id: profile.user_id.clone(),
            retrieved_guidelines: retrieved.iter().map(|r| r.condition.clone()).collect(),
            payload,
            top_candidates,
            summary,
            synthesis,
            nutrient_ranges,
        })
    }
}
