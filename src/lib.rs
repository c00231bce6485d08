//! # nutrank
//!
//! Adaptive, nutrient-based food ranking.
//!
//! Given a user profile, nutrank retrieves the medical dietary guidelines
//! closest to the user's conditions, turns them into structured constraints,
//! builds a daily nutrient target from biometrics and ranks reference recipes
//! by weighted cosine similarity under penalties. The best candidates then
//! seed a handful of synthetic nutrient profiles.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! nutrank recommend --dataset data/recipes.json --guidelines data/guidelines.json data/profiles.json
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use nutrank::prelude::*;
//! use std::sync::Arc;
//!
//! let data = ReferenceData::load("data/recipes.json", "data/guidelines.json").unwrap();
//! let recommender = Recommender::new(Arc::new(data), RecommenderConfig::default());
//!
//! let profile: UserProfile = serde_json::from_str(r#"{
//!     "userId": "user_001", "age": 25, "gender": "male",
//!     "weight": 65, "height": 175, "medicalHistory": ["Hypertension"]
//! }"#).unwrap();
//! let recommendation = recommender.recommend(&profile).unwrap();
//! println!("{}", serde_json::to_string_pretty(&recommendation).unwrap());
//! ```
//!
//! ## Crate Structure
//!
//! - `nutrank-core` - Schema, nutrient maps, population statistics, constraints, dataset loading
//! - `nutrank-guideline` - Guideline embedding, retrieval and rule-based constraint extraction
//! - `nutrank-ranking` - Targets, weights, ranking, profile synthesis and the recommendation engine

// Re-export core types
pub use nutrank_core::{
    AvoidList, CandidateId, CandidateItem, ConstraintSet, Error, MedicalLimits, NutrientMap,
    NutrientSchema, PopulationStats, ReferenceDataset, Result,
};

// Re-export guideline retrieval
pub use nutrank_guideline::{
    CachedEmbedder, ConstraintExtractor, Embedder, GuidelineIndex, GuidelineRecord, HashEmbedder,
};

// Re-export the pipeline
pub use nutrank_ranking::{
    AdaptiveWeightEngine, CandidateRanker, ProfileSynthesizer, QueryPayloadBuilder, RankRequest,
    RankerConfig, Recommendation, Recommender, RecommenderConfig, ReferenceData, ScoredCandidate,
    SearchQueryPayload, SynthesisOutcome, SynthesizerConfig, TargetProfileBuilder, UserFilters,
    UserProfile,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CandidateItem, ConstraintSet, Error, GuidelineRecord, HashEmbedder, NutrientSchema,
        RankRequest, RankerConfig, Recommendation, Recommender, RecommenderConfig, ReferenceData,
        ReferenceDataset, Result, SearchQueryPayload, SynthesisOutcome, UserFilters, UserProfile,
    };
}
