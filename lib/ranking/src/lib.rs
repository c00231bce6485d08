//! # nutrank Ranking
//!
//! The adaptive recommendation pipeline: nutrient targets from biometrics,
//! variability-driven weights, constrained candidate ranking, synthetic
//! profile generation and query payload assembly.
//!
//! ## Example
//!
//! ```rust
//! use nutrank_core::{CandidateItem, ReferenceDataset, NutrientSchema};
//! use nutrank_guideline::{GuidelineRecord, HashEmbedder};
//! use nutrank_ranking::{ReferenceData, Recommender, RecommenderConfig, UserProfile};
//! use std::sync::Arc;
//!
//! let schema = NutrientSchema::new(["Energy (kcal)", "Sodium (mg)"]).unwrap();
//! let dataset = ReferenceDataset::new(schema, vec![
//!     CandidateItem::new(1u64, "Lentil Stew", vec![450.0, 600.0]),
//!     CandidateItem::new(2u64, "Miso Soup", vec![120.0, 1800.0]),
//! ]).unwrap();
//! let corpus = vec![GuidelineRecord::new("Hypertension", "Follow a low sodium diet.")];
//! let data = ReferenceData::new(dataset, corpus, Arc::new(HashEmbedder::default())).unwrap();
//!
//! let profile: UserProfile = serde_json::from_str(r#"{
//!     "userId": "u1", "age": 40, "weight": 80, "height": 180,
//!     "medicalHistory": ["Hypertension"]
//! }"#).unwrap();
//!
//! let recommender = Recommender::new(Arc::new(data), RecommenderConfig::default());
//! let recommendation = recommender.recommend(&profile).unwrap();
//! assert_eq!(recommendation.top_candidates[0].item.title, "Lentil Stew");
//! ```

pub mod distance;
pub mod engine;
pub mod explain;
pub mod payload;
pub mod profile;
pub mod rank;
pub mod surrogate;
pub mod synth;
pub mod target;
pub mod weights;

pub use distance::{cosine_similarity, population_std, region_preference};
pub use engine::{Recommendation, Recommender, RecommenderConfig, ReferenceData};
pub use explain::{nutrient_contributions, RankingSummary};
pub use payload::{PayloadMetadata, QueryPayloadBuilder, SearchQueryPayload};
pub use profile::{ActivityLevel, Gender, PrimaryGoal, UserBiometrics, UserProfile};
pub use rank::{CandidateRanker, RankRequest, RankerConfig, ScoredCandidate, UserFilters};
pub use surrogate::{BoostingConfig, GradientBoostedRegressor, Stump};
pub use synth::{NutrientRanges, ProfileSynthesizer, SynthesisOutcome, SynthesizerConfig, SyntheticProfile};
pub use target::TargetProfileBuilder;
pub use weights::AdaptiveWeightEngine;
