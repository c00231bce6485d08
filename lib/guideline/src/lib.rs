//! # nutrank Guideline
//!
//! Retrieval of medical dietary guidelines and extraction of structured
//! constraints from them.
//!
//! ## Example
//!
//! ```rust
//! use nutrank_guideline::{ConstraintExtractor, GuidelineIndex, GuidelineRecord, HashEmbedder};
//! use std::sync::Arc;
//!
//! let corpus = vec![
//!     GuidelineRecord::new("Hypertension", "Follow a low sodium diet and limit salt."),
//!     GuidelineRecord::new("Diabetes Type 2", "Limit added sugar."),
//! ];
//! let index = GuidelineIndex::build(corpus, Arc::new(HashEmbedder::default())).unwrap();
//!
//! let retrieved = index.retrieve(&["Hypertension"], 1).unwrap();
//! let constraints = ConstraintExtractor::default().extract(retrieved.iter().copied());
//! assert_eq!(constraints.nutrient_thresholds["Sodium, Na (mg)"], 1500.0);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Corpus    │────>│  Embedder   │────>│   Index     │
//! │ (records)   │     │ (text→v)    │     │ (flat L2)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                     ┌─────────────┐            │
//!                     │  Extractor  │<───────────┘
//!                     │ (rule table)│
//!                     └─────────────┘
//!                            │
//!                     ┌─────────────┐
//!                     │ConstraintSet│
//!                     └─────────────┘
//! ```

pub mod embedder;
pub mod extract;
pub mod index;
pub mod record;

pub use embedder::{hash_text_to_vector, CachedEmbedder, Embedder, HashEmbedder, DEFAULT_EMBEDDING_DIM};
pub use extract::{
    condition_constraints, diet_avoidance, ConstraintExtractor, ExtractionRule, RuleEffect,
    CONDITION_LIMITS, SODIUM_NUTRIENT, SUGAR_NUTRIENT,
};
pub use index::{GuidelineIndex, DEFAULT_TOP_K};
pub use record::{load_corpus, GuidelineRecord};
