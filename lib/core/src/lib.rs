//! # nutrank Core
//!
//! Core data structures for the nutrank recommendation pipeline.
//!
//! - [`NutrientSchema`] - Ordered nutrient features; defines vector alignment
//! - [`NutrientMap`] - Schema-validated nutrient name → value map
//! - [`PopulationStats`] - Per-nutrient mean/std for standardization
//! - [`CandidateItem`] - A recipe row with its nutrient vector and tags
//! - [`ReferenceDataset`] - The shared, read-only recipe population
//! - [`ConstraintSet`] - Ingredient avoidances and nutrient upper bounds
//! - [`Vector`] - Dense embedding vector
//!
//! ## Example
//!
//! ```rust
//! use nutrank_core::{NutrientSchema, PopulationStats};
//!
//! let schema = NutrientSchema::new(["Calories", "Protein (g)"]).unwrap();
//! let rows = vec![vec![400.0, 12.0], vec![600.0, 30.0]];
//! let stats = PopulationStats::fit(rows.iter().map(Vec::as_slice), schema.len()).unwrap();
//!
//! let z = stats.normalize(&[500.0, 21.0]).unwrap();
//! assert_eq!(z, vec![0.0, 0.0]);
//! ```

pub mod candidate;
pub mod constraints;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod nutrients;
pub mod schema;
pub mod stats;
pub mod vector;

pub use candidate::{CandidateId, CandidateItem};
pub use constraints::{ingredient_stem, AvoidList, ConstraintSet, MedicalLimits};
pub use dataset::ReferenceDataset;
pub use error::{Error, Result};
pub use filter::{Filter, FilterCondition};
pub use nutrients::NutrientMap;
pub use schema::{simplify_keyword, NutrientSchema};
pub use stats::{rectify, PopulationStats};
pub use vector::Vector;
