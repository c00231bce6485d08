//! Rule-based constraint extraction
//!
//! Turns retrieved guideline text into a [`ConstraintSet`] with an explicit,
//! ordered table of (trigger → effect) rules. Matching is lower-cased
//! substring search; there is no language understanding here, and the table
//! can be swapped wholesale without touching the ranking pipeline.

use crate::record::GuidelineRecord;
use nutrank_core::{ConstraintSet, MedicalLimits};
use smallvec::{smallvec, SmallVec};
use tracing::debug;

pub const SODIUM_NUTRIENT: &str = "Sodium, Na (mg)";
pub const SUGAR_NUTRIENT: &str = "Sugars, total (g)";

/// What a rule does to the constraint set when it fires
#[derive(Debug, Clone, PartialEq)]
pub enum RuleEffect {
    Avoid(&'static str),
    Threshold {
        nutrient: &'static str,
        limit: f64,
    },
}

/// A trigger/effect pair.
///
/// The rule fires when the text contains any of `triggers` and, if `gate` is
/// non-empty, also any of `gate`.
#[derive(Debug, Clone)]
pub struct ExtractionRule {
    pub gate: SmallVec<[&'static str; 2]>,
    pub triggers: SmallVec<[&'static str; 2]>,
    pub effect: RuleEffect,
}

impl ExtractionRule {
    fn fires(&self, text: &str) -> bool {
        let gated = self.gate.is_empty() || self.gate.iter().any(|g| text.contains(g));
        gated && self.triggers.iter().any(|t| text.contains(t))
    }
}

/// Ordered rule table applied to every retrieved guideline
#[derive(Debug, Clone)]
pub struct ConstraintExtractor {
    rules: Vec<ExtractionRule>,
}

impl Default for ConstraintExtractor {
    fn default() -> Self {
        let restrict: SmallVec<[&'static str; 2]> = smallvec!["avoid", "limit"];
        let avoid = |triggers: SmallVec<[&'static str; 2]>, term| ExtractionRule {
            gate: restrict.clone(),
            triggers,
            effect: RuleEffect::Avoid(term),
        };

        Self::new(vec![
            avoid(smallvec!["sugar"], "sugar"),
            avoid(smallvec!["salt", "sodium"], "salt"),
            avoid(smallvec!["fat"], "fat"),
            avoid(smallvec!["oil"], "oil"),
            ExtractionRule {
                gate: SmallVec::new(),
                triggers: smallvec!["low sodium"],
                effect: RuleEffect::Threshold { nutrient: SODIUM_NUTRIENT, limit: 1500.0 },
            },
            ExtractionRule {
                gate: SmallVec::new(),
                triggers: smallvec!["low sugar"],
                effect: RuleEffect::Threshold { nutrient: SUGAR_NUTRIENT, limit: 25.0 },
            },
        ])
    }
}

impl ConstraintExtractor {
    pub fn new(rules: Vec<ExtractionRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ExtractionRule] {
        &self.rules
    }

    /// Scan each guideline's text and collect the effects of every firing rule
    pub fn extract<'a, I>(&self, retrieved: I) -> ConstraintSet
    where
        I: IntoIterator<Item = &'a GuidelineRecord>,
    {
        let mut constraints = ConstraintSet::new();
        for record in retrieved {
            let text = record.text.to_lowercase();
            for rule in self.rules.iter().filter(|r| r.fires(&text)) {
                match &rule.effect {
                    RuleEffect::Avoid(term) => {
                        constraints.avoid_ingredients.insert(term);
                    }
                    RuleEffect::Threshold { nutrient, limit } => {
                        constraints.add_threshold(*nutrient, *limit);
                    }
                }
            }
        }

        debug!(
            "Extracted {} avoid terms and {} thresholds from guidelines",
            constraints.avoid_ingredients.len(),
            constraints.nutrient_thresholds.len()
        );
        constraints
    }
}

/// Static medical-history table, independent of retrieval
pub const CONDITION_LIMITS: &[(&str, MedicalLimits)] = &[
    (
        "Diabetes Type 2",
        MedicalLimits { max_sugar: Some(25.0), max_sodium: None },
    ),
    (
        "Hypertension",
        MedicalLimits { max_sugar: None, max_sodium: Some(1500.0) },
    ),
];

/// Limits for every known condition in the user's medical history
pub fn condition_constraints<S: AsRef<str>>(medical_history: &[S]) -> ConstraintSet {
    let mut constraints = ConstraintSet::new();
    for condition in medical_history {
        let condition = condition.as_ref().trim();
        if let Some((_, limits)) = CONDITION_LIMITS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(condition))
        {
            constraints.medical_limits.merge(limits);
        }
    }
    constraints
}

const VEGAN_AVOID: &[&str] = &[
    "chicken", "beef", "pork", "fish", "egg", "dairy", "milk", "cheese", "honey", "meat", "lamb",
    "shrimp", "seafood", "clam", "oyster", "crab", "bacon", "steak",
];

const VEGETARIAN_AVOID: &[&str] = &[
    "chicken", "beef", "pork", "fish", "meat", "lamb", "shrimp", "seafood", "clam", "oyster",
    "crab", "bacon", "steak",
];

const PESCETARIAN_AVOID: &[&str] = &["chicken", "beef", "pork", "meat", "lamb", "bacon", "steak"];

/// Ingredient terms incompatible with a dietary preference
pub fn diet_avoidance(dietary_preference: &str) -> &'static [&'static str] {
    match dietary_preference.trim().to_lowercase().as_str() {
        "vegan" => VEGAN_AVOID,
        "vegetarian" => VEGETARIAN_AVOID,
        "pescetarian" => PESCETARIAN_AVOID,
        _ => &[],
    }
}
