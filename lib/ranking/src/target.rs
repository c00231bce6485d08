//! Daily nutrient targets from biometrics
//!
//! Energy comes from the Mifflin-St Jeor BMR scaled by activity; a handful of
//! nutrients have fixed reference intakes; everything else falls back to the
//! population mean.

use crate::profile::{Gender, PrimaryGoal, UserBiometrics};
use nutrank_core::{simplify_keyword, NutrientSchema, Result};

/// Calorie deficit applied for weight loss
const WEIGHT_LOSS_FACTOR: f64 = 0.85;

/// Protein grams per kg of body weight
const PROTEIN_PER_KG: f64 = 1.2;

/// Fixed daily reference intakes, matched by leading keyword word(s)
const REFERENCE_INTAKES: &[(&str, f64)] = &[
    ("carbohydrate", 200.0),
    ("total lipid", 60.0),
    ("fat", 60.0),
    ("fiber", 30.0),
    ("sugars", 25.0),
    ("sugar", 25.0),
    ("sodium", 1500.0),
    ("calcium", 1000.0),
    ("iron", 18.0),
    ("potassium", 3500.0),
    ("vitamin c", 90.0),
    ("cholesterol", 300.0),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct TargetProfileBuilder;

impl TargetProfileBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Basal metabolic rate, kcal/day
    pub fn bmr(biometrics: &UserBiometrics) -> f64 {
        let sex = match biometrics.gender {
            Gender::Male => 5.0,
            Gender::Other => -161.0,
        };
        10.0 * biometrics.weight + 6.25 * biometrics.height - 5.0 * biometrics.age + sex
    }

    /// Total daily energy expenditure after activity and goal adjustment
    pub fn tdee(biometrics: &UserBiometrics) -> f64 {
        let tdee = Self::bmr(biometrics) * biometrics.activity_level.factor();
        match biometrics.primary_goal {
            PrimaryGoal::WeightLoss => tdee * WEIGHT_LOSS_FACTOR,
            _ => tdee,
        }
    }

    /// Raw daily target aligned to `schema`.
    ///
    /// `population_means` may be empty, in which case unmatched nutrients
    /// target 0.
    pub fn build(
        &self,
        biometrics: &UserBiometrics,
        schema: &NutrientSchema,
        population_means: &[f64],
    ) -> Result<Vec<f64>> {
        if !population_means.is_empty() {
            schema.check_dim(population_means.len())?;
        }

        let tdee = Self::tdee(biometrics);
        Ok(schema
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let keyword = simplify_keyword(name);
                if leads_with(&keyword, "energy") || leads_with(&keyword, "calories") {
                    tdee
                } else if leads_with(&keyword, "protein") {
                    PROTEIN_PER_KG * biometrics.weight
                } else if let Some((_, intake)) = REFERENCE_INTAKES
                    .iter()
                    .find(|(prefix, _)| leads_with(&keyword, prefix))
                {
                    *intake
                } else {
                    population_means.get(i).copied().unwrap_or(0.0)
                }
            })
            .collect())
    }
}

/// `keyword` starts with `word` at a word boundary ("fat" does not match "fatty acids")
fn leads_with(keyword: &str, word: &str) -> bool {
    keyword
        .strip_prefix(word)
        .map(|rest| !rest.starts_with(|c: char| c.is_alphanumeric()))
        .unwrap_or(false)
}
