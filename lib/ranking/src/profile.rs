//! User profile documents
//!
//! The request-side input: biometrics plus dietary and medical context.
//! Biometrics are validated before the pipeline runs.

use nutrank_core::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    #[serde(alias = "lightly-active", alias = "lightly_active")]
    Light,
    #[default]
    #[serde(alias = "moderately-active")]
    ModeratelyActive,
    #[serde(alias = "very-active", alias = "extra-active", alias = "very_active")]
    Active,
    /// Any unrecognized level; treated like moderate activity
    #[serde(other)]
    Unknown,
}

impl ActivityLevel {
    /// Multiplier from basal to total daily energy expenditure
    pub fn factor(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::Unknown => 1.55,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryGoal {
    #[serde(alias = "weight-loss")]
    WeightLoss,
    #[serde(alias = "weight-gain")]
    WeightGain,
    #[serde(alias = "muscle-gain")]
    MuscleGain,
    #[default]
    #[serde(other)]
    Maintenance,
}

/// Validated biometric inputs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UserBiometrics {
    /// kg
    pub weight: f64,
    /// cm
    pub height: f64,
    /// years
    pub age: f64,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    pub primary_goal: PrimaryGoal,
}

impl UserBiometrics {
    pub fn new(
        weight: f64,
        height: f64,
        age: f64,
        gender: Gender,
        activity_level: ActivityLevel,
        primary_goal: PrimaryGoal,
    ) -> Result<Self> {
        for (field, value) in [("weight", weight), ("height", height), ("age", age)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidUserInput(format!(
                    "{} must be a positive number, got {}",
                    field, value
                )));
            }
        }

        Ok(Self {
            weight,
            height,
            age,
            gender,
            activity_level,
            primary_goal,
        })
    }
}

/// A user profile document as submitted by a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(alias = "user_id")]
    pub user_id: String,
    pub age: f64,
    #[serde(default)]
    pub gender: Gender,
    pub weight: f64,
    pub height: f64,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub dietary_preference: String,
    #[serde(default)]
    pub primary_goal: PrimaryGoal,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub medical_history: Vec<String>,
    #[serde(default)]
    pub health_goals: Vec<String>,
    /// Region allow-list; `None` keeps every region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_region: Option<String>,
}

impl UserProfile {
    /// Validate and extract biometrics
    pub fn biometrics(&self) -> Result<UserBiometrics> {
        UserBiometrics::new(
            self.weight,
            self.height,
            self.age,
            self.gender,
            self.activity_level,
            self.primary_goal,
        )
    }
}
