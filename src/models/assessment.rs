// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Assessment (fitness intake) record for storage and API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Main training goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    WeightLoss,
    MuscleGain,
    Maintenance,
    Fitness,
    Strength,
    Endurance,
    GeneralFitness,
}

impl Goal {
    pub const ALL: [Goal; 7] = [
        Goal::WeightLoss,
        Goal::MuscleGain,
        Goal::Maintenance,
        Goal::Fitness,
        Goal::Strength,
        Goal::Endurance,
        Goal::GeneralFitness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::WeightLoss => "weight_loss",
            Goal::MuscleGain => "muscle_gain",
            Goal::Maintenance => "maintenance",
            Goal::Fitness => "fitness",
            Goal::Strength => "strength",
            Goal::Endurance => "endurance",
            Goal::GeneralFitness => "general_fitness",
        }
    }
}

impl FromStr for Goal {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Goal::ALL
            .into_iter()
            .find(|g| g.as_str() == s.trim())
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Day-to-day activity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtraActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtraActive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::LightlyActive => "lightly_active",
            ActivityLevel::ModeratelyActive => "moderately_active",
            ActivityLevel::VeryActive => "very_active",
            ActivityLevel::ExtraActive => "extra_active",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityLevel::ALL
            .into_iter()
            .find(|a| a.as_str() == s.trim())
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Training experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingExperience {
    Beginner,
    Intermediate,
    Advanced,
}

impl TrainingExperience {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingExperience::Beginner => "beginner",
            TrainingExperience::Intermediate => "intermediate",
            TrainingExperience::Advanced => "advanced",
        }
    }
}

impl FromStr for TrainingExperience {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "beginner" => Ok(TrainingExperience::Beginner),
            "intermediate" => Ok(TrainingExperience::Intermediate),
            "advanced" => Ok(TrainingExperience::Advanced),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// Training day, stored by its Spanish name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Lunes,
    Martes,
    #[serde(rename = "Miércoles")]
    Miercoles,
    Jueves,
    Viernes,
    #[serde(rename = "Sábado")]
    Sabado,
    Domingo,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Lunes,
        Weekday::Martes,
        Weekday::Miercoles,
        Weekday::Jueves,
        Weekday::Viernes,
        Weekday::Sabado,
        Weekday::Domingo,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Lunes => "Lunes",
            Weekday::Martes => "Martes",
            Weekday::Miercoles => "Miércoles",
            Weekday::Jueves => "Jueves",
            Weekday::Viernes => "Viernes",
            Weekday::Sabado => "Sábado",
            Weekday::Domingo => "Domingo",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Weekday {
    type Err = UnknownVariant;

    /// Case-insensitive; accents optional ("miercoles" == "Miércoles").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| match c {
                'á' => 'a',
                'é' => 'e',
                _ => c,
            })
            .collect();

        Weekday::ALL
            .into_iter()
            .find(|d| d.label().to_lowercase().replace('é', "e").replace('á', "a") == folded)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Value outside a closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value: {0:?}")]
pub struct UnknownVariant(pub String);

/// Validated answers, ready to insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewAssessment {
    /// Identity ID of the submitter (not unique: one row per completed run)
    pub user_id: String,
    #[validate(range(min = 1, max = 120, message = "Age must be between 1 and 120"))]
    pub age: u32,
    /// Kilograms
    #[validate(range(min = 20.0, max = 400.0, message = "Weight must be between 20 and 400 kg"))]
    pub weight: f64,
    /// Centimetres
    #[validate(range(min = 80.0, max = 250.0, message = "Height must be between 80 and 250 cm"))]
    pub height: f64,
    pub goal: Goal,
    pub activity_level: ActivityLevel,
    #[validate(length(max = 2000, message = "Too long"))]
    pub medical_conditions: String,
    #[validate(length(max = 2000, message = "Too long"))]
    pub dietary_restrictions: String,
    pub training_experience: TrainingExperience,
    pub preferred_training_days: Vec<Weekday>,
    #[validate(range(min = 0.0, max = 24.0, message = "Sleep hours must be between 0 and 24"))]
    pub sleep_hours: f64,
}

/// Stored assessment row in `user_assessments`. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    #[serde(flatten)]
    pub answers: NewAssessment,
    /// When the run was submitted (RFC3339)
    pub created_at: String,
}
