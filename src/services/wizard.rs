// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Assessment wizard.
//!
//! A linear run of steps collecting raw answers into one draft. Navigation
//! never validates; parsing and range checks happen once, at submit, and a
//! successful submit writes exactly one assessment row.

use crate::backend::Identity;
use crate::db::{Database, StoreError};
use crate::models::assessment::UnknownVariant;
use crate::models::{ActivityLevel, Assessment, Goal, NewAssessment, TrainingExperience, Weekday};
use crate::time_utils::format_utc_rfc3339;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

/// Steps in the standard questionnaire.
pub const STANDARD_STEPS: u8 = 4;
/// Steps in the longer questionnaire (sleep gets its own step).
pub const EXTENDED_STEPS: u8 = 5;

/// Where the client goes after a successful submit.
pub const COMPLETION_REDIRECT: &str = "/workout-plan";

/// Text-entry fields of the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardField {
    Age,
    Weight,
    Height,
    Goal,
    ActivityLevel,
    MedicalConditions,
    DietaryRestrictions,
    TrainingExperience,
    SleepHours,
}

impl WizardField {
    pub const ALL: [WizardField; 9] = [
        WizardField::Age,
        WizardField::Weight,
        WizardField::Height,
        WizardField::Goal,
        WizardField::ActivityLevel,
        WizardField::MedicalConditions,
        WizardField::DietaryRestrictions,
        WizardField::TrainingExperience,
        WizardField::SleepHours,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WizardField::Age => "age",
            WizardField::Weight => "weight",
            WizardField::Height => "height",
            WizardField::Goal => "goal",
            WizardField::ActivityLevel => "activity_level",
            WizardField::MedicalConditions => "medical_conditions",
            WizardField::DietaryRestrictions => "dietary_restrictions",
            WizardField::TrainingExperience => "training_experience",
            WizardField::SleepHours => "sleep_hours",
        }
    }

    /// Step on which the field is asked.
    pub fn step(&self, total_steps: u8) -> u8 {
        match self {
            WizardField::Age | WizardField::Weight | WizardField::Height => 1,
            WizardField::Goal | WizardField::ActivityLevel => 2,
            WizardField::MedicalConditions | WizardField::DietaryRestrictions => 3,
            WizardField::TrainingExperience => 4,
            WizardField::SleepHours => total_steps.min(EXTENDED_STEPS),
        }
    }
}

impl FromStr for WizardField {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WizardField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Training days in the order they were picked. Toggle semantics keep it duplicate free.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DaySet(Vec<Weekday>);

impl DaySet {
    /// Add the day if absent, remove it if present. Returns whether it is now selected.
    pub fn toggle(&mut self, day: Weekday) -> bool {
        match self.0.iter().position(|d| *d == day) {
            Some(idx) => {
                self.0.remove(idx);
                false
            }
            None => {
                self.0.push(day);
                true
            }
        }
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0.contains(&day)
    }

    pub fn as_slice(&self) -> &[Weekday] {
        &self.0
    }
}

/// Answers exactly as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Draft {
    pub age: String,
    pub weight: String,
    pub height: String,
    pub goal: String,
    pub activity_level: String,
    pub medical_conditions: String,
    pub dietary_restrictions: String,
    pub training_experience: String,
    pub preferred_training_days: DaySet,
    pub sleep_hours: String,
}

impl Draft {
    fn slot(&mut self, field: WizardField) -> &mut String {
        match field {
            WizardField::Age => &mut self.age,
            WizardField::Weight => &mut self.weight,
            WizardField::Height => &mut self.height,
            WizardField::Goal => &mut self.goal,
            WizardField::ActivityLevel => &mut self.activity_level,
            WizardField::MedicalConditions => &mut self.medical_conditions,
            WizardField::DietaryRestrictions => &mut self.dietary_restrictions,
            WizardField::TrainingExperience => &mut self.training_experience,
            WizardField::SleepHours => &mut self.sleep_hours,
        }
    }

    /// Parse and range-check into a record for `user_id`.
    fn to_assessment(&self, user_id: &str) -> Result<NewAssessment, WizardError> {
        let mut issues = Vec::new();

        let age = parse_field::<u32>(&self.age, WizardField::Age, &mut issues);
        let weight = parse_number(&self.weight, WizardField::Weight, &mut issues);
        let height = parse_number(&self.height, WizardField::Height, &mut issues);
        let goal = parse_field::<Goal>(&self.goal, WizardField::Goal, &mut issues);
        let activity_level =
            parse_field::<ActivityLevel>(&self.activity_level, WizardField::ActivityLevel, &mut issues);
        let training_experience = parse_field::<TrainingExperience>(
            &self.training_experience,
            WizardField::TrainingExperience,
            &mut issues,
        );
        let sleep_hours = parse_number(&self.sleep_hours, WizardField::SleepHours, &mut issues);

        let (
            Some(age),
            Some(weight),
            Some(height),
            Some(goal),
            Some(activity_level),
            Some(training_experience),
            Some(sleep_hours),
        ) = (
            age,
            weight,
            height,
            goal,
            activity_level,
            training_experience,
            sleep_hours,
        )
        else {
            return Err(WizardError::Validation(issues));
        };

        let answers = NewAssessment {
            user_id: user_id.to_string(),
            age,
            weight,
            height,
            goal,
            activity_level,
            medical_conditions: self.medical_conditions.clone(),
            dietary_restrictions: self.dietary_restrictions.clone(),
            training_experience,
            preferred_training_days: self.preferred_training_days.as_slice().to_vec(),
            sleep_hours,
        };

        if let Err(errors) = answers.validate() {
            for (field, errs) in errors.field_errors() {
                for err in errs {
                    issues.push(FieldIssue {
                        field: field.to_string(),
                        message: err
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| err.code.to_string()),
                    });
                }
            }
        }

        if issues.is_empty() {
            Ok(answers)
        } else {
            issues.sort_by(|a, b| a.field.cmp(&b.field));
            Err(WizardError::Validation(issues))
        }
    }
}

fn parse_field<T: FromStr>(raw: &str, field: WizardField, issues: &mut Vec<FieldIssue>) -> Option<T> {
    let raw = raw.trim();
    if raw.is_empty() {
        issues.push(FieldIssue::new(field, "Required"));
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            issues.push(FieldIssue::new(field, "Invalid value"));
            None
        }
    }
}

fn parse_number(raw: &str, field: WizardField, issues: &mut Vec<FieldIssue>) -> Option<f64> {
    let value = parse_field::<f64>(raw, field, issues)?;
    if value.is_finite() {
        Some(value)
    } else {
        issues.push(FieldIssue::new(field, "Invalid value"));
        None
    }
}

/// One rejected answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    fn new(field: WizardField, message: &str) -> Self {
        Self {
            field: field.as_str().to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WizardError {
    #[error("Submit is only available on step {total} (currently on step {step})")]
    NotOnFinalStep { step: u8, total: u8 },

    #[error("Sign in to submit the assessment")]
    Unauthenticated,

    #[error("This assessment was already submitted")]
    AlreadySubmitted,

    #[error("Invalid answers: {}", format_issues(.0))]
    Validation(Vec<FieldIssue>),

    #[error("Could not save the assessment: {0}")]
    Store(#[from] StoreError),
}

fn format_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{} ({})", i.field, i.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result of a successful submit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub assessment: Assessment,
    pub redirect: &'static str,
}

/// What a client renders for the wizard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardView {
    pub step: u8,
    pub total_steps: u8,
    pub progress_percent: u8,
    pub is_final_step: bool,
    pub completed: bool,
    pub fields: Draft,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Wizard {
    total_steps: u8,
    step: u8,
    draft: Draft,
    completed: bool,
    last_error: Option<String>,
}

impl Wizard {
    /// A run over `total_steps` steps (at least one), starting on step 1.
    pub fn new(total_steps: u8) -> Self {
        Self {
            total_steps: total_steps.max(1),
            step: 1,
            draft: Draft::default(),
            completed: false,
            last_error: None,
        }
    }

    pub fn standard() -> Self {
        Self::new(STANDARD_STEPS)
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn total_steps(&self) -> u8 {
        self.total_steps
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn is_final_step(&self) -> bool {
        self.step == self.total_steps
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn progress_percent(&self) -> u8 {
        (u32::from(self.step) * 100 / u32::from(self.total_steps)) as u8
    }

    /// Advance one step; no-op on the last step.
    pub fn next(&mut self) -> u8 {
        if self.step < self.total_steps {
            self.step += 1;
        }
        self.step
    }

    /// Go back one step; no-op on the first step.
    pub fn previous(&mut self) -> u8 {
        if self.step > 1 {
            self.step -= 1;
        }
        self.step
    }

    pub fn set_field(&mut self, field: WizardField, raw: impl Into<String>) {
        *self.draft.slot(field) = raw.into();
    }

    pub fn toggle_day(&mut self, day: Weekday) -> bool {
        self.draft.preferred_training_days.toggle(day)
    }

    /// Start a fresh run with the same number of steps.
    pub fn reset(&mut self) {
        *self = Self::new(self.total_steps);
    }

    pub fn view(&self) -> WizardView {
        WizardView {
            step: self.step,
            total_steps: self.total_steps,
            progress_percent: self.progress_percent(),
            is_final_step: self.is_final_step(),
            completed: self.completed,
            fields: self.draft.clone(),
            last_error: self.last_error.clone(),
        }
    }

    /// Validate the draft and insert one assessment for `identity`.
    ///
    /// On any failure the step and draft are left untouched.
    pub async fn submit(
        &mut self,
        identity: Option<&Identity>,
        db: &Database,
    ) -> Result<Submission, WizardError> {
        if self.completed {
            return Err(WizardError::AlreadySubmitted);
        }
        if !self.is_final_step() {
            return Err(WizardError::NotOnFinalStep {
                step: self.step,
                total: self.total_steps,
            });
        }
        let Some(identity) = identity else {
            return Err(self.fail(WizardError::Unauthenticated));
        };

        let answers = match self.draft.to_assessment(&identity.id) {
            Ok(answers) => answers,
            Err(e) => return Err(self.fail(e)),
        };

        let created_at = format_utc_rfc3339(chrono::Utc::now());
        match db.insert_assessment(answers, created_at).await {
            Ok(assessment) => {
                self.completed = true;
                self.last_error = None;
                Ok(Submission {
                    assessment,
                    redirect: COMPLETION_REDIRECT,
                })
            }
            Err(e) => {
                tracing::error!(error = %e, user_id = %identity.id, "Assessment insert failed");
                Err(self.fail(e.into()))
            }
        }
    }

    fn fail(&mut self, error: WizardError) -> WizardError {
        self.last_error = Some(error.to_string());
        error
    }
}

impl Default for Wizard {
    fn default() -> Self {
        Self::standard()
    }
}
