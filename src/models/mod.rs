// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod assessment;
pub mod plan;
pub mod profile;

pub use assessment::{
    ActivityLevel, Assessment, Goal, NewAssessment, TrainingExperience, Weekday,
};
pub use plan::{DayPlan, Exercise, Macros, Meal, PlanSummary};
pub use profile::Profile;
