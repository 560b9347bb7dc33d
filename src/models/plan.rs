// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Static plan types (compiled-in workout and nutrition data).

use serde::Serialize;

/// One exercise prescription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Exercise {
    pub name: &'static str,
    pub sets: u8,
    pub reps: u8,
    /// Rest between sets
    pub rest_seconds: u16,
}

/// Macro grams for a meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Macros {
    pub protein: u16,
    pub carbs: u16,
    pub fats: u16,
}

/// A meal slot and its foods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Meal {
    /// Slot key ("breakfast", "lunch", ...)
    pub slot: &'static str,
    pub title: &'static str,
    pub items: &'static [&'static str],
    pub macros: Macros,
}

/// A day of the weekly schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayPlan {
    /// 1-7
    pub day: u8,
    pub focus: &'static str,
}

/// Headline numbers shown with the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub title: &'static str,
    pub calories_per_day: u16,
    pub cardio: &'static str,
    pub meals_per_day: u8,
}
