// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The compiled-in 30-day plan and the per-browser day selector.

use crate::models::{DayPlan, Exercise, Macros, Meal, PlanSummary};
use serde::Serialize;

pub const FIRST_DAY: u8 = 1;
pub const LAST_DAY: u8 = 7;

pub const SUMMARY: PlanSummary = PlanSummary {
    title: "Tu Plan de 30 Días",
    calories_per_day: 2400,
    cardio: "30 min / 3x semana",
    meals_per_day: 5,
};

pub const DAYS: [DayPlan; 7] = [
    DayPlan { day: 1, focus: "Pecho y Tríceps" },
    DayPlan { day: 2, focus: "Espalda y Bíceps" },
    DayPlan { day: 3, focus: "Piernas y Hombros" },
    DayPlan { day: 4, focus: "Descanso Activo" },
    DayPlan { day: 5, focus: "Push (Empuje)" },
    DayPlan { day: 6, focus: "Pull (Jalón)" },
    DayPlan { day: 7, focus: "Descanso Total" },
];

const fn ex(name: &'static str, sets: u8, reps: u8, rest_seconds: u16) -> Exercise {
    Exercise {
        name,
        sets,
        reps,
        rest_seconds,
    }
}

const CHEST_TRICEPS: &[Exercise] = &[
    ex("Press de Banca", 4, 12, 90),
    ex("Press Inclinado", 3, 12, 60),
    ex("Aperturas con Mancuernas", 3, 15, 60),
    ex("Extensiones de Tríceps", 4, 12, 60),
    ex("Fondos en Paralelas", 3, 12, 60),
];

const BACK_BICEPS: &[Exercise] = &[
    ex("Dominadas", 4, 8, 90),
    ex("Remo con Barra", 4, 10, 90),
    ex("Jalón al Pecho", 3, 12, 60),
    ex("Curl con Barra", 3, 12, 60),
    ex("Curl Martillo", 3, 12, 60),
];

const LEGS_SHOULDERS: &[Exercise] = &[
    ex("Sentadilla", 4, 10, 120),
    ex("Prensa de Piernas", 3, 12, 90),
    ex("Peso Muerto Rumano", 3, 10, 90),
    ex("Press Militar", 4, 10, 90),
    ex("Elevaciones Laterales", 3, 15, 60),
];

const PUSH: &[Exercise] = &[
    ex("Press de Banca con Mancuernas", 4, 10, 90),
    ex("Press Arnold", 3, 12, 60),
    ex("Cruces en Polea", 3, 15, 60),
    ex("Press Francés", 3, 12, 60),
];

const PULL: &[Exercise] = &[
    ex("Peso Muerto", 4, 8, 120),
    ex("Remo con Mancuerna", 3, 12, 60),
    ex("Face Pull", 3, 15, 60),
    ex("Curl Concentrado", 3, 12, 60),
];

pub const MEALS: [Meal; 5] = [
    Meal {
        slot: "breakfast",
        title: "Desayuno",
        items: &[
            "Avena con proteína (50g)",
            "Claras de huevo (6 unidades)",
            "Plátano",
            "Almendras (15g)",
        ],
        macros: Macros { protein: 35, carbs: 45, fats: 15 },
    },
    Meal {
        slot: "morning_snack",
        title: "Media Mañana",
        items: &["Yogur griego (200g)", "Frutos rojos (100g)", "Nueces (15g)"],
        macros: Macros { protein: 20, carbs: 25, fats: 10 },
    },
    Meal {
        slot: "lunch",
        title: "Almuerzo",
        items: &[
            "Pechuga de pollo (200g)",
            "Arroz integral (150g)",
            "Verduras al vapor",
            "Aceite de oliva (1 cda)",
        ],
        macros: Macros { protein: 50, carbs: 60, fats: 15 },
    },
    Meal {
        slot: "afternoon_snack",
        title: "Merienda",
        items: &["Batido de proteína", "Manzana", "Crema de cacahuete (1 cda)"],
        macros: Macros { protein: 30, carbs: 30, fats: 10 },
    },
    Meal {
        slot: "dinner",
        title: "Cena",
        items: &["Salmón (180g)", "Batata (150g)", "Ensalada verde"],
        macros: Macros { protein: 40, carbs: 40, fats: 20 },
    },
];

/// Focus for a day index, if it is one of the seven.
pub fn day(day: i64) -> Option<&'static DayPlan> {
    DAYS.iter().find(|d| i64::from(d.day) == day)
}

/// Exercises for a day index. Rest days and unknown indices give an empty list.
pub fn exercises_for(day: i64) -> &'static [Exercise] {
    match day {
        1 => CHEST_TRICEPS,
        2 => BACK_BICEPS,
        3 => LEGS_SHOULDERS,
        5 => PUSH,
        6 => PULL,
        _ => &[],
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Day must be between {FIRST_DAY} and {LAST_DAY}, got {0}")]
pub struct InvalidDay(pub i64);

/// Everything shown for one day.
#[derive(Debug, Clone, Serialize)]
pub struct PlanView {
    pub summary: PlanSummary,
    pub days: &'static [DayPlan],
    pub selected_day: i64,
    pub focus: Option<&'static str>,
    pub exercises: &'static [Exercise],
    pub nutrition: &'static [Meal],
}

impl PlanView {
    pub fn for_day(selected_day: i64) -> Self {
        Self {
            summary: SUMMARY,
            days: &DAYS,
            selected_day,
            focus: day(selected_day).map(|d| d.focus),
            exercises: exercises_for(selected_day),
            nutrition: &MEALS,
        }
    }
}

/// Day selection for one browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanViewer {
    selected_day: u8,
}

impl Default for PlanViewer {
    fn default() -> Self {
        Self {
            selected_day: FIRST_DAY,
        }
    }
}

impl PlanViewer {
    pub fn selected_day(&self) -> u8 {
        self.selected_day
    }

    pub fn select(&mut self, day: i64) -> Result<u8, InvalidDay> {
        match u8::try_from(day) {
            Ok(d) if (FIRST_DAY..=LAST_DAY).contains(&d) => {
                self.selected_day = d;
                Ok(d)
            }
            _ => Err(InvalidDay(day)),
        }
    }

    pub fn view(&self) -> PlanView {
        PlanView::for_day(self.selected_day.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_day_one() {
        let viewer = PlanViewer::default();
        let view = viewer.view();
        assert_eq!(view.selected_day, 1);
        assert_eq!(view.focus, Some("Pecho y Tríceps"));
        assert_eq!(view.exercises.len(), 5);
        assert_eq!(view.exercises[0], ex("Press de Banca", 4, 12, 90));
    }

    #[test]
    fn test_rest_days_have_no_exercises() {
        let mut viewer = PlanViewer::default();
        viewer.select(4).unwrap();
        let view = viewer.view();
        assert_eq!(view.focus, Some("Descanso Activo"));
        assert!(view.exercises.is_empty());
        assert!(exercises_for(7).is_empty());
    }

    #[test]
    fn test_unknown_day_lookup_is_empty() {
        assert!(exercises_for(0).is_empty());
        assert!(exercises_for(42).is_empty());
        assert!(day(8).is_none());
        assert!(exercises_for(300).is_empty());
        assert!(exercises_for(-1).is_empty());
        assert!(day(i64::from(u8::MAX) + 1).is_none());

        let view = PlanView::for_day(-1);
        assert_eq!(view.selected_day, -1);
        assert!(view.focus.is_none());
        assert!(view.exercises.is_empty());
    }

    #[test]
    fn test_select_rejects_out_of_range() {
        let mut viewer = PlanViewer::default();
        viewer.select(3).unwrap();
        assert_eq!(viewer.select(0), Err(InvalidDay(0)));
        assert_eq!(viewer.select(8), Err(InvalidDay(8)));
        assert_eq!(viewer.select(-1), Err(InvalidDay(-1)));
        assert_eq!(viewer.selected_day(), 3);
    }

    #[test]
    fn test_nutrition_table() {
        assert_eq!(MEALS.len(), SUMMARY.meals_per_day as usize);
        let breakfast = &MEALS[0];
        assert_eq!(breakfast.title, "Desayuno");
        assert_eq!(breakfast.items.len(), 4);
        assert_eq!(breakfast.macros, Macros { protein: 35, carbs: 45, fats: 15 });
    }

    #[test]
    fn test_view_serializes() {
        let json = serde_json::to_value(PlanView::for_day(2)).unwrap();
        assert_eq!(json["summary"]["calories_per_day"], 2400);
        assert_eq!(json["days"].as_array().unwrap().len(), 7);
        assert_eq!(json["exercises"][0]["name"], "Dominadas");
        assert_eq!(json["nutrition"][0]["slot"], "breakfast");
    }
}
