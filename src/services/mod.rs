// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod plan;
pub mod wizard;

pub use plan::{PlanView, PlanViewer};
pub use wizard::{Submission, Wizard, WizardError, WizardField, WizardView};
