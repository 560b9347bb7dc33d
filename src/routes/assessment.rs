// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Assessment wizard routes.

use crate::error::{AppError, Result};
use crate::middleware::CurrentSession;
use crate::models::Weekday;
use crate::services::wizard::{Submission, WizardField, WizardView};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Longest raw value accepted for any one field.
const MAX_RAW_FIELD_LEN: usize = 4000;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/assessment", get(get_wizard))
        .route("/api/assessment/next", post(next_step))
        .route("/api/assessment/previous", post(previous_step))
        .route("/api/assessment/reset", post(reset))
        .route("/api/assessment/fields", patch(update_fields))
        .route("/api/assessment/days/{day}/toggle", post(toggle_day))
        .route("/api/assessment/submit", post(submit))
}

async fn get_wizard(
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> Json<WizardView> {
    Json(session.wizard.lock().await.view())
}

async fn next_step(
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> Json<WizardView> {
    let mut wizard = session.wizard.lock().await;
    wizard.next();
    Json(wizard.view())
}

async fn previous_step(
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> Json<WizardView> {
    let mut wizard = session.wizard.lock().await;
    wizard.previous();
    Json(wizard.view())
}

async fn reset(Extension(CurrentSession(session)): Extension<CurrentSession>) -> Json<WizardView> {
    let mut wizard = session.wizard.lock().await;
    wizard.reset();
    Json(wizard.view())
}

/// Store raw answers. Values are kept as typed; nothing is checked until submit.
async fn update_fields(
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Json(updates): Json<HashMap<String, String>>,
) -> Result<Json<WizardView>> {
    let mut parsed = Vec::with_capacity(updates.len());
    for (name, value) in updates {
        let field: WizardField = name
            .parse()
            .map_err(|_| AppError::BadRequest(format!("Unknown field: {}", name)))?;
        if value.len() > MAX_RAW_FIELD_LEN {
            return Err(AppError::BadRequest(format!("{} is too long", field.as_str())));
        }
        parsed.push((field, value));
    }

    let mut wizard = session.wizard.lock().await;
    for (field, value) in parsed {
        wizard.set_field(field, value);
    }
    Ok(Json(wizard.view()))
}

async fn toggle_day(
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Path(day): Path<String>,
) -> Result<Json<WizardView>> {
    let day: Weekday = day
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Unknown training day: {}", day)))?;

    let mut wizard = session.wizard.lock().await;
    wizard.toggle_day(day);
    Ok(Json(wizard.view()))
}

/// Submit the finished run as one assessment row.
async fn submit(
    State(state): State<Arc<AppState>>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> Result<(StatusCode, Json<Submission>)> {
    let identity = session.context.resolved().await.identity;

    let mut wizard = session.wizard.lock().await;
    let submission = wizard.submit(identity.as_ref(), &state.db).await?;

    tracing::info!(
        user_id = %submission.assessment.answers.user_id,
        "Assessment submitted"
    );
    Ok((StatusCode::CREATED, Json(submission)))
}
