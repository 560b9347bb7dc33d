// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout and nutrition plan routes.

use crate::error::Result;
use crate::middleware::CurrentSession;
use crate::services::plan::PlanView;
use crate::AppState;
use axum::{
    extract::Path,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/plan", get(get_plan))
        .route("/api/plan/day", put(select_day))
}

/// Lookups that need no browser session.
pub fn lookup_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/plan/days/{day}", get(get_day))
}

/// View for the browser's selected day.
async fn get_plan(Extension(CurrentSession(session)): Extension<CurrentSession>) -> Json<PlanView> {
    Json(session.plan.lock().await.view())
}

#[derive(Deserialize)]
pub struct SelectDay {
    day: i64,
}

async fn select_day(
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    Json(body): Json<SelectDay>,
) -> Result<Json<PlanView>> {
    let mut plan = session.plan.lock().await;
    let day = plan.select(body.day)?;
    tracing::debug!(day, "Plan day selected");
    Ok(Json(plan.view()))
}

/// Lookup without touching the selection. Unmapped days come back empty.
async fn get_day(Path(day): Path<i64>) -> Json<PlanView> {
    Json(PlanView::for_day(day))
}
