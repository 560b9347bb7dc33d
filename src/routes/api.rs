// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session and premium-area routes.

use crate::backend::Identity;
use crate::middleware::CurrentSession;
use crate::models::Profile;
use crate::AppState;
use axum::{routing::get, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Routes open to any browser session.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/session", get(get_session))
}

/// Routes behind the route guard (applied in routes/mod.rs).
pub fn guarded_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/premium", get(get_premium))
}

// ─── Session ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SessionResponse {
    pub identity: Option<Identity>,
    pub profile: Option<Profile>,
    pub loading: bool,
    pub premium: bool,
}

/// Current session state, as the navigation bar shows it.
async fn get_session(
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> Json<SessionResponse> {
    let state = session.context.state();
    let premium = state.is_premium();
    Json(SessionResponse {
        identity: state.identity,
        profile: state.profile,
        loading: state.loading,
        premium,
    })
}

// ─── Premium ─────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PremiumResponse {
    pub email: Option<String>,
    pub premium_access: bool,
    pub title: String,
    pub message: String,
}

async fn get_premium(
    Extension(CurrentSession(session)): Extension<CurrentSession>,
) -> Json<PremiumResponse> {
    let state = session.context.state();
    let premium_access = state.is_premium();

    let (title, message) = if premium_access {
        (
            "¡Bienvenido al Área Premium!",
            "Tienes acceso a todo el contenido premium.",
        )
    } else {
        (
            "Acceso Premium No Disponible",
            "Contacta al administrador para obtener acceso premium.",
        )
    };

    Json(PremiumResponse {
        email: state.identity.map(|i| i.email),
        premium_access,
        title: title.to_string(),
        message: message.to_string(),
    })
}
