// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-up, sign-in and logout.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::post,
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::backend::AuthError;
use crate::error::{AppError, Result};
use crate::middleware::session::{expire_app_cookies, logged_in_cookie, CurrentSession};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(sign_up))
        .route("/auth/signin", post(sign_in))
        .route("/auth/logout", post(logout))
}

/// Email/password form.
#[derive(Deserialize, Validate)]
pub struct Credentials {
    #[validate(length(min = 1, max = 320, message = "Email is required"))]
    email: String,
    #[validate(length(min = 1, max = 1024, message = "Password is required"))]
    password: String,
}

impl Credentials {
    fn checked(self) -> Result<(String, String)> {
        let email = self.email.trim().to_string();
        let creds = Credentials {
            email,
            password: self.password,
        };
        creds
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        Ok((creds.email, creds.password))
    }
}

#[derive(Serialize)]
pub struct SignUpResponse {
    pub success: bool,
}

/// Register and sign in.
async fn sign_up(
    State(state): State<Arc<AppState>>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    jar: CookieJar,
    Json(body): Json<Credentials>,
) -> Result<Response> {
    let (email, password) = body.checked()?;

    let ctx = &session.context;
    ctx.resolved().await;
    ctx.sign_up(&email, &password).await?;

    tracing::info!("Account registered");

    let jar = jar.add(logged_in_cookie(state.config.secure_cookies()));
    Ok((
        StatusCode::CREATED,
        jar,
        Json(SignUpResponse { success: true }),
    )
        .into_response())
}

async fn sign_in(
    State(state): State<Arc<AppState>>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    jar: CookieJar,
    Json(body): Json<Credentials>,
) -> Result<Response> {
    let (email, password) = body.checked()?;

    let ctx = &session.context;
    ctx.resolved().await;
    ctx.sign_in(&email, &password).await.map_err(|e| match e {
        AuthError::InvalidCredentials(msg) => AppError::LoginFailed(msg),
        other => other.into(),
    })?;

    let jar = jar.add(logged_in_cookie(state.config.secure_cookies()));
    Ok((jar, Json(json!({}))).into_response())
}

/// End the session, drop this browser's server-side state, expire our
/// cookies, and send the browser to the root.
async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    jar: CookieJar,
) -> impl IntoResponse {
    if let Err(e) = session.context.sign_out().await {
        tracing::warn!(error = %e, "Backend sign-out failed; local session cleared");
    }
    state.sessions.remove(&session.id);

    (
        expire_app_cookies(jar, state.config.secure_cookies()),
        Redirect::to("/"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_are_trimmed_and_checked() {
        let ok = Credentials {
            email: "  ana@example.com ".into(),
            password: "secret123".into(),
        };
        assert_eq!(
            ok.checked().unwrap(),
            ("ana@example.com".to_string(), "secret123".to_string())
        );

        let blank = Credentials {
            email: "   ".into(),
            password: "secret123".into(),
        };
        assert!(matches!(blank.checked(), Err(AppError::BadRequest(_))));
    }
}
