// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Route guard for signed-in-only views.

use super::session::CurrentSession;
use crate::session::SessionState;
use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Extension, Json,
};
use serde_json::json;

/// Where anonymous visitors are sent.
pub const SIGN_IN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still being derived; neither allow nor redirect yet.
    Pending,
    Redirect(&'static str),
    Allow,
}

pub struct RouteGuard;

impl RouteGuard {
    pub fn evaluate(state: &SessionState) -> GuardDecision {
        if state.loading {
            GuardDecision::Pending
        } else if state.identity.is_none() {
            GuardDecision::Redirect(SIGN_IN_PATH)
        } else {
            GuardDecision::Allow
        }
    }
}

/// Middleware that only lets signed-in sessions through.
pub async fn require_session(
    Extension(CurrentSession(session)): Extension<CurrentSession>,
    request: Request,
    next: Next,
) -> Response {
    match RouteGuard::evaluate(&session.context.state()) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Pending => (
            StatusCode::ACCEPTED,
            [(header::RETRY_AFTER, "1")],
            Json(json!({ "status": "pending" })),
        )
            .into_response(),
        GuardDecision::Redirect(to) => Redirect::to(to).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Identity;

    fn state(identity: bool, loading: bool) -> SessionState {
        SessionState {
            identity: identity.then(|| Identity {
                id: "u1".into(),
                email: "ana@example.com".into(),
            }),
            profile: None,
            loading,
        }
    }

    #[test]
    fn test_loading_is_pending_regardless_of_identity() {
        assert_eq!(RouteGuard::evaluate(&state(false, true)), GuardDecision::Pending);
        assert_eq!(RouteGuard::evaluate(&state(true, true)), GuardDecision::Pending);
    }

    #[test]
    fn test_resolved_decisions() {
        assert_eq!(
            RouteGuard::evaluate(&state(false, false)),
            GuardDecision::Redirect("/login")
        );
        assert_eq!(RouteGuard::evaluate(&state(true, false)), GuardDecision::Allow);
    }
}
