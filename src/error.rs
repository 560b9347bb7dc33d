// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::backend::AuthError;
use crate::db::StoreError;
use crate::services::plan::InvalidDay;
use crate::services::wizard::{FieldIssue, WizardError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    /// Credential problem the user can fix (bad login, duplicate email, weak password).
    #[error("{0}")]
    Credentials(String),

    /// Sign-in refused.
    #[error("{0}")]
    LoginFailed(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Invalid answers")]
    Validation(Vec<FieldIssue>),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Hosted auth or record store failed.
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<FieldIssue>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut fields = None;
        let (status, error, details) = match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string(), None),
            AppError::Credentials(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::LoginFailed(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found".to_string(), Some(msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request".to_string(), Some(msg))
            }
            AppError::Validation(issues) => {
                fields = Some(issues);
                (StatusCode::BAD_REQUEST, "validation_failed".to_string(), None)
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "conflict".to_string(), Some(msg)),
            AppError::Backend(msg) => {
                tracing::error!(error = %msg, "Backend error");
                (StatusCode::BAD_GATEWAY, "backend_error".to_string(), None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error,
            details,
            fields,
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials(msg) => AppError::Credentials(msg),
            AuthError::Unavailable(msg) => AppError::Backend(msg),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            other => AppError::Backend(other.to_string()),
        }
    }
}

impl From<WizardError> for AppError {
    fn from(err: WizardError) -> Self {
        match err {
            WizardError::Unauthenticated => AppError::Unauthorized,
            WizardError::Validation(issues) => AppError::Validation(issues),
            WizardError::Store(e) => e.into(),
            e @ (WizardError::NotOnFinalStep { .. } | WizardError::AlreadySubmitted) => {
                AppError::Conflict(e.to_string())
            }
        }
    }
}

impl From<InvalidDay> for AppError {
    fn from(err: InvalidDay) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
