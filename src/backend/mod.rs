// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hosted authentication collaborator.
//!
//! The service never verifies passwords itself. Credential checks, session
//! issuance and token validation are delegated to an [`AuthBackend`]; the
//! per-browser [`AuthClient`] keeps the resulting session and announces
//! changes to whoever subscribed.

pub mod client;
pub mod firebase;
pub mod memory;

pub use client::{AuthClient, Subscription};
pub use firebase::FirebaseAuth;
pub use memory::MemoryAuth;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated principal as issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Backend user ID (also the profile document ID)
    pub id: String,
    pub email: String,
}

/// A live backend session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    /// Access token expiry (RFC3339), when the backend reports one
    #[serde(default)]
    pub expires_at: Option<String>,
    pub identity: Identity,
}

impl AuthSession {
    /// Whether the backend-reported expiry has passed. Without one, only the
    /// backend can tell.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .is_some_and(|at| at.with_timezone(&Utc) <= now)
    }
}

/// Kind of session change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEventKind {
    SignedIn,
    SignedOut,
}

/// Session-change notification: the kind plus the session now in effect.
#[derive(Debug, Clone)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    pub session: Option<AuthSession>,
}

/// Authentication failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Rejected credentials or registration data; the message is user-facing.
    #[error("{0}")]
    InvalidCredentials(String),

    /// Network or backend failure.
    #[error("Authentication service unavailable: {0}")]
    Unavailable(String),
}

/// Operations consumed from the hosted auth service.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Register new credentials and open a session for them.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    /// Verify credentials and open a session.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError>;

    /// Terminate a session.
    async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError>;

    /// Resolve the identity behind an access token.
    ///
    /// `Ok(None)` means the token is no longer valid.
    async fn get_user(&self, access_token: &str) -> Result<Option<Identity>, AuthError>;
}
