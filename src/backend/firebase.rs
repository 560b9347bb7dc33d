// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase Authentication client (Identity Toolkit REST API).
//!
//! Handles:
//! - Email/password registration and sign-in
//! - ID token lookup for session restore
//! - Mapping Firebase error codes to [`AuthError`]
//!
//! For local development against the Auth emulator, set
//! `FIREBASE_AUTH_EMULATOR_HOST`.

use super::{AuthBackend, AuthError, AuthSession, Identity};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Firebase Auth client.
#[derive(Clone)]
pub struct FirebaseAuth {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Response of `accounts:signUp` / `accounts:signInWithPassword`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    id_token: String,
    email: String,
    /// Seconds, as a string
    expires_in: Option<String>,
    local_id: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseAuth {
    pub fn new(api_key: impl Into<String>) -> anyhow::Result<Self> {
        let base_url = match std::env::var("FIREBASE_AUTH_EMULATOR_HOST") {
            Ok(host) => {
                tracing::info!(host = %host, "Using Firebase Auth emulator");
                format!("http://{}/identitytoolkit.googleapis.com/v1", host)
            }
            Err(_) => IDENTITY_TOOLKIT_URL.to_string(),
        };
        Self::with_base_url(api_key, base_url)
    }

    /// Client against an explicit Identity Toolkit base URL.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/accounts:{}", self.base_url, method)
    }

    /// POST a JSON body; returns the Firebase error code on a 4xx.
    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<Result<T, String>, AuthError> {
        let response = self
            .http
            .post(self.endpoint(method))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map(Ok)
                .map_err(|e| AuthError::Unavailable(format!("Malformed response: {}", e)));
        }

        let text = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&text) {
                return Ok(Err(envelope.error.message));
            }
        }

        tracing::warn!(status = %status, method, "Firebase Auth request failed");
        Err(AuthError::Unavailable(format!("HTTP {}: {}", status, text)))
    }

    async fn token_request(
        &self,
        method: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        let token: TokenResponse = self.post(method, body).await?.map_err(map_error_code)?;
        Ok(token.into_session())
    }
}

impl TokenResponse {
    fn into_session(self) -> AuthSession {
        let expires_at = self
            .expires_in
            .as_deref()
            .and_then(|s| s.parse::<i64>().ok())
            .map(|secs| {
                crate::time_utils::format_utc_rfc3339(
                    chrono::Utc::now() + chrono::Duration::seconds(secs),
                )
            });

        AuthSession {
            access_token: self.id_token,
            expires_at,
            identity: Identity {
                id: self.local_id,
                email: self.email,
            },
        }
    }
}

/// Map a Firebase error code to the auth error taxonomy.
///
/// Codes may carry a suffix, e.g. `WEAK_PASSWORD : Password should be at least 6 characters`.
fn map_error_code(code: String) -> AuthError {
    let (head, detail) = match code.split_once(" : ") {
        Some((head, detail)) => (head.trim(), Some(detail.trim())),
        None => (code.trim(), None),
    };

    let message = match head {
        "EMAIL_EXISTS" => "User already registered",
        "INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" => {
            "Invalid login credentials"
        }
        "USER_DISABLED" => "This account has been disabled",
        "INVALID_EMAIL" | "MISSING_EMAIL" => "Invalid email address",
        "MISSING_PASSWORD" => "Password is required",
        "WEAK_PASSWORD" => detail.unwrap_or("Password should be at least 6 characters"),
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts, try again later",
        _ => return AuthError::Unavailable(code.clone()),
    };

    AuthError::InvalidCredentials(message.to_string())
}

#[async_trait]
impl AuthBackend for FirebaseAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let session = self.token_request("signUp", email, password).await?;
        tracing::info!(user_id = %session.identity.id, "Firebase account created");
        Ok(session)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        self.token_request("signInWithPassword", email, password)
            .await
    }

    /// ID tokens cannot be revoked from a client; dropping them locally is the sign-out.
    async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError> {
        tracing::debug!(user_id = %session.identity.id, "Firebase session dropped");
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<Identity>, AuthError> {
        let body = serde_json::json!({ "idToken": access_token });

        match self.post::<LookupResponse>("lookup", body).await? {
            Ok(lookup) => Ok(lookup.users.into_iter().next().map(|u| Identity {
                id: u.local_id,
                email: u.email.unwrap_or_default(),
            })),
            Err(code) if code.starts_with("INVALID_ID_TOKEN")
                || code.starts_with("USER_NOT_FOUND")
                || code.starts_with("TOKEN_EXPIRED") =>
            {
                Ok(None)
            }
            Err(code) => Err(AuthError::Unavailable(code)),
        }
    }
}
