// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development. The Firebase API key is
//! only required when the service talks to the hosted backend.

use std::env;
use std::time::Duration;

/// Which backend-as-a-service implementation to wire up at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    /// Firebase Auth + Firestore.
    Firebase,
    /// In-process auth and record store (local development, tests).
    Memory,
}

impl BackendMode {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "firebase" => Ok(Self::Firebase),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid("BACKEND", raw.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend implementation
    pub backend: BackendMode,
    /// Firebase Web API key (Identity Toolkit)
    pub firebase_api_key: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Frontend URL for CORS and cookie attributes
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// HS256 key for the browser session cookie (raw bytes)
    pub session_signing_key: Vec<u8>,
    /// Browser sessions untouched for this long are torn down
    pub session_idle_timeout: Duration,
    /// Upper bound on live browser sessions
    pub max_sessions: usize,
}

const DEFAULT_IDLE_MINUTES: u64 = 60;
const DEFAULT_MAX_SESSIONS: usize = 10_000;

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let backend = match env::var("BACKEND") {
            Ok(raw) => BackendMode::parse(&raw)?,
            Err(_) => BackendMode::Firebase,
        };

        let firebase_api_key = match backend {
            BackendMode::Firebase => env::var("FIREBASE_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("FIREBASE_API_KEY"))?,
            BackendMode::Memory => env::var("FIREBASE_API_KEY").unwrap_or_default(),
        };

        let session_idle_timeout = match env::var("SESSION_IDLE_MINUTES") {
            Ok(raw) => parse_idle_minutes(&raw)?,
            Err(_) => Duration::from_secs(DEFAULT_IDLE_MINUTES * 60),
        };

        let max_sessions = match env::var("SESSION_MAX_COUNT") {
            Ok(raw) => parse_max_sessions(&raw)?,
            Err(_) => DEFAULT_MAX_SESSIONS,
        };

        Ok(Self {
            backend,
            firebase_api_key,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            session_signing_key: env::var("SESSION_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("SESSION_SIGNING_KEY"))?
                .into_bytes(),
            session_idle_timeout,
            max_sessions,
        })
    }

    /// Config for tests: in-memory backend, fixed signing key.
    pub fn test_default() -> Self {
        Self {
            backend: BackendMode::Memory,
            firebase_api_key: String::new(),
            gcp_project_id: "test-project".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            session_signing_key: b"test_session_key_32_bytes_min!!!".to_vec(),
            session_idle_timeout: Duration::from_secs(DEFAULT_IDLE_MINUTES * 60),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }

    /// Whether cookies must carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.frontend_url.starts_with("https://")
    }
}

fn parse_idle_minutes(raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .and_then(|minutes| minutes.checked_mul(60))
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::Invalid("SESSION_IDLE_MINUTES", raw.to_string()))
}

fn parse_max_sessions(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid("SESSION_MAX_COUNT", raw.to_string())),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
