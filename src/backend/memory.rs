// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process auth backend for local development and tests.

use super::{AuthBackend, AuthError, AuthSession, Identity};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

type HmacSha256 = Hmac<Sha256>;

const MIN_PASSWORD_LEN: usize = 6;

struct MemoryUser {
    id: String,
    email: String,
    password_digest: String,
}

/// Auth backend keeping users and tokens in memory.
pub struct MemoryAuth {
    pepper: Vec<u8>,
    /// Users keyed by normalized email
    users: DashMap<String, MemoryUser>,
    /// Access token -> user ID
    tokens: DashMap<String, String>,
    counter: AtomicU64,
    unavailable: AtomicBool,
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuth {
    pub fn new() -> Self {
        let seed = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        Self {
            pepper: Sha256::digest(seed.to_le_bytes()).to_vec(),
            users: DashMap::new(),
            tokens: DashMap::new(),
            counter: AtomicU64::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make every call fail as if the backend were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    fn check_available(&self) -> Result<(), AuthError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuthError::Unavailable("backend offline".to_string()));
        }
        Ok(())
    }

    fn digest_password(&self, password: &str) -> Result<String, AuthError> {
        let mut mac = HmacSha256::new_from_slice(&self.pepper)
            .map_err(|e| AuthError::Unavailable(format!("HMAC init failed: {}", e)))?;
        mac.update(password.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn next_id(&self, label: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let mut hasher = Sha256::new();
        hasher.update(&self.pepper);
        hasher.update(label.as_bytes());
        hasher.update(n.to_le_bytes());
        hex::encode(hasher.finalize())
    }

    fn open_session(&self, user: &MemoryUser) -> AuthSession {
        let access_token = self.next_id("token");
        self.tokens.insert(access_token.clone(), user.id.clone());
        AuthSession {
            access_token,
            expires_at: None,
            identity: Identity {
                id: user.id.clone(),
                email: user.email.clone(),
            },
        }
    }
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AuthError::InvalidCredentials(
            "Invalid email address".to_string(),
        )),
    }
}

#[async_trait]
impl AuthBackend for MemoryAuth {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.check_available()?;
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidCredentials(format!(
                "Password should be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let user = MemoryUser {
            id: self.next_id("user")[..28].to_string(),
            email: email.clone(),
            password_digest: self.digest_password(password)?,
        };

        let entry = self.users.entry(email);
        match entry {
            Entry::Occupied(_) => Err(AuthError::InvalidCredentials(
                "User already registered".to_string(),
            )),
            Entry::Vacant(slot) => {
                let session = self.open_session(&user);
                slot.insert(user);
                Ok(session)
            }
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        self.check_available()?;
        let invalid = || AuthError::InvalidCredentials("Invalid login credentials".to_string());

        let email = normalize_email(email).map_err(|_| invalid())?;
        let digest = self.digest_password(password)?;
        let user = self.users.get(&email).ok_or_else(invalid)?;
        if user.password_digest != digest {
            return Err(invalid());
        }
        Ok(self.open_session(&user))
    }

    async fn sign_out(&self, session: &AuthSession) -> Result<(), AuthError> {
        self.check_available()?;
        self.tokens.remove(&session.access_token);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<Identity>, AuthError> {
        self.check_available()?;
        let Some(user_id) = self.tokens.get(access_token).map(|id| id.clone()) else {
            return Ok(None);
        };
        Ok(self
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| Identity {
                id: u.id.clone(),
                email: u.email.clone(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let auth = MemoryAuth::new();
        let created = auth.sign_up("Ana@Example.com", "secret123").await.unwrap();
        assert_eq!(created.identity.email, "ana@example.com");

        let session = auth
            .sign_in_with_password("ana@example.com", "secret123")
            .await
            .unwrap();
        assert_eq!(session.identity, created.identity);
        assert_ne!(session.access_token, created.access_token);
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let auth = MemoryAuth::new();
        auth.sign_up("ana@example.com", "secret123").await.unwrap();

        let err = auth.sign_up("ana@example.com", "other123").await.unwrap_err();
        assert_eq!(
            err,
            AuthError::InvalidCredentials("User already registered".to_string())
        );
        assert_eq!(auth.user_count(), 1);
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let auth = MemoryAuth::new();
        auth.sign_up("ana@example.com", "secret123").await.unwrap();

        assert!(matches!(
            auth.sign_in_with_password("ana@example.com", "wrong").await,
            Err(AuthError::InvalidCredentials(_))
        ));
        assert!(matches!(
            auth.sign_in_with_password("nobody@example.com", "secret123").await,
            Err(AuthError::InvalidCredentials(_))
        ));
        assert!(matches!(
            auth.sign_up("not-an-email", "secret123").await,
            Err(AuthError::InvalidCredentials(_))
        ));
        assert!(matches!(
            auth.sign_up("bob@example.com", "123").await,
            Err(AuthError::InvalidCredentials(_))
        ));
    }

    #[tokio::test]
    async fn test_sign_out_invalidates_token() {
        let auth = MemoryAuth::new();
        let session = auth.sign_up("ana@example.com", "secret123").await.unwrap();
        assert!(auth.get_user(&session.access_token).await.unwrap().is_some());

        auth.sign_out(&session).await.unwrap();
        assert!(auth.get_user(&session.access_token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unavailable() {
        let auth = MemoryAuth::new();
        auth.set_unavailable(true);
        assert!(matches!(
            auth.sign_up("ana@example.com", "secret123").await,
            Err(AuthError::Unavailable(_))
        ));
    }
}
