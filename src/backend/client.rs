// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-browser auth client.
//!
//! Holds the browser's current backend session (persisted in its
//! [`ClientStorage`]) and broadcasts an [`AuthEvent`] whenever that session
//! changes.

use super::{AuthBackend, AuthError, AuthEvent, AuthEventKind, AuthSession};
use crate::session::storage::{ClientStorage, Partition, AUTH_SESSION_KEY};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Handle on the session-change stream.
///
/// Delivery stops on [`Subscription::unsubscribe`] or when the handle is dropped.
pub struct Subscription {
    rx: broadcast::Receiver<AuthEvent>,
}

impl Subscription {
    /// Next event, in emission order.
    pub async fn recv(&mut self) -> Result<AuthEvent, broadcast::error::RecvError> {
        self.rx.recv().await
    }

    pub fn unsubscribe(self) {}
}

pub struct AuthClient {
    backend: Arc<dyn AuthBackend>,
    storage: Arc<Mutex<ClientStorage>>,
    events: broadcast::Sender<AuthEvent>,
}

impl AuthClient {
    pub fn new(backend: Arc<dyn AuthBackend>, storage: Arc<Mutex<ClientStorage>>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            backend,
            storage,
            events,
        }
    }

    /// Subscribe to session changes.
    pub fn on_auth_state_change(&self) -> Subscription {
        Subscription {
            rx: self.events.subscribe(),
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let session = self.backend.sign_up(email, password).await?;
        self.persist(&session).await;
        self.emit(AuthEventKind::SignedIn, Some(session.clone()));
        Ok(session)
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let session = self.backend.sign_in_with_password(email, password).await?;
        self.persist(&session).await;
        self.emit(AuthEventKind::SignedIn, Some(session.clone()));
        Ok(session)
    }

    /// End the current session.
    ///
    /// The persisted session is dropped even when the backend call fails.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let current = self.stored_session().await;
        let result = match &current {
            Some(session) => self.backend.sign_out(session).await,
            None => Ok(()),
        };

        self.discard().await;
        self.emit(AuthEventKind::SignedOut, None);
        result
    }

    /// Current session, re-validated with the backend.
    ///
    /// A stored token that has expired, or that the backend no longer
    /// recognises, is discarded.
    pub async fn get_session(&self) -> Result<Option<AuthSession>, AuthError> {
        let Some(mut session) = self.stored_session().await else {
            return Ok(None);
        };

        if session.is_expired(chrono::Utc::now()) {
            tracing::info!("Stored session expired, discarding");
            self.discard().await;
            return Ok(None);
        }

        match self.backend.get_user(&session.access_token).await? {
            Some(identity) => {
                session.identity = identity;
                Ok(Some(session))
            }
            None => {
                tracing::info!("Stored session rejected by backend, discarding");
                self.discard().await;
                Ok(None)
            }
        }
    }

    async fn discard(&self) {
        self.storage
            .lock()
            .await
            .remove(Partition::Local, AUTH_SESSION_KEY);
    }

    /// Access token of the stored session, without contacting the backend.
    pub async fn current_access_token(&self) -> Option<String> {
        self.stored_session().await.map(|s| s.access_token)
    }

    async fn stored_session(&self) -> Option<AuthSession> {
        let storage = self.storage.lock().await;
        let raw = storage.get(Partition::Local, AUTH_SESSION_KEY)?;
        match serde_json::from_str(raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable stored session");
                None
            }
        }
    }

    async fn persist(&self, session: &AuthSession) {
        match serde_json::to_string(session) {
            Ok(raw) => self
                .storage
                .lock()
                .await
                .set(Partition::Local, AUTH_SESSION_KEY, raw),
            Err(e) => tracing::error!(error = %e, "Failed to serialize auth session"),
        }
    }

    fn emit(&self, kind: AuthEventKind, session: Option<AuthSession>) {
        // No subscribers is fine.
        let _ = self.events.send(AuthEvent { kind, session });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryAuth;

    fn client() -> (AuthClient, Arc<Mutex<ClientStorage>>) {
        let storage = Arc::new(Mutex::new(ClientStorage::new()));
        let client = AuthClient::new(Arc::new(MemoryAuth::new()), storage.clone());
        (client, storage)
    }

    #[tokio::test]
    async fn test_sign_in_persists_and_notifies() {
        let (client, storage) = client();
        let mut sub = client.on_auth_state_change();

        let session = client.sign_up("ana@example.com", "secret123").await.unwrap();

        let event = sub.recv().await.unwrap();
        assert_eq!(event.kind, AuthEventKind::SignedIn);
        assert_eq!(event.session.unwrap().identity, session.identity);
        assert!(storage
            .lock()
            .await
            .get(Partition::Local, AUTH_SESSION_KEY)
            .is_some());

        let restored = client.get_session().await.unwrap().unwrap();
        assert_eq!(restored.identity.email, "ana@example.com");
    }

    #[tokio::test]
    async fn test_sign_out_clears_session() {
        let (client, storage) = client();
        client.sign_up("ana@example.com", "secret123").await.unwrap();
        let mut sub = client.on_auth_state_change();

        client.sign_out().await.unwrap();

        let event = sub.recv().await.unwrap();
        assert_eq!(event.kind, AuthEventKind::SignedOut);
        assert!(event.session.is_none());
        assert_eq!(storage.lock().await.owned_len(), 0);
        assert!(client.get_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revoked_token_is_discarded() {
        let storage = Arc::new(Mutex::new(ClientStorage::new()));
        let backend = Arc::new(MemoryAuth::new());
        let client = AuthClient::new(backend.clone(), storage.clone());

        let session = client.sign_up("ana@example.com", "secret123").await.unwrap();
        backend.sign_out(&session).await.unwrap();

        assert!(client.get_session().await.unwrap().is_none());
        assert_eq!(storage.lock().await.owned_len(), 0);
    }

    #[tokio::test]
    async fn test_expired_session_is_discarded() {
        let (client, storage) = client();
        let mut session = client.sign_up("ana@example.com", "secret123").await.unwrap();

        session.expires_at = Some(crate::time_utils::format_utc_rfc3339(
            chrono::Utc::now() - chrono::Duration::minutes(5),
        ));
        client.persist(&session).await;

        assert!(client.get_session().await.unwrap().is_none());
        assert_eq!(storage.lock().await.owned_len(), 0);
    }
}
