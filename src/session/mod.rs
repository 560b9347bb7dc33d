// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session context: who is signed in, and their profile.
//!
//! A [`SessionContext`] is the only writer of its [`SessionState`]. Views
//! read it through [`SessionContext::state`] or follow changes with
//! [`SessionContext::subscribe`]. State is re-derived from the backend at
//! start-up and after every session-change event; while a derivation is in
//! flight `loading` is true and the session must be treated as undecided.

pub mod registry;
pub mod storage;

pub use registry::{ClientSession, SessionRegistry};
pub use storage::ClientStorage;

use crate::backend::{AuthClient, AuthError, AuthEvent, AuthEventKind, Identity};
use crate::db::Database;
use crate::models::Profile;
use serde::Serialize;
use std::sync::{Arc, Weak};
use tokio::sync::{broadcast::error::RecvError, watch, Mutex};
use tokio::task::JoinHandle;

/// Snapshot of the session as views see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub profile: Option<Profile>,
    pub loading: bool,
}

impl SessionState {
    fn initial() -> Self {
        Self {
            identity: None,
            profile: None,
            loading: true,
        }
    }

    pub fn is_premium(&self) -> bool {
        self.profile.as_ref().is_some_and(|p| p.premium_access)
    }
}

pub struct SessionContext {
    auth: AuthClient,
    db: Database,
    storage: Arc<Mutex<ClientStorage>>,
    state: watch::Sender<SessionState>,
}

impl SessionContext {
    /// Build a context over one browser's storage. Starts in the loading state.
    pub fn new(
        backend: Arc<dyn crate::backend::AuthBackend>,
        db: Database,
        storage: Arc<Mutex<ClientStorage>>,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(SessionState::initial());
        Arc::new(Self {
            auth: AuthClient::new(backend, storage.clone()),
            db,
            storage,
            state,
        })
    }

    /// Run initialisation, then follow session-change events until the
    /// context is dropped.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let mut subscription = self.auth.on_auth_state_change();
        let weak: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            if let Some(ctx) = weak.upgrade() {
                ctx.initialize().await;
            }

            loop {
                let received = subscription.recv().await;
                let Some(ctx) = weak.upgrade() else { break };
                match received {
                    Ok(event) => ctx.handle_event(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Session events lagged, re-deriving");
                        ctx.initialize().await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            subscription.unsubscribe();
        })
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Wait for any in-flight derivation to finish.
    pub async fn resolved(&self) -> SessionState {
        let mut rx = self.state.subscribe();
        let resolved = match rx.wait_for(|s| !s.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        resolved
    }

    pub fn storage(&self) -> &Arc<Mutex<ClientStorage>> {
        &self.storage
    }

    /// Derive identity/profile from the backend's current session.
    pub async fn initialize(&self) {
        self.set_loading(true);

        let next = match self.auth.get_session().await {
            Ok(Some(session)) => {
                let profile = self.load_profile(&session.identity, true).await;
                SessionState {
                    identity: Some(session.identity),
                    profile,
                    loading: false,
                }
            }
            Ok(None) => SessionState {
                identity: None,
                profile: None,
                loading: false,
            },
            Err(e) => {
                tracing::error!(error = %e, "Session initialisation failed");
                SessionState {
                    identity: None,
                    profile: None,
                    loading: false,
                }
            }
        };
        self.state.send_replace(next);
    }

    /// Apply one backend notification; the derived state replaces the old one.
    async fn handle_event(&self, event: AuthEvent) {
        tracing::debug!(kind = ?event.kind, "Session event");

        // Skip events overtaken by a later sign-in/sign-out.
        let current = self.auth.current_access_token().await;
        let stale = match &event.session {
            Some(session) => current.as_deref() != Some(session.access_token.as_str()),
            None => current.is_some(),
        };
        if stale {
            tracing::debug!(kind = ?event.kind, "Ignoring superseded session event");
            return;
        }

        let (identity, profile) = match event.session {
            Some(session) => {
                let create = event.kind == AuthEventKind::SignedIn;
                let profile = self.load_profile(&session.identity, create).await;
                (Some(session.identity), profile)
            }
            None => (None, None),
        };

        // `loading` belongs to whichever call is in flight; leave it alone.
        self.state.send_modify(|state| {
            state.identity = identity;
            state.profile = profile;
        });
    }

    /// Register credentials and create the profile row.
    ///
    /// A failed profile insert is logged, not reported: the next sign-in
    /// creates it.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.set_loading(true);
        tracing::info!("Starting sign-up");

        let result = match self.auth.sign_up(email, password).await {
            Ok(session) => {
                let profile = match self
                    .db
                    .create_profile(&session.identity.id, &session.identity.email)
                    .await
                {
                    Ok(profile) => Some(profile),
                    Err(e) => {
                        tracing::error!(error = %e, user_id = %session.identity.id, "Profile creation failed");
                        None
                    }
                };
                self.state.send_replace(SessionState {
                    identity: Some(session.identity),
                    profile,
                    loading: true,
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Sign-up rejected");
                Err(e)
            }
        };

        self.set_loading(false);
        result
    }

    /// Verify credentials, then load (or lazily create) the profile.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.set_loading(true);

        let result = match self.auth.sign_in_with_password(email, password).await {
            Ok(session) => {
                let profile = self.load_profile(&session.identity, true).await;
                tracing::info!(user_id = %session.identity.id, "Signed in");
                self.state.send_replace(SessionState {
                    identity: Some(session.identity),
                    profile,
                    loading: true,
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Sign-in rejected");
                Err(e)
            }
        };

        self.set_loading(false);
        result
    }

    /// End the session and wipe this browser's app-owned state.
    ///
    /// Local state is cleared even if the backend call fails; that failure is
    /// still returned.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.set_loading(true);
        tracing::info!("Starting sign-out");

        let result = self.auth.sign_out().await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "Backend sign-out failed, clearing local state anyway");
        }

        let cleared = self.storage.lock().await.clear_owned();
        self.state.send_replace(SessionState {
            identity: None,
            profile: None,
            loading: false,
        });

        tracing::info!(cleared_keys = cleared, "Signed out");
        result
    }

    /// Fetch the profile for an identity.
    ///
    /// A missing row is created when `create_if_missing`; a store failure is
    /// logged and yields no profile without creating one.
    async fn load_profile(&self, identity: &Identity, create_if_missing: bool) -> Option<Profile> {
        match self.db.get_profile(&identity.id).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) if create_if_missing => {
                tracing::info!(user_id = %identity.id, "No profile found, creating one");
                match self.db.create_profile(&identity.id, &identity.email).await {
                    Ok(profile) => Some(profile),
                    Err(e) => {
                        tracing::error!(error = %e, user_id = %identity.id, "Profile creation failed");
                        None
                    }
                }
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, user_id = %identity.id, "Profile fetch failed");
                None
            }
        }
    }

    fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.loading != loading;
            state.loading = loading;
            changed
        });
    }
}
