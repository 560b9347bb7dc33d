// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Browser sessions held by the server.
//!
//! One [`ClientSession`] per browser, keyed by the opaque ID carried in the
//! session cookie. Entries go away on sign-out or after sitting idle, and the
//! least recently used entry makes room when the registry is full.

use super::{ClientStorage, SessionContext};
use crate::backend::AuthBackend;
use crate::db::Database;
use crate::services::plan::PlanViewer;
use crate::services::wizard::Wizard;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Everything the server keeps for one browser.
pub struct ClientSession {
    pub id: String,
    pub context: Arc<SessionContext>,
    pub wizard: Mutex<Wizard>,
    pub plan: Mutex<PlanViewer>,
    /// Unix millis of the last request
    last_seen: AtomicI64,
    listener: JoinHandle<()>,
}

impl ClientSession {
    fn touch(&self) {
        self.last_seen
            .store(chrono::Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    fn idle_for(&self, now_millis: i64) -> Duration {
        let idle = now_millis - self.last_seen.load(Ordering::Relaxed);
        Duration::from_millis(idle.max(0) as u64)
    }
}

impl Drop for ClientSession {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

pub struct SessionRegistry {
    sessions: DashMap<String, Arc<ClientSession>>,
    auth: Arc<dyn AuthBackend>,
    db: Database,
    idle_timeout: Duration,
    max_sessions: usize,
    seed: [u8; 32],
    counter: AtomicU64,
}

impl SessionRegistry {
    pub fn new(
        auth: Arc<dyn AuthBackend>,
        db: Database,
        idle_timeout: Duration,
        max_sessions: usize,
    ) -> Self {
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        Self {
            sessions: DashMap::new(),
            auth,
            db,
            idle_timeout,
            max_sessions: max_sessions.max(1),
            seed: Sha256::digest(nanos.to_le_bytes()).into(),
            counter: AtomicU64::new(0),
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Look up a live session and mark it as used.
    pub fn get(&self, id: &str) -> Option<Arc<ClientSession>> {
        let session = self.sessions.get(id).map(|s| s.clone())?;
        session.touch();
        Some(session)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    /// Open a session for a new browser. Its context starts loading immediately.
    pub fn create(&self) -> Arc<ClientSession> {
        self.make_room();

        let id = self.generate_id();
        let storage = Arc::new(Mutex::new(ClientStorage::new()));
        let context = SessionContext::new(self.auth.clone(), self.db.clone(), storage);
        let listener = context.start();

        let session = Arc::new(ClientSession {
            id: id.clone(),
            context,
            wizard: Mutex::new(Wizard::standard()),
            plan: Mutex::new(PlanViewer::default()),
            last_seen: AtomicI64::new(chrono::Utc::now().timestamp_millis()),
            listener,
        });

        self.sessions.insert(id, session.clone());
        tracing::debug!(sessions = self.sessions.len(), "Browser session opened");
        session
    }

    /// Tear down a session (sign-out).
    pub fn remove(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Drop sessions idle for longer than the configured timeout.
    pub fn evict_idle(&self) -> usize {
        let now = chrono::Utc::now().timestamp_millis();
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| session.idle_for(now) < self.idle_timeout);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::info!(evicted, remaining = self.sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    /// Bring the registry below its cap: idle sessions first, then the least
    /// recently used.
    fn make_room(&self) {
        if self.sessions.len() < self.max_sessions {
            return;
        }
        self.evict_idle();

        while self.sessions.len() >= self.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|entry| entry.value().last_seen.load(Ordering::Relaxed))
                .map(|entry| entry.key().clone());
            let Some(id) = oldest else { break };
            self.sessions.remove(&id);
            tracing::warn!(
                max_sessions = self.max_sessions,
                "Session registry full, evicted least recently used"
            );
        }
    }

    /// Periodically evict idle sessions.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let registry = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let Some(registry) = registry.upgrade() else { break };
                registry.evict_idle();
            }
        })
    }

    fn generate_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(self.seed);
        hasher.update(n.to_le_bytes());
        hasher.update(nanos.to_le_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryAuth;
    use crate::db::MemoryStore;

    fn registry_with_cap(idle_timeout: Duration, max_sessions: usize) -> SessionRegistry {
        SessionRegistry::new(
            Arc::new(MemoryAuth::new()),
            Database::new(Arc::new(MemoryStore::new())),
            idle_timeout,
            max_sessions,
        )
    }

    fn registry(idle_timeout: Duration) -> SessionRegistry {
        registry_with_cap(idle_timeout, 100)
    }

    #[tokio::test]
    async fn test_create_get_remove() {
        let registry = registry(Duration::from_secs(60));
        let session = registry.create();

        let found = registry.get(&session.id).unwrap();
        assert!(Arc::ptr_eq(&found, &session));

        assert!(registry.remove(&session.id));
        assert!(registry.get(&session.id).is_none());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let registry = registry(Duration::from_secs(60));
        let a = registry.create();
        let b = registry.create();
        assert_ne!(a.id, b.id);
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_evict_idle() {
        let registry = registry(Duration::ZERO);
        registry.create();
        registry.create();

        assert_eq!(registry.evict_idle(), 2);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_full_registry_evicts_least_recently_used() {
        let registry = registry_with_cap(Duration::from_secs(60), 2);
        let first = registry.create();
        let second = registry.create();
        // Older than the others but not idle.
        first
            .last_seen
            .store(chrono::Utc::now().timestamp_millis() - 1_000, Ordering::Relaxed);
        second.touch();

        let third = registry.create();

        assert_eq!(registry.len(), 2);
        assert!(!registry.contains(&first.id));
        assert!(registry.contains(&second.id));
        assert!(registry.contains(&third.id));
    }

    #[tokio::test]
    async fn test_full_registry_drops_idle_sessions_first() {
        let registry = registry_with_cap(Duration::from_secs(60), 3);
        let a = registry.create();
        let b = registry.create();
        let c = registry.create();
        a.last_seen.store(0, Ordering::Relaxed);
        b.last_seen.store(0, Ordering::Relaxed);

        registry.create();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&c.id));
    }

    #[tokio::test]
    async fn test_new_session_resolves_anonymous() {
        let registry = registry(Duration::from_secs(60));
        let session = registry.create();

        let state = session.context.resolved().await;
        assert!(state.identity.is_none());
    }
}
