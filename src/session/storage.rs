// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-browser key/value state.
//!
//! Mirrors the two storage partitions a browser offers (`local` survives
//! restarts, `session` does not). Keys written by this application carry the
//! [`OWNED_PREFIX`]; sign-out only clears those.

use std::collections::HashMap;

/// Prefix marking keys owned by this application.
pub const OWNED_PREFIX: &str = "fitcoach.";

/// Storage key for the persisted auth session.
pub const AUTH_SESSION_KEY: &str = "fitcoach.auth.session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Local,
    Session,
}

#[derive(Debug, Default, Clone)]
pub struct ClientStorage {
    local: HashMap<String, String>,
    session: HashMap<String, String>,
}

impl ClientStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn partition(&self, partition: Partition) -> &HashMap<String, String> {
        match partition {
            Partition::Local => &self.local,
            Partition::Session => &self.session,
        }
    }

    fn partition_mut(&mut self, partition: Partition) -> &mut HashMap<String, String> {
        match partition {
            Partition::Local => &mut self.local,
            Partition::Session => &mut self.session,
        }
    }

    pub fn get(&self, partition: Partition, key: &str) -> Option<&str> {
        self.partition(partition).get(key).map(String::as_str)
    }

    pub fn set(&mut self, partition: Partition, key: impl Into<String>, value: impl Into<String>) {
        self.partition_mut(partition).insert(key.into(), value.into());
    }

    pub fn remove(&mut self, partition: Partition, key: &str) -> Option<String> {
        self.partition_mut(partition).remove(key)
    }

    pub fn len(&self, partition: Partition) -> usize {
        self.partition(partition).len()
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.session.is_empty()
    }

    /// Number of app-owned keys across both partitions.
    pub fn owned_len(&self) -> usize {
        self.local
            .keys()
            .chain(self.session.keys())
            .filter(|k| k.starts_with(OWNED_PREFIX))
            .count()
    }

    /// Drop every app-owned key from both partitions; returns how many went.
    pub fn clear_owned(&mut self) -> usize {
        let before = self.local.len() + self.session.len();
        self.local.retain(|k, _| !k.starts_with(OWNED_PREFIX));
        self.session.retain(|k, _| !k.starts_with(OWNED_PREFIX));
        before - (self.local.len() + self.session.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partitions_are_independent() {
        let mut storage = ClientStorage::new();
        storage.set(Partition::Local, "fitcoach.a", "1");
        storage.set(Partition::Session, "fitcoach.a", "2");

        assert_eq!(storage.get(Partition::Local, "fitcoach.a"), Some("1"));
        assert_eq!(storage.get(Partition::Session, "fitcoach.a"), Some("2"));

        storage.remove(Partition::Local, "fitcoach.a");
        assert_eq!(storage.get(Partition::Local, "fitcoach.a"), None);
        assert_eq!(storage.len(Partition::Session), 1);
    }

    #[test]
    fn test_clear_owned_keeps_foreign_keys() {
        let mut storage = ClientStorage::new();
        storage.set(Partition::Local, AUTH_SESSION_KEY, "{}");
        storage.set(Partition::Session, "fitcoach.plan.day", "3");
        storage.set(Partition::Local, "other-app.theme", "dark");

        assert_eq!(storage.clear_owned(), 2);
        assert_eq!(storage.owned_len(), 0);
        assert_eq!(storage.get(Partition::Local, "other-app.theme"), Some("dark"));
    }
}
