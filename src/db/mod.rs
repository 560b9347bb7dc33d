// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Record-store layer.
//!
//! The hosted store is reached through [`RecordStore`], a table-name keyed
//! interface with three operations. [`Database`] layers the typed profile and
//! assessment operations on top of it.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::models::{Assessment, NewAssessment, Profile};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Table names as constants.
pub mod tables {
    pub const PROFILES: &str = "profiles";
    pub const ASSESSMENTS: &str = "user_assessments";
}

/// Record-store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Insert with an explicit ID that already exists.
    #[error("Record already exists: {0}")]
    Conflict(String),

    /// The record an update targets does not exist.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Network or backend failure; the same call may succeed later.
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    /// A record did not have the expected shape.
    #[error("Malformed record: {0}")]
    Decode(String),
}

/// Operations consumed from the hosted record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert one record. Atomic per call.
    ///
    /// With `id`, fails with [`StoreError::Conflict`] if that ID is taken;
    /// without, the store generates one.
    async fn insert(&self, table: &str, id: Option<&str>, record: Value)
        -> Result<(), StoreError>;

    /// First record whose `field` equals `value`, if any.
    async fn select_one(
        &self,
        table: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Value>, StoreError>;

    /// Create or replace the record with this ID.
    async fn upsert(&self, table: &str, id: &str, record: Value) -> Result<(), StoreError>;
}

/// Typed access to the application's tables.
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn RecordStore>,
}

impl Database {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a profile by identity ID. `Ok(None)` means no such row.
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        self.store
            .select_one(tables::PROFILES, "id", user_id)
            .await?
            .map(|value| {
                serde_json::from_value(value).map_err(|e| StoreError::Decode(e.to_string()))
            })
            .transpose()
    }

    /// Create the profile for an identity (premium off).
    ///
    /// Keyed by the identity ID, so concurrent creators converge on one row:
    /// losing the race returns the row that won.
    pub async fn create_profile(&self, user_id: &str, email: &str) -> Result<Profile, StoreError> {
        let profile = Profile::new_for(user_id, email);
        let record =
            serde_json::to_value(&profile).map_err(|e| StoreError::Decode(e.to_string()))?;

        match self
            .store
            .insert(tables::PROFILES, Some(user_id), record)
            .await
        {
            Ok(()) => {
                tracing::info!(user_id, "Profile created");
                Ok(profile)
            }
            Err(StoreError::Conflict(_)) => {
                tracing::debug!(user_id, "Profile already exists, re-reading");
                self.get_profile(user_id)
                    .await?
                    .ok_or_else(|| StoreError::Unavailable("profile vanished after conflict".into()))
            }
            Err(e) => Err(e),
        }
    }

    /// Set the premium flag (admin tooling). The profile must already exist.
    pub async fn set_premium_access(
        &self,
        user_id: &str,
        premium_access: bool,
    ) -> Result<Profile, StoreError> {
        let mut profile = self
            .get_profile(user_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("profile {}", user_id)))?;
        profile.premium_access = premium_access;

        let record =
            serde_json::to_value(&profile).map_err(|e| StoreError::Decode(e.to_string()))?;
        self.store.upsert(tables::PROFILES, user_id, record).await?;
        Ok(profile)
    }

    // ─── Assessment Operations ───────────────────────────────────

    /// Insert one completed assessment run.
    pub async fn insert_assessment(
        &self,
        answers: NewAssessment,
        created_at: String,
    ) -> Result<Assessment, StoreError> {
        let assessment = Assessment {
            answers,
            created_at,
        };
        let record =
            serde_json::to_value(&assessment).map_err(|e| StoreError::Decode(e.to_string()))?;

        self.store
            .insert(tables::ASSESSMENTS, None, record)
            .await?;

        tracing::info!(
            user_id = %assessment.answers.user_id,
            goal = assessment.answers.goal.as_str(),
            "Assessment stored"
        );
        Ok(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> (Database, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Database::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_profile_absent_then_created() {
        let (db, store) = db();
        assert_eq!(db.get_profile("u1").await.unwrap(), None);

        let profile = db.create_profile("u1", "ana@example.com").await.unwrap();
        assert!(!profile.premium_access);
        assert_eq!(db.get_profile("u1").await.unwrap(), Some(profile));
        assert_eq!(store.records(tables::PROFILES).len(), 1);
    }

    #[tokio::test]
    async fn test_create_profile_twice_keeps_one_row() {
        let (db, store) = db();
        db.create_profile("u1", "ana@example.com").await.unwrap();
        db.set_premium_access("u1", true).await.unwrap();

        let again = db.create_profile("u1", "ana@example.com").await.unwrap();

        assert!(again.premium_access, "existing row must win");
        assert_eq!(store.records(tables::PROFILES).len(), 1);
    }

    #[tokio::test]
    async fn test_set_premium_without_profile_is_not_found() {
        let (db, store) = db();

        assert!(matches!(
            db.set_premium_access("ghost", true).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(store.records(tables::PROFILES).is_empty());
    }

    #[tokio::test]
    async fn test_transient_error_is_not_absence() {
        let (db, store) = db();
        store.set_unavailable(true);

        assert!(matches!(
            db.get_profile("u1").await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
