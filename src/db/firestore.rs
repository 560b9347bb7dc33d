// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore-backed [`RecordStore`].
//!
//! Tables map to collections. Records are stored as-is; explicit IDs become
//! document IDs, otherwise Firestore generates one.

use super::{RecordStore, StoreError};
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use serde_json::Value;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

fn map_error(e: FirestoreError) -> StoreError {
    match e {
        FirestoreError::DataConflictError(err) => StoreError::Conflict(err.to_string()),
        FirestoreError::DeserializeError(err) => StoreError::Decode(err.to_string()),
        FirestoreError::SerializeError(err) => StoreError::Decode(err.to_string()),
        other => StoreError::Unavailable(other.to_string()),
    }
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, StoreError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            StoreError::Unavailable(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, StoreError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StoreError::Unavailable(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Offline client: every operation fails with [`StoreError::Unavailable`].
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, StoreError> {
        self.client
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("Database not connected (offline mode)".into()))
    }
}

#[async_trait]
impl RecordStore for FirestoreDb {
    async fn insert(
        &self,
        table: &str,
        id: Option<&str>,
        record: Value,
    ) -> Result<(), StoreError> {
        let client = self.get_client()?;

        let _: () = match id {
            Some(id) => client
                .fluent()
                .insert()
                .into(table)
                .document_id(id)
                .object(&record)
                .execute()
                .await
                .map_err(map_error)?,
            None => client
                .fluent()
                .insert()
                .into(table)
                .generate_document_id()
                .object(&record)
                .execute()
                .await
                .map_err(map_error)?,
        };
        Ok(())
    }

    async fn select_one(
        &self,
        table: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Value>, StoreError> {
        let field = field.to_string();
        let value = value.to_string();

        let mut found: Vec<Value> = self
            .get_client()?
            .fluent()
            .select()
            .from(table)
            .filter(move |q| q.for_all([q.field(&field).eq(value.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(map_error)?;

        Ok(found.pop())
    }

    async fn upsert(&self, table: &str, id: &str, record: Value) -> Result<(), StoreError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(table)
            .document_id(id)
            .object(&record)
            .execute()
            .await
            .map_err(map_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_mode_reports_unavailable() {
        let db = FirestoreDb::new_mock();
        let err = db
            .select_one("profiles", "id", "u1")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
