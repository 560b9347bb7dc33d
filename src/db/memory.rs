// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process record store for local development and tests.

use super::{RecordStore, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Tables keyed by name, rows keyed by ID (insertion order preserved by ID sequence).
#[derive(Default)]
pub struct MemoryStore {
    tables: DashMap<String, BTreeMap<String, Value>>,
    next_id: AtomicU64,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Snapshot of a table's rows.
    pub fn records(&self, table: &str) -> Vec<Value> {
        self.tables
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        Ok(())
    }

    fn generate_id(&self) -> String {
        format!("{:020}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

fn field_matches(record: &Value, field: &str, value: &str) -> bool {
    match record.get(field) {
        Some(Value::String(s)) => s == value,
        Some(other @ (Value::Number(_) | Value::Bool(_))) => other.to_string() == value,
        _ => false,
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(
        &self,
        table: &str,
        id: Option<&str>,
        record: Value,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        let id = id.map(str::to_string).unwrap_or_else(|| self.generate_id());

        let mut rows = self.tables.entry(table.to_string()).or_default();
        if rows.contains_key(&id) {
            return Err(StoreError::Conflict(format!("{}/{}", table, id)));
        }
        rows.insert(id, record);
        Ok(())
    }

    async fn select_one(
        &self,
        table: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Value>, StoreError> {
        self.check_available()?;
        Ok(self.tables.get(table).and_then(|rows| {
            rows.values()
                .find(|record| field_matches(record, field, value))
                .cloned()
        }))
    }

    async fn upsert(&self, table: &str, id: &str, record: Value) -> Result<(), StoreError> {
        self.check_available()?;
        self.tables
            .entry(table.to_string())
            .or_default()
            .insert(id.to_string(), record);
        Ok(())
    }
}
