use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};

use ownerguard_core::error::{OwnerGuardError, Result};

use super::EntityAccessor;

/// In-process accessor over JSON records. Counts fetches.
pub struct MemoryAccessor {
    model: String,
    records: DashMap<i64, Map<String, Value>>,
    fetches: AtomicU64,
}

impl MemoryAccessor {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            records: DashMap::new(),
            fetches: AtomicU64::new(0),
        }
    }

    /// Insert or replace record `id`. Non-object values are stored as an
    /// empty record.
    pub fn insert(&self, id: i64, record: Value) {
        let fields = match record {
            Value::Object(m) => m,
            _ => Map::new(),
        };
        self.records.insert(id, fields);
    }

    pub fn with_record(self, id: i64, record: Value) -> Self {
        self.insert(id, record);
        self
    }

    pub fn remove(&self, id: i64) {
        self.records.remove(&id);
    }

    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl EntityAccessor for MemoryAccessor {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn fetch_field(&self, id: i64, field: &str) -> Result<Value> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let record = self.records.get(&id).ok_or_else(|| OwnerGuardError::RecordNotFound {
            model: self.model.clone(),
            id,
        })?;
        Ok(record.get(field).cloned().unwrap_or(Value::Null))
    }
}
