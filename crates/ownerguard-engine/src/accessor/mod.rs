//! Entity accessors and their registry.
//!
//! An accessor fetches one field of one entity type's record by id. The
//! registry maps entity-type names to accessors and resolves relation models
//! through an owner fallback.

pub mod memory;
pub mod registry;

use async_trait::async_trait;
use serde_json::Value;

use ownerguard_core::error::Result;

pub use memory::MemoryAccessor;
pub use registry::{AccessorRegistry, AccessorRegistryBuilder, AccessorResolver};

/// Field access for one entity type. Implementations wrap the live datastore.
#[async_trait]
pub trait EntityAccessor: Send + Sync {
    fn model_name(&self) -> &str;

    /// Value of `field` on record `id`.
    ///
    /// A missing record is `OwnerGuardError::RecordNotFound`; a record without
    /// the field yields `Value::Null`.
    async fn fetch_field(&self, id: i64, field: &str) -> Result<Value>;
}
