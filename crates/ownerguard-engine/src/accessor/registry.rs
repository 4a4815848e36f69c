use std::collections::HashMap;
use std::sync::Arc;


use ownerguard_core::attempt::AccessAttempt;
use ownerguard_core::error::{OwnerGuardError, Result};

use super::EntityAccessor;

/// Seam between the decision engine and accessor lookup.
pub trait AccessorResolver: Send + Sync {
    /// Accessor for `attempt.target_model_name`, falling back to the owner
    /// model of a relation.
    fn resolve(&self, attempt: &AccessAttempt) -> Result<Arc<dyn EntityAccessor>>;
}

/// Registry of accessors keyed by entity-type name.
///
/// Built once through [`AccessorRegistryBuilder`] and never changed after.
/// There is no way to register through a shared reference:
///
/// ```compile_fail
/// use std::sync::Arc;
/// use ownerguard_engine::accessor::{AccessorRegistry, MemoryAccessor};
///
/// let reg = AccessorRegistry::builder().build();
/// reg.register(Arc::new(MemoryAccessor::new("Invoice")));
/// ```
#[derive(Default)]
pub struct AccessorRegistry {
    accessors: HashMap<String, Arc<dyn EntityAccessor>>,
    // relation model -> owner model
    owners: HashMap<String, String>,
}

/// Collects accessors and owner mappings at startup.
#[derive(Default)]
pub struct AccessorRegistryBuilder {
    accessors: HashMap<String, Arc<dyn EntityAccessor>>,
    owners: HashMap<String, String>,
}

impl AccessorRegistryBuilder {
    /// Later registrations for the same model replace earlier ones.
    pub fn accessor(mut self, accessor: Arc<dyn EntityAccessor>) -> Self {
        self.accessors.insert(accessor.model_name().to_string(), accessor);
        self
    }

    /// Declare `owner_model` as the owning entity of `relation_model`.
    pub fn owner(mut self, relation_model: impl Into<String>, owner_model: impl Into<String>) -> Self {
        self.owners.insert(relation_model.into(), owner_model.into());
        self
    }

    pub fn build(self) -> AccessorRegistry {
        AccessorRegistry {
            accessors: self.accessors,
            owners: self.owners,
        }
    }
}

impl AccessorRegistry {
    pub fn builder() -> AccessorRegistryBuilder {
        AccessorRegistryBuilder::default()
    }

    pub fn registered_models(&self) -> Vec<String> {
        let mut out: Vec<String> = self.accessors.keys().cloned().collect();
        out.sort();
        out
    }

    pub fn contains(&self, model_name: &str) -> bool {
        self.accessors.contains_key(model_name)
    }

    pub fn owner_of(&self, relation_model: &str) -> Option<String> {
        self.owners.get(relation_model).cloned()
    }

    /// Resolvable directly or through the registered owner mapping.
    pub fn can_resolve(&self, model_name: &str) -> bool {
        self.contains(model_name)
            || self
                .owner_of(model_name)
                .is_some_and(|owner| self.contains(&capitalize(&owner)))
    }

    fn lookup(&self, model_name: &str) -> Option<Arc<dyn EntityAccessor>> {
        self.accessors.get(model_name).cloned()
    }

    /// Direct lookup, then the owner fallback: the attempt's own
    /// `owner_model_name` wins over the registered owner mapping. The owner
    /// name is capitalized before the retry.
    pub fn resolve_model(
        &self,
        model_name: &str,
        owner_hint: Option<&str>,
    ) -> Result<Arc<dyn EntityAccessor>> {
        if let Some(acc) = self.lookup(model_name) {
            return Ok(acc);
        }

        let owner = owner_hint
            .map(str::to_string)
            .or_else(|| self.owner_of(model_name));

        if let Some(owner) = owner {
            let derived = capitalize(&owner);
            if let Some(acc) = self.lookup(&derived) {
                tracing::debug!(model = %model_name, owner = %derived, "accessor resolved via owner");
                return Ok(acc);
            }
            tracing::warn!(model = %model_name, owner = %derived, "owner model has no accessor");
        } else {
            tracing::warn!(model = %model_name, "no accessor and no owner for model");
        }

        Err(OwnerGuardError::AccessorResolution {
            model: model_name.to_string(),
        })
    }
}

impl AccessorResolver for AccessorRegistry {
    fn resolve(&self, attempt: &AccessAttempt) -> Result<Arc<dyn EntityAccessor>> {
        self.resolve_model(
            &attempt.target_model_name,
            attempt.owner_model_name.as_deref(),
        )
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
