//! Shared authorization state.
//!
//! Built once at startup from the policy file and the datastore's accessors,
//! then cloned into request handlers. The accessor registry is never mutated
//! after `Guard::new` returns.

use std::sync::Arc;
use std::time::Instant;

use ownerguard_core::attempt::AccessAttempt;
use ownerguard_core::decision::{Fault, Outcome};
use ownerguard_core::error::{OwnerGuardError, Result};
use ownerguard_core::policy::{Role, WILDCARD};

use crate::accessor::{AccessorRegistry, EntityAccessor};
use crate::config::{EngineSection, PolicyConfig};
use crate::engine::{self, EvalPath};
use crate::obs::GuardMetrics;
use crate::roles::{ConfigRoleStore, RoleStore};

#[derive(Clone)]
pub struct Guard {
    inner: Arc<GuardInner>,
}

struct GuardInner {
    cfg: PolicyConfig,
    registry: AccessorRegistry,
    metrics: GuardMetrics,
}

impl Guard {
    /// Register `accessors` and the configured owner mappings, then check
    /// that every model named by a condition can be resolved.
    pub fn new(cfg: PolicyConfig, accessors: Vec<Arc<dyn EntityAccessor>>) -> Result<Self> {
        let registry = accessors
            .into_iter()
            .fold(AccessorRegistry::builder(), |b, acc| b.accessor(acc));
        let registry = cfg
            .owners
            .iter()
            .fold(registry, |b, (relation, owner)| b.owner(relation.clone(), owner.clone()))
            .build();

        // policy <-> registry sanity check
        for role in &cfg.roles {
            for cond in &role.conditions {
                let model = cond.model_name.as_str();
                if model == WILDCARD || cond.is_unconditional() || registry.can_resolve(model) {
                    continue;
                }
                tracing::warn!(role = %role.name, model, "condition refers to a model without accessor");
                if cfg.engine.strict_models {
                    return Err(OwnerGuardError::BadRequest(format!(
                        "role {} references model without accessor: {}",
                        role.name, model
                    )));
                }
            }
        }

        tracing::info!(
            roles = cfg.roles.len(),
            models = ?registry.registered_models(),
            "ownerguard ready"
        );

        Ok(Self {
            inner: Arc::new(GuardInner {
                cfg,
                registry,
                metrics: GuardMetrics::default(),
            }),
        })
    }

    pub fn cfg(&self) -> &PolicyConfig {
        &self.inner.cfg
    }

    pub fn engine_options(&self) -> &EngineSection {
        &self.inner.cfg.engine
    }

    /// Read-only view of the accessors built at startup.
    pub fn registry(&self) -> &AccessorRegistry {
        &self.inner.registry
    }

    pub fn metrics(&self) -> &GuardMetrics {
        &self.inner.metrics
    }

    /// Role store over the roles in the policy file.
    pub fn config_role_store(&self) -> ConfigRoleStore {
        ConfigRoleStore::from_config(&self.inner.cfg)
    }

    /// Decide `attempt` for the given role set and record the outcome.
    pub async fn authorize(&self, roles: &[Role], attempt: &AccessAttempt) -> Outcome {
        let started = Instant::now();
        let path = EvalPath::for_attempt(roles, attempt);

        let outcome =
            engine::authorize(roles, attempt, &self.inner.registry, &self.inner.cfg.engine).await;

        let m = &self.inner.metrics;
        m.decisions
            .inc(&[("outcome", outcome.label()), ("path", path.as_str())]);
        m.decision_duration
            .observe(&[("path", path.as_str())], started.elapsed());

        match &outcome {
            Outcome::Fault(Fault::AccessorResolution { model }) => {
                m.resolution_faults.inc(&[("model", model.as_str())]);
                tracing::warn!(model = %model, action = %attempt.action, "accessor resolution fault");
            }
            other => {
                tracing::debug!(
                    model = %attempt.target_model_name,
                    action = %attempt.action,
                    principal = ?attempt.current_principal_id,
                    outcome = other.label(),
                    path = path.as_str(),
                    "authorization decided"
                );
            }
        }

        outcome
    }

    /// Load the principal's roles from `store`, then `authorize`.
    ///
    /// Unauthenticated attempts are denied without a lookup.
    pub async fn authorize_principal(
        &self,
        store: &dyn RoleStore,
        attempt: &AccessAttempt,
    ) -> Result<Outcome> {
        let Some(principal) = attempt.current_principal_id else {
            self.inner
                .metrics
                .decisions
                .inc(&[("outcome", "deny"), ("path", "anonymous")]);
            return Ok(Outcome::Deny);
        };
        let roles = store.roles_for(principal).await?;
        Ok(self.authorize(&roles, attempt).await)
    }
}
