//! Role lookup for a principal.
//!
//! Roles are read on every request; nothing is cached here.

use async_trait::async_trait;

use ownerguard_core::error::Result;
use ownerguard_core::policy::Role;

use crate::config::PolicyConfig;

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn roles_for(&self, principal_id: i64) -> Result<Vec<Role>>;
}

/// Roles from the policy file: the configured default roles plus every role
/// row assigned to the principal through `user_id`.
pub struct ConfigRoleStore {
    roles: Vec<Role>,
    default_roles: Vec<String>,
}

impl ConfigRoleStore {
    pub fn new(roles: Vec<Role>, default_roles: Vec<String>) -> Self {
        Self {
            roles,
            default_roles,
        }
    }

    pub fn from_config(cfg: &PolicyConfig) -> Self {
        Self::new(cfg.roles.clone(), cfg.default_roles.clone())
    }

    pub fn role_named(&self, name: &str) -> Option<&Role> {
        self.roles.iter().find(|r| r.name == name)
    }
}

#[async_trait]
impl RoleStore for ConfigRoleStore {
    async fn roles_for(&self, principal_id: i64) -> Result<Vec<Role>> {
        let roles = self
            .roles
            .iter()
            .filter(|r| {
                r.user_id == Some(principal_id)
                    || (r.user_id.is_none() && self.default_roles.contains(&r.name))
            })
            .cloned()
            .collect();
        Ok(roles)
    }
}
