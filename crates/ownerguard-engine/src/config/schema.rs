use std::collections::BTreeMap;

use serde::Deserialize;

use ownerguard_core::error::{OwnerGuardError, Result};
use ownerguard_core::policy::Role;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    pub version: u32,

    #[serde(default)]
    pub engine: EngineSection,

    /// relation model -> owner model
    #[serde(default)]
    pub owners: BTreeMap<String, String>,

    /// Role names granted to every authenticated principal.
    #[serde(default)]
    pub default_roles: Vec<String>,

    #[serde(default)]
    pub roles: Vec<Role>,
}

impl PolicyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(OwnerGuardError::UnsupportedVersion);
        }
        if self.roles.is_empty() {
            return Err(OwnerGuardError::BadRequest("roles must not be empty".into()));
        }

        for (i, role) in self.roles.iter().enumerate() {
            validate_role(i, role)?;
        }

        for (relation, owner) in &self.owners {
            if relation.is_empty() || owner.is_empty() {
                return Err(OwnerGuardError::BadRequest(
                    "owners entries must name both models".into(),
                ));
            }
        }

        for name in &self.default_roles {
            if !self.roles.iter().any(|r| &r.name == name) {
                return Err(OwnerGuardError::BadRequest(format!(
                    "default_roles references unknown role: {name}"
                )));
            }
        }

        Ok(())
    }
}

fn validate_role(idx: usize, role: &Role) -> Result<()> {
    if role.name.trim().is_empty() {
        return Err(OwnerGuardError::BadRequest(format!(
            "roles[{idx}].name must not be empty"
        )));
    }
    if role.conditions.is_empty() {
        return Err(OwnerGuardError::BadRequest(format!(
            "role {} must have at least one condition",
            role.name
        )));
    }
    for (j, c) in role.conditions.iter().enumerate() {
        if c.model_name.is_empty() || c.ownership_field.is_empty() {
            return Err(OwnerGuardError::BadRequest(format!(
                "role {} conditions[{j}]: modelName and ownershipField are required",
                role.name
            )));
        }
    }
    Ok(())
}

/// What the slow path does when a `$currentUserId` comparison fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MismatchMode {
    /// Abort the whole evaluation with `AccessDenied`.
    #[default]
    Raise,
    /// Count the condition as Deny and keep evaluating siblings.
    Deny,
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    /// Issue slow-path fetches concurrently (results still folded in order).
    #[serde(default)]
    pub concurrent_fetches: bool,

    #[serde(default)]
    pub on_mismatch: MismatchMode,

    /// Fail startup when a condition names a model nothing can resolve.
    #[serde(default)]
    pub strict_models: bool,
}
