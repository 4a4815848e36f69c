use serde::{Deserialize, Serialize};

/// Matches any model, field, value or action.
pub const WILDCARD: &str = "*";

/// Placeholder substituted with the authenticated principal id.
pub const CURRENT_USER_ID: &str = "$currentUserId";

/// Field name used by the id-ownership fast path.
pub const ID_FIELD: &str = "id";

/// One clause of a role: target scope plus the actions it grants.
///
/// Field names follow the persisted policy shape (`modelName`,
/// `ownershipField`, `value`, `permissions`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Condition {
    pub model_name: String,
    pub ownership_field: String,
    pub value: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Condition {
    pub fn new(
        model_name: impl Into<String>,
        ownership_field: impl Into<String>,
        value: impl Into<String>,
        permissions: &[&str],
    ) -> Self {
        Self {
            model_name: model_name.into(),
            ownership_field: ownership_field.into(),
            value: value.into(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// `ownershipField == "*"` and `value == "*"`: allows without looking at
    /// any record.
    pub fn is_unconditional(&self) -> bool {
        self.ownership_field == WILDCARD && self.value == WILDCARD
    }

    pub fn applies_to_model(&self, model_name: &str) -> bool {
        self.model_name == WILDCARD || self.model_name == model_name
    }

    pub fn grants(&self, action: &str) -> bool {
        self.permissions.iter().any(|p| p == WILDCARD || p == action)
    }

    pub fn targets_current_user(&self) -> bool {
        self.value == CURRENT_USER_ID
    }

    /// Shape handled by the fast path: `{ownershipField: "id", value: "$currentUserId"}`.
    pub fn is_id_ownership(&self) -> bool {
        self.ownership_field == ID_FIELD && self.targets_current_user()
    }
}
