use serde::{Deserialize, Serialize};

use super::condition::{Condition, CURRENT_USER_ID, WILDCARD};

/// Named, ordered set of conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Role {
    pub name: String,
    pub conditions: Vec<Condition>,
    /// Principal this persisted role belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl Role {
    pub fn new(name: impl Into<String>, conditions: Vec<Condition>) -> Self {
        Self {
            name: name.into(),
            conditions,
            user_id: None,
        }
    }

    pub fn assigned_to(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Role handed to every registered user: manage the own `User` row and
    /// read the own role rows.
    pub fn default_user() -> Self {
        Self::new(
            "user",
            vec![
                Condition::new("User", "id", CURRENT_USER_ID, &["read", "write", "update"]),
                Condition::new("Role", "userId", CURRENT_USER_ID, &["read"]),
            ],
        )
    }

    pub fn super_admin() -> Self {
        Self::new(
            "super admin",
            vec![Condition::new(WILDCARD, WILDCARD, WILDCARD, &[WILDCARD])],
        )
    }

    pub fn has_unconditional(&self) -> bool {
        self.conditions.iter().any(Condition::is_unconditional)
    }
}
