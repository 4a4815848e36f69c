//! Non-fatal policy checks.
//!
//! Conditions that can never match are legal (they are simply inert at
//! runtime), so they are reported here instead of failing the load.

use ownerguard_core::policy::{Condition, CURRENT_USER_ID, WILDCARD};

use super::schema::PolicyConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintWarning {
    pub role: String,
    pub condition: usize,
    pub msg: &'static str,
}

pub fn lint(cfg: &PolicyConfig) -> Vec<LintWarning> {
    let mut out = Vec::new();
    for role in &cfg.roles {
        for (i, c) in role.conditions.iter().enumerate() {
            if let Some(msg) = check_condition(c) {
                out.push(LintWarning {
                    role: role.name.clone(),
                    condition: i,
                    msg,
                });
            }
        }
    }
    out
}

fn check_condition(c: &Condition) -> Option<&'static str> {
    if c.permissions.is_empty() {
        return Some("permissions empty: condition never matches by-id access");
    }
    if c.value.starts_with('$') && c.value != CURRENT_USER_ID {
        return Some("unknown placeholder: compared as a literal");
    }
    if c.ownership_field == WILDCARD && c.value != WILDCARD {
        return Some("ownershipField '*' without value '*' never matches");
    }
    None
}
