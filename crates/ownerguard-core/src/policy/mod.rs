//! Policy model (roles and conditions).
//!
//! Plain value objects read from persisted policy data. Nothing here checks
//! placeholder syntax: a condition whose `value` is neither a wildcard nor
//! `$currentUserId` is treated as a literal.

pub mod condition;
pub mod role;

pub use condition::{Condition, CURRENT_USER_ID, ID_FIELD, WILDCARD};
pub use role::Role;
