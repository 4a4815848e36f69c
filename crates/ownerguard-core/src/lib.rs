//! ownerguard core: policy model, access attempt descriptor, decision types
//! and the shared error surface.
//!
//! This crate carries no runtime or datastore dependencies so request
//! handlers can build attempts and inspect outcomes without pulling in the
//! engine.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Every fallible path
//! surfaces as `OwnerGuardError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod attempt;
pub mod decision;
pub mod error;
pub mod policy;

pub use attempt::{AccessAttempt, MethodKind};
pub use decision::{Decision, Fault, Outcome};
/// Shared result type.
pub use error::{OwnerGuardError, Result};
pub use policy::{Condition, Role};
