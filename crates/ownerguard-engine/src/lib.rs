//! ownerguard engine library entry.
//!
//! Wires the accessor registry, decision engine, policy configuration, role
//! lookup and metrics into a `Guard` that request handlers share. Consumed by
//! the policy lint binary (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod accessor;
pub mod config;
pub mod engine;
pub mod guard;
pub mod obs;
pub mod roles;

pub use guard::Guard;
