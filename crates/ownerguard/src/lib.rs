//! Top-level facade crate for ownerguard.
//!
//! Re-exports the core types and the engine library so users can depend on a single crate.

pub mod core {
    pub use ownerguard_core::*;
}

pub mod engine {
    pub use ownerguard_engine::*;
}
