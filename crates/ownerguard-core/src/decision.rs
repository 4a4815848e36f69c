//! Decision results.
//!
//! `Decision` is what a single evaluation path yields. `Outcome` is the
//! unified result handed to callers: a fault is a value, not a panic or a
//! stray error, and it stays distinguishable from a plain Deny.

use crate::error::{OwnerGuardError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allow(self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn from_bool(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

/// Reason an evaluation was aborted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Ownership mismatch on a `$currentUserId` condition (slow path).
    AccessDenied { model: String },
    /// Configuration defect: no accessor for the model.
    AccessorResolution { model: String },
}

impl Fault {
    /// Metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            Fault::AccessDenied { .. } => "access_denied",
            Fault::AccessorResolution { .. } => "accessor_resolution",
        }
    }

    /// The only text an end caller may see.
    pub fn client_message(&self) -> &'static str {
        "access denied"
    }

    /// Convert an engine error into a fault. Errors that are not decision
    /// faults (fetch failures are folded earlier) become `None`.
    pub fn from_error(err: &OwnerGuardError) -> Option<Self> {
        match err {
            OwnerGuardError::AccessDenied { model } => Some(Fault::AccessDenied { model: model.clone() }),
            OwnerGuardError::AccessorResolution { model } => {
                Some(Fault::AccessorResolution { model: model.clone() })
            }
            _ => None,
        }
    }
}

impl From<Fault> for OwnerGuardError {
    fn from(f: Fault) -> Self {
        match f {
            Fault::AccessDenied { model } => OwnerGuardError::AccessDenied { model },
            Fault::AccessorResolution { model } => OwnerGuardError::AccessorResolution { model },
        }
    }
}

/// Unified result of `authorize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Allow,
    Deny,
    Fault(Fault),
}

impl Outcome {
    pub fn is_allow(&self) -> bool {
        matches!(self, Outcome::Allow)
    }

    /// Metrics label.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Allow => "allow",
            Outcome::Deny => "deny",
            Outcome::Fault(f) => f.kind(),
        }
    }

    /// `Ok(())` on Allow; Deny reports as `AccessDenied` on `model`.
    pub fn into_result(self, model: &str) -> Result<()> {
        match self {
            Outcome::Allow => Ok(()),
            Outcome::Deny => Err(OwnerGuardError::AccessDenied { model: model.to_string() }),
            Outcome::Fault(f) => Err(f.into()),
        }
    }
}

impl From<Decision> for Outcome {
    fn from(d: Decision) -> Self {
        match d {
            Decision::Allow => Outcome::Allow,
            Decision::Deny => Outcome::Deny,
        }
    }
}
