//! Shared error type across ownerguard crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed configuration.
    BadRequest,
    /// Authorization refused.
    Forbidden,
    /// Unsupported policy file version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::Forbidden => "FORBIDDEN",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, OwnerGuardError>;

/// Unified error type used by core and engine.
#[derive(Debug, Error)]
pub enum OwnerGuardError {
    /// Ownership comparison failed on a `$currentUserId` condition.
    #[error("access denied on {model}")]
    AccessDenied { model: String },
    /// No accessor for the model, even after the owner fallback.
    #[error("no accessor registered for {model}")]
    AccessorResolution { model: String },
    /// Fetch target does not exist.
    #[error("record {model}#{id} not found")]
    RecordNotFound { model: String, id: i64 },
    /// Accessor backend failure.
    #[error("datastore: {0}")]
    Datastore(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported policy version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl OwnerGuardError {
    /// Map internal error to a stable client-facing code.
    ///
    /// Anything raised while deciding access surfaces as `Forbidden`; the
    /// remaining variants are startup or wiring errors.
    pub fn client_code(&self) -> ClientCode {
        match self {
            OwnerGuardError::AccessDenied { .. }
            | OwnerGuardError::AccessorResolution { .. }
            | OwnerGuardError::RecordNotFound { .. }
            | OwnerGuardError::Datastore(_) => ClientCode::Forbidden,
            OwnerGuardError::BadRequest(_) => ClientCode::BadRequest,
            OwnerGuardError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            OwnerGuardError::Internal(_) => ClientCode::Internal,
        }
    }

    /// True for failures that come from fetching a record. These are folded
    /// into a Deny contribution and never propagated out of the engine.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            OwnerGuardError::RecordNotFound { .. } | OwnerGuardError::Datastore(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_faults_map_to_forbidden() {
        let denied = OwnerGuardError::AccessDenied { model: "User".into() };
        let unresolved = OwnerGuardError::AccessorResolution { model: "Invoice".into() };
        assert_eq!(denied.client_code(), ClientCode::Forbidden);
        assert_eq!(unresolved.client_code().as_str(), "FORBIDDEN");
    }

    #[test]
    fn only_fetch_errors_are_foldable() {
        assert!(OwnerGuardError::RecordNotFound { model: "User".into(), id: 1 }.is_fetch_failure());
        assert!(OwnerGuardError::Datastore("timeout".into()).is_fetch_failure());
        assert!(!OwnerGuardError::AccessDenied { model: "User".into() }.is_fetch_failure());
    }
}
