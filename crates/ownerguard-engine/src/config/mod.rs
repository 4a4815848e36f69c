//! Policy file loader (strict parsing) and lint checks.

pub mod lint;
pub mod schema;

use std::fs;

use ownerguard_core::error::{OwnerGuardError, Result};

pub use lint::{lint, LintWarning};
pub use schema::{EngineSection, MismatchMode, PolicyConfig};

pub fn load_from_file(path: &str) -> Result<PolicyConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| OwnerGuardError::Internal(format!("read policy failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<PolicyConfig> {
    let cfg: PolicyConfig = serde_yaml::from_str(s)
        .map_err(|e| OwnerGuardError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
