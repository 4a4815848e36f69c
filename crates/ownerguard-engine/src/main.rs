//! Policy lint: load `ownerguard.yaml`, validate it strictly and report
//! conditions that can never match.

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use ownerguard_engine::config;

const POLICY_PATH: &str = "ownerguard.yaml";

fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = match config::load_from_file(POLICY_PATH) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(path = POLICY_PATH, error = %e, "policy rejected");
            return ExitCode::FAILURE;
        }
    };

    for role in &cfg.roles {
        tracing::info!(
            role = %role.name,
            user_id = ?role.user_id,
            conditions = role.conditions.len(),
            "role loaded"
        );
    }

    let warnings = config::lint(&cfg);
    for w in &warnings {
        tracing::warn!(role = %w.role, condition = w.condition, "{}", w.msg);
    }

    tracing::info!(
        roles = cfg.roles.len(),
        owners = cfg.owners.len(),
        warnings = warnings.len(),
        "policy ok"
    );
    ExitCode::SUCCESS
}
