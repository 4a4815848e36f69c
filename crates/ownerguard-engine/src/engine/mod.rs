//! Decision engine.
//!
//! Two evaluation strategies over a role's conditions:
//! - fast path: id-addressed access, compares the path id with the principal
//!   without touching the datastore.
//! - slow path: fetches the ownership field through a resolved accessor.
//!
//! `authorize` combines them over a principal's whole role set and returns
//! the unified `Outcome`. Each call is a pure evaluation over its inputs plus
//! fetched data; nothing is kept between calls.

pub mod fast_path;
pub mod ownership;
pub mod slow_path;

use ownerguard_core::attempt::AccessAttempt;
use ownerguard_core::decision::{Decision, Fault, Outcome};
use ownerguard_core::error::OwnerGuardError;
use ownerguard_core::policy::Role;

use crate::accessor::AccessorResolver;
use crate::config::EngineSection;

pub use fast_path::evaluate_id_ownership;
pub use slow_path::evaluate_field_ownership;

/// Which strategy produced a decision (metrics/log label).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalPath {
    Unconditional,
    Fast,
    Slow,
}

impl EvalPath {
    pub fn as_str(self) -> &'static str {
        match self {
            EvalPath::Unconditional => "unconditional",
            EvalPath::Fast => "fast",
            EvalPath::Slow => "slow",
        }
    }

    pub fn for_attempt(roles: &[Role], attempt: &AccessAttempt) -> Self {
        if roles.iter().any(|role| allows_unconditionally(role, attempt)) {
            EvalPath::Unconditional
        } else if attempt.is_by_id() {
            EvalPath::Fast
        } else {
            EvalPath::Slow
        }
    }
}

/// Whether `role` holds an unconditional condition that covers `attempt`.
///
/// Id-addressed attempts are scoped like the fast path: the condition must
/// name the target model and grant the action. Other attempts only look at
/// the ownership shape, as the slow path does.
fn allows_unconditionally(role: &Role, attempt: &AccessAttempt) -> bool {
    if !attempt.is_by_id() {
        return role.has_unconditional();
    }
    role.conditions.iter().any(|c| {
        c.is_unconditional()
            && c.applies_to_model(&attempt.target_model_name)
            && c.grants(&attempt.action)
    })
}

/// Decide `attempt` for a principal holding `roles`.
///
/// 1. An unconditional condition covering the attempt allows, with zero
///    fetches. For id-addressed attempts it must match model and action.
/// 2. Id-addressed attempts run the fast path per role; first Allow wins.
/// 3. Everything else runs the slow path per role; first Allow wins and the
///    first fault aborts.
///
/// An empty role set is Deny.
pub async fn authorize(
    roles: &[Role],
    attempt: &AccessAttempt,
    resolver: &dyn AccessorResolver,
    opts: &EngineSection,
) -> Outcome {
    match EvalPath::for_attempt(roles, attempt) {
        EvalPath::Unconditional => Outcome::Allow,
        EvalPath::Fast => {
            let allowed = roles
                .iter()
                .any(|role| evaluate_id_ownership(role, attempt).is_allow());
            Decision::from_bool(allowed).into()
        }
        EvalPath::Slow => {
            for role in roles {
                match evaluate_field_ownership(role, attempt, resolver, opts).await {
                    Ok(Decision::Allow) => return Outcome::Allow,
                    Ok(Decision::Deny) => {}
                    Err(e) => return Outcome::Fault(to_fault(e, attempt)),
                }
            }
            Outcome::Deny
        }
    }
}

fn to_fault(err: OwnerGuardError, attempt: &AccessAttempt) -> Fault {
    Fault::from_error(&err).unwrap_or_else(|| {
        // Fetch failures are folded inside the slow path; anything else
        // reaching here is reported as a denial.
        tracing::warn!(error = %err, "unexpected engine error");
        Fault::AccessDenied {
            model: attempt.target_model_name.clone(),
        }
    })
}
