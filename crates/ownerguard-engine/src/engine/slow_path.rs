//! Field-ownership slow path: fetch the ownership field, then compare.
//!
//! Conditions are OR-ed in declared order and the OR short-circuits: after
//! the first allowing condition nothing else is fetched or compared. With
//! `concurrent_fetches` the fetches of the conditions that sequential
//! evaluation could reach are issued together, but results are still folded
//! in declared order, so the outcome (including a raised mismatch) is the
//! same.

use std::sync::Arc;

use futures_util::future::join_all;
use serde_json::Value;

use ownerguard_core::attempt::AccessAttempt;
use ownerguard_core::decision::Decision;
use ownerguard_core::error::{OwnerGuardError, Result};
use ownerguard_core::policy::{Condition, Role, WILDCARD};

use crate::accessor::{AccessorResolver, EntityAccessor};
use crate::config::{EngineSection, MismatchMode};

use super::ownership::{value_is_id, value_is_literal};

enum Fetched {
    Value(Value),
    Missing,
}

/// Evaluate `role` against the record addressed by `positional_args[0]`.
///
/// No model/permission pre-filter applies here; only `ownershipField` and
/// `value` are consulted. The accessor is resolved right before the first
/// fetch, so a role that allows unconditionally first never resolves one.
pub async fn evaluate_field_ownership(
    role: &Role,
    attempt: &AccessAttempt,
    resolver: &dyn AccessorResolver,
    opts: &EngineSection,
) -> Result<Decision> {
    let decision = if opts.concurrent_fetches {
        evaluate_concurrent(role, attempt, resolver, opts).await?
    } else {
        evaluate_sequential(role, attempt, resolver, opts).await?
    };

    tracing::debug!(
        role = %role.name,
        model = %attempt.target_model_name,
        allowed = decision.is_allow(),
        "slow path"
    );
    Ok(decision)
}

async fn evaluate_sequential(
    role: &Role,
    attempt: &AccessAttempt,
    resolver: &dyn AccessorResolver,
    opts: &EngineSection,
) -> Result<Decision> {
    let entity_id = attempt.entity_id();
    let mut accessor: Option<Arc<dyn EntityAccessor>> = None;

    for cond in &role.conditions {
        if cond.is_unconditional() {
            return Ok(Decision::Allow);
        }

        let acc = match &accessor {
            Some(acc) => Arc::clone(acc),
            None => {
                let acc = resolver.resolve(attempt)?;
                accessor = Some(Arc::clone(&acc));
                acc
            }
        };

        let fetched = fetch(acc.as_ref(), entity_id, &cond.ownership_field).await;
        if fold(cond, fetched, attempt, opts)?.is_allow() {
            return Ok(Decision::Allow);
        }
    }

    Ok(Decision::Deny)
}

async fn evaluate_concurrent(
    role: &Role,
    attempt: &AccessAttempt,
    resolver: &dyn AccessorResolver,
    opts: &EngineSection,
) -> Result<Decision> {
    // Nothing after the first unconditional condition can be reached.
    let reachable = match role.conditions.iter().position(Condition::is_unconditional) {
        Some(i) => &role.conditions[..=i],
        None => &role.conditions[..],
    };

    if reachable.first().is_some_and(Condition::is_unconditional) {
        return Ok(Decision::Allow);
    }
    if reachable.is_empty() {
        return Ok(Decision::Deny);
    }

    let acc = resolver.resolve(attempt)?;
    let entity_id = attempt.entity_id();

    let fetches = reachable.iter().map(|cond| {
        let acc = Arc::clone(&acc);
        async move {
            if cond.is_unconditional() {
                Fetched::Missing
            } else {
                fetch(acc.as_ref(), entity_id, &cond.ownership_field).await
            }
        }
    });
    let results = join_all(fetches).await;

    for (cond, fetched) in reachable.iter().zip(results) {
        if cond.is_unconditional() {
            return Ok(Decision::Allow);
        }
        if fold(cond, fetched, attempt, opts)?.is_allow() {
            return Ok(Decision::Allow);
        }
    }

    Ok(Decision::Deny)
}

/// Any fetch failure becomes `Missing`; no retries.
async fn fetch(acc: &dyn EntityAccessor, entity_id: Option<i64>, field: &str) -> Fetched {
    let Some(id) = entity_id else {
        tracing::debug!(model = %acc.model_name(), "no entity id to fetch");
        return Fetched::Missing;
    };

    match acc.fetch_field(id, field).await {
        Ok(v) => Fetched::Value(v),
        Err(e @ OwnerGuardError::RecordNotFound { .. }) => {
            tracing::debug!(error = %e, field, "ownership record missing");
            Fetched::Missing
        }
        Err(e) if e.is_fetch_failure() => {
            tracing::warn!(model = %acc.model_name(), id, field, error = %e, "ownership fetch failed");
            Fetched::Missing
        }
        Err(e) => {
            tracing::warn!(model = %acc.model_name(), id, field, error = %e, "accessor returned a non-fetch error");
            Fetched::Missing
        }
    }
}

/// One condition's contribution to the OR.
fn fold(
    cond: &Condition,
    fetched: Fetched,
    attempt: &AccessAttempt,
    opts: &EngineSection,
) -> Result<Decision> {
    let Fetched::Value(v) = fetched else {
        return Ok(Decision::Deny);
    };

    if cond.targets_current_user() {
        let owned = attempt
            .current_principal_id
            .is_some_and(|principal| value_is_id(&v, principal));
        if owned {
            return Ok(Decision::Allow);
        }
        return match opts.on_mismatch {
            MismatchMode::Raise => Err(OwnerGuardError::AccessDenied {
                model: attempt.target_model_name.clone(),
            }),
            MismatchMode::Deny => Ok(Decision::Deny),
        };
    }

    if cond.value == WILDCARD {
        return Ok(Decision::Allow);
    }

    Ok(Decision::from_bool(value_is_literal(&v, &cond.value)))
}
