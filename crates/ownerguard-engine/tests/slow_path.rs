//! Field-ownership evaluation against in-memory accessors.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Barrier;
use tokio::time::timeout;

use ownerguard_core::attempt::AccessAttempt;
use ownerguard_core::decision::Decision;
use ownerguard_core::error::{OwnerGuardError, Result};
use ownerguard_core::policy::{Condition, Role, CURRENT_USER_ID, WILDCARD};
use ownerguard_engine::accessor::{AccessorRegistry, AccessorResolver, EntityAccessor, MemoryAccessor};
use ownerguard_engine::config::{EngineSection, MismatchMode};
use ownerguard_engine::engine::evaluate_field_ownership;

/// Resolver wrapper counting `resolve` calls.
struct CountingResolver {
    inner: AccessorRegistry,
    calls: AtomicUsize,
}

impl CountingResolver {
    fn new(accessors: Vec<Arc<dyn EntityAccessor>>) -> Self {
        let inner = accessors
            .into_iter()
            .fold(AccessorRegistry::builder(), |b, a| b.accessor(a))
            .build();
        Self { inner, calls: AtomicUsize::new(0) }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AccessorResolver for CountingResolver {
    fn resolve(&self, attempt: &AccessAttempt) -> Result<Arc<dyn EntityAccessor>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve(attempt)
    }
}

/// Accessor whose backend is always down.
struct BrokenAccessor;

#[async_trait]
impl EntityAccessor for BrokenAccessor {
    fn model_name(&self) -> &str {
        "UserLog"
    }

    async fn fetch_field(&self, _id: i64, _field: &str) -> Result<Value> {
        Err(OwnerGuardError::Datastore("connection refused".into()))
    }
}

/// Accessor whose fetches only return once `barrier` has seen every party.
struct RendezvousAccessor {
    barrier: Barrier,
}

#[async_trait]
impl EntityAccessor for RendezvousAccessor {
    fn model_name(&self) -> &str {
        "UserLog"
    }

    async fn fetch_field(&self, _id: i64, field: &str) -> Result<Value> {
        self.barrier.wait().await;
        Ok(json!(format!("{field}-value")))
    }
}

fn sequential() -> EngineSection {
    EngineSection::default()
}

fn concurrent() -> EngineSection {
    EngineSection {
        concurrent_fetches: true,
        ..EngineSection::default()
    }
}

fn owner_role() -> Role {
    Role::new("owner", vec![Condition::new("User", "userId", CURRENT_USER_ID, &["*"])])
}

fn logs() -> Arc<MemoryAccessor> {
    Arc::new(
        MemoryAccessor::new("UserLog")
            .with_record(1, json!({"userId": 7, "tenant": "acme"}))
            .with_record(2, json!({"userId": 8, "tenant": "other"})),
    )
}

#[tokio::test]
async fn matching_owner_allows() {
    let acc = logs();
    let resolver = CountingResolver::new(vec![acc.clone()]);
    let attempt = AccessAttempt::new("UserLog", "read").arg(1).principal(7);

    for opts in [sequential(), concurrent()] {
        let d = evaluate_field_ownership(&owner_role(), &attempt, &resolver, &opts).await.unwrap();
        assert_eq!(d, Decision::Allow);
    }
}

#[tokio::test]
async fn mismatched_owner_raises() {
    let resolver = CountingResolver::new(vec![logs()]);
    let attempt = AccessAttempt::new("UserLog", "read").arg(2).principal(7);

    for opts in [sequential(), concurrent()] {
        let err = evaluate_field_ownership(&owner_role(), &attempt, &resolver, &opts)
            .await
            .expect_err("mismatch must raise");
        assert!(matches!(err, OwnerGuardError::AccessDenied { ref model } if model == "UserLog"));
    }
}

#[tokio::test]
async fn mismatch_can_be_folded_into_deny() {
    let resolver = CountingResolver::new(vec![logs()]);
    let attempt = AccessAttempt::new("UserLog", "read").arg(2).principal(7);
    let role = Role::new(
        "two",
        vec![
            Condition::new("UserLog", "userId", CURRENT_USER_ID, &["*"]),
            Condition::new("UserLog", "tenant", "other", &["*"]),
        ],
    );
    let opts = EngineSection {
        on_mismatch: MismatchMode::Deny,
        ..EngineSection::default()
    };

    let d = evaluate_field_ownership(&role, &attempt, &resolver, &opts).await.unwrap();
    assert_eq!(d, Decision::Allow);
}

#[tokio::test]
async fn anonymous_never_owns() {
    let resolver = CountingResolver::new(vec![logs()]);
    let attempt = AccessAttempt::new("UserLog", "read").arg(1);
    let res = evaluate_field_ownership(&owner_role(), &attempt, &resolver, &sequential()).await;
    assert!(matches!(res, Err(OwnerGuardError::AccessDenied { .. })));
}

#[tokio::test]
async fn missing_record_denies_and_siblings_continue() {
    let resolver = CountingResolver::new(vec![logs()]);
    let role = Role::new(
        "mixed",
        vec![
            Condition::new("UserLog", "userId", CURRENT_USER_ID, &["*"]),
            Condition::new(WILDCARD, WILDCARD, WILDCARD, &["*"]),
        ],
    );
    let gone = AccessAttempt::new("UserLog", "read").arg(99).principal(7);

    for opts in [sequential(), concurrent()] {
        let d = evaluate_field_ownership(&role, &gone, &resolver, &opts).await.unwrap();
        assert_eq!(d, Decision::Allow);
        let d = evaluate_field_ownership(&owner_role(), &gone, &resolver, &opts).await.unwrap();
        assert_eq!(d, Decision::Deny);
    }
}

#[tokio::test]
async fn backend_errors_fold_into_deny() {
    let resolver = CountingResolver::new(vec![Arc::new(BrokenAccessor)]);
    let attempt = AccessAttempt::new("UserLog", "read").arg(1).principal(7);
    for opts in [sequential(), concurrent()] {
        let d = evaluate_field_ownership(&owner_role(), &attempt, &resolver, &opts).await.unwrap();
        assert_eq!(d, Decision::Deny);
    }
}

#[tokio::test]
async fn unparseable_id_denies_without_fetch() {
    let acc = logs();
    let resolver = CountingResolver::new(vec![acc.clone()]);
    let attempt = AccessAttempt::new("UserLog", "read").arg("latest").principal(7);
    let d = evaluate_field_ownership(&owner_role(), &attempt, &resolver, &sequential()).await.unwrap();
    assert_eq!(d, Decision::Deny);
    assert_eq!(acc.fetch_count(), 0);
}

#[tokio::test]
async fn wildcard_and_literal_values() {
    let resolver = CountingResolver::new(vec![logs()]);
    let attempt = AccessAttempt::new("UserLog", "read").arg(1).principal(99);

    let any_tenant = Role::new("t", vec![Condition::new("UserLog", "tenant", WILDCARD, &["read"])]);
    let acme = Role::new("a", vec![Condition::new("UserLog", "tenant", "acme", &["read"])]);
    let other = Role::new("o", vec![Condition::new("UserLog", "tenant", "other", &["read"])]);
    let seven = Role::new("s", vec![Condition::new("UserLog", "userId", "7", &["read"])]);

    for (role, expected) in [
        (any_tenant, Decision::Allow),
        (acme, Decision::Allow),
        (other, Decision::Deny),
        (seven, Decision::Allow),
    ] {
        let d = evaluate_field_ownership(&role, &attempt, &resolver, &sequential()).await.unwrap();
        assert_eq!(d, expected, "role={}", role.name);
    }
}

#[tokio::test]
async fn unconditional_first_never_resolves() {
    let resolver = CountingResolver::new(vec![]);
    let attempt = AccessAttempt::new("Invoice", "delete").arg(42);

    for opts in [sequential(), concurrent()] {
        let d = evaluate_field_ownership(&Role::super_admin(), &attempt, &resolver, &opts)
            .await
            .unwrap();
        assert_eq!(d, Decision::Allow);
    }
    assert_eq!(resolver.calls(), 0);
}

#[tokio::test]
async fn unresolvable_model_faults() {
    let resolver = CountingResolver::new(vec![logs()]);
    let attempt = AccessAttempt::new("Invoice", "read").arg(1).principal(7);
    let err = evaluate_field_ownership(&owner_role(), &attempt, &resolver, &sequential())
        .await
        .expect_err("no accessor");
    assert!(matches!(err, OwnerGuardError::AccessorResolution { ref model } if model == "Invoice"));
}

#[tokio::test]
async fn short_circuit_stops_before_later_mismatch() {
    let acc = logs();
    let resolver = CountingResolver::new(vec![acc.clone()]);
    // record 1: userId 7, tenant acme
    let role = Role::new(
        "ordered",
        vec![
            Condition::new("UserLog", "tenant", "acme", &["*"]),
            Condition::new("UserLog", "userId", CURRENT_USER_ID, &["*"]),
        ],
    );
    let attempt = AccessAttempt::new("UserLog", "read").arg(1).principal(8);

    let d = evaluate_field_ownership(&role, &attempt, &resolver, &sequential()).await.unwrap();
    assert_eq!(d, Decision::Allow);
    assert_eq!(acc.fetch_count(), 1);

    // same outcome when both fetches are issued up front
    let d = evaluate_field_ownership(&role, &attempt, &resolver, &concurrent()).await.unwrap();
    assert_eq!(d, Decision::Allow);
}

#[tokio::test]
async fn earlier_mismatch_wins_over_later_allow() {
    let resolver = CountingResolver::new(vec![logs()]);
    let role = Role::new(
        "ordered",
        vec![
            Condition::new("UserLog", "userId", CURRENT_USER_ID, &["*"]),
            Condition::new("UserLog", "tenant", "acme", &["*"]),
        ],
    );
    let attempt = AccessAttempt::new("UserLog", "read").arg(1).principal(8);

    for opts in [sequential(), concurrent()] {
        let res = evaluate_field_ownership(&role, &attempt, &resolver, &opts).await;
        assert!(matches!(res, Err(OwnerGuardError::AccessDenied { .. })));
    }
}

#[tokio::test]
async fn deterministic() {
    let resolver = CountingResolver::new(vec![logs()]);
    let attempt = AccessAttempt::new("UserLog", "read").arg(1).principal(7);
    let first = evaluate_field_ownership(&owner_role(), &attempt, &resolver, &sequential()).await.unwrap();
    let second = evaluate_field_ownership(&owner_role(), &attempt, &resolver, &sequential()).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn concurrent_fetches_overlap() {
    let role = Role::new(
        "tenants",
        vec![
            Condition::new("UserLog", "tenant", "acme", &["*"]),
            Condition::new("UserLog", "region", "eu", &["*"]),
            Condition::new("UserLog", "plan", "pro", &["*"]),
        ],
    );
    let attempt = AccessAttempt::new("UserLog", "read").arg(1).principal(7);
    let resolver = CountingResolver::new(vec![Arc::new(RendezvousAccessor {
        barrier: Barrier::new(role.conditions.len()),
    })]);

    // Every fetch must be in flight at once for the barrier to open.
    let d = timeout(
        Duration::from_secs(5),
        evaluate_field_ownership(&role, &attempt, &resolver, &concurrent()),
    )
    .await
    .expect("fetches were not issued together")
    .unwrap();
    assert_eq!(d, Decision::Deny);
    assert_eq!(resolver.calls(), 1);

    let resolver = CountingResolver::new(vec![Arc::new(RendezvousAccessor {
        barrier: Barrier::new(role.conditions.len()),
    })]);
    let stalled = timeout(
        Duration::from_millis(50),
        evaluate_field_ownership(&role, &attempt, &resolver, &sequential()),
    )
    .await;
    assert!(stalled.is_err());
}
