//! Id-ownership fast path: no data fetch.

use ownerguard_core::attempt::AccessAttempt;
use ownerguard_core::decision::Decision;
use ownerguard_core::policy::Role;

/// Allow iff some condition scoped to the model and action has the shape
/// `{ownershipField: "id", value: "$currentUserId"}` and the addressed id is
/// the principal's. Default deny.
pub fn evaluate_id_ownership(role: &Role, attempt: &AccessAttempt) -> Decision {
    // Only id-addressed calls carry a comparable id.
    let target_id = if attempt.is_by_id() {
        attempt.entity_id()
    } else {
        None
    };

    let (Some(target), Some(principal)) = (target_id, attempt.current_principal_id) else {
        return Decision::Deny;
    };

    let allowed = role.conditions.iter().any(|c| {
        c.applies_to_model(&attempt.target_model_name)
            && c.grants(&attempt.action)
            && c.is_id_ownership()
            && principal == target
    });

    tracing::debug!(
        role = %role.name,
        model = %attempt.target_model_name,
        action = %attempt.action,
        allowed,
        "fast path"
    );
    Decision::from_bool(allowed)
}
