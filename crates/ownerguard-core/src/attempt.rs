//! Access attempt descriptor.
//!
//! Built by request handling code once the principal is verified, consumed by
//! a single decision and then dropped.

use serde_json::Value;

/// How the call addresses its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MethodKind {
    /// `findById`-style call: `positional_args[0]` is the entity's own id.
    ById,
    /// Anything else (collections, relation endpoints, ...).
    #[default]
    Other,
}

/// Everything the engine knows about one authorization request.
#[derive(Debug, Clone, Default)]
pub struct AccessAttempt {
    pub target_model_name: String,
    /// Verb / permission name, e.g. `read`.
    pub action: String,
    pub method_kind: MethodKind,
    pub positional_args: Vec<Value>,
    /// `None` for unauthenticated requests.
    pub current_principal_id: Option<i64>,
    /// Owning entity of a relation endpoint (e.g. `User` for `/users/{id}/user-logs`).
    pub owner_model_name: Option<String>,
}

impl AccessAttempt {
    pub fn new(target_model_name: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            target_model_name: target_model_name.into(),
            action: action.into(),
            ..Self::default()
        }
    }

    /// Mark as id-addressed; `id` becomes the first positional argument.
    pub fn by_id(mut self, id: impl Into<Value>) -> Self {
        self.method_kind = MethodKind::ById;
        self.positional_args.insert(0, id.into());
        self
    }

    pub fn arg(mut self, arg: impl Into<Value>) -> Self {
        self.positional_args.push(arg.into());
        self
    }

    pub fn principal(mut self, id: i64) -> Self {
        self.current_principal_id = Some(id);
        self
    }

    pub fn owner(mut self, model_name: impl Into<String>) -> Self {
        self.owner_model_name = Some(model_name.into());
        self
    }

    pub fn is_by_id(&self) -> bool {
        self.method_kind == MethodKind::ById
    }

    /// Id carried in `positional_args[0]`, if it parses.
    pub fn entity_id(&self) -> Option<i64> {
        self.positional_args.first().and_then(parse_entity_id)
    }
}

/// Integer-prefix parsing of a positional id.
///
/// Integral numbers are taken as-is (fractions truncate). Strings skip leading
/// whitespace, accept one sign, then read the leading run of digits. Anything
/// else has no id.
pub fn parse_entity_id(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => parse_int_prefix(s),
        other => {
            tracing::trace!(arg = %other, "positional argument is not an id");
            None
        }
    }
}

fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (neg, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    let n: i64 = rest[..end].parse().ok()?;
    Some(if neg { -n } else { n })
}
