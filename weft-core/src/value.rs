//! Value Model
//!
//! Values stored by the engine are plain JSON values. Three rules govern how
//! the engine looks at them:
//!
//! - [`strict_eq`] decides whether an update is a change. Scalars compare by
//!   value (numbers numerically), arrays and objects never compare equal,
//!   and an absent key differs from `null`.
//! - [`is_truthy`] drives class toggles.
//! - [`display`] turns a value into the text substituted into a template.

use indexmap::IndexMap;

pub use serde_json::{Map, Number, Value};

/// An ordered set of key/value pairs passed to one `update` call.
///
/// Iteration order is insertion order, which is also the order in which
/// per-key handlers fire.
pub type Batch = IndexMap<String, Value>;

/// Build a [`Batch`] from `(key, value)` pairs.
pub fn batch<K, V, I>(pairs: I) -> Batch
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Convert a batch into the JSON object handed to `"update"` handlers.
pub fn batch_to_object(batch: &Batch) -> Value {
    let map: Map<String, Value> = batch
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Value::Object(map)
}

/// Strict equality between a stored value (possibly absent) and an incoming one.
pub fn strict_eq(current: Option<&Value>, incoming: &Value) -> bool {
    let Some(current) = current else {
        return false;
    };

    match (current, incoming) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_eq(a, b),
        // Structured values carry no identity across updates.
        _ => false,
    }
}

fn numbers_eq(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Truthiness used by class toggles.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Text substituted for a value inside a template.
///
/// Absent and `null` values render as the empty string.
pub fn display(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => display_number(n),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| display(Some(item)))
            .collect::<Vec<_>>()
            .join(","),
        Some(object @ Value::Object(_)) => object.to_string(),
    }
}

fn display_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}
