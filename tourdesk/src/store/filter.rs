//! Filter predicate matching
//!
//! A filter predicate is a JSON object mapping field names to either a
//! literal value (equality) or a nested object of `$`-prefixed comparison
//! operators (`$gte`, `$gt`, `$lte`, `$lt`).
//!
//! Values coming off a query string are always strings, while stored
//! documents carry typed JSON, so comparisons coerce both sides to `f64`
//! whenever both parse as numbers. `duration[gte]=5` therefore matches a
//! numeric `duration` field the same way the schema-cast original query
//! would.

use std::cmp::Ordering;

use serde_json::Value;

use super::JsonMap;

/// Check whether a document satisfies every condition in the predicate.
///
/// An empty predicate matches everything. Unknown `$`-operators constrain
/// nothing: they passed through the rewrite stage unchanged and are ignored
/// here rather than turned into a failure the caller never asked for.
pub(crate) fn matches(doc: &JsonMap, predicate: &JsonMap) -> bool {
    predicate.iter().all(|(field, condition)| match condition {
        Value::Object(ops) if ops.keys().any(|k| k.starts_with('$')) => {
            let Some(actual) = doc.get(field) else {
                return false;
            };
            ops.iter().all(|(op, expected)| match op.as_str() {
                "$gte" => compare(actual, expected).is_some_and(|o| o != Ordering::Less),
                "$gt" => compare(actual, expected) == Some(Ordering::Greater),
                "$lte" => compare(actual, expected).is_some_and(|o| o != Ordering::Greater),
                "$lt" => compare(actual, expected) == Some(Ordering::Less),
                _ => true,
            })
        }
        expected => doc
            .get(field)
            .is_some_and(|actual| values_equal(actual, expected)),
    })
}

/// Compare two JSON values, coercing numeric strings to numbers.
///
/// Returns `None` for incomparable types (e.g. a string against an array).
pub(crate) fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (numeric(a), numeric(b)) {
        return x.partial_cmp(&y);
    }
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    if let (Some(x), Some(y)) = (numeric(a), numeric(b)) {
        return x == y;
    }
    a == b
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
