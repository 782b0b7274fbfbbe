//! Field values and row access
//!
//! Rows handed back by a query engine are read through the [`Node`] trait,
//! which looks fields up by name. Everything read that way is a [`Value`],
//! the same type used for predicate parameters and cursor sort values.

use crate::types::{JsonObject, JsonValue, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::cmp::Ordering;
use std::fmt;

/// A dynamically typed column value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL or a missing JSON value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer or floating point number
    Number(Number),
    /// Text
    String(String),
    /// UTC instant
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Check if this is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the text of a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Compare two values the way a SQL engine would after implicit casts
    ///
    /// Returns `None` when either side is NULL or the types cannot be
    /// reconciled. Strings are coerced when compared against numbers
    /// or timestamps, since cursor ids always travel as text.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => None,
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::String(s), Value::Number(n)) => {
                compare_numbers(&s.parse::<Number>().ok()?, n)
            }
            (Value::Number(n), Value::String(s)) => {
                compare_numbers(n, &s.parse::<Number>().ok()?)
            }
            (Value::String(s), Value::Timestamp(t)) => Some(parse_timestamp(s)?.cmp(t)),
            (Value::Timestamp(t), Value::String(s)) => Some(t.cmp(&parse_timestamp(s)?)),
            _ => None,
        }
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return Some(a.cmp(&b));
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return Some(a.cmp(&b));
    }
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Canonical text form, used for cursor ids and id/sort-value comparison
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Timestamp(t) => {
                f.write_str(&t.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value.into())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Number(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<&JsonValue> for Value {
    fn from(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => Value::Number(n.clone()),
            JsonValue::String(s) => Value::String(s.clone()),
            // Nested structures are not sortable; keep their JSON text
            other => Value::String(other.to_string()),
        }
    }
}

// ============================================================================
// Node
// ============================================================================

/// Field lookup by name on a fetched row
///
/// This is the only capability the pagination core needs from an entity:
/// reading the id field and the sort field to build edge cursors, and
/// evaluating predicates in the in-memory engine.
pub trait Node {
    /// Value of the named field, or `None` if the row has no such field
    fn field(&self, name: &str) -> Option<Value>;
}

impl Node for Record {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl Node for JsonObject {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).map(Value::from)
    }
}

impl Node for JsonValue {
    fn field(&self, name: &str) -> Option<Value> {
        match self {
            JsonValue::Object(map) => map.field(name),
            _ => None,
        }
    }
}

impl<T: Node + ?Sized> Node for &T {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }
}
