//! The record data model (spec data model §3): an unordered mapping from field name to
//! scalar or list-of-scalar, where null is a value distinct from absence.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A scalar or list-of-scalar value carried by a record field, or used inside a filter
/// expression's `value` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Best-effort ordering for the scalar comparison operators (GT/LT/GE/LE). Returns
    /// `None` for values that cannot be ordered against each other (e.g. string vs. int).
    pub fn partial_cmp_value(&self, other: &Value) -> Option<std::cmp::Ordering> {
        use Value::*;
        match (self, other) {
            (Int(a), Int(b)) => a.partial_cmp(b),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Int(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), Int(b)) => a.partial_cmp(&(*b as f64)),
            (String(a), String(b)) => a.partial_cmp(b),
            (Bool(a), Bool(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// An unordered mapping from field name to value. Key absence and `Value::Null` are
/// distinct: a record that never mentions a field differs from one that sets it to null.
pub type Record = HashMap<String, Value>;

/// Convenience constructor mirroring the common `record! {"a" => 1, "b" => "x"}` shape used
/// throughout the pipeline tests.
pub fn record_from_pairs<I, K, V>(pairs: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_distinct_from_absence() {
        let mut r: Record = Record::new();
        r.insert("a".to_string(), Value::Null);
        assert!(r.contains_key("a"));
        assert!(r.get("a").unwrap().is_null());
        assert!(!r.contains_key("b"));
    }

    #[test]
    fn ordering_across_numeric_kinds() {
        assert_eq!(
            Value::Int(1).partial_cmp_value(&Value::Float(1.5)),
            Some(std::cmp::Ordering::Less)
        );
        assert_eq!(Value::String("a".into()).partial_cmp_value(&Value::Int(1)), None);
    }
}
