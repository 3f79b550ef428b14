//! Shared `serde_json::Value` -> `Record`/`Value` conversion used by every source that reads
//! JSON (file, API, SPARQL results).

use graflo_core::{Record, Value};

pub fn object_to_record(v: &serde_json::Value) -> Record {
    let mut record = Record::new();
    if let serde_json::Value::Object(map) = v {
        for (key, val) in map {
            record.insert(key.clone(), json_to_value(val));
        }
    }
    record
}

pub fn json_to_value(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::List(items.iter().map(json_to_value).collect()),
        // Nested objects have no place in the flat record model; callers that need them
        // should project/flatten beforehand.
        serde_json::Value::Object(_) => Value::Null,
    }
}

/// Walks a dotted path (`"data.items"`) into a JSON value, returning the array found there.
pub fn array_at_path<'a>(root: &'a serde_json::Value, path: Option<&str>) -> Option<&'a Vec<serde_json::Value>> {
    let Some(path) = path else {
        return root.as_array();
    };
    let mut current = root;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    current.as_array()
}
