//! Helpers shared by the local-file and SPARQL-endpoint RDF sources: URI local-name
//! extraction and multi-valued-predicate accumulation, both ported from the flattening
//! logic in `graflo/data_source/rdf.py`.

use graflo_core::{Record, Value};

/// Extracts the fragment after `#`, or the last path segment after `/`.
pub fn local_name(uri: &str) -> String {
    if let Some(idx) = uri.rfind('#') {
        return uri[idx + 1..].to_string();
    }
    match uri.rfind('/') {
        Some(idx) => uri[idx + 1..].to_string(),
        None => uri.to_string(),
    }
}

/// Inserts `value` at `key`, upgrading to a `Value::List` on a second occurrence —
/// mirrors the Python dict-of-lists accumulation in `_triples_to_docs`/`_sparql_results_to_docs`.
pub fn insert_multi(record: &mut Record, key: &str, value: Value) {
    match record.get_mut(key) {
        Some(Value::List(items)) => items.push(value),
        Some(existing) => {
            let previous = existing.clone();
            *existing = Value::List(vec![previous, value]);
        }
        None => {
            record.insert(key.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_name_prefers_fragment() {
        assert_eq!(local_name("http://example.org/ns#name"), "name");
        assert_eq!(local_name("http://example.org/people/alice"), "alice");
    }

    #[test]
    fn insert_multi_upgrades_to_list_on_second_value() {
        let mut record = Record::new();
        insert_multi(&mut record, "tag", Value::String("a".into()));
        insert_multi(&mut record, "tag", Value::String("b".into()));
        assert_eq!(
            record.get("tag"),
            Some(&Value::List(vec![Value::String("a".into()), Value::String("b".into())]))
        );
    }
}
