//! SPARQL endpoint data source (C7), grounded on `SparqlEndpointDataSource`/`SparqlSourceConfig`
//! in `graflo/data_source/rdf.py`. Paginates a remote endpoint's `SELECT ?s ?p ?o` results via
//! `LIMIT`/`OFFSET` embedded in the query text, then flattens bindings by subject.

use crate::rdf_common::{insert_multi, local_name};
use async_trait::async_trait;
use graflo_core::{DataSource, Record, Value};
use std::collections::HashMap;

/// Mirrors `SparqlSourceConfig`: either a custom query (LIMIT/OFFSET appended) or a
/// generated `rdf_class`/`graph_uri` filter.
#[derive(Debug, Clone)]
pub struct SparqlSourceConfig {
    pub endpoint_url: String,
    pub rdf_class: Option<String>,
    pub graph_uri: Option<String>,
    pub sparql_query: Option<String>,
    pub page_size: usize,
}

impl SparqlSourceConfig {
    fn build_query(&self, offset: usize) -> String {
        let base = match &self.sparql_query {
            Some(q) => q.trim().trim_end_matches(';').to_string(),
            None => {
                let graph_open = self
                    .graph_uri
                    .as_ref()
                    .map(|g| format!("GRAPH <{g}> {{"))
                    .unwrap_or_default();
                let graph_close = if self.graph_uri.is_some() { "}" } else { "" };
                let class_filter = self
                    .rdf_class
                    .as_ref()
                    .map(|c| format!("?s a <{c}> . "))
                    .unwrap_or_default();
                format!("SELECT ?s ?p ?o WHERE {{ {graph_open} {class_filter}?s ?p ?o . {graph_close} }}")
            }
        };
        format!("{base} LIMIT {} OFFSET {offset}", self.page_size)
    }
}

enum State {
    Pending,
    Ready { docs: Vec<Record>, cursor: usize },
}

pub struct SparqlEndpointDataSource {
    name: String,
    client: reqwest::Client,
    config: SparqlSourceConfig,
    state: State,
}

impl SparqlEndpointDataSource {
    pub fn new(name: impl Into<String>, config: SparqlSourceConfig) -> Self {
        Self {
            name: name.into(),
            client: reqwest::Client::new(),
            config,
            state: State::Pending,
        }
    }

    async fn fetch_all(&self) -> anyhow::Result<Vec<Record>> {
        let mut offset = 0usize;
        let mut subjects: HashMap<String, Record> = HashMap::new();
        let mut subject_order: Vec<String> = Vec::new();

        loop {
            let query = self.config.build_query(offset);
            let response: serde_json::Value = self
                .client
                .get(&self.config.endpoint_url)
                .query(&[("query", query.as_str())])
                .header("Accept", "application/sparql-results+json")
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            let bindings = response
                .get("results")
                .and_then(|r| r.get("bindings"))
                .and_then(|b| b.as_array())
                .cloned()
                .unwrap_or_default();

            if bindings.is_empty() {
                break;
            }
            let fetched = bindings.len();
            for binding in &bindings {
                accumulate_binding(binding, &mut subjects, &mut subject_order);
            }
            if fetched < self.config.page_size {
                break;
            }
            offset += self.config.page_size;
        }

        Ok(subject_order.into_iter().filter_map(|uri| subjects.remove(&uri)).collect())
    }
}

fn accumulate_binding(binding: &serde_json::Value, subjects: &mut HashMap<String, Record>, order: &mut Vec<String>) {
    let Some(s_val) = binding.get("s").and_then(|v| v.get("value")).and_then(|v| v.as_str()) else {
        return;
    };
    let Some(p_val) = binding.get("p").and_then(|v| v.get("value")).and_then(|v| v.as_str()) else {
        return;
    };
    let Some(o_binding) = binding.get("o") else {
        return;
    };

    let p_name = local_name(p_val);
    if p_name == "type" {
        return;
    }

    if !subjects.contains_key(s_val) {
        let mut record = Record::new();
        record.insert("_uri".to_string(), Value::String(s_val.to_string()));
        record.insert("_key".to_string(), Value::String(local_name(s_val)));
        subjects.insert(s_val.to_string(), record);
        order.push(s_val.to_string());
    }

    let value = binding_value_to_value(o_binding);
    let record = subjects.get_mut(s_val).expect("just inserted");
    insert_multi(record, &p_name, value);
}

fn binding_value_to_value(o_binding: &serde_json::Value) -> Value {
    let raw = o_binding.get("value").and_then(|v| v.as_str()).unwrap_or_default();
    let is_literal = o_binding.get("type").and_then(|v| v.as_str()) == Some("literal");
    if !is_literal {
        return Value::String(raw.to_string());
    }
    let datatype = o_binding.get("datatype").and_then(|v| v.as_str()).unwrap_or_default();
    if datatype.contains("integer") {
        raw.parse::<i64>().map(Value::Int).unwrap_or_else(|_| Value::String(raw.to_string()))
    } else if datatype.contains("float") || datatype.contains("double") || datatype.contains("decimal") {
        raw.parse::<f64>().map(Value::Float).unwrap_or_else(|_| Value::String(raw.to_string()))
    } else if datatype.contains("boolean") {
        Value::Bool(raw == "true" || raw == "1")
    } else {
        Value::String(raw.to_string())
    }
}

#[async_trait]
impl DataSource for SparqlEndpointDataSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_batch(&mut self, batch_size: usize) -> anyhow::Result<Option<Vec<Record>>> {
        if matches!(self.state, State::Pending) {
            let docs = self.fetch_all().await?;
            self.state = State::Ready { docs, cursor: 0 };
        }
        let State::Ready { docs, cursor } = &mut self.state else {
            unreachable!()
        };
        if *cursor >= docs.len() {
            return Ok(None);
        }
        let end = (*cursor + batch_size).min(docs.len());
        let batch = docs[*cursor..end].to_vec();
        *cursor = end;
        Ok(Some(batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_query_appends_limit_offset_to_generated_query() {
        let config = SparqlSourceConfig {
            endpoint_url: "http://localhost:3030/ds/sparql".to_string(),
            rdf_class: Some("http://example.org/Person".to_string()),
            graph_uri: None,
            sparql_query: None,
            page_size: 500,
        };
        let query = config.build_query(0);
        assert!(query.contains("?s a <http://example.org/Person> ."));
        assert!(query.ends_with("LIMIT 500 OFFSET 0"));
    }

    #[test]
    fn build_query_appends_limit_offset_to_custom_query() {
        let config = SparqlSourceConfig {
            endpoint_url: "http://localhost:3030/ds/sparql".to_string(),
            rdf_class: None,
            graph_uri: None,
            sparql_query: Some("SELECT ?s ?p ?o WHERE { ?s ?p ?o . } ;".to_string()),
            page_size: 100,
        };
        let query = config.build_query(200);
        assert_eq!(query, "SELECT ?s ?p ?o WHERE { ?s ?p ?o . } LIMIT 100 OFFSET 200");
    }
}
