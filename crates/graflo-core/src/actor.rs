//! Pipeline actors (C8): the fixed set of transform kinds a resource's pipeline is built
//! from, and `Resource`, the named pipeline that folds one record into a bucket map.

use crate::bucket::{BucketMap, EdgeBucketKey};
use crate::value::{Record, Value};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;

/// Emits the current record (after an optional field rename) into the `vertex_name` bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexActor {
    pub vertex_name: String,
    #[serde(default)]
    pub map: Option<HashMap<String, String>>,
}

impl VertexActor {
    pub fn run(&self, record: &Record, out: &mut BucketMap) {
        let emitted = match &self.map {
            Some(map) => apply_field_map(record, map),
            None => record.clone(),
        };
        out.push_vertex(self.vertex_name.clone(), emitted);
    }
}

/// Emits the current record into the edge bucket keyed by `(from, to, relation?)`. When
/// `relation_field` is set, the record's value at that key names the relation per-row,
/// overriding the actor's static `relation` (if any).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeActor {
    pub from: String,
    pub to: String,
    pub match_source: String,
    pub match_target: String,
    #[serde(default)]
    pub relation: Option<String>,
    #[serde(default)]
    pub relation_field: Option<String>,
}

impl EdgeActor {
    pub fn run(&self, record: &Record, out: &mut BucketMap) {
        let relation = match &self.relation_field {
            Some(field) => record.get(field).and_then(Value::as_str).map(|s| s.to_string()),
            None => self.relation.clone(),
        };
        let key = EdgeBucketKey::new(self.from.clone(), self.to.clone(), relation);
        out.push_edge(key, record.clone());
    }
}

/// Renames keys in the current record. When `target_vertex` is set, the renamed submap is
/// routed to that vertex's bucket instead of staying attached to the edge row — this lets
/// one edge-table row contribute vertex-shaped data for both of its endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMapActor {
    #[serde(default)]
    pub target_vertex: Option<String>,
    pub map: HashMap<String, String>,
}

impl FieldMapActor {
    pub fn run(&self, record: &Record, out: &mut BucketMap) {
        let renamed = apply_field_map(record, &self.map);
        match &self.target_vertex {
            Some(vertex_name) => out.push_vertex(vertex_name.clone(), renamed),
            None => {
                // No target vertex: the renamed submap has nowhere to land on its own: it
                // is meant to be combined by a caller operating on the whole pipeline, so
                // this no-op variant only exists for field-map subexpressions nested under
                // a router; see `VertexRouter::run`.
                let _ = renamed;
            }
        }
    }
}

/// Reads `record[type_field]` to get the vertex-type name for the current record, extracts
/// a sub-record (prefix strip or explicit field map), and lazily invokes a per-type child
/// `VertexActor`. The child cache is keyed by vertex-type name and populated on first use;
/// this is the only statefulness an actor carries, and it never persists across resources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexRouterActor {
    pub type_field: String,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub field_map: Option<HashMap<String, String>>,
    #[serde(skip)]
    child_cache: RefCell<HashMap<String, VertexActor>>,
}

impl VertexRouterActor {
    pub fn new(
        type_field: impl Into<String>,
        prefix: Option<String>,
        field_map: Option<HashMap<String, String>>,
    ) -> Self {
        Self {
            type_field: type_field.into(),
            prefix,
            field_map,
            child_cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn run(&self, record: &Record, out: &mut BucketMap) {
        let Some(vertex_name) = record.get(&self.type_field).and_then(Value::as_str) else {
            return;
        };
        let vertex_name = vertex_name.to_string();

        let sub_record = match (&self.prefix, &self.field_map) {
            (_, Some(map)) => apply_field_map(record, map),
            (Some(prefix), None) => strip_prefix(record, prefix),
            (None, None) => record.clone(),
        };

        if !self.child_cache.borrow().contains_key(&vertex_name) {
            self.child_cache.borrow_mut().insert(
                vertex_name.clone(),
                VertexActor {
                    vertex_name: vertex_name.clone(),
                    map: None,
                },
            );
        }
        let cache = self.child_cache.borrow();
        let child = cache.get(&vertex_name).expect("just inserted");
        child.run(&sub_record, out);
    }
}

fn apply_field_map(record: &Record, map: &HashMap<String, String>) -> Record {
    let mut out = Record::new();
    for (key, value) in record {
        let renamed = map.get(key).cloned().unwrap_or_else(|| key.clone());
        out.insert(renamed, value.clone());
    }
    out
}

fn strip_prefix(record: &Record, prefix: &str) -> Record {
    let mut out = Record::new();
    for (key, value) in record {
        if let Some(stripped) = key.strip_prefix(prefix) {
            out.insert(stripped.to_string(), value.clone());
        }
    }
    out
}

/// One stage of a resource's pipeline. A closed, fixed set of transform kinds (see Design
/// Notes: discriminated unions over inheritance), plus `Sequence` so a resource's pipeline
/// can be a small ordered tree rather than a single flat actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Actor {
    Vertex(VertexActor),
    Edge(EdgeActor),
    FieldMap(FieldMapActor),
    VertexRouter(VertexRouterActor),
    Sequence(Vec<Actor>),
}

impl Actor {
    pub fn run(&self, record: &Record, out: &mut BucketMap) {
        match self {
            Actor::Vertex(a) => a.run(record, out),
            Actor::Edge(a) => a.run(record, out),
            Actor::FieldMap(a) => a.run(record, out),
            Actor::VertexRouter(a) => a.run(record, out),
            Actor::Sequence(actors) => {
                for actor in actors {
                    actor.run(record, out);
                }
            }
        }
    }

    /// Every vertex/edge type name this actor (and its children) references, used by
    /// `Schema` construction to validate that every pipeline reference resolves.
    pub fn referenced_vertex_types(&self, out: &mut Vec<String>) {
        match self {
            Actor::Vertex(a) => out.push(a.vertex_name.clone()),
            Actor::Edge(a) => {
                out.push(a.from.clone());
                out.push(a.to.clone());
            }
            Actor::FieldMap(a) => {
                if let Some(v) = &a.target_vertex {
                    out.push(v.clone());
                }
            }
            Actor::VertexRouter(_) => {
                // Vertex names for a router are data-dependent (read from the record at
                // runtime), so there is nothing to validate statically here.
            }
            Actor::Sequence(actors) => {
                for actor in actors {
                    actor.referenced_vertex_types(out);
                }
            }
        }
    }
}

/// A named pipeline producing vertex/edge records for a graph sink. Each resource is bound
/// to exactly one resource pattern (see `graflo-patterns`), looked up by `name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub pipeline: Actor,
}

impl Resource {
    pub fn new(name: impl Into<String>, pipeline: Actor) -> Self {
        Self {
            name: name.into(),
            pipeline,
        }
    }

    /// Run the actor pipeline against one record, returning the bucket map it produced.
    pub fn evaluate(&self, record: &Record) -> BucketMap {
        let mut out = BucketMap::new();
        self.pipeline.run(record, &mut out);
        out
    }

    /// All EdgeActors appearing anywhere in this resource's pipeline, used by the
    /// auto-join planner (C6).
    pub fn edge_actors(&self) -> Vec<&EdgeActor> {
        fn walk<'a>(actor: &'a Actor, out: &mut Vec<&'a EdgeActor>) {
            match actor {
                Actor::Edge(a) => out.push(a),
                Actor::Sequence(actors) => {
                    for a in actors {
                        walk(a, out);
                    }
                }
                _ => {}
            }
        }
        let mut out = Vec::new();
        walk(&self.pipeline, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::record_from_pairs;

    #[test]
    fn vertex_router_prefix_strip() {
        let record = record_from_pairs([
            ("parent", Value::from("1")),
            ("child", Value::from("2")),
            ("type_display", Value::from("runs_on")),
            ("s__id", Value::from("1")),
            ("s__class_name", Value::from("server")),
            ("s__description", Value::from("Web Server")),
            ("t__id", Value::from("2")),
            ("t__class_name", Value::from("database")),
            ("t__description", Value::from("PostgreSQL")),
        ]);

        let router = VertexRouterActor::new("type_display", Some("s__".to_string()), None);
        let mut out = BucketMap::new();
        router.run(&record, &mut out);

        // type_display = "runs_on" is not a vertex name the actor knows about up front —
        // the router creates a child wrapper for whatever name it reads, so the bucket is
        // keyed "runs_on" here, carrying the s__-stripped sub-record.
        let bucket = out.vertices.get("runs_on").expect("bucket created");
        assert_eq!(bucket.len(), 1);
        let sub = &bucket[0];
        assert_eq!(sub.get("id"), Some(&Value::from("1")));
        assert_eq!(sub.get("class_name"), Some(&Value::from("server")));
        assert_eq!(sub.get("description"), Some(&Value::from("Web Server")));
        assert!(!sub.contains_key("t__id"));
    }

    #[test]
    fn edge_actor_with_relation_field() {
        let record = record_from_pairs([
            ("parent", Value::from("1")),
            ("child", Value::from("2")),
            ("rel_name", Value::from("follows")),
        ]);
        let actor = EdgeActor {
            from: "user".into(),
            to: "user".into(),
            match_source: "parent".into(),
            match_target: "child".into(),
            relation: None,
            relation_field: Some("rel_name".into()),
        };
        let mut out = BucketMap::new();
        actor.run(&record, &mut out);
        let key = EdgeBucketKey::new("user", "user", Some("follows".into()));
        assert_eq!(out.edges.get(&key).unwrap().len(), 1);
    }
}
