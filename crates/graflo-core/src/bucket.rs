//! Bucket map: the result of one record traversing a resource's actor pipeline.

use crate::value::Record;
use std::collections::HashMap;

/// Identifies an edge write bucket: the (source-vertex, target-vertex, relation) triple,
/// with relation optional (a resource may carry rows of several relations under one
/// edge type when `relation_field` is set on its `EdgeActor`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeBucketKey {
    pub source: String,
    pub target: String,
    pub relation: Option<String>,
}

impl EdgeBucketKey {
    pub fn new(source: impl Into<String>, target: impl Into<String>, relation: Option<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relation,
        }
    }
}

/// Mapping from vertex-type name or edge-type key to the records a pipeline emitted for
/// one input record.
#[derive(Debug, Clone, Default)]
pub struct BucketMap {
    pub vertices: HashMap<String, Vec<Record>>,
    pub edges: HashMap<EdgeBucketKey, Vec<Record>>,
}

impl BucketMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_vertex(&mut self, vertex_type: impl Into<String>, record: Record) {
        self.vertices.entry(vertex_type.into()).or_default().push(record);
    }

    pub fn push_edge(&mut self, key: EdgeBucketKey, record: Record) {
        self.edges.entry(key).or_default().push(record);
    }

    /// Merge another bucket map's contributions into this one, preserving insertion order
    /// within each bucket.
    pub fn merge(&mut self, other: BucketMap) {
        for (ty, mut records) in other.vertices {
            self.vertices.entry(ty).or_default().append(&mut records);
        }
        for (key, mut records) in other.edges {
            self.edges.entry(key).or_default().append(&mut records);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.values().all(|v| v.is_empty()) && self.edges.values().all(|v| v.is_empty())
    }
}
