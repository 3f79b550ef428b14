//! Graph schema types (spec data model §3): vertex types, edge types, and the resource
//! registry that binds them together. `Schema` is immutable after construction —
//! construction is where every cross-reference invariant is checked once, so nothing
//! downstream needs to re-validate them.

use crate::actor::Resource;
use crate::error::GrafloError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One field of a vertex type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(default)]
    pub field_type: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: None,
        }
    }
}

/// An ordered field list forming a key (primary or secondary index).
pub type Index = Vec<String>;

/// A named entity with an ordered field list, a primary index, and optional secondary
/// indices. Invariant: the primary index references only fields declared on this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexType {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
    pub primary_index: Index,
    #[serde(default)]
    pub secondary_indices: Vec<Index>,
}

impl VertexType {
    pub fn new(
        name: impl Into<String>,
        fields: Vec<FieldDescriptor>,
        primary_index: Index,
    ) -> Result<Self, GrafloError> {
        let vt = Self {
            name: name.into(),
            fields,
            primary_index,
            secondary_indices: Vec::new(),
        };
        vt.validate()?;
        Ok(vt)
    }

    fn validate(&self) -> Result<(), GrafloError> {
        let known: std::collections::HashSet<&str> =
            self.fields.iter().map(|f| f.name.as_str()).collect();
        for field in &self.primary_index {
            if !known.contains(field.as_str()) {
                return Err(GrafloError::Config(format!(
                    "vertex type '{}' primary index references undeclared field '{field}'",
                    self.name
                )));
            }
        }
        Ok(())
    }

    /// The primary key field, per spec §4.6: "first field of the first index".
    pub fn primary_key_field(&self) -> Option<&str> {
        self.primary_index.first().map(|s| s.as_str())
    }
}

/// A triple (source-vertex-name, target-vertex-name, relation-name?), with optional field
/// names on the edge's source record carrying the key values pointing into the source and
/// target vertices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeType {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub relation: Option<String>,
    #[serde(default)]
    pub match_source: Option<String>,
    #[serde(default)]
    pub match_target: Option<String>,
}

/// The full graph schema: vertex types, edge types, and the resources that populate them.
/// Constructing a `Schema` validates every cross-reference once; schema and patterns are
/// immutable afterward (spec §3 Lifecycles).
#[derive(Debug, Clone)]
pub struct Schema {
    pub vertices: HashMap<String, VertexType>,
    pub edges: Vec<EdgeType>,
    pub resources: Vec<Resource>,
}

impl Schema {
    pub fn new(
        vertices: Vec<VertexType>,
        edges: Vec<EdgeType>,
        resources: Vec<Resource>,
    ) -> Result<Self, GrafloError> {
        let vertices: HashMap<String, VertexType> =
            vertices.into_iter().map(|v| (v.name.clone(), v)).collect();

        for edge in &edges {
            if !vertices.contains_key(&edge.source) {
                return Err(GrafloError::Config(format!(
                    "edge type references unknown source vertex '{}'",
                    edge.source
                )));
            }
            if !vertices.contains_key(&edge.target) {
                return Err(GrafloError::Config(format!(
                    "edge type references unknown target vertex '{}'",
                    edge.target
                )));
            }
            // Self-edges (source == target) are explicitly permitted.
        }

        for resource in &resources {
            let mut referenced = Vec::new();
            resource.pipeline.referenced_vertex_types(&mut referenced);
            for name in referenced {
                if !vertices.contains_key(&name) {
                    return Err(GrafloError::Config(format!(
                        "resource '{}' pipeline references unknown vertex type '{name}'",
                        resource.name
                    )));
                }
            }
        }

        Ok(Self {
            vertices,
            edges,
            resources,
        })
    }

    pub fn fetch_resource(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name == name)
    }

    pub fn vertex(&self, name: &str) -> Option<&VertexType> {
        self.vertices.get(name)
    }

    /// Every vertex type name referenced as an edge endpoint, used by the caster to
    /// enforce the vertex-before-edge ordering guarantee (spec §4.9, §5).
    pub fn vertex_types_referenced_by_edges(&self) -> std::collections::HashSet<&str> {
        let mut out = std::collections::HashSet::new();
        for edge in &self.edges {
            out.insert(edge.source.as_str());
            out.insert(edge.target.as_str());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Actor, VertexActor};

    fn vertex(name: &str) -> VertexType {
        VertexType::new(name, vec![FieldDescriptor::new("id")], vec!["id".to_string()]).unwrap()
    }

    #[test]
    fn rejects_primary_index_on_undeclared_field() {
        let err = VertexType::new("users", vec![FieldDescriptor::new("id")], vec!["missing".to_string()]);
        assert!(err.is_err());
    }

    #[test]
    fn rejects_edge_with_unknown_endpoint() {
        let vertices = vec![vertex("users")];
        let edges = vec![EdgeType {
            source: "users".to_string(),
            target: "ghost".to_string(),
            relation: None,
            match_source: None,
            match_target: None,
        }];
        assert!(Schema::new(vertices, edges, vec![]).is_err());
    }

    #[test]
    fn self_edges_are_permitted() {
        let vertices = vec![vertex("users")];
        let edges = vec![EdgeType {
            source: "users".to_string(),
            target: "users".to_string(),
            relation: Some("follows".to_string()),
            match_source: Some("user_id".to_string()),
            match_target: Some("follows_user_id".to_string()),
        }];
        assert!(Schema::new(vertices, edges, vec![]).is_ok());
    }

    #[test]
    fn resource_referencing_unknown_vertex_is_rejected() {
        let vertices = vec![vertex("users")];
        let resources = vec![Resource::new(
            "ghosts",
            Actor::Vertex(VertexActor {
                vertex_name: "ghost".to_string(),
                map: None,
            }),
        )];
        assert!(Schema::new(vertices, vec![], resources).is_err());
    }
}
