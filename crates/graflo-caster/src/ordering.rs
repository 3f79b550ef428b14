//! Resource dependency ordering (spec §4.9, §5): every vertex type referenced by an edge
//! type is fully flushed before the first edge flush involving it. The default rule is the
//! simple one spec.md names ("process all vertex resources before any edge resource");
//! this module expresses it as a dependency graph over resource names so a resource whose
//! vertex types are produced by several other resources is still ordered correctly, with
//! the plain two-pass rule as a fallback if the graph ever has a cycle.

use graflo_core::{Actor, Schema};
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use std::collections::HashMap;

fn collect_produced_vertex_types(actor: &Actor, out: &mut Vec<String>) {
    match actor {
        Actor::Vertex(a) => out.push(a.vertex_name.clone()),
        Actor::FieldMap(a) => {
            if let Some(target) = &a.target_vertex {
                out.push(target.clone());
            }
        }
        Actor::Sequence(actors) => {
            for a in actors {
                collect_produced_vertex_types(a, out);
            }
        }
        Actor::Edge(_) | Actor::VertexRouter(_) => {}
    }
}

fn vertex_before_edge_fallback(schema: &Schema, resource_names: &[String]) -> Vec<String> {
    let is_edge = |name: &str| {
        schema
            .fetch_resource(name)
            .map(|r| !r.edge_actors().is_empty())
            .unwrap_or(false)
    };
    let mut vertices: Vec<String> = resource_names.iter().filter(|n| !is_edge(n)).cloned().collect();
    let mut edges: Vec<String> = resource_names.iter().filter(|n| is_edge(n)).cloned().collect();
    vertices.append(&mut edges);
    vertices
}

/// Orders `resource_names` so every resource producing a vertex type precedes every
/// resource whose edge actors reference that type.
pub fn order_resource_names(schema: &Schema, resource_names: &[String]) -> Vec<String> {
    let mut graph = DiGraph::<String, ()>::new();
    let mut node_of = HashMap::new();
    for name in resource_names {
        let idx = graph.add_node(name.clone());
        node_of.insert(name.clone(), idx);
    }

    let mut producers: HashMap<String, Vec<String>> = HashMap::new();
    for name in resource_names {
        let Some(resource) = schema.fetch_resource(name) else { continue };
        if !resource.edge_actors().is_empty() {
            continue;
        }
        let mut produced = Vec::new();
        collect_produced_vertex_types(&resource.pipeline, &mut produced);
        for vertex_type in produced {
            producers.entry(vertex_type).or_default().push(name.clone());
        }
    }

    for name in resource_names {
        let Some(resource) = schema.fetch_resource(name) else { continue };
        let edges = resource.edge_actors();
        if edges.is_empty() {
            continue;
        }
        let consumer_idx = node_of[name];
        for edge in edges {
            for vertex_type in [&edge.from, &edge.to] {
                if let Some(producer_names) = producers.get(vertex_type) {
                    for producer_name in producer_names {
                        if producer_name != name {
                            graph.add_edge(node_of[producer_name], consumer_idx, ());
                        }
                    }
                }
            }
        }
    }

    match toposort(&graph, None) {
        Ok(order) => order.into_iter().map(|idx| graph[idx].clone()).collect(),
        Err(_) => {
            tracing::warn!("resource dependency graph has a cycle, falling back to vertex-before-edge order");
            vertex_before_edge_fallback(schema, resource_names)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graflo_core::{EdgeActor, FieldDescriptor, Resource, VertexActor, VertexType};

    fn schema_with_users_orders_and_follows() -> Schema {
        let user = VertexType::new("user", vec![FieldDescriptor::new("id")], vec!["id".to_string()]).unwrap();
        let order = VertexType::new("order", vec![FieldDescriptor::new("id")], vec!["id".to_string()]).unwrap();

        let purchases = Resource::new(
            "purchases",
            Actor::Edge(EdgeActor {
                from: "user".into(),
                to: "order".into(),
                match_source: "user_id".into(),
                match_target: "order_id".into(),
                relation: None,
                relation_field: None,
            }),
        );
        let users = Resource::new(
            "users",
            Actor::Vertex(VertexActor {
                vertex_name: "user".into(),
                map: None,
            }),
        );
        let orders = Resource::new(
            "orders",
            Actor::Vertex(VertexActor {
                vertex_name: "order".into(),
                map: None,
            }),
        );

        Schema::new(vec![user, order], vec![], vec![purchases, users, orders]).unwrap()
    }

    #[test]
    fn vertex_resources_precede_the_edge_resource_that_depends_on_them() {
        let schema = schema_with_users_orders_and_follows();
        let names = vec!["purchases".to_string(), "users".to_string(), "orders".to_string()];
        let ordered = order_resource_names(&schema, &names);

        let purchases_pos = ordered.iter().position(|n| n == "purchases").unwrap();
        let users_pos = ordered.iter().position(|n| n == "users").unwrap();
        let orders_pos = ordered.iter().position(|n| n == "orders").unwrap();

        assert!(users_pos < purchases_pos);
        assert!(orders_pos < purchases_pos);
    }
}
