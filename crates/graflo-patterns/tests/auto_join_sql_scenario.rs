//! End-to-end scenario: auto-join planning feeding straight into SQL query rendering,
//! for an edge resource whose endpoints share a single physical "classes" table.

use graflo_core::{Actor, EdgeActor, FieldDescriptor, Resource, Schema, VertexType};
use graflo_patterns::{enrich_edge_pattern_with_joins, Patterns, TablePattern};

fn classes_schema() -> Schema {
    let server = VertexType::new("server", vec![FieldDescriptor::new("id")], vec!["id".to_string()]).unwrap();
    let database = VertexType::new("database", vec![FieldDescriptor::new("id")], vec!["id".to_string()]).unwrap();
    let network = VertexType::new("network", vec![FieldDescriptor::new("id")], vec!["id".to_string()]).unwrap();
    let relations = Resource::new(
        "relations",
        Actor::Edge(EdgeActor {
            from: "server".to_string(),
            to: "database".to_string(),
            match_source: "parent".to_string(),
            match_target: "child".to_string(),
            relation: None,
            relation_field: None,
        }),
    );
    Schema::new(vec![server, database, network], vec![], vec![relations]).unwrap()
}

fn classes_patterns() -> Patterns {
    let mut patterns = Patterns::default();
    for vertex_name in ["server", "database", "network"] {
        patterns.table_patterns.insert(
            vertex_name.to_string(),
            TablePattern {
                table_name: "classes".to_string(),
                ..Default::default()
            },
        );
    }
    patterns
}

#[test]
fn auto_joined_relations_query_contains_both_endpoint_joins_and_filters() {
    let schema = classes_schema();
    let patterns = classes_patterns();
    let resource = schema.fetch_resource("relations").unwrap().clone();

    let mut relations_pattern = TablePattern {
        table_name: "relations".to_string(),
        ..Default::default()
    };
    enrich_edge_pattern_with_joins(&resource, &mut relations_pattern, &patterns, &schema);

    let sql = relations_pattern.build_query("public");

    assert!(sql.contains(r#"LEFT JOIN "public"."classes" s ON r."parent" = s."id""#), "{sql}");
    assert!(sql.contains(r#"LEFT JOIN "public"."classes" t ON r."child" = t."id""#), "{sql}");
    assert!(sql.contains(r#"s."id" IS NOT NULL"#), "{sql}");
    assert!(sql.contains(r#"t."id" IS NOT NULL"#), "{sql}");
}
