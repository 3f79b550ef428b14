//! Auto-join planner (C6): given an edge actor that matches source/target records by a
//! foreign-key-like field, appends the joins and filters needed for its `TablePattern` to
//! carry both endpoints' primary keys into one row, without the schema author hand-writing
//! SQL joins. Grounded on `auto_join.py`.

use crate::patterns::{JoinClause, Patterns, TablePattern};
use graflo_core::{ComparisonOperator, EdgeActor, FilterExpression, Resource, Schema};

/// Appends the joins/filters an edge resource's `TablePattern` needs so its rows carry both
/// endpoints' primary keys, for every `EdgeActor` in `resource`'s pipeline. Idempotent: a
/// join already present for a given alias is left untouched, so calling this twice is a
/// no-op the second time.
pub fn enrich_edge_pattern_with_joins(
    resource: &Resource,
    pattern: &mut TablePattern,
    patterns: &Patterns,
    schema: &Schema,
) {
    for edge in resource.edge_actors() {
        enrich_for_edge(edge, pattern, patterns, schema);
    }
}

fn enrich_for_edge(edge: &EdgeActor, pattern: &mut TablePattern, patterns: &Patterns, schema: &Schema) {
    if pattern.joins.iter().any(|j| j.alias == "s") || pattern.joins.iter().any(|j| j.alias == "t") {
        // Already enriched (or hand-authored joins occupy these aliases); leave as-is.
        return;
    }

    let Some(source_key) = primary_key_for(&edge.from, schema) else {
        return;
    };
    let Some(target_key) = primary_key_for(&edge.to, schema) else {
        return;
    };
    let Some(source_table) = table_name_for(&edge.from, patterns) else {
        return;
    };
    let Some(target_table) = table_name_for(&edge.to, patterns) else {
        return;
    };

    pattern.joins.push(JoinClause {
        table: source_table,
        schema: None,
        alias: "s".to_string(),
        on_self: edge.match_source.clone(),
        on_other: source_key.clone(),
        join_type: "LEFT".to_string(),
        select_fields: None,
    });
    pattern.joins.push(JoinClause {
        table: target_table,
        schema: None,
        alias: "t".to_string(),
        on_self: edge.match_target.clone(),
        on_other: target_key,
        join_type: "LEFT".to_string(),
        select_fields: None,
    });

    pattern.filters.push(
        FilterExpression::leaf("s.".to_string() + &source_key, ComparisonOperator::IsNotNull, vec![], None)
            .expect("IS_NOT_NULL leaf carries no value"),
    );
    pattern.filters.push(
        FilterExpression::leaf(format!("t.{}", column_for(&edge.to, schema)), ComparisonOperator::IsNotNull, vec![], None)
            .expect("IS_NOT_NULL leaf carries no value"),
    );
}

fn primary_key_for(vertex_name: &str, schema: &Schema) -> Option<String> {
    schema.vertex(vertex_name)?.primary_key_field().map(|s| s.to_string())
}

fn column_for(vertex_name: &str, schema: &Schema) -> String {
    primary_key_for(vertex_name, schema).unwrap_or_else(|| "id".to_string())
}

fn table_name_for(vertex_name: &str, patterns: &Patterns) -> Option<String> {
    patterns.table_patterns.get(vertex_name).map(|t| t.table_name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::TablePattern;
    use graflo_core::{Actor, EdgeActor as CoreEdgeActor, FieldDescriptor, Resource, VertexType};

    fn schema_with_users_and_orders() -> Schema {
        let user = VertexType::new("user", vec![FieldDescriptor::new("id")], vec!["id".to_string()]).unwrap();
        let order = VertexType::new("order", vec![FieldDescriptor::new("id")], vec!["id".to_string()]).unwrap();
        let resource = Resource::new(
            "orders",
            Actor::Edge(CoreEdgeActor {
                from: "user".into(),
                to: "order".into(),
                match_source: "user_id".into(),
                match_target: "order_id".into(),
                relation: None,
                relation_field: None,
            }),
        );
        Schema::new(vec![user, order], vec![], vec![resource]).unwrap()
    }

    fn patterns_with_endpoint_tables() -> Patterns {
        let mut patterns = Patterns::default();
        patterns.table_patterns.insert(
            "user".to_string(),
            TablePattern {
                table_name: "user".to_string(),
                ..Default::default()
            },
        );
        patterns.table_patterns.insert(
            "order".to_string(),
            TablePattern {
                table_name: "order".to_string(),
                ..Default::default()
            },
        );
        patterns
    }

    #[test]
    fn adds_two_joins_and_two_filters() {
        let schema = schema_with_users_and_orders();
        let resource = schema.fetch_resource("orders").unwrap().clone();
        let mut pattern = TablePattern {
            table_name: "orders".to_string(),
            ..Default::default()
        };
        let patterns = patterns_with_endpoint_tables();
        enrich_edge_pattern_with_joins(&resource, &mut pattern, &patterns, &schema);

        assert_eq!(pattern.joins.len(), 2);
        assert_eq!(pattern.joins[0].alias, "s");
        assert_eq!(pattern.joins[1].alias, "t");
        assert_eq!(pattern.filters.len(), 2);
    }

    #[test]
    fn is_idempotent() {
        let schema = schema_with_users_and_orders();
        let resource = schema.fetch_resource("orders").unwrap().clone();
        let mut pattern = TablePattern {
            table_name: "orders".to_string(),
            ..Default::default()
        };
        let patterns = patterns_with_endpoint_tables();
        enrich_edge_pattern_with_joins(&resource, &mut pattern, &patterns, &schema);
        enrich_edge_pattern_with_joins(&resource, &mut pattern, &patterns, &schema);

        assert_eq!(pattern.joins.len(), 2);
        assert_eq!(pattern.filters.len(), 2);
    }

    #[test]
    fn skips_enrichment_when_an_endpoint_table_pattern_is_missing() {
        let schema = schema_with_users_and_orders();
        let resource = schema.fetch_resource("orders").unwrap().clone();
        let mut pattern = TablePattern {
            table_name: "orders".to_string(),
            ..Default::default()
        };
        let patterns = Patterns::default();
        enrich_edge_pattern_with_joins(&resource, &mut pattern, &patterns, &schema);

        assert!(pattern.joins.is_empty());
        assert!(pattern.filters.is_empty());
    }
}
