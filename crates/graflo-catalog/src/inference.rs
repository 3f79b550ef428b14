//! Schema inferrer (C4): classifies tables as vertex or edge tables, and for edge tables
//! computes `(source, target, relation)` from table and key-column names when FK metadata
//! alone doesn't pin it down.

use crate::catalog::TableCatalog;
use crate::fuzzy::FuzzyMatcher;
use graflo_core::actor::{Actor, EdgeActor, FieldMapActor, Resource, VertexActor};
use std::collections::{HashMap, HashSet};

/// The (source, target, relation) triple the inferrer computed for one edge-like table,
/// plus the FK column names that carried each endpoint's key value.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeInference {
    pub source_vertex: String,
    pub target_vertex: String,
    pub source_column: String,
    pub target_column: String,
    pub relation_name: Option<String>,
}

fn fk_constraint_count(foreign_keys: &[crate::catalog::ForeignKeyEdge]) -> usize {
    foreign_keys
        .iter()
        .map(|fk| fk.constraint_name.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Any one of: `|PK| >= 2`; `|FK| = 2`; table name begins with `rel_`;
/// `PK ⊆ {columns of FKs}` and `|FK| >= 2`.
pub fn is_edge_like(table: &TableCatalog) -> bool {
    if table.primary_key.len() >= 2 {
        return true;
    }
    let fk_count = fk_constraint_count(&table.foreign_keys);
    if fk_count == 2 {
        return true;
    }
    if table.name.starts_with("rel_") {
        return true;
    }
    let fk_columns: HashSet<&str> = table.foreign_keys.iter().map(|fk| fk.column.as_str()).collect();
    if fk_count >= 2 && table.primary_key.iter().all(|pk| fk_columns.contains(pk.as_str())) {
        return true;
    }
    false
}

/// Has a PK; is not edge-like; has at least one column outside PK ∪ FK.
pub fn is_vertex_like(table: &TableCatalog) -> bool {
    if table.primary_key.is_empty() {
        return false;
    }
    if is_edge_like(table) {
        return false;
    }
    let pk_fk: HashSet<&str> = table
        .primary_key
        .iter()
        .map(String::as_str)
        .chain(table.foreign_keys.iter().map(|fk| fk.column.as_str()))
        .collect();
    table.columns.iter().any(|c| !pk_fk.contains(c.name.as_str()))
}

/// Majority separator among `_`, `-`, `.`; default `_`.
fn detect_separator(name: &str) -> char {
    let candidates = ['_', '-', '.'];
    let mut best = ('_', 0usize);
    for sep in candidates {
        let count = name.matches(sep).count();
        if count > best.1 {
            best = (sep, count);
        }
    }
    best.0
}

fn split_fragments(s: &str, sep: char) -> Vec<String> {
    s.split(sep).filter(|f| !f.is_empty()).map(|f| f.to_string()).collect()
}

/// Collects fuzzy vertex-name matches across table-name fragments (in position order) then
/// key-column fragments, in first-seen order, de-duplicated. Fragments of length <= 2 are
/// never queried against the matcher.
fn collect_vertex_matches(
    table_fragments: &[String],
    key_fragments: &[String],
    matcher: &FuzzyMatcher,
    threshold: f64,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for fragment in table_fragments.iter().chain(key_fragments.iter()) {
        if fragment.len() <= 2 {
            continue;
        }
        if let Some(hit) = matcher.best_match(fragment, threshold) {
            if seen.insert(hit.name.clone()) {
                out.push(hit.name);
            }
        }
    }
    out
}

/// Distinct `references_table` values across the table's FKs, in declaration order.
fn distinct_fk_references(table: &TableCatalog) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for fk in &table.foreign_keys {
        if seen.insert(fk.references_table.clone()) {
            out.push(fk.references_table.clone());
        }
    }
    out
}

/// Source/target endpoint choice: P1 (FK references) > P2 (fuzzy matches) > P3 (fill
/// whichever endpoint is still missing from whatever evidence remains).
fn choose_endpoints(fk_refs: &[String], fuzzy_matches: &[String]) -> (Option<String>, Option<String>) {
    let mut source = None;
    let mut target = None;

    if fk_refs.len() >= 2 {
        source = Some(fk_refs[0].clone());
        target = Some(fk_refs[1].clone());
    } else if fk_refs.len() == 1 {
        source = Some(fk_refs[0].clone());
        target = Some(fk_refs[0].clone());
    }

    if source.is_none() && target.is_none() {
        if fuzzy_matches.len() >= 2 {
            source = Some(fuzzy_matches[0].clone());
            target = Some(fuzzy_matches[1].clone());
        } else if fuzzy_matches.len() == 1 {
            source = Some(fuzzy_matches[0].clone());
            target = Some(fuzzy_matches[0].clone());
        }
    }

    if source.is_none() {
        source = fk_refs.first().cloned().or_else(|| fuzzy_matches.first().cloned());
    }
    if target.is_none() {
        target = fk_refs
            .iter()
            .find(|r| Some((*r).clone()) != source)
            .cloned()
            .or_else(|| fuzzy_matches.iter().find(|m| Some((*m).clone()) != source).cloned());
    }

    (source, target)
}

/// Relation-name extraction: among table-name fragments not matching source or target, and
/// not "very short" (length <= 2), score by `length + 5*position_index` (0-based from the
/// left) and pick the maximum. A leading `rel_` marker fragment is excluded first — it is a
/// naming convention, not semantic content.
fn infer_relation(
    table_name: &str,
    table_fragments: &[String],
    source: &str,
    target: &str,
    matcher: &FuzzyMatcher,
    threshold: f64,
) -> Option<String> {
    let fragments: Vec<&String> = if table_name.starts_with("rel_") {
        table_fragments.iter().skip(1).collect()
    } else {
        table_fragments.iter().collect()
    };

    let mut best: Option<(String, i64)> = None;
    for (position, fragment) in fragments.iter().enumerate() {
        if fragment.len() <= 2 {
            continue;
        }
        let matches_endpoint = matcher
            .best_match(fragment, threshold)
            .map(|m| m.name == source || m.name == target)
            .unwrap_or(false);
        if matches_endpoint {
            continue;
        }
        let score = fragment.len() as i64 + 5 * position as i64;
        if best.as_ref().map(|(_, s)| score > *s).unwrap_or(true) {
            best = Some(((*fragment).clone(), score));
        }
    }
    best.map(|(name, _)| name)
}

/// Infer `(source, target, relation)` for one edge-like table. Returns `None` (logged by
/// the caller) if source/target cannot be resolved.
pub fn infer_edge(table: &TableCatalog, vertex_names: &[String]) -> Option<EdgeInference> {
    let matcher = FuzzyMatcher::new(vertex_names.to_vec());
    let threshold = FuzzyMatcher::INFERENCE_THRESHOLD;

    let sep = detect_separator(&table.name);
    let table_fragments = split_fragments(&table.name, sep);

    let mut key_fragments = Vec::new();
    for pk in &table.primary_key {
        key_fragments.extend(split_fragments(pk, sep));
    }
    for fk in &table.foreign_keys {
        key_fragments.extend(split_fragments(&fk.column, sep));
    }

    let fk_refs = distinct_fk_references(table);
    let fuzzy_matches = collect_vertex_matches(&table_fragments, &key_fragments, &matcher, threshold);

    let (source, target) = choose_endpoints(&fk_refs, &fuzzy_matches);
    let (source, target) = (source?, target?);

    let relation = infer_relation(&table.name, &table_fragments, &source, &target, &matcher, threshold);

    let source_column = fk_column_for(table, &source).unwrap_or_else(|| format!("{source}_id"));
    let target_column = fk_column_for(table, &target).unwrap_or_else(|| format!("{target}_id"));

    Some(EdgeInference {
        source_vertex: source,
        target_vertex: target,
        source_column,
        target_column,
        relation_name: relation,
    })
}

fn fk_column_for(table: &TableCatalog, vertex_name: &str) -> Option<String> {
    table
        .foreign_keys
        .iter()
        .find(|fk| fk.references_table == vertex_name)
        .map(|fk| fk.column.clone())
}

/// Field-name sanitization applied during vertex-field derivation: non-alphanumeric
/// characters become `_`, and the result is lowercased.
pub fn sanitize_field_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// Per-vertex rename maps remembered during vertex-resource construction, re-applied
/// inside edge resources so shared columns are renamed consistently.
pub type FieldRenameMap = HashMap<String, HashMap<String, String>>;

/// Build the `Resource` for a vertex table: a single `VertexActor` with a sanitized-field
/// rename map. Returns the rename map alongside so `build_edge_resource` can reuse it.
pub fn build_vertex_resource(table: &TableCatalog) -> (Resource, HashMap<String, String>) {
    let mut renames = HashMap::new();
    for column in &table.columns {
        let sanitized = sanitize_field_name(&column.name);
        if sanitized != column.name {
            renames.insert(column.name.clone(), sanitized);
        }
    }
    let map = if renames.is_empty() { None } else { Some(renames.clone()) };
    let resource = Resource::new(
        table.name.clone(),
        Actor::Vertex(VertexActor {
            vertex_name: table.name.clone(),
            map,
        }),
    );
    (resource, renames)
}

/// Build the `Resource` for an edge table: an `EdgeActor` emitting the edge row, plus two
/// `target_vertex`-scoped field maps carrying the source/target FK values into their
/// vertex's primary-key field, using whatever rename the referenced vertex's own resource
/// applied to that field.
pub fn build_edge_resource(table: &TableCatalog, edge: &EdgeInference, renames: &FieldRenameMap) -> Resource {
    let source_pk_field = renames
        .get(&edge.source_vertex)
        .and_then(|m| m.get(&edge.source_column))
        .cloned()
        .unwrap_or_else(|| edge.source_column.clone());
    let target_pk_field = renames
        .get(&edge.target_vertex)
        .and_then(|m| m.get(&edge.target_column))
        .cloned()
        .unwrap_or_else(|| edge.target_column.clone());

    let pipeline = Actor::Sequence(vec![
        Actor::Edge(EdgeActor {
            from: edge.source_vertex.clone(),
            to: edge.target_vertex.clone(),
            match_source: edge.source_column.clone(),
            match_target: edge.target_column.clone(),
            relation: edge.relation_name.clone(),
            relation_field: None,
        }),
        Actor::FieldMap(FieldMapActor {
            target_vertex: Some(edge.source_vertex.clone()),
            map: HashMap::from([(edge.source_column.clone(), source_pk_field)]),
        }),
        Actor::FieldMap(FieldMapActor {
            target_vertex: Some(edge.target_vertex.clone()),
            map: HashMap::from([(edge.target_column.clone(), target_pk_field)]),
        }),
    ]);

    Resource::new(table.name.clone(), pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ColumnInfo;

    fn table(name: &str, pk: Vec<&str>, fks: Vec<(&str, &str, &str, &str)>, cols: Vec<&str>) -> TableCatalog {
        TableCatalog {
            name: name.to_string(),
            columns: cols
                .into_iter()
                .map(|c| ColumnInfo {
                    name: c.to_string(),
                    data_type: "text".to_string(),
                })
                .collect(),
            primary_key: pk.into_iter().map(String::from).collect(),
            foreign_keys: fks
                .into_iter()
                .map(|(col, rt, rc, cn)| crate::catalog::ForeignKeyEdge {
                    column: col.to_string(),
                    references_table: rt.to_string(),
                    references_column: rc.to_string(),
                    constraint_name: cn.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn classifies_vertex_and_edge_tables() {
        let users = table("users", vec!["id"], vec![], vec!["id", "name", "email"]);
        assert!(is_vertex_like(&users));
        assert!(!is_edge_like(&users));

        let purchases = table(
            "purchases",
            vec!["user_id", "product_id"],
            vec![
                ("user_id", "users", "id", "fk_user"),
                ("product_id", "products", "id", "fk_product"),
            ],
            vec!["user_id", "product_id", "quantity"],
        );
        assert!(is_edge_like(&purchases));
        assert!(!is_vertex_like(&purchases));
    }

    #[test]
    fn infers_edge_vertices_from_fk_metadata() {
        let purchases = table(
            "purchases",
            vec!["user_id", "product_id"],
            vec![
                ("user_id", "users", "id", "fk_user"),
                ("product_id", "products", "id", "fk_product"),
            ],
            vec!["user_id", "product_id", "quantity"],
        );
        let edge = infer_edge(&purchases, &["users".into(), "products".into()]).unwrap();
        assert_eq!(edge.source_vertex, "users");
        assert_eq!(edge.target_vertex, "products");
    }

    #[test]
    fn infers_self_reference_from_single_fk() {
        let follows = table(
            "follows",
            vec!["user_id", "follows_user_id"],
            vec![("user_id", "users", "id", "fk_follower")],
            vec!["user_id", "follows_user_id"],
        );
        let edge = infer_edge(&follows, &["users".into()]).unwrap();
        assert_eq!(edge.source_vertex, "users");
        assert_eq!(edge.target_vertex, "users");
    }

    #[test]
    fn rel_prefixed_table_infers_relation_by_fuzzy_match_no_fks() {
        let t = table(
            "rel_user_purchases_product",
            vec!["user_id", "product_id"],
            vec![],
            vec!["user_id", "product_id"],
        );
        let edge = infer_edge(&t, &["user".into(), "product".into(), "order".into()]).unwrap();
        assert_eq!(edge.source_vertex, "user");
        assert_eq!(edge.target_vertex, "product");
        assert_eq!(edge.relation_name.as_deref(), Some("purchases"));
    }

    #[test]
    fn scoring_prefers_longer_trailing_fragment() {
        let t = table(
            "user_product_purchase_history",
            vec!["user_id", "product_id"],
            vec![],
            vec!["user_id", "product_id"],
        );
        let edge = infer_edge(&t, &["user".into(), "product".into()]).unwrap();
        assert_eq!(edge.source_vertex, "user");
        assert_eq!(edge.target_vertex, "product");
        assert_eq!(edge.relation_name.as_deref(), Some("history"));
    }
}
