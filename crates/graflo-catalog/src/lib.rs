//! Catalog reader (C2), fuzzy name matcher (C3), and schema inferrer (C4).

pub mod catalog;
pub mod fuzzy;
pub mod inference;

pub use catalog::{CatalogReader, ColumnInfo, ForeignKeyEdge, TableCatalog};
pub use fuzzy::{FuzzyMatch, FuzzyMatcher};
pub use inference::{
    build_edge_resource, build_vertex_resource, infer_edge, is_edge_like, is_vertex_like, sanitize_field_name,
    EdgeInference, FieldRenameMap,
};
