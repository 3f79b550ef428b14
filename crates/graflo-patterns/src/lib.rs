//! Resource patterns (C5) and the auto-join planner (C6).

pub mod auto_join;
pub mod patterns;
pub mod sql;

pub use auto_join::enrich_edge_pattern_with_joins;
pub use patterns::{
    FilePattern, JoinClause, PatternRef, Patterns, PostgresConfig, ResourceType, SparqlPattern, TableInfo,
    TablePattern,
};
pub use sql::datetime_range_where_sql;
