//! Core types shared by every graflo-rs crate: the record data model, the filter
//! expression algebra (C1), the pipeline actor set (C8), the graph schema (§3), the data
//! source / graph sink seams (C7/C9), and the error taxonomy (§7).

pub mod actor;
pub mod bucket;
pub mod config;
pub mod datasource;
pub mod error;
pub mod filter;
pub mod schema;
pub mod sink;
pub mod value;

pub use actor::{Actor, EdgeActor, FieldMapActor, Resource, VertexActor, VertexRouterActor};
pub use bucket::{BucketMap, EdgeBucketKey};
pub use config::IngestionParams;
pub use datasource::DataSource;
pub use error::{GrafloError, Result};
pub use filter::{ComparisonOperator, FieldKind, Flavor, FilterExpression, LogicalOperator};
pub use schema::{EdgeType, FieldDescriptor, Index, Schema, VertexType};
pub use sink::{GraphSink, InMemoryGraphSink, LoggingGraphSink};
pub use value::{record_from_pairs, Record, Value};
