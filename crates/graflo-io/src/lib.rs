//! Data source implementations (C7): file, SQL, REST API, local RDF, and SPARQL endpoint,
//! each behind the `graflo_core::DataSource` pull trait.

mod json_bridge;
mod rdf_common;

pub mod source_api;
pub mod source_file;
pub mod source_rdf;
pub mod source_sparql;
pub mod source_sql;

pub use source_api::{ApiDataSource, Pagination};
pub use source_file::{FileDataSource, FileFormat};
pub use source_rdf::RdfFileDataSource;
pub use source_sparql::{SparqlEndpointDataSource, SparqlSourceConfig};
pub use source_sql::SqlDataSource;
