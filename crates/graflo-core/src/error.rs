//! Error taxonomy shared by every graflo-rs crate.
//!
//! Mirrors the teacher's `RdeError`: a small `thiserror` enum for the errors the engine
//! itself raises, plus a transparent variant for everything else. The taxonomy matches
//! spec.md §7: `ConfigError`, `CatalogError`, `InferenceWarning`, `DataSourceError`,
//! `SinkError`, `InvariantViolation`.

use thiserror::Error;

/// Errors raised by the graflo-rs ingestion engine.
#[derive(Debug, Error)]
pub enum GrafloError {
    /// Missing required fields on a pattern, missing target vertex on an edge actor,
    /// or an ambiguous pattern serialization. Raised at construction; fatal for the
    /// resource being built.
    #[error("config error: {0}")]
    Config(String),

    /// The catalog reader could not obtain a required shape (no PK on a table classified
    /// as vertex, unresolved FK reference). Logged by the caller; the affected table is
    /// skipped rather than propagated as a hard failure.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Source/target could not be resolved for an edge-like table during inference.
    /// Logged; the table is skipped; never fatal to the overall inference run.
    #[error("inference warning: {0}")]
    Inference(String),

    /// Transport failure opening or reading a data source.
    #[error("data source error: {0}")]
    DataSource(String),

    /// Failure writing a batch to the graph sink, after the retry budget is exhausted.
    #[error("sink error: {0}")]
    Sink(String),

    /// An internal contract failed (e.g. a leaf filter expression with `deps` set).
    /// Always indicates a programming error, never a user-data problem.
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// Catch-all for errors bubbled up from elsewhere (I/O, parsing, a transitive
    /// dependency's error type).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, GrafloError>;
