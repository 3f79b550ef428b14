//! Graph sink contract (C9 collaborator): the external graph database driver the caster
//! writes batched vertex/edge records into. Out of scope per spec.md §1 ("the concrete
//! graph database drivers ... are external collaborators"); this module defines only the
//! seam and a couple of reference implementations useful for tests and dry runs.

use crate::value::Record;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// A target graph database. Must be thread-safe for concurrent bulk writes to disjoint
/// type buckets (spec §5, "Shared resources") since the caster may drive several resources
/// concurrently, each writing to its own vertex/edge type.
#[async_trait]
pub trait GraphSink: Send + Sync {
    async fn write_vertices(&self, vertex_type: &str, records: Vec<Record>) -> anyhow::Result<()>;

    async fn write_edges(
        &self,
        source: &str,
        target: &str,
        relation: Option<&str>,
        records: Vec<Record>,
    ) -> anyhow::Result<()>;
}

/// A sink that only logs what it would have written. Useful for dry-run CLI invocations.
#[derive(Debug, Default)]
pub struct LoggingGraphSink;

#[async_trait]
impl GraphSink for LoggingGraphSink {
    async fn write_vertices(&self, vertex_type: &str, records: Vec<Record>) -> anyhow::Result<()> {
        tracing::info!(vertex_type, count = records.len(), "would write vertices");
        Ok(())
    }

    async fn write_edges(
        &self,
        source: &str,
        target: &str,
        relation: Option<&str>,
        records: Vec<Record>,
    ) -> anyhow::Result<()> {
        tracing::info!(source, target, ?relation, count = records.len(), "would write edges");
        Ok(())
    }
}

/// An in-memory sink used by integration tests to assert on what the caster flushed.
#[derive(Debug, Default)]
pub struct InMemoryGraphSink {
    pub vertices: Mutex<HashMap<String, Vec<Record>>>,
    pub edges: Mutex<HashMap<(String, String, Option<String>), Vec<Record>>>,
}

#[async_trait]
impl GraphSink for InMemoryGraphSink {
    async fn write_vertices(&self, vertex_type: &str, mut records: Vec<Record>) -> anyhow::Result<()> {
        self.vertices
            .lock()
            .unwrap()
            .entry(vertex_type.to_string())
            .or_default()
            .append(&mut records);
        Ok(())
    }

    async fn write_edges(
        &self,
        source: &str,
        target: &str,
        relation: Option<&str>,
        mut records: Vec<Record>,
    ) -> anyhow::Result<()> {
        let key = (source.to_string(), target.to_string(), relation.map(str::to_string));
        self.edges.lock().unwrap().entry(key).or_default().append(&mut records);
        Ok(())
    }
}
