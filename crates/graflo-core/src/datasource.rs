//! Data source contract (C7): the common "produces lazy batches of records" interface
//! implemented by file/SQL/API/RDF/SPARQL sources in `graflo-io`.
//!
//! Generalizes the teacher's `Source::run(tx, cancel)` push model to the pull model spec.md
//! §4.7 describes (`iter_batches(batch_size, limit?)`): a data source is single-pass and
//! non-restartable, so the trait is a plain async iterator rather than a channel producer.
//! The caster (C9) is what spawns one task per resource and applies cancellation at batch
//! boundaries (spec §5); the source itself stays a synchronous-between-awaits pull source.

use crate::value::Record;
use async_trait::async_trait;

/// A single-pass, non-restartable source of record batches.
///
/// Implementations are not required to be thread-safe on a single instance — the caster
/// owns each source exclusively for the resource's lifetime (spec §5, "Shared resources").
#[async_trait]
pub trait DataSource: Send {
    /// A short, human-readable label used in logs (e.g. the resource name or file path).
    fn name(&self) -> &str;

    /// Pull the next batch of up to `batch_size` records. Returns `Ok(None)` on clean
    /// exhaustion. Once this returns `Ok(None)` or `Err`, the source must not be polled
    /// again; the caster calls `close` and moves on.
    async fn next_batch(&mut self, batch_size: usize) -> anyhow::Result<Option<Vec<Record>>>;

    /// Release any held connection or file handle. Called exactly once, whether the source
    /// was exhausted normally or aborted on error.
    async fn close(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}
