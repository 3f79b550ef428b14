//! Ingestion parameters shared by the caster and registry builder (C9 inputs, spec §4.9).

use serde::{Deserialize, Serialize};

/// Tuning knobs for one ingestion run. Loaded from the CLI's YAML config alongside the
/// schema and patterns documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionParams {
    /// If set, the caster is expected to wipe target vertex/edge buckets before writing
    /// (a sink-level concern; the caster only threads the flag through).
    #[serde(default)]
    pub clean_start: bool,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub datetime_after: Option<String>,
    #[serde(default)]
    pub datetime_before: Option<String>,
    #[serde(default)]
    pub datetime_column: Option<String>,
    #[serde(default)]
    pub limit_files: Option<usize>,
}

fn default_batch_size() -> usize {
    1000
}

impl Default for IngestionParams {
    fn default() -> Self {
        Self {
            clean_start: false,
            batch_size: default_batch_size(),
            datetime_after: None,
            datetime_before: None,
            datetime_column: None,
            limit_files: None,
        }
    }
}
