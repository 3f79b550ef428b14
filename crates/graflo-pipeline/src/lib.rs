//! Drives a single `DataSource` through a single `Resource`'s actor pipeline (C8).
//!
//! This is the per-resource inner loop that `graflo-caster` fans out across an entire
//! schema: pull a batch of records, run each one through `Resource::evaluate`, merge the
//! resulting bucket maps, and hand the merged batch to a sink callback once it reaches
//! the configured batch size.

mod driver;

pub use driver::{drive_resource, DriveStats};
