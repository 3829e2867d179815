//! Cadence Stats
//!
//! This crate provides the run-statistics contract consumed by the
//! read-model layer. Statistics are aggregated from run records written by
//! the execution tracker; the read-model side only ever reads.
//!
//! The [`StatisticsStore`] trait defines two lookups:
//! - a single-workflow aggregate fetch
//! - a batched fetch returning exactly one entry per requested id, backed
//!   by one bulk query (this is what keeps list serialization free of
//!   per-item query fan-out)

mod error;
mod sqlite;
mod types;

pub use error::StatsError;
pub use sqlite::SqliteStatisticsStore;
pub use types::{RunStatus, WorkflowRun, WorkflowStatistics};

use std::collections::{BTreeSet, HashMap};

/// Read contract for aggregated workflow run statistics.
pub trait StatisticsStore: Send + Sync {
  /// Fetch the aggregate for one workflow.
  ///
  /// Fails with [`StatsError::NotFound`] when the workflow has no recorded
  /// runs; callers decide whether absence is an error or a zero-default.
  fn get_stats(
    &self,
    workflow_id: i64,
  ) -> impl std::future::Future<Output = Result<WorkflowStatistics, StatsError>> + Send;

  /// Fetch aggregates for a set of workflows in a single bulk operation.
  ///
  /// Contract: the returned map's key set equals `workflow_ids` exactly.
  /// Ids with no recorded runs map to zeroed statistics; implementations
  /// must never loop over single fetches.
  fn get_stats_for_many(
    &self,
    workflow_ids: &BTreeSet<i64>,
  ) -> impl std::future::Future<Output = Result<HashMap<i64, WorkflowStatistics>, StatsError>> + Send;
}
