use cadence_stats::StatsError;
use cadence_workflow::WorkflowError;
use thiserror::Error;

/// Errors surfaced by workflow projection. All failures propagate to the
/// caller unchanged; the mapper never emits a partially populated record.
#[derive(Debug, Error)]
pub enum MapperError {
  /// Statistics lookup failed (missing aggregate or storage failure).
  #[error("statistics lookup failed: {0}")]
  Stats(#[from] StatsError),

  /// The batched lookup broke its contract: no entry for a requested id.
  #[error("batched statistics lookup returned no entry for workflow {workflow_id}")]
  MissingStatistics { workflow_id: i64 },

  /// The workflow snapshot violates a model invariant.
  #[error("invalid workflow snapshot: {0}")]
  InvalidWorkflow(#[from] WorkflowError),
}
