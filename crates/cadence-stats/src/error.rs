use thiserror::Error;

/// Errors from statistics storage.
#[derive(Debug, Error)]
pub enum StatsError {
  /// No runs recorded for the requested workflow.
  #[error("no statistics recorded for workflow {workflow_id}")]
  NotFound { workflow_id: i64 },

  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("migration error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),
}
