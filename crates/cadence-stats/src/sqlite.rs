use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::StatsError;
use crate::types::{WorkflowRun, WorkflowStatistics};
use crate::StatisticsStore;

/// SQLite-backed statistics store.
pub struct SqliteStatisticsStore {
  pool: SqlitePool,
}

impl SqliteStatisticsStore {
  /// Create a new store with the given connection pool.
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  /// Open (or create) the statistics database at `path` and run migrations.
  pub async fn open(path: &Path) -> Result<Self, StatsError> {
    let options = SqliteConnectOptions::new()
      .filename(path)
      .create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await?;
    let store = Self::new(pool);
    store.migrate().await?;
    Ok(store)
  }

  /// Run database migrations.
  pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(&self.pool).await
  }

  /// Record a run. Called by the execution tracker; the read-model side
  /// never writes.
  pub async fn record_run(&self, run: &WorkflowRun) -> Result<(), StatsError> {
    sqlx::query(
      r#"
            INSERT INTO workflow_runs (run_id, workflow_id, status, created_at)
            VALUES (?, ?, ?, ?)
            "#,
    )
    .bind(&run.run_id)
    .bind(run.workflow_id)
    .bind(run.status)
    .bind(run.created_at)
    .execute(&self.pool)
    .await?;

    Ok(())
  }
}

impl StatisticsStore for SqliteStatisticsStore {
  async fn get_stats(&self, workflow_id: i64) -> Result<WorkflowStatistics, StatsError> {
    let rows = sqlx::query(
      r#"
            SELECT status, COUNT(*) AS count
            FROM workflow_runs
            WHERE workflow_id = ?
            GROUP BY status
            "#,
    )
    .bind(workflow_id)
    .fetch_all(&self.pool)
    .await?;

    if rows.is_empty() {
      return Err(StatsError::NotFound { workflow_id });
    }

    let mut stats = WorkflowStatistics::empty(workflow_id);
    for row in rows {
      let status: String = row.get("status");
      let count: i64 = row.get("count");
      stats.counters.insert(status, count);
      *stats.counters.entry("total".to_string()).or_insert(0) += count;
    }

    Ok(stats)
  }

  async fn get_stats_for_many(
    &self,
    workflow_ids: &BTreeSet<i64>,
  ) -> Result<HashMap<i64, WorkflowStatistics>, StatsError> {
    if workflow_ids.is_empty() {
      return Ok(HashMap::new());
    }

    // One bulk query for the whole id set, never a per-id loop.
    let placeholders = vec!["?"; workflow_ids.len()].join(", ");
    let sql = format!(
      "SELECT workflow_id, status, COUNT(*) AS count \
             FROM workflow_runs \
             WHERE workflow_id IN ({placeholders}) \
             GROUP BY workflow_id, status"
    );

    let mut query = sqlx::query(&sql);
    for workflow_id in workflow_ids {
      query = query.bind(*workflow_id);
    }
    let rows = query.fetch_all(&self.pool).await?;

    debug!(
      requested = workflow_ids.len(),
      rows = rows.len(),
      "batched statistics lookup"
    );

    // Every requested id gets an entry; ids with no runs stay zeroed.
    let mut stats: HashMap<i64, WorkflowStatistics> = workflow_ids
      .iter()
      .map(|id| (*id, WorkflowStatistics::empty(*id)))
      .collect();

    for row in rows {
      let workflow_id: i64 = row.get("workflow_id");
      let status: String = row.get("status");
      let count: i64 = row.get("count");

      if let Some(entry) = stats.get_mut(&workflow_id) {
        entry.counters.insert(status, count);
        *entry.counters.entry("total".to_string()).or_insert(0) += count;
      }
    }

    Ok(stats)
  }
}
