use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Status of a single workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum RunStatus {
  Running,
  Completed,
  Failed,
  Cancelled,
}

/// A workflow run as recorded by the execution tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WorkflowRun {
  pub run_id: String,
  pub workflow_id: i64,
  pub status: RunStatus,
  pub created_at: DateTime<Utc>,
}

/// Aggregate run counters for one workflow.
///
/// Counters are a flat field -> number mapping (per-status counts plus
/// `total`), which is exactly the shape the wire format wants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStatistics {
  pub workflow_id: i64,
  pub counters: BTreeMap<String, i64>,
}

impl WorkflowStatistics {
  /// Zeroed statistics for a workflow with no recorded runs.
  pub fn empty(workflow_id: i64) -> Self {
    let mut counters = BTreeMap::new();
    counters.insert("total".to_string(), 0);
    Self {
      workflow_id,
      counters,
    }
  }

  /// Total number of recorded runs.
  pub fn total(&self) -> i64 {
    self.counters.get("total").copied().unwrap_or(0)
  }
}
