use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::graph::Graph;
use crate::step::Step;

/// Lifecycle status of a workflow. The member set is owned by the editing
/// domain; this crate only carries it through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
  Draft,
  Active,
  Deactivated,
}

/// Read-only snapshot of the external identity that authored a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
  pub id: i64,
  pub display_name: String,
}

/// A fully hydrated workflow snapshot: scalar metadata, author, and the
/// ordered step graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
  /// Globally unique, never reassigned.
  pub id: i64,
  pub name: String,
  pub status: WorkflowStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  /// Present iff the workflow has ever reached an active-eligible status.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub activated_at: Option<DateTime<Utc>>,
  pub author: UserRef,
  /// Ordered steps; order is display/declaration order, not execution order.
  pub steps: Vec<Step>,
}

impl Workflow {
  /// Build the adjacency view of the step graph.
  pub fn graph(&self) -> Graph {
    Graph::new(&self.steps)
  }

  /// Get a step by id.
  pub fn get_step(&self, step_id: &str) -> Option<&Step> {
    self.steps.iter().find(|step| step.id == step_id)
  }

  /// Check the snapshot invariants.
  ///
  /// Callers that project a snapshot must reject invalid input up front
  /// rather than emit a malformed record:
  /// - step ids are unique within the workflow
  /// - every next-step edge resolves to a step in the same workflow
  /// - `updated_at` does not precede `created_at`
  pub fn validate(&self) -> Result<(), WorkflowError> {
    if self.updated_at < self.created_at {
      return Err(WorkflowError::TimestampOrder { workflow_id: self.id });
    }

    let mut step_ids: HashSet<&str> = HashSet::with_capacity(self.steps.len());
    for step in &self.steps {
      if !step_ids.insert(step.id.as_str()) {
        return Err(WorkflowError::DuplicateStepId {
          step_id: step.id.clone(),
        });
      }
    }

    for step in &self.steps {
      for next in &step.next_steps {
        if !step_ids.contains(next.id.as_str()) {
          return Err(WorkflowError::DanglingNextStep {
            from: step.id.clone(),
            to: next.id.clone(),
          });
        }
      }
    }

    Ok(())
  }
}
