use std::collections::BTreeMap;

use cadence_workflow::{StepType, WorkflowStatus};
use serde::Serialize;
use serde_json::{Map, Value};

/// Author identity as exposed on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireAuthor {
  pub id: i64,
  pub name: String,
}

/// A step's outgoing edge on the wire. The source step is implied by the
/// parent; `condition` is dropped from the JSON when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireNextStep {
  pub id: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub condition: Option<String>,
}

/// One step of the graph, with its adjacency list. No traversal beyond one
/// hop: cycles and shared targets are representable as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireStep {
  pub id: String,
  #[serde(rename = "type")]
  pub step_type: StepType,
  pub key: String,
  pub args: Map<String, Value>,
  pub next_steps: Vec<WireNextStep>,
}

/// Full detail view of a workflow.
///
/// `activated_at` serializes as an explicit `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireWorkflow {
  pub id: i64,
  pub name: String,
  pub status: WorkflowStatus,
  pub created_at: String,
  pub updated_at: String,
  pub activated_at: Option<String>,
  pub author: WireAuthor,
  pub stats: BTreeMap<String, i64>,
  pub steps: Vec<WireStep>,
}

/// Condensed list view. The step graph is never expanded here: the field
/// does not exist on the type, so `steps` is absent from the JSON rather
/// than empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireWorkflowListItem {
  pub id: i64,
  pub name: String,
  pub status: WorkflowStatus,
  pub created_at: String,
  pub updated_at: String,
  pub activated_at: Option<String>,
  pub author: WireAuthor,
  pub stats: BTreeMap<String, i64>,
}
