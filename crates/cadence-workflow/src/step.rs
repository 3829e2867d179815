use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Category of a step within the workflow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
  Trigger,
  Action,
}

/// A directed edge from a step to another step in the same workflow.
///
/// Edge order within a step is significant: it encodes branch priority and
/// display order. Multiple edges represent branching; zero edges mark a
/// terminal step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextStep {
  /// Target step id.
  pub id: String,
  /// Optional branch label (e.g. a condition slot).
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub condition: Option<String>,
}

/// A typed node in a workflow's control graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
  /// Step id, unique within its owning workflow.
  pub id: String,
  #[serde(rename = "type")]
  pub step_type: StepType,
  /// Identifies the concrete behavior within the step type.
  pub key: String,
  /// Opaque configuration payload. Never interpreted by this crate;
  /// type-specific validation belongs to the step implementations.
  #[serde(default)]
  pub args: Map<String, Value>,
  /// Ordered outgoing edges.
  #[serde(default)]
  pub next_steps: Vec<NextStep>,
}

impl Step {
  /// True when the step has no outgoing edges.
  pub fn is_terminal(&self) -> bool {
    self.next_steps.is_empty()
  }
}
