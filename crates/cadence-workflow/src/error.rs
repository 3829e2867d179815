use thiserror::Error;

/// Invariant violations in a workflow snapshot.
#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("duplicate step id: {step_id}")]
  DuplicateStepId { step_id: String },

  #[error("next step references unknown step: from={from}, to={to}")]
  DanglingNextStep { from: String, to: String },

  #[error("workflow {workflow_id}: updated_at precedes created_at")]
  TimestampOrder { workflow_id: i64 },
}
