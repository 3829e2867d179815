use std::collections::BTreeSet;

use cadence_stats::{StatisticsStore, WorkflowStatistics};
use cadence_workflow::{Step, Workflow};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::error::MapperError;
use crate::wire::{WireAuthor, WireNextStep, WireStep, WireWorkflow, WireWorkflowListItem};

/// Projects workflow snapshots and their run statistics into wire records.
///
/// The mapper is stateless per call and safe to share across concurrent
/// projections; it holds only the statistics store it reads from.
pub struct WorkflowMapper<S> {
  stats: S,
}

impl<S: StatisticsStore> WorkflowMapper<S> {
  /// Create a mapper over the given statistics store.
  pub fn new(stats: S) -> Self {
    Self { stats }
  }

  /// Project one workflow into the full detail view.
  ///
  /// Validates the snapshot, fetches its statistics with a single lookup,
  /// and emits scalars, timestamps, author, the stats mapping and the step
  /// graph in declaration order. A failed statistics lookup propagates;
  /// nothing is zero-filled.
  pub async fn build_workflow(&self, workflow: &Workflow) -> Result<WireWorkflow, MapperError> {
    workflow.validate()?;
    let stats = self.stats.get_stats(workflow.id).await?;

    Ok(WireWorkflow {
      id: workflow.id,
      name: workflow.name.clone(),
      status: workflow.status,
      created_at: format_timestamp(&workflow.created_at),
      updated_at: format_timestamp(&workflow.updated_at),
      activated_at: workflow.activated_at.as_ref().map(format_timestamp),
      author: build_author(workflow),
      stats: stats.counters,
      steps: workflow.steps.iter().map(build_step).collect(),
    })
  }

  /// Project workflows into the condensed list view, in input order.
  ///
  /// Statistics for the whole list come from exactly one batched lookup,
  /// regardless of list length; duplicate ids collapse into one requested
  /// key. If the batch result misses a requested id the projection fails
  /// as a whole instead of emitting a zeroed record.
  pub async fn build_workflow_list(
    &self,
    workflows: &[Workflow],
  ) -> Result<Vec<WireWorkflowListItem>, MapperError> {
    if workflows.is_empty() {
      return Ok(Vec::new());
    }

    for workflow in workflows {
      workflow.validate()?;
    }

    let ids: BTreeSet<i64> = workflows.iter().map(|workflow| workflow.id).collect();
    let stats = self.stats.get_stats_for_many(&ids).await?;

    debug!(
      workflows = workflows.len(),
      distinct = ids.len(),
      "projecting workflow list"
    );

    workflows
      .iter()
      .map(|workflow| {
        let stats = stats
          .get(&workflow.id)
          .ok_or(MapperError::MissingStatistics {
            workflow_id: workflow.id,
          })?;
        Ok(build_list_item(workflow, stats))
      })
      .collect()
  }
}

/// ISO-8601 with an explicit UTC offset, e.g. `2024-01-15T10:30:00+00:00`.
fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
  timestamp.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn build_author(workflow: &Workflow) -> WireAuthor {
  WireAuthor {
    id: workflow.author.id,
    name: workflow.author.display_name.clone(),
  }
}

fn build_step(step: &Step) -> WireStep {
  WireStep {
    id: step.id.clone(),
    step_type: step.step_type,
    key: step.key.clone(),
    args: step.args.clone(),
    next_steps: step
      .next_steps
      .iter()
      .map(|next| WireNextStep {
        id: next.id.clone(),
        condition: next.condition.clone(),
      })
      .collect(),
  }
}

fn build_list_item(workflow: &Workflow, stats: &WorkflowStatistics) -> WireWorkflowListItem {
  WireWorkflowListItem {
    id: workflow.id,
    name: workflow.name.clone(),
    status: workflow.status,
    created_at: format_timestamp(&workflow.created_at),
    updated_at: format_timestamp(&workflow.updated_at),
    activated_at: workflow.activated_at.as_ref().map(format_timestamp),
    author: build_author(workflow),
    stats: stats.counters.clone(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use cadence_stats::StatsError;
  use cadence_workflow::{NextStep, StepType, UserRef, WorkflowStatus};
  use chrono::TimeZone;
  use std::collections::{BTreeMap, HashMap};
  use std::sync::atomic::{AtomicUsize, Ordering};

  /// Mock statistics store with call counters.
  struct MockStatsStore {
    stats: HashMap<i64, WorkflowStatistics>,
    single_calls: AtomicUsize,
    batch_calls: AtomicUsize,
  }

  impl MockStatsStore {
    fn new() -> Self {
      Self {
        stats: HashMap::new(),
        single_calls: AtomicUsize::new(0),
        batch_calls: AtomicUsize::new(0),
      }
    }

    fn with_counters(mut self, workflow_id: i64, counters: &[(&str, i64)]) -> Self {
      let counters: BTreeMap<String, i64> = counters
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect();
      self.stats.insert(
        workflow_id,
        WorkflowStatistics {
          workflow_id,
          counters,
        },
      );
      self
    }
  }

  impl StatisticsStore for MockStatsStore {
    async fn get_stats(&self, workflow_id: i64) -> Result<WorkflowStatistics, StatsError> {
      self.single_calls.fetch_add(1, Ordering::SeqCst);
      self
        .stats
        .get(&workflow_id)
        .cloned()
        .ok_or(StatsError::NotFound { workflow_id })
    }

    async fn get_stats_for_many(
      &self,
      workflow_ids: &BTreeSet<i64>,
    ) -> Result<HashMap<i64, WorkflowStatistics>, StatsError> {
      self.batch_calls.fetch_add(1, Ordering::SeqCst);
      // Deliberately returns only the ids it knows about, so tests can
      // simulate a contract-violating aggregator.
      Ok(
        workflow_ids
          .iter()
          .filter_map(|id| self.stats.get(id).map(|stats| (*id, stats.clone())))
          .collect(),
      )
    }
  }

  fn step(id: &str, step_type: StepType, next: &[&str]) -> Step {
    Step {
      id: id.to_string(),
      step_type,
      key: format!("core:{id}"),
      args: serde_json::Map::new(),
      next_steps: next
        .iter()
        .map(|to| NextStep {
          id: to.to_string(),
          condition: None,
        })
        .collect(),
    }
  }

  fn workflow(id: i64, name: &str, steps: Vec<Step>) -> Workflow {
    let created_at = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
    Workflow {
      id,
      name: name.to_string(),
      status: WorkflowStatus::Active,
      created_at,
      updated_at: created_at,
      activated_at: None,
      author: UserRef {
        id: 3,
        display_name: "Ada".to_string(),
      },
      steps,
    }
  }

  #[tokio::test]
  async fn single_view_projects_scalars_stats_and_steps() {
    let store = MockStatsStore::new().with_counters(5, &[("sent", 100), ("opened", 40)]);
    let mapper = WorkflowMapper::new(store);

    let wf = workflow(
      5,
      "Welcome Series",
      vec![
        step("t1", StepType::Trigger, &["s2"]),
        step("s2", StepType::Action, &[]),
      ],
    );
    let wire = mapper.build_workflow(&wf).await.unwrap();

    assert_eq!(wire.id, 5);
    assert_eq!(wire.name, "Welcome Series");
    assert_eq!(wire.status, WorkflowStatus::Active);
    assert_eq!(wire.created_at, "2024-01-15T10:30:00+00:00");
    assert_eq!(wire.author.id, 3);
    assert_eq!(wire.author.name, "Ada");

    let expected: BTreeMap<String, i64> =
      [("sent".to_string(), 100), ("opened".to_string(), 40)]
        .into_iter()
        .collect();
    assert_eq!(wire.stats, expected);

    assert_eq!(wire.steps.len(), 2);
    assert_eq!(wire.steps[0].id, "t1");
    assert_eq!(wire.steps[0].next_steps.len(), 1);
    assert_eq!(wire.steps[0].next_steps[0].id, "s2");
    assert!(wire.steps[1].next_steps.is_empty());
  }

  #[tokio::test]
  async fn step_and_edge_order_is_declaration_order() {
    let store = MockStatsStore::new().with_counters(1, &[("total", 0)]);
    let mapper = WorkflowMapper::new(store);

    let wf = workflow(
      1,
      "ordered",
      vec![
        step("b", StepType::Trigger, &["c", "a"]),
        step("c", StepType::Action, &[]),
        step("a", StepType::Action, &[]),
      ],
    );
    let wire = mapper.build_workflow(&wf).await.unwrap();

    let step_ids: Vec<&str> = wire.steps.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(step_ids, ["b", "c", "a"]);

    let edge_ids: Vec<&str> = wire.steps[0]
      .next_steps
      .iter()
      .map(|next| next.id.as_str())
      .collect();
    assert_eq!(edge_ids, ["c", "a"]);
  }

  #[tokio::test]
  async fn activated_at_serializes_as_explicit_null_when_absent() {
    let store = MockStatsStore::new().with_counters(1, &[("total", 0)]);
    let mapper = WorkflowMapper::new(store);

    let wf = workflow(1, "draft", vec![]);
    let wire = mapper.build_workflow(&wf).await.unwrap();
    assert!(wire.activated_at.is_none());

    let json = serde_json::to_value(&wire).unwrap();
    assert!(json["activated_at"].is_null());
    assert!(json.get("activated_at").is_some());
  }

  #[tokio::test]
  async fn activated_at_is_formatted_when_present() {
    let store = MockStatsStore::new().with_counters(1, &[("total", 0)]);
    let mapper = WorkflowMapper::new(store);

    let mut wf = workflow(1, "active", vec![]);
    wf.activated_at = Some(Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap());
    let wire = mapper.build_workflow(&wf).await.unwrap();

    assert_eq!(wire.activated_at.as_deref(), Some("2024-02-01T08:00:00+00:00"));
  }

  #[tokio::test]
  async fn missing_statistics_propagate_as_not_found() {
    let mapper = WorkflowMapper::new(MockStatsStore::new());

    let wf = workflow(9, "no stats", vec![]);
    let err = mapper.build_workflow(&wf).await.unwrap_err();
    assert!(matches!(
      err,
      MapperError::Stats(StatsError::NotFound { workflow_id: 9 })
    ));
  }

  #[tokio::test]
  async fn invalid_snapshot_is_rejected_before_any_lookup() {
    let store = MockStatsStore::new().with_counters(1, &[("total", 0)]);
    let mapper = WorkflowMapper::new(store);

    let wf = workflow(1, "bad", vec![step("t1", StepType::Trigger, &["missing"])]);
    let err = mapper.build_workflow(&wf).await.unwrap_err();
    assert!(matches!(err, MapperError::InvalidWorkflow(_)));
    assert_eq!(mapper.stats.single_calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn empty_list_makes_no_statistics_calls() {
    let mapper = WorkflowMapper::new(MockStatsStore::new());

    let items = mapper.build_workflow_list(&[]).await.unwrap();
    assert!(items.is_empty());
    assert_eq!(mapper.stats.single_calls.load(Ordering::SeqCst), 0);
    assert_eq!(mapper.stats.batch_calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn list_view_uses_exactly_one_batched_call() {
    let store = MockStatsStore::new()
      .with_counters(1, &[("total", 2)])
      .with_counters(2, &[("total", 5)]);
    let mapper = WorkflowMapper::new(store);

    // Three inputs, two distinct ids.
    let workflows = vec![
      workflow(1, "first", vec![]),
      workflow(2, "second", vec![]),
      workflow(1, "first again", vec![]),
    ];
    let items = mapper.build_workflow_list(&workflows).await.unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].id, 1);
    assert_eq!(items[1].id, 2);
    assert_eq!(items[2].id, 1);
    assert_eq!(items[0].stats.get("total"), Some(&2));
    assert_eq!(items[2].stats.get("total"), Some(&2));

    assert_eq!(mapper.stats.batch_calls.load(Ordering::SeqCst), 1);
    assert_eq!(mapper.stats.single_calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn batch_result_missing_an_id_fails_the_whole_projection() {
    let store = MockStatsStore::new().with_counters(5, &[("total", 1)]);
    let mapper = WorkflowMapper::new(store);

    let workflows = vec![workflow(5, "known", vec![]), workflow(7, "unknown", vec![])];
    let err = mapper.build_workflow_list(&workflows).await.unwrap_err();

    assert!(matches!(
      err,
      MapperError::MissingStatistics { workflow_id: 7 }
    ));
  }

  #[tokio::test]
  async fn list_item_json_has_no_steps_key() {
    let store = MockStatsStore::new().with_counters(1, &[("total", 0)]);
    let mapper = WorkflowMapper::new(store);

    let workflows = vec![workflow(
      1,
      "with steps",
      vec![step("t1", StepType::Trigger, &[])],
    )];
    let items = mapper.build_workflow_list(&workflows).await.unwrap();

    let json = serde_json::to_value(&items[0]).unwrap();
    assert!(json.get("steps").is_none());
    assert_eq!(json["status"], "active");
  }

  #[tokio::test]
  async fn edge_condition_is_carried_verbatim() {
    let store = MockStatsStore::new().with_counters(1, &[("total", 0)]);
    let mapper = WorkflowMapper::new(store);

    let mut branch = step("t1", StepType::Trigger, &["yes", "no"]);
    branch.next_steps[0].condition = Some("matched".to_string());
    let wf = workflow(
      1,
      "branching",
      vec![
        branch,
        step("yes", StepType::Action, &[]),
        step("no", StepType::Action, &[]),
      ],
    );
    let wire = mapper.build_workflow(&wf).await.unwrap();

    assert_eq!(
      wire.steps[0].next_steps[0].condition.as_deref(),
      Some("matched")
    );
    assert!(wire.steps[0].next_steps[1].condition.is_none());

    // Absent condition is dropped from the JSON entirely.
    let json = serde_json::to_value(&wire).unwrap();
    assert!(json["steps"][0]["next_steps"][1].get("condition").is_none());
  }
}
