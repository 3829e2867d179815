use std::collections::HashMap;

use crate::step::Step;

/// Adjacency view of a workflow's step graph.
///
/// Built per call from a snapshot's steps; edge order is preserved from the
/// declaration order of each step's `next_steps`.
#[derive(Debug, Clone)]
pub struct Graph {
  /// Adjacency list: step_id -> ordered downstream step ids.
  adjacency: HashMap<String, Vec<String>>,
  /// Reverse adjacency: step_id -> upstream step ids.
  reverse_adjacency: HashMap<String, Vec<String>>,
  /// Steps with no incoming edges.
  entry_points: Vec<String>,
  /// Steps with no outgoing edges.
  terminal_points: Vec<String>,
}

impl Graph {
  /// Build a graph from a workflow's steps.
  pub fn new(steps: &[Step]) -> Self {
    let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
    let mut reverse_adjacency: HashMap<String, Vec<String>> = HashMap::new();

    // Initialize all steps
    for step in steps {
      adjacency.entry(step.id.clone()).or_default();
      reverse_adjacency.entry(step.id.clone()).or_default();
    }

    // Build adjacency lists
    for step in steps {
      for next in &step.next_steps {
        adjacency
          .entry(step.id.clone())
          .or_default()
          .push(next.id.clone());
        reverse_adjacency
          .entry(next.id.clone())
          .or_default()
          .push(step.id.clone());
      }
    }

    // Entry points (no incoming edges), in step declaration order
    let entry_points: Vec<String> = steps
      .iter()
      .filter(|step| {
        reverse_adjacency
          .get(&step.id)
          .is_none_or(|incoming| incoming.is_empty())
      })
      .map(|step| step.id.clone())
      .collect();

    // Terminal points (no outgoing edges), in step declaration order
    let terminal_points: Vec<String> = steps
      .iter()
      .filter(|step| {
        adjacency
          .get(&step.id)
          .is_none_or(|outgoing| outgoing.is_empty())
      })
      .map(|step| step.id.clone())
      .collect();

    Self {
      adjacency,
      reverse_adjacency,
      entry_points,
      terminal_points,
    }
  }

  /// Get entry points (steps with no incoming edges).
  pub fn entry_points(&self) -> &[String] {
    &self.entry_points
  }

  /// Get terminal points (steps with no outgoing edges).
  pub fn terminal_points(&self) -> &[String] {
    &self.terminal_points
  }

  /// Get downstream steps for a given step, in edge-declaration order.
  pub fn downstream(&self, step_id: &str) -> &[String] {
    self
      .adjacency
      .get(step_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  /// Get upstream steps for a given step.
  pub fn upstream(&self, step_id: &str) -> &[String] {
    self
      .reverse_adjacency
      .get(step_id)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }
}
