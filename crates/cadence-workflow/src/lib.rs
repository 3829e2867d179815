//! Cadence Workflow
//!
//! This crate contains the workflow snapshot model for Cadence: a workflow
//! is a directed graph of typed steps connected by ordered, optionally
//! labelled "next step" edges, plus lifecycle metadata and an author
//! snapshot.
//!
//! Snapshots are produced by the editing component and hydrated from
//! storage; this crate never creates or mutates them. It owns the model
//! invariants (unique step ids, resolvable edges, timestamp ordering) and
//! a derived adjacency view for graph inspection.

mod error;
mod graph;
mod step;
mod workflow;

pub use error::WorkflowError;
pub use graph::Graph;
pub use step::{NextStep, Step, StepType};
pub use workflow::{UserRef, Workflow, WorkflowStatus};
