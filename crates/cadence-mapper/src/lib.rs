//! Cadence Mapper
//!
//! Pure projection of workflow snapshots plus their run statistics into
//! stable wire records, ready to be handed to an HTTP handler or any other
//! outer boundary.
//!
//! Two views share one projection:
//! - the full detail view expands the step graph as per-step adjacency
//!   lists
//! - the list view omits the step graph entirely and fetches statistics
//!   for the whole list with a single batched lookup
//!
//! The mapper never mutates its inputs, never substitutes defaults for
//! failed lookups, and never retries.

mod error;
mod mapper;
mod wire;

pub use error::MapperError;
pub use mapper::WorkflowMapper;
pub use wire::{WireAuthor, WireNextStep, WireStep, WireWorkflow, WireWorkflowListItem};
