//! Common utilities and shared types for the durable workspace.
//!
//! This crate provides configuration handling, input parsing, dataset
//! preparation and the scenario test cases used across the project.

mod config;
mod dataset;
mod error;
mod input;
mod labels;
mod test_cases;

pub use crate::config::*;
pub use crate::dataset::*;
pub use crate::error::*;
pub use crate::input::*;
pub use crate::labels::*;
pub use crate::test_cases::*;

/// Raw data vertex identifier, as read from the temporal edge list.
pub type VertexId = u64;

/// Snapshot index at which an edge is observed.
pub type Timestamp = u64;
