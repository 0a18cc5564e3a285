//! Task-load validation errors.
//!
//! Geometry operations themselves never fail; degenerate input resolves to
//! degenerate results. Errors exist only at the descriptor boundary where
//! the task editor hands over data.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TaskError {
    #[error("task has no turnpoints")]
    EmptyTask,

    #[error("turnpoint {index} has a non-finite or out-of-range coordinate")]
    InvalidCoordinate { index: usize },

    #[error("turnpoint {index} has an invalid zone: {reason}")]
    InvalidZone { index: usize, reason: String },
}
