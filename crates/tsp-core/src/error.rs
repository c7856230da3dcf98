//! The solver's error taxonomy. `Transient` signals are deliberately *not* part of this
//! enum: they are absorbed inside the separator/branch layer as plain `Option`/status returns,
//! never constructed as errors.

use thiserror::Error;

use crate::{distance::Distance, node::Node};

/// A fatal, propagating solver error. Any variant here terminates the loop driver that observes
/// it and bubbles up to the caller.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("malformed input: {0}")]
    BadInput(String),

    #[error("LP solver reported an unexpected status: {0}")]
    LpFailure(String),

    #[error("invariant breach: {0}")]
    InvariantBreach(String),
}

impl SolveError {
    pub fn invariant(msg: impl Into<String>) -> Self {
        SolveError::InvariantBreach(msg.into())
    }

    pub fn bad_input(msg: impl Into<String>) -> Self {
        SolveError::BadInput(msg.into())
    }
}

/// A non-fatal timeout: the cooperative budget (wall clock, node limit, augment count) expired.
/// Carries the best tour known at the time so it can be surfaced to the caller.
#[derive(Debug, Clone)]
pub struct Timeout {
    pub best_length: Distance,
    pub best_tour_nodes: Vec<Node>,
}

pub type SolveResult<T> = Result<T, SolveError>;
