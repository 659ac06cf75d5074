//! Error types for the solving engine.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// The asserted constraints cannot all hold at once.
    #[error("contradiction: no assignment satisfies the problem")]
    Contradiction,

    /// The search ran out of steps before finding an assignment.
    #[error("search gave up after {steps} steps")]
    Timeout { steps: usize },
}

/// Result type for solver operations
pub type Result<T> = std::result::Result<T, SolverError>;
