use crate::domain::SolverError;

/// Failures of the scheduling pipeline.
///
/// Budget exhaustion is not listed: a search stopped by its budget still
/// returns its incumbent together with the remaining gap.
#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    /// Job data broke a precondition; raised before any solving
    #[error("Invalid instance: {0}")]
    InvalidInstance(String),

    /// The oracle failed numerically on the root relaxation
    #[error("Relaxation failed at the root node: {0}")]
    RelaxationFailure(String),

    /// Well-formed data, but no schedule satisfies the model
    #[error("Instance is infeasible: {0}")]
    InfeasibleInstance(String),

    /// The extracted assignment broke a schedule invariant
    #[error("Infeasible schedule: {0}")]
    InfeasibleSchedule(String),

    /// The budget ran out before any feasible schedule was known
    #[error("Search stopped after {nodes} nodes without a feasible schedule")]
    NoSolution { nodes: u64 },

    #[error(transparent)]
    Solver(#[from] SolverError),
}

pub type Result<T> = std::result::Result<T, SchedulingError>;
