// Domain layer: linear models and the relaxation oracle contract
pub mod domain;

// Scheduling core: instance, formulation, branch-and-bound, extraction
pub mod scheduling;

// Application layer: use cases and wire mapping
pub mod application;

// Infrastructure layer: configuration files and logging
pub mod infrastructure;

// Solver adapters: concrete implementations of RelaxationOracle
pub mod solver;

// Re-export commonly used types
pub use domain::{
    Constraint, ConstraintType, ObjectiveFunction, OptimizationProblem, RelaxationOracle, Solution,
    SolutionStatus, SolverBackend, SolverError, Variable, VariableBounds, VariableType,
};

pub use scheduling::{
    BranchAndBound, BranchingRule, CancellationToken, Formulation, Instance, Job, NodeSelection,
    Objective, Schedule, ScheduleExtractor, ScheduledJob, SchedulingError, SearchConfig,
    SearchOutcome, SearchStatistics,
};

pub use application::{ScheduleReport, SchedulingService, SolveStrategy};

pub use infrastructure::{init_tracing, load_instance, AppConfig};

pub use solver::{MicroLpSolver, SolverFactory};

#[cfg(feature = "coin_cbc")]
pub use solver::CoinCbcSolver;

#[cfg(feature = "highs")]
pub use solver::HighsSolver;
