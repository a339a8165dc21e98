// Contract between the search and whatever solves its linear relaxations.
// The search only ever talks to this trait; backends live in `crate::solver`.

use super::models::{OptimizationProblem, Solution, VariableBounds};

/// Error types for the oracle
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    #[error("Solver not available: {0}")]
    SolverNotAvailable(String),

    #[error("Solver execution failed: {0}")]
    ExecutionFailed(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Solves continuous relaxations of a linear model.
///
/// `solve_relaxation` ignores integrality: every variable is treated as
/// continuous inside the supplied bounds. Infeasibility is a regular
/// answer (`SolutionStatus::Infeasible`); numerical trouble is an `Err`.
pub trait RelaxationOracle: Send + Sync {
    /// Solve the LP relaxation of `problem` under per-variable `bounds`
    fn solve_relaxation(
        &self,
        problem: &OptimizationProblem,
        bounds: &[VariableBounds],
    ) -> Result<Solution>;

    /// Solve `problem` with integrality enforced by the backend itself
    fn solve_integer(&self, _problem: &OptimizationProblem) -> Result<Solution> {
        Err(SolverError::SolverNotAvailable(format!(
            "{} does not solve mixed-integer models",
            self.name()
        )))
    }

    /// Validate a problem and its bounds without solving it
    fn validate(&self, problem: &OptimizationProblem, bounds: &[VariableBounds]) -> Result<()> {
        let mut errors = Vec::new();

        if problem.objective.coefficients.is_empty() {
            errors.push("Objective must have at least one coefficient".to_string());
        }

        let num_vars = problem.num_variables();

        if problem.variables.len() != num_vars {
            errors.push(format!(
                "Number of variables ({}) doesn't match objective coefficients ({})",
                problem.variables.len(),
                num_vars
            ));
        }

        if bounds.len() != num_vars {
            errors.push(format!(
                "Got {} variable bounds for {} variables",
                bounds.len(),
                num_vars
            ));
        }

        for (i, constraint) in problem.constraints.iter().enumerate() {
            if constraint.num_variables() != num_vars {
                errors.push(format!(
                    "Constraint {} '{}' has {} coefficients but problem has {} variables",
                    i,
                    constraint.name,
                    constraint.num_variables(),
                    num_vars
                ));
            }
        }

        for (i, (var, b)) in problem.variables.iter().zip(bounds).enumerate() {
            if b.lower.is_nan() || b.upper.is_nan() || b.lower > b.upper {
                errors.push(format!(
                    "Variable {} '{}' has lower bound ({}) > upper bound ({})",
                    i, var.name, b.lower, b.upper
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SolverError::InvalidProblem(errors.join("; ")))
        }
    }

    /// Name of this backend
    fn name(&self) -> &str;

    /// Whether `solve_integer` is implemented
    fn supports_mip(&self) -> bool;
}
