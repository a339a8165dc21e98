use super::good_lp_model::solve_with;
use crate::domain::{
    models::{OptimizationProblem, Solution, VariableBounds},
    relaxation_oracle::{RelaxationOracle, Result},
};
use good_lp::solvers::microlp::microlp;

/// Pure-Rust simplex backend, always compiled in.
pub struct MicroLpSolver;

impl MicroLpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MicroLpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl RelaxationOracle for MicroLpSolver {
    fn solve_relaxation(
        &self,
        problem: &OptimizationProblem,
        bounds: &[VariableBounds],
    ) -> Result<Solution> {
        self.validate(problem, bounds)?;
        solve_with(microlp, problem, bounds, false)
    }

    fn name(&self) -> &str {
        "microlp"
    }

    fn supports_mip(&self) -> bool {
        false
    }
}
