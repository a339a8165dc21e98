use super::good_lp_model::solve_with;
use crate::domain::{
    models::{OptimizationProblem, Solution, VariableBounds},
    relaxation_oracle::{RelaxationOracle, Result},
};
use good_lp::solvers::coin_cbc::coin_cbc;

/// COIN-OR CBC through good_lp. Also solves the full MILP.
pub struct CoinCbcSolver;

impl CoinCbcSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CoinCbcSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl RelaxationOracle for CoinCbcSolver {
    fn solve_relaxation(
        &self,
        problem: &OptimizationProblem,
        bounds: &[VariableBounds],
    ) -> Result<Solution> {
        self.validate(problem, bounds)?;
        solve_with(coin_cbc, problem, bounds, false)
    }

    fn solve_integer(&self, problem: &OptimizationProblem) -> Result<Solution> {
        let bounds = problem.declared_bounds();
        self.validate(problem, &bounds)?;
        solve_with(coin_cbc, problem, &bounds, true)
    }

    fn name(&self) -> &str {
        "COIN-OR CBC"
    }

    fn supports_mip(&self) -> bool {
        true
    }
}
