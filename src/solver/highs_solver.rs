// HiGHS adapter
// Translates the domain model to the HiGHS row-wise API

use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution, SolverStatistics, VariableBounds},
    relaxation_oracle::{RelaxationOracle, Result, SolverError},
    value_objects::{ConstraintType, SolutionStatus as DomainSolutionStatus},
};
use highs::{HighsModelStatus, RowProblem, Sense};
use std::time::Instant;

pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        Self
    }

    fn run(
        &self,
        problem: &OptimizationProblem,
        bounds: &[VariableBounds],
        integral: bool,
    ) -> Result<DomainSolution> {
        let start_time = Instant::now();

        let mut pb = RowProblem::default();
        let mut cols = Vec::with_capacity(bounds.len());

        for (i, (var_def, b)) in problem.variables.iter().zip(bounds).enumerate() {
            let obj_coeff = problem.objective.coefficients.get(i).copied().unwrap_or(0.0);
            let col = if integral && var_def.is_integer() {
                pb.add_integer_column(obj_coeff, b.lower..=b.upper)
            } else {
                pb.add_column(obj_coeff, b.lower..=b.upper)
            };
            cols.push(col);
        }

        for constraint in &problem.constraints {
            let mut terms = Vec::new();
            for (i, &coeff) in constraint.coefficients.iter().enumerate() {
                if coeff != 0.0 && i < cols.len() {
                    terms.push((cols[i], coeff));
                }
            }

            match constraint.constraint_type {
                ConstraintType::LessThanOrEqual => {
                    pb.add_row(..=constraint.bound, &terms);
                }
                ConstraintType::Equal => {
                    pb.add_row(constraint.bound..=constraint.bound, &terms);
                }
                ConstraintType::GreaterThanOrEqual => {
                    pb.add_row(constraint.bound.., &terms);
                }
            }
        }

        let solved = pb.optimise(Sense::Minimise).solve();

        let mut statistics = SolverStatistics::for_problem(problem, integral);
        statistics.solve_time_ms = start_time.elapsed().as_secs_f64() * 1000.0;

        match solved.status() {
            HighsModelStatus::Optimal => {
                let variable_values = solved.get_solution().columns().to_vec();
                let actual_obj = problem.objective.evaluate(&variable_values);

                let mut solution = DomainSolution::optimal(actual_obj, variable_values)
                    .with_statistics(statistics);
                solution.message = format!("Optimal solution found for '{}'", problem.name);
                Ok(solution)
            }
            HighsModelStatus::Infeasible => {
                Ok(DomainSolution::infeasible().with_statistics(statistics))
            }
            HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
                Ok(DomainSolution::new(
                    DomainSolutionStatus::Unbounded,
                    "Problem is unbounded: objective can be improved infinitely",
                )
                .with_statistics(statistics))
            }
            status => Err(SolverError::ExecutionFailed(format!(
                "HiGHS solver returned status: {:?}",
                status
            ))),
        }
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl RelaxationOracle for HighsSolver {
    fn solve_relaxation(
        &self,
        problem: &OptimizationProblem,
        bounds: &[VariableBounds],
    ) -> Result<DomainSolution> {
        self.validate(problem, bounds)?;
        self.run(problem, bounds, false)
    }

    fn solve_integer(&self, problem: &OptimizationProblem) -> Result<DomainSolution> {
        let bounds = problem.declared_bounds();
        self.validate(problem, &bounds)?;
        self.run(problem, &bounds, true)
    }

    fn name(&self) -> &str {
        "HiGHS"
    }

    fn supports_mip(&self) -> bool {
        true
    }
}
