// Translation of the domain model into a good_lp problem.
// Shared by every backend reached through good_lp (microlp, COIN-OR CBC).

use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution, SolverStatistics, VariableBounds},
    relaxation_oracle::{Result, SolverError},
    value_objects::{ConstraintType, SolutionStatus as DomainSolutionStatus},
};
use good_lp::{
    variable, variables, Expression, ResolutionError, Solution as GoodLpSolutionTrait, Solver,
    SolverModel, Variable as GoodLpVariable,
};
use std::time::Instant;

/// Build `problem` under `bounds` and solve it with `solver`.
///
/// With `integral` unset every variable is continuous, which is what the
/// search needs for its relaxations.
pub(crate) fn solve_with<S>(
    solver: S,
    problem: &OptimizationProblem,
    bounds: &[VariableBounds],
    integral: bool,
) -> Result<DomainSolution>
where
    S: Solver,
    S::Model: SolverModel<Error = ResolutionError>,
{
    let start_time = Instant::now();

    let mut vars = variables!();
    let mut lp_variables: Vec<GoodLpVariable> = Vec::with_capacity(bounds.len());

    for (var_def, b) in problem.variables.iter().zip(bounds) {
        let definition = variable().min(b.lower).max(b.upper);
        let var = if integral && var_def.is_integer() {
            vars.add(definition.integer())
        } else {
            vars.add(definition)
        };
        lp_variables.push(var);
    }

    let mut obj_expr: Expression = 0.into();
    for (i, &coeff) in problem.objective.coefficients.iter().enumerate() {
        if coeff != 0.0 {
            obj_expr += coeff * lp_variables[i];
        }
    }

    let mut lp_model = vars.minimise(obj_expr).using(solver);

    for constraint in &problem.constraints {
        let mut lhs: Expression = 0.into();
        for (i, &coeff) in constraint.coefficients.iter().enumerate() {
            if coeff != 0.0 {
                lhs += coeff * lp_variables[i];
            }
        }

        lp_model = match constraint.constraint_type {
            ConstraintType::LessThanOrEqual => lp_model.with(lhs.leq(constraint.bound)),
            ConstraintType::Equal => lp_model.with(lhs.eq(constraint.bound)),
            ConstraintType::GreaterThanOrEqual => lp_model.with(lhs.geq(constraint.bound)),
        };
    }

    let solution_result = lp_model.solve();

    let mut statistics = SolverStatistics::for_problem(problem, integral);
    statistics.solve_time_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    match solution_result {
        Ok(sol) => {
            let variable_values: Vec<f64> = lp_variables.iter().map(|&v| sol.value(v)).collect();
            let actual_obj = problem.objective.evaluate(&variable_values);

            let mut solution =
                DomainSolution::optimal(actual_obj, variable_values).with_statistics(statistics);
            solution.message = format!("Optimal solution found for '{}'", problem.name);
            Ok(solution)
        }
        Err(ResolutionError::Infeasible) => {
            Ok(DomainSolution::infeasible().with_statistics(statistics))
        }
        Err(ResolutionError::Unbounded) => Ok(DomainSolution::new(
            DomainSolutionStatus::Unbounded,
            "Problem is unbounded: objective can be improved infinitely",
        )
        .with_statistics(statistics)),
        Err(e) => Err(SolverError::ExecutionFailed(format!("{:?}", e))),
    }
}
