//! Big-M disjunctive formulation of the single-machine problem.
//!
//! Variables are laid out as `start[0..n]`, `pastdue[0..n]`, then one
//! `precedes` binary per canonical pair:
//!
//! ```text
//! START[k]      start[k]                                 >= release[k]
//! FINISH[k]     start[k] - pastdue[k]                    <= due[k] - duration[k]
//! ORDER_A[j,k]  start[j] - start[k] + M·precedes[j,k]    <= M - duration[j]
//! ORDER_B[j,k]  start[k] - start[j] - M·precedes[j,k]    <= -duration[k]
//! ```
//!
//! `precedes[j,k] = 1` makes ORDER_A bind (j before k) and leaves ORDER_B
//! slack by M; `0` swaps the roles.

use super::error::Result;
use super::instance::Instance;
use super::objective::Objective;
use crate::domain::{
    Constraint, ConstraintType, ObjectiveFunction, OptimizationProblem, Variable, VariableBounds,
};

/// Column positions of the model's variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableLayout {
    jobs: usize,
    pairs: usize,
}

impl VariableLayout {
    pub fn new(jobs: usize) -> Self {
        Self {
            jobs,
            pairs: jobs * jobs.saturating_sub(1) / 2,
        }
    }

    pub fn start(&self, k: usize) -> usize {
        k
    }

    pub fn pastdue(&self, k: usize) -> usize {
        self.jobs + k
    }

    pub fn precedes(&self, pair: usize) -> usize {
        2 * self.jobs + pair
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    pub fn pairs(&self) -> usize {
        self.pairs
    }

    pub fn len(&self) -> usize {
        2 * self.jobs + self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The mixed-integer model of one instance, immutable once built.
#[derive(Debug, Clone)]
pub struct Formulation {
    problem: OptimizationProblem,
    layout: VariableLayout,
    pairs: Vec<(usize, usize)>,
    big_m: f64,
}

impl Formulation {
    pub fn build(instance: &Instance, objective: &Objective) -> Result<Self> {
        objective.validate(instance)?;

        let n = instance.len();
        let layout = VariableLayout::new(n);
        let pairs = instance.pairs();
        let big_m = instance.big_m();
        let jobs = instance.jobs();

        let mut variables = Vec::with_capacity(layout.len());
        for job in jobs {
            variables.push(
                Variable::continuous(format!("start[{}]", job.id))
                    .with_bounds(job.release, None),
            );
        }
        for job in jobs {
            variables.push(Variable::continuous(format!("pastdue[{}]", job.id)));
        }
        for &(j, k) in &pairs {
            variables.push(Variable::binary(format!(
                "precedes[{},{}]",
                jobs[j].id, jobs[k].id
            )));
        }

        let (coefficients, constant) = objective.linear_terms(instance, &layout);
        let mut problem = OptimizationProblem::new(
            ObjectiveFunction::minimize(coefficients).with_constant(constant),
        )
        .with_name("single-machine")
        .with_description(format!(
            "{} jobs, {} disjunctive pairs, objective {}",
            n,
            pairs.len(),
            objective
        ))
        .with_variables(variables);

        let row = |terms: &[(usize, f64)]| {
            let mut coefficients = vec![0.0; layout.len()];
            for &(column, value) in terms {
                coefficients[column] += value;
            }
            coefficients
        };

        for (k, job) in jobs.iter().enumerate() {
            problem = problem.add_constraint(
                Constraint::new(
                    ConstraintType::GreaterThanOrEqual,
                    row(&[(layout.start(k), 1.0)]),
                    job.release,
                )
                .with_name(format!("START[{}]", job.id)),
            );
        }

        for (k, job) in jobs.iter().enumerate() {
            problem = problem.add_constraint(
                Constraint::new(
                    ConstraintType::LessThanOrEqual,
                    row(&[(layout.start(k), 1.0), (layout.pastdue(k), -1.0)]),
                    job.due - job.duration,
                )
                .with_name(format!("FINISH[{}]", job.id)),
            );
        }

        for (p, &(j, k)) in pairs.iter().enumerate() {
            let (first, second) = (&jobs[j], &jobs[k]);
            problem = problem
                .add_constraint(
                    Constraint::new(
                        ConstraintType::LessThanOrEqual,
                        row(&[
                            (layout.start(j), 1.0),
                            (layout.start(k), -1.0),
                            (layout.precedes(p), big_m),
                        ]),
                        big_m - first.duration,
                    )
                    .with_name(format!("ORDER_A[{},{}]", first.id, second.id)),
                )
                .add_constraint(
                    Constraint::new(
                        ConstraintType::LessThanOrEqual,
                        row(&[
                            (layout.start(k), 1.0),
                            (layout.start(j), -1.0),
                            (layout.precedes(p), -big_m),
                        ]),
                        -second.duration,
                    )
                    .with_name(format!("ORDER_B[{},{}]", first.id, second.id)),
                );
        }

        Ok(Self {
            problem,
            layout,
            pairs,
            big_m,
        })
    }

    pub fn problem(&self) -> &OptimizationProblem {
        &self.problem
    }

    pub fn layout(&self) -> VariableLayout {
        self.layout
    }

    /// Canonical pairs, indexed like the `precedes` columns.
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn big_m(&self) -> f64 {
        self.big_m
    }

    /// Bounds of the unrestricted relaxation.
    pub fn root_bounds(&self) -> Vec<VariableBounds> {
        self.problem.declared_bounds()
    }

    /// Objective value of a full assignment, constant included.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.problem.objective.evaluate(values)
    }

    /// Full assignment for a job sequence, each job started as early as
    /// its release and its predecessor allow.
    pub fn sequence_values(&self, instance: &Instance, sequence: &[usize]) -> Vec<f64> {
        let mut values = vec![0.0; self.layout.len()];
        let mut position = vec![0; instance.len()];
        let mut time = 0.0_f64;

        for (slot, &k) in sequence.iter().enumerate() {
            let job = instance.job(k);
            let start = time.max(job.release);
            values[self.layout.start(k)] = start;
            values[self.layout.pastdue(k)] = job.pastdue_at(start);
            position[k] = slot;
            time = job.finish_at(start);
        }

        for (p, &(j, k)) in self.pairs.iter().enumerate() {
            values[self.layout.precedes(p)] = if position[j] < position[k] { 1.0 } else { 0.0 };
        }

        values
    }
}
