use super::value_objects::{ConstraintType, SolutionStatus, VariableType};

/// Decision variable in a linear model
#[derive(Debug, Clone)]
pub struct Variable {
    pub variable_type: VariableType,
    pub lower_bound: f64,
    pub upper_bound: Option<f64>,
    pub name: String,
}

impl Variable {
    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            variable_type: VariableType::Continuous,
            lower_bound: 0.0,
            upper_bound: None,
            name: name.into(),
        }
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            variable_type: VariableType::Binary,
            lower_bound: 0.0,
            upper_bound: Some(1.0),
            name: name.into(),
        }
    }

    pub fn with_bounds(mut self, lower: f64, upper: Option<f64>) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    pub fn is_integer(&self) -> bool {
        self.variable_type == VariableType::Binary
    }

    pub fn bounds(&self) -> VariableBounds {
        VariableBounds::new(self.lower_bound, self.upper_bound.unwrap_or(f64::INFINITY))
    }
}

/// Box bounds handed to the oracle for one relaxation.
///
/// The search tightens these per node (fixed orderings, release heads)
/// without touching the constraint matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableBounds {
    pub lower: f64,
    pub upper: f64,
}

impl VariableBounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn fixed(value: f64) -> Self {
        Self {
            lower: value,
            upper: value,
        }
    }
}

/// Linear objective, always minimized
#[derive(Debug, Clone)]
pub struct ObjectiveFunction {
    pub coefficients: Vec<f64>,
    /// Constant term added to every evaluation
    pub constant: f64,
}

impl ObjectiveFunction {
    pub fn minimize(coefficients: Vec<f64>) -> Self {
        Self {
            coefficients,
            constant: 0.0,
        }
    }

    pub fn with_constant(mut self, constant: f64) -> Self {
        self.constant = constant;
        self
    }

    pub fn num_variables(&self) -> usize {
        self.coefficients.len()
    }

    /// Value of the objective at `values`, constant included
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(c, v)| c * v)
            .sum::<f64>()
            + self.constant
    }
}

/// Linear constraint on variables
#[derive(Debug, Clone)]
pub struct Constraint {
    pub constraint_type: ConstraintType,
    pub coefficients: Vec<f64>,
    pub bound: f64,
    pub name: String,
}

impl Constraint {
    pub fn new(constraint_type: ConstraintType, coefficients: Vec<f64>, bound: f64) -> Self {
        Self {
            constraint_type,
            coefficients,
            bound,
            name: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn num_variables(&self) -> usize {
        self.coefficients.len()
    }

    /// Amount by which `values` violates this constraint (0 when satisfied)
    pub fn violation(&self, values: &[f64]) -> f64 {
        let lhs: f64 = self
            .coefficients
            .iter()
            .zip(values)
            .map(|(c, v)| c * v)
            .sum();
        match self.constraint_type {
            ConstraintType::LessThanOrEqual => (lhs - self.bound).max(0.0),
            ConstraintType::GreaterThanOrEqual => (self.bound - lhs).max(0.0),
            ConstraintType::Equal => (lhs - self.bound).abs(),
        }
    }
}

/// Complete linear model
#[derive(Debug, Clone)]
pub struct OptimizationProblem {
    pub name: String,
    pub description: String,
    pub objective: ObjectiveFunction,
    pub constraints: Vec<Constraint>,
    pub variables: Vec<Variable>,
}

impl OptimizationProblem {
    pub fn new(objective: ObjectiveFunction) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            objective,
            constraints: Vec::new(),
            variables: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn add_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_variables(mut self, variables: Vec<Variable>) -> Self {
        self.variables = variables;
        self
    }

    pub fn num_variables(&self) -> usize {
        self.objective.num_variables()
    }

    pub fn num_integer_variables(&self) -> usize {
        self.variables.iter().filter(|v| v.is_integer()).count()
    }

    pub fn num_binary_variables(&self) -> usize {
        self.variables
            .iter()
            .filter(|v| v.variable_type == VariableType::Binary)
            .count()
    }

    /// Bounds declared on the variables themselves
    pub fn declared_bounds(&self) -> Vec<VariableBounds> {
        self.variables.iter().map(Variable::bounds).collect()
    }

    /// Largest constraint violation of `values`
    pub fn max_violation(&self, values: &[f64]) -> f64 {
        self.constraints
            .iter()
            .map(|c| c.violation(values))
            .fold(0.0, f64::max)
    }
}

/// Statistics about one oracle call
#[derive(Debug, Clone, Default)]
pub struct SolverStatistics {
    pub solve_time_ms: f64,
    pub num_variables: u32,
    pub num_constraints: u32,
    pub num_integer_vars: u32,
}

impl SolverStatistics {
    pub fn for_problem(problem: &OptimizationProblem, integral: bool) -> Self {
        Self {
            solve_time_ms: 0.0,
            num_variables: problem.num_variables() as u32,
            num_constraints: problem.constraints.len() as u32,
            num_integer_vars: if integral {
                problem.num_integer_variables() as u32
            } else {
                0
            },
        }
    }
}

/// Answer of the oracle for one model
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: SolutionStatus,
    pub optimal_value: Option<f64>,
    pub variable_values: Vec<f64>,
    pub message: String,
    pub statistics: SolverStatistics,
}

impl Solution {
    pub fn new(status: SolutionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            optimal_value: None,
            variable_values: Vec::new(),
            message: message.into(),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn optimal(value: f64, variable_values: Vec<f64>) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            optimal_value: Some(value),
            variable_values,
            message: "Optimal solution found".to_string(),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn infeasible() -> Self {
        Self::new(
            SolutionStatus::Infeasible,
            "Problem is infeasible: no solution satisfies all constraints",
        )
    }

    pub fn with_statistics(mut self, statistics: SolverStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}
