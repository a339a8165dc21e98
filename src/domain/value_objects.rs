// Domain value objects shared by the linear model and the search

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type of decision variable in the linear model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableType {
    /// Continuous real number (x ∈ ℝ)
    Continuous,
    /// Binary variable (x ∈ {0, 1})
    Binary,
}

/// Type of constraint comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintType {
    /// Less than or equal (≤)
    LessThanOrEqual,
    /// Equal (=)
    Equal,
    /// Greater than or equal (≥)
    GreaterThanOrEqual,
}

/// Status of a relaxation or of a whole search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolutionStatus {
    /// Found optimal solution
    Optimal,
    /// Found feasible solution, optimality not proven
    Feasible,
    /// Problem has no feasible solution
    Infeasible,
    /// Objective can be improved infinitely
    Unbounded,
    /// Time limit reached
    TimeLimit,
    /// Node limit reached
    NodeLimit,
    /// Search cancelled by the caller
    Interrupted,
}

impl SolutionStatus {
    /// True when the search stopped on a budget rather than by exhausting its worklist.
    pub fn is_budget_stop(&self) -> bool {
        matches!(
            self,
            SolutionStatus::TimeLimit | SolutionStatus::NodeLimit | SolutionStatus::Interrupted
        )
    }
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionStatus::Optimal => write!(f, "Optimal"),
            SolutionStatus::Feasible => write!(f, "Feasible"),
            SolutionStatus::Infeasible => write!(f, "Infeasible"),
            SolutionStatus::Unbounded => write!(f, "Unbounded"),
            SolutionStatus::TimeLimit => write!(f, "Time Limit Reached"),
            SolutionStatus::NodeLimit => write!(f, "Node Limit Reached"),
            SolutionStatus::Interrupted => write!(f, "Interrupted"),
        }
    }
}

/// LP backend answering relaxations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverBackend {
    /// Best backend compiled into this build
    #[default]
    Auto,
    /// Pure-Rust simplex shipped with good_lp
    #[serde(rename = "microlp", alias = "micro_lp")]
    MicroLp,
    /// COIN-OR CBC (feature `coin_cbc`)
    CoinCbc,
    /// HiGHS (feature `highs`)
    Highs,
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverBackend::Auto => write!(f, "Auto"),
            SolverBackend::MicroLp => write!(f, "microlp"),
            SolverBackend::CoinCbc => write!(f, "COIN-OR CBC"),
            SolverBackend::Highs => write!(f, "HiGHS"),
        }
    }
}

impl FromStr for SolverBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "auto" => Ok(SolverBackend::Auto),
            "microlp" => Ok(SolverBackend::MicroLp),
            "cbc" | "coin-cbc" => Ok(SolverBackend::CoinCbc),
            "highs" => Ok(SolverBackend::Highs),
            other => Err(format!("unknown solver backend '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("auto".parse::<SolverBackend>(), Ok(SolverBackend::Auto));
        assert_eq!("MicroLP".parse::<SolverBackend>(), Ok(SolverBackend::MicroLp));
        assert_eq!("coin_cbc".parse::<SolverBackend>(), Ok(SolverBackend::CoinCbc));
        assert_eq!("cbc".parse::<SolverBackend>(), Ok(SolverBackend::CoinCbc));
        assert_eq!("highs".parse::<SolverBackend>(), Ok(SolverBackend::Highs));
        assert!("gurobi".parse::<SolverBackend>().is_err());
    }

    #[test]
    fn test_backend_serde_names() {
        let backend: SolverBackend = serde_json::from_str(r#""microlp""#).unwrap();
        assert_eq!(backend, SolverBackend::MicroLp);
        assert_eq!(
            serde_json::to_string(&SolverBackend::CoinCbc).unwrap(),
            r#""coin_cbc""#
        );
    }

    #[test]
    fn test_budget_stops() {
        assert!(SolutionStatus::NodeLimit.is_budget_stop());
        assert!(SolutionStatus::TimeLimit.is_budget_stop());
        assert!(SolutionStatus::Interrupted.is_budget_stop());
        assert!(!SolutionStatus::Optimal.is_budget_stop());
        assert!(!SolutionStatus::Feasible.is_budget_stop());
    }
}
