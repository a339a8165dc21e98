use crate::domain::{RelaxationOracle, SolutionStatus, SolverError};
use crate::scheduling::{
    warm_start, BranchAndBound, CancellationToken, Formulation, Incumbent, IncumbentSource,
    Instance, Objective, Result, Schedule, ScheduleExtractor, SchedulingError, SearchConfig,
    SearchOutcome, SearchStatistics,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Who decides the ordering binaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStrategy {
    /// In-crate branch-and-bound over LP relaxations
    #[default]
    BranchAndBound,
    /// Whole MILP handed to a MIP-capable backend
    External,
}

impl fmt::Display for SolveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStrategy::BranchAndBound => write!(f, "branch-and-bound"),
            SolveStrategy::External => write!(f, "external"),
        }
    }
}

impl FromStr for SolveStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "branch-and-bound" | "branch_and_bound" | "bnb" => Ok(SolveStrategy::BranchAndBound),
            "external" | "mip" => Ok(SolveStrategy::External),
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}

/// Everything known about a solved instance
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleReport {
    pub schedule: Schedule,
    pub objective: String,
    pub status: SolutionStatus,
    /// Proven lower bound on the objective
    pub best_bound: f64,
    pub gap: f64,
    pub solver: String,
    pub strategy: SolveStrategy,
    /// What produced the reported schedule
    pub found_by: String,
    pub statistics: SearchStatistics,
}

impl ScheduleReport {
    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}

/// Runs instance → formulation → search → extraction
pub struct SchedulingService {
    oracle: Arc<dyn RelaxationOracle>,
    config: SearchConfig,
    strategy: SolveStrategy,
    cancel: CancellationToken,
}

impl SchedulingService {
    pub fn new(oracle: Arc<dyn RelaxationOracle>) -> Self {
        Self {
            oracle,
            config: SearchConfig::default(),
            strategy: SolveStrategy::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_strategy(mut self, strategy: SolveStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Token that stops any solve running on this service
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn solve(&self, instance: &Instance, objective: &Objective) -> Result<ScheduleReport> {
        objective.validate(instance)?;
        let formulation = Formulation::build(instance, objective)?;

        info!(
            jobs = instance.len(),
            objective = %objective,
            strategy = %self.strategy,
            solver = self.oracle.name(),
            "Solving instance"
        );

        let outcome = match self.strategy {
            SolveStrategy::BranchAndBound => self.search(instance, &formulation, objective)?,
            SolveStrategy::External => self.external(&formulation)?,
        };

        let incumbent = match outcome.incumbent {
            Some(incumbent) => incumbent,
            None if outcome.status == SolutionStatus::Infeasible => {
                return Err(SchedulingError::InfeasibleInstance(
                    "no ordering of the jobs admits a schedule".to_string(),
                ))
            }
            None => {
                return Err(SchedulingError::NoSolution {
                    nodes: outcome.statistics.nodes_explored,
                })
            }
        };

        let schedule = ScheduleExtractor::new(
            instance,
            &formulation,
            objective,
            self.config.feasibility_tolerance,
        )
        .extract(&incumbent.values, incumbent.objective)?;

        info!(
            status = %outcome.status,
            objective = schedule.objective,
            found_by = %incumbent.source,
            "Schedule extracted"
        );

        let (best_bound, gap) = if outcome.status == SolutionStatus::Optimal {
            (schedule.objective, 0.0)
        } else {
            let bound = outcome.best_bound.min(schedule.objective);
            (bound, schedule.objective - bound)
        };
        if outcome.status.is_budget_stop() {
            warn!(
                status = %outcome.status,
                best_bound,
                gap,
                "Search budget exhausted before optimality was proven"
            );
        }

        Ok(ScheduleReport {
            best_bound,
            gap,
            schedule,
            objective: objective.name().to_string(),
            status: outcome.status,
            solver: self.oracle.name().to_string(),
            strategy: self.strategy,
            found_by: incumbent.source.to_string(),
            statistics: outcome.statistics,
        })
    }

    fn search(
        &self,
        instance: &Instance,
        formulation: &Formulation,
        objective: &Objective,
    ) -> Result<SearchOutcome> {
        let warm = if self.config.warm_start {
            warm_start(instance, formulation, objective)
        } else {
            None
        };
        if let Some(warm) = &warm {
            debug!(objective = warm.objective, source = %warm.source, "Warm start");
        }

        BranchAndBound::new(instance, formulation, self.oracle.as_ref(), &self.config)
            .with_cancellation(self.cancel.clone())
            .run(warm)
    }

    fn external(&self, formulation: &Formulation) -> Result<SearchOutcome> {
        if !self.oracle.supports_mip() {
            return Err(SolverError::SolverNotAvailable(format!(
                "{} cannot solve the full model; use branch-and-bound",
                self.oracle.name()
            ))
            .into());
        }

        let started = Instant::now();
        let solution = self.oracle.solve_integer(formulation.problem())?;
        let statistics = SearchStatistics {
            elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
            ..SearchStatistics::default()
        };

        match (solution.status, solution.optimal_value) {
            (SolutionStatus::Infeasible, _) => Err(SchedulingError::InfeasibleInstance(
                "the MIP backend found no schedule".to_string(),
            )),
            (status @ (SolutionStatus::Optimal | SolutionStatus::Feasible), Some(value)) => {
                Ok(SearchOutcome {
                    status,
                    best_bound: if status == SolutionStatus::Optimal {
                        value
                    } else {
                        f64::NEG_INFINITY
                    },
                    gap: if status == SolutionStatus::Optimal {
                        0.0
                    } else {
                        f64::INFINITY
                    },
                    incumbent: Some(Incumbent::new(
                        value,
                        solution.variable_values,
                        IncumbentSource::External,
                    )),
                    statistics,
                })
            }
            (status, _) => Err(SolverError::ExecutionFailed(format!(
                "MIP backend ended with status {}: {}",
                status, solution.message
            ))
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::fixtures::{brute_force_total_tardiness, identical_pair, published};
    use crate::scheduling::Job;
    use crate::solver::MicroLpSolver;

    fn service() -> SchedulingService {
        SchedulingService::new(Arc::new(MicroLpSolver::new()))
    }

    #[test]
    fn test_published_instance() {
        let report = service()
            .solve(&published(), &Objective::TotalTardiness)
            .unwrap();

        assert!(report.is_optimal());
        assert!((report.schedule.objective - 16.0).abs() < 1e-6);
        assert_eq!(report.gap, 0.0);
        assert_eq!(report.schedule.jobs.len(), 7);
        assert!(report
            .schedule
            .jobs
            .windows(2)
            .all(|w| w[0].finish <= w[1].start + 1e-6));
    }

    #[test]
    fn test_identical_pair() {
        let report = service()
            .solve(&identical_pair(), &Objective::TotalTardiness)
            .unwrap();
        assert!((report.schedule.objective - 5.0).abs() < 1e-6);
        assert!((report.schedule.total_pastdue() - 5.0).abs() < 1e-6);
        assert_eq!(report.schedule.jobs[0].start, 0.0);
    }

    #[test]
    fn test_total_completion_objective() {
        let report = service()
            .solve(&identical_pair(), &Objective::TotalCompletion)
            .unwrap();
        assert!((report.schedule.objective - 15.0).abs() < 1e-6);
        assert_eq!(report.objective, "total-completion");
    }

    #[test]
    fn test_weighted_tardiness_prefers_heavy_job() {
        let instance = identical_pair();
        let report = service()
            .solve(&instance, &Objective::WeightedTardiness(vec![1.0, 4.0]))
            .unwrap();

        assert_eq!(report.schedule.sequence(), vec!["second", "first"]);
        assert!((report.schedule.objective - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_bad_weights_rejected_before_solving() {
        let result = service().solve(&identical_pair(), &Objective::WeightedTardiness(vec![1.0]));
        assert!(matches!(result, Err(SchedulingError::InvalidInstance(_))));
    }

    #[test]
    fn test_external_strategy_needs_mip_backend() {
        let result = service()
            .with_strategy(SolveStrategy::External)
            .solve(&published(), &Objective::TotalTardiness);
        assert!(matches!(
            result,
            Err(SchedulingError::Solver(SolverError::SolverNotAvailable(_)))
        ));
    }

    #[test]
    fn test_budget_stop_still_reports_schedule() {
        let config = SearchConfig::default().with_node_limit(1);
        let report = service()
            .with_config(config)
            .solve(&published(), &Objective::TotalTardiness)
            .unwrap();

        assert_eq!(report.status, SolutionStatus::NodeLimit);
        assert!(report.schedule.objective >= 16.0 - 1e-6);
        assert!(report.gap >= 0.0);
        assert!(report.found_by.ends_with("dispatching"));
    }

    #[test]
    fn test_budget_stop_without_incumbent() {
        let config = SearchConfig::default()
            .with_node_limit(1)
            .with_warm_start(false);
        let result = service()
            .with_config(config)
            .solve(&published(), &Objective::TotalTardiness);
        assert!(matches!(result, Err(SchedulingError::NoSolution { nodes: 1 })));
    }

    #[test]
    fn test_matches_enumeration_on_released_jobs() {
        let instance = Instance::new(vec![
            Job::new("p", 0.0, 3.0, 4.0),
            Job::new("q", 1.0, 2.0, 3.0),
            Job::new("r", 2.0, 1.0, 3.0),
            Job::new("s", 6.0, 2.0, 8.0),
        ])
        .unwrap();
        let report = service()
            .solve(&instance, &Objective::TotalTardiness)
            .unwrap();
        assert!(
            (report.schedule.objective - brute_force_total_tardiness(&instance)).abs() < 1e-6
        );
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("external".parse(), Ok(SolveStrategy::External));
        assert_eq!("bnb".parse(), Ok(SolveStrategy::BranchAndBound));
        assert!("greedy".parse::<SolveStrategy>().is_err());
    }

    #[cfg(feature = "coin_cbc")]
    #[test]
    fn test_external_cbc_agrees_with_search() {
        let service = SchedulingService::new(Arc::new(crate::solver::CoinCbcSolver::new()))
            .with_strategy(SolveStrategy::External);
        let report = service
            .solve(&published(), &Objective::TotalTardiness)
            .unwrap();
        assert!((report.schedule.objective - 16.0).abs() < 1e-6);
        assert_eq!(report.found_by, "external MIP");
    }
}
