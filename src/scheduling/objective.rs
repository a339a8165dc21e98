//! Pluggable linear cost over completion times.
//!
//! Swapping the objective only changes the objective row of the model;
//! the constraints stay the same.

use super::error::{Result, SchedulingError};
use super::formulation::VariableLayout;
use super::instance::Instance;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "weights", rename_all = "snake_case")]
pub enum Objective {
    /// Σ pastdue[k]
    #[default]
    TotalTardiness,
    /// Σ w[k]·pastdue[k], weights in canonical job order
    WeightedTardiness(Vec<f64>),
    /// Σ finish[k]
    TotalCompletion,
}

impl Objective {
    pub fn name(&self) -> &'static str {
        match self {
            Objective::TotalTardiness => "total-tardiness",
            Objective::WeightedTardiness(_) => "weighted-tardiness",
            Objective::TotalCompletion => "total-completion",
        }
    }

    pub fn validate(&self, instance: &Instance) -> Result<()> {
        if let Objective::WeightedTardiness(weights) = self {
            if weights.len() != instance.len() {
                return Err(SchedulingError::InvalidInstance(format!(
                    "{} tardiness weights for {} jobs",
                    weights.len(),
                    instance.len()
                )));
            }
            if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
                return Err(SchedulingError::InvalidInstance(format!(
                    "tardiness weight {} is not a finite non-negative number",
                    w
                )));
            }
        }
        Ok(())
    }

    /// Objective coefficients over `layout` plus the constant term.
    pub fn linear_terms(&self, instance: &Instance, layout: &VariableLayout) -> (Vec<f64>, f64) {
        let mut coefficients = vec![0.0; layout.len()];
        let mut constant = 0.0;

        for (k, job) in instance.jobs().iter().enumerate() {
            match self {
                Objective::TotalTardiness => coefficients[layout.pastdue(k)] = 1.0,
                Objective::WeightedTardiness(weights) => {
                    coefficients[layout.pastdue(k)] = weights[k]
                }
                Objective::TotalCompletion => {
                    coefficients[layout.start(k)] = 1.0;
                    constant += job.duration;
                }
            }
        }

        (coefficients, constant)
    }

    /// Cost of a concrete schedule given start times in canonical order.
    pub fn evaluate(&self, instance: &Instance, starts: &[f64]) -> f64 {
        instance
            .jobs()
            .iter()
            .zip(starts)
            .enumerate()
            .map(|(k, (job, &start))| match self {
                Objective::TotalTardiness => job.pastdue_at(start),
                Objective::WeightedTardiness(weights) => weights[k] * job.pastdue_at(start),
                Objective::TotalCompletion => job.finish_at(start),
            })
            .sum()
    }

    /// True when every pastdue variable carries a positive cost, so the
    /// minimisation keeps it at `max(0, finish - due)`.
    pub fn drives_pastdue(&self) -> bool {
        match self {
            Objective::TotalTardiness => true,
            Objective::WeightedTardiness(weights) => weights.iter().all(|&w| w > 0.0),
            Objective::TotalCompletion => false,
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Objective {
    type Err = String;

    /// Parses the weight-free objectives; weighted tardiness comes from
    /// a configuration file.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "total-tardiness" | "tardiness" => Ok(Objective::TotalTardiness),
            "total-completion" | "completion" => Ok(Objective::TotalCompletion),
            other => Err(format!("unknown objective '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::fixtures::identical_pair;

    #[test]
    fn test_total_tardiness_terms() {
        let instance = identical_pair();
        let layout = VariableLayout::new(instance.len());
        let (coefficients, constant) = Objective::TotalTardiness.linear_terms(&instance, &layout);

        assert_eq!(coefficients, vec![0.0, 0.0, 1.0, 1.0, 0.0]);
        assert_eq!(constant, 0.0);
    }

    #[test]
    fn test_total_completion_terms_carry_durations() {
        let instance = identical_pair();
        let layout = VariableLayout::new(instance.len());
        let (coefficients, constant) = Objective::TotalCompletion.linear_terms(&instance, &layout);

        assert_eq!(coefficients, vec![1.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(constant, 10.0);
    }

    #[test]
    fn test_evaluate() {
        let instance = identical_pair();
        let starts = [0.0, 5.0];
        assert_eq!(Objective::TotalTardiness.evaluate(&instance, &starts), 5.0);
        assert_eq!(
            Objective::WeightedTardiness(vec![1.0, 3.0]).evaluate(&instance, &starts),
            15.0
        );
        assert_eq!(Objective::TotalCompletion.evaluate(&instance, &starts), 15.0);
    }

    #[test]
    fn test_weight_validation() {
        let instance = identical_pair();
        assert!(Objective::WeightedTardiness(vec![1.0]).validate(&instance).is_err());
        assert!(Objective::WeightedTardiness(vec![1.0, -2.0])
            .validate(&instance)
            .is_err());
        assert!(Objective::WeightedTardiness(vec![1.0, 0.0])
            .validate(&instance)
            .is_ok());
    }

    #[test]
    fn test_drives_pastdue() {
        assert!(Objective::TotalTardiness.drives_pastdue());
        assert!(Objective::WeightedTardiness(vec![1.0, 2.0]).drives_pastdue());
        assert!(!Objective::WeightedTardiness(vec![1.0, 0.0]).drives_pastdue());
        assert!(!Objective::TotalCompletion.drives_pastdue());
    }

    #[test]
    fn test_parse_and_serde() {
        assert_eq!("tardiness".parse::<Objective>(), Ok(Objective::TotalTardiness));
        assert_eq!(
            "total_completion".parse::<Objective>(),
            Ok(Objective::TotalCompletion)
        );
        assert!("makespan".parse::<Objective>().is_err());

        let weighted: Objective =
            serde_json::from_str(r#"{"kind":"weighted_tardiness","weights":[1.0,2.0]}"#).unwrap();
        assert_eq!(weighted, Objective::WeightedTardiness(vec![1.0, 2.0]));
        let plain: Objective = serde_json::from_str(r#"{"kind":"total_tardiness"}"#).unwrap();
        assert_eq!(plain, Objective::TotalTardiness);
    }
}
