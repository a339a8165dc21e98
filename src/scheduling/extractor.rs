//! Turns an incumbent assignment into a checked schedule.
//!
//! Nothing the solver returns is trusted: finish times and tardiness are
//! recomputed from the start times and every schedule invariant is checked
//! again with the configured tolerance.

use super::error::{Result, SchedulingError};
use super::formulation::Formulation;
use super::instance::Instance;
use super::objective::Objective;
use serde::Serialize;

/// One row of a schedule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledJob {
    pub id: String,
    pub release: f64,
    pub duration: f64,
    pub due: f64,
    pub start: f64,
    pub finish: f64,
    /// `max(0, finish - due)`
    pub pastdue: f64,
}

/// Jobs ordered by start time, with the cost of the schedule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    pub jobs: Vec<ScheduledJob>,
    pub objective: f64,
}

impl Schedule {
    pub fn makespan(&self) -> f64 {
        self.jobs.iter().map(|j| j.finish).fold(0.0, f64::max)
    }

    pub fn total_pastdue(&self) -> f64 {
        self.jobs.iter().map(|j| j.pastdue).sum()
    }

    /// Job ids in processing order
    pub fn sequence(&self) -> Vec<&str> {
        self.jobs.iter().map(|j| j.id.as_str()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&ScheduledJob> {
        self.jobs.iter().find(|j| j.id == id)
    }
}

pub struct ScheduleExtractor<'a> {
    instance: &'a Instance,
    formulation: &'a Formulation,
    objective: &'a Objective,
    tolerance: f64,
}

impl<'a> ScheduleExtractor<'a> {
    pub fn new(
        instance: &'a Instance,
        formulation: &'a Formulation,
        objective: &'a Objective,
        tolerance: f64,
    ) -> Self {
        Self {
            instance,
            formulation,
            objective,
            tolerance,
        }
    }

    /// Builds the schedule for `values`, an assignment in formulation
    /// layout whose model objective is `reported`.
    pub fn extract(&self, values: &[f64], reported: f64) -> Result<Schedule> {
        let layout = self.formulation.layout();
        if values.len() != layout.len() {
            return Err(SchedulingError::InfeasibleSchedule(format!(
                "assignment has {} values, the model has {} variables",
                values.len(),
                layout.len()
            )));
        }

        let tol = self.tolerance;
        let mut rows = Vec::with_capacity(self.instance.len());
        let mut starts = Vec::with_capacity(self.instance.len());

        for (k, job) in self.instance.jobs().iter().enumerate() {
            let start = values[layout.start(k)];
            let reported_pastdue = values[layout.pastdue(k)];
            let finish = job.finish_at(start);
            let pastdue = job.pastdue_at(start);

            if !start.is_finite() || !reported_pastdue.is_finite() {
                return Err(infeasible(format!("job '{}' has a non-finite value", job.id)));
            }
            if start < job.release - tol {
                return Err(infeasible(format!(
                    "job '{}' starts at {} before its release {}",
                    job.id, start, job.release
                )));
            }
            if reported_pastdue < -tol {
                return Err(infeasible(format!(
                    "job '{}' has negative pastdue {}",
                    job.id, reported_pastdue
                )));
            }
            if finish > job.due + reported_pastdue + tol {
                return Err(infeasible(format!(
                    "job '{}' finishes at {} past due {} plus pastdue {}",
                    job.id, finish, job.due, reported_pastdue
                )));
            }
            if self.objective.drives_pastdue() && (reported_pastdue - pastdue).abs() > tol {
                return Err(infeasible(format!(
                    "job '{}' reports pastdue {} but finishes {} late",
                    job.id, reported_pastdue, pastdue
                )));
            }

            starts.push(start);
            rows.push((
                k,
                ScheduledJob {
                    id: job.id.clone(),
                    release: job.release,
                    duration: job.duration,
                    due: job.due,
                    start,
                    finish,
                    pastdue,
                },
            ));
        }

        for (p, &(j, k)) in self.formulation.pairs().iter().enumerate() {
            let (first, second) = if values[layout.precedes(p)] >= 0.5 {
                (j, k)
            } else {
                (k, j)
            };
            if rows[first].1.finish > rows[second].1.start + tol {
                return Err(infeasible(format!(
                    "job '{}' is ordered before '{}' but finishes at {} after it starts at {}",
                    rows[first].1.id, rows[second].1.id, rows[first].1.finish, rows[second].1.start
                )));
            }
        }

        rows.sort_by(|(a, x), (b, y)| x.start.total_cmp(&y.start).then(a.cmp(b)));

        for pair in rows.windows(2) {
            let (before, after) = (&pair[0].1, &pair[1].1);
            if before.finish > after.start + tol {
                return Err(infeasible(format!(
                    "jobs '{}' and '{}' overlap",
                    before.id, after.id
                )));
            }
        }

        let objective = self.objective.evaluate(self.instance, &starts);
        if objective > reported + tol {
            return Err(infeasible(format!(
                "schedule costs {} but the model reported {}",
                objective, reported
            )));
        }

        Ok(Schedule {
            jobs: rows.into_iter().map(|(_, row)| row).collect(),
            objective,
        })
    }
}

fn infeasible(message: String) -> SchedulingError {
    SchedulingError::InfeasibleSchedule(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::fixtures::{identical_pair, published};

    fn sequence(instance: &Instance, ids: &[&str]) -> Vec<usize> {
        ids.iter()
            .map(|id| instance.position(id).unwrap())
            .collect()
    }

    #[test]
    fn test_published_sequence() {
        let instance = published();
        let objective = Objective::TotalTardiness;
        let formulation = Formulation::build(&instance, &objective).unwrap();
        let order = sequence(&instance, &["E", "A", "D", "F", "B", "G", "C"]);
        let values = formulation.sequence_values(&instance, &order);

        let schedule = ScheduleExtractor::new(&instance, &formulation, &objective, 1e-6)
            .extract(&values, formulation.objective_value(&values))
            .unwrap();

        assert_eq!(schedule.sequence(), vec!["E", "A", "D", "F", "B", "G", "C"]);
        assert_eq!(schedule.objective, 16.0);
        assert_eq!(schedule.total_pastdue(), 16.0);
        assert_eq!(schedule.makespan(), 30.0);

        let c = schedule.get("C").unwrap();
        assert_eq!((c.start, c.finish, c.pastdue), (22.0, 30.0, 15.0));
        assert_eq!(schedule.get("D").unwrap().pastdue, 1.0);
    }

    #[test]
    fn test_slack_pastdue_is_reported_tight_for_completion_objective() {
        let instance = identical_pair();
        let objective = Objective::TotalCompletion;
        let formulation = Formulation::build(&instance, &objective).unwrap();
        let mut values = formulation.sequence_values(&instance, &[0, 1]);
        // pastdue is free under this objective; the solver may leave slack
        values[formulation.layout().pastdue(1)] = 9.0;

        let schedule = ScheduleExtractor::new(&instance, &formulation, &objective, 1e-6)
            .extract(&values, formulation.objective_value(&values))
            .unwrap();

        assert_eq!(schedule.get("second").unwrap().pastdue, 5.0);
        assert_eq!(schedule.objective, 15.0);
    }

    #[test]
    fn test_slack_pastdue_rejected_when_objective_drives_it() {
        let instance = identical_pair();
        let objective = Objective::TotalTardiness;
        let formulation = Formulation::build(&instance, &objective).unwrap();
        let mut values = formulation.sequence_values(&instance, &[0, 1]);
        values[formulation.layout().pastdue(1)] = 9.0;

        let result = ScheduleExtractor::new(&instance, &formulation, &objective, 1e-6)
            .extract(&values, formulation.objective_value(&values));
        assert!(matches!(result, Err(SchedulingError::InfeasibleSchedule(_))));
    }

    #[test]
    fn test_overlap_is_rejected() {
        let instance = identical_pair();
        let objective = Objective::TotalTardiness;
        let formulation = Formulation::build(&instance, &objective).unwrap();
        let mut values = formulation.sequence_values(&instance, &[0, 1]);
        values[formulation.layout().start(1)] = 3.0;
        values[formulation.layout().pastdue(1)] = 3.0;

        let result = ScheduleExtractor::new(&instance, &formulation, &objective, 1e-6)
            .extract(&values, 100.0);
        assert!(matches!(result, Err(SchedulingError::InfeasibleSchedule(_))));
    }

    #[test]
    fn test_early_start_is_rejected() {
        let instance = published();
        let objective = Objective::TotalTardiness;
        let formulation = Formulation::build(&instance, &objective).unwrap();
        let order = sequence(&instance, &["E", "A", "D", "F", "B", "G", "C"]);
        let mut values = formulation.sequence_values(&instance, &order);
        // A is released at 2
        values[formulation.layout().start(0)] = 1.0;

        let result = ScheduleExtractor::new(&instance, &formulation, &objective, 1e-6)
            .extract(&values, 100.0);
        assert!(matches!(result, Err(SchedulingError::InfeasibleSchedule(_))));
    }

    #[test]
    fn test_tolerance_absorbs_solver_noise() {
        let instance = identical_pair();
        let objective = Objective::TotalTardiness;
        let formulation = Formulation::build(&instance, &objective).unwrap();
        let mut values = formulation.sequence_values(&instance, &[1, 0]);
        values[formulation.layout().start(0)] += 1e-9;
        values[formulation.layout().pastdue(0)] += 1e-9;

        let schedule = ScheduleExtractor::new(&instance, &formulation, &objective, 1e-6)
            .extract(&values, 5.0)
            .unwrap();
        assert_eq!(schedule.sequence(), vec!["second", "first"]);
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let instance = identical_pair();
        let objective = Objective::TotalTardiness;
        let formulation = Formulation::build(&instance, &objective).unwrap();

        let result = ScheduleExtractor::new(&instance, &formulation, &objective, 1e-6)
            .extract(&[0.0, 5.0], 5.0);
        assert!(matches!(result, Err(SchedulingError::InfeasibleSchedule(_))));
    }
}
