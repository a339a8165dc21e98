//! Jobs and the immutable problem instance.
//!
//! The order in which jobs are handed to [`Instance::new`] is the canonical
//! order. Every pairwise decision uses it: the disjunctive pair `(j, k)` is
//! only ever stored with `j < k`.

use super::error::{Result, SchedulingError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A job waiting for the machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    /// Earliest start.
    pub release: f64,
    /// Processing time, strictly positive.
    pub duration: f64,
    /// Finishing later than this counts as pastdue.
    pub due: f64,
}

impl Job {
    pub fn new(id: impl Into<String>, release: f64, duration: f64, due: f64) -> Self {
        Self {
            id: id.into(),
            release,
            duration,
            due,
        }
    }

    /// Finish time when started at `start`.
    pub fn finish_at(&self, start: f64) -> f64 {
        start + self.duration
    }

    /// Tardiness when started at `start`.
    pub fn pastdue_at(&self, start: f64) -> f64 {
        (self.finish_at(start) - self.due).max(0.0)
    }

    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !(self.release.is_finite() && self.duration.is_finite() && self.due.is_finite()) {
            problems.push(format!("job '{}' has a non-finite time", self.id));
            return problems;
        }
        if self.release < 0.0 {
            problems.push(format!(
                "job '{}' has negative release {}",
                self.id, self.release
            ));
        }
        if self.duration <= 0.0 {
            problems.push(format!(
                "job '{}' has non-positive duration {}",
                self.id, self.duration
            ));
        }
        if self.release + self.duration > self.due {
            problems.push(format!(
                "job '{}' cannot finish on time even alone: release {} + duration {} > due {}",
                self.id, self.release, self.duration, self.due
            ));
        }
        problems
    }
}

/// Validated, immutable set of jobs in canonical order.
#[derive(Debug, Clone)]
pub struct Instance {
    jobs: Vec<Job>,
    big_m: f64,
}

impl Instance {
    /// Validates and freezes `jobs`. All problems are reported at once.
    pub fn new(jobs: Vec<Job>) -> Result<Self> {
        let mut errors = Vec::new();

        if jobs.is_empty() {
            errors.push("instance has no jobs".to_string());
        }

        let mut seen = HashSet::new();
        for job in &jobs {
            if !seen.insert(job.id.as_str()) {
                errors.push(format!("duplicate job id '{}'", job.id));
            }
            errors.extend(job.problems());
        }

        if !errors.is_empty() {
            return Err(SchedulingError::InvalidInstance(errors.join("; ")));
        }

        let big_m = jobs.iter().map(|j| j.release).fold(0.0, f64::max)
            + jobs.iter().map(|j| j.duration).sum::<f64>();

        Ok(Self { jobs, big_m })
    }

    /// Builds an instance from `id -> (release, duration, due)`.
    /// Canonical order is ascending id.
    pub fn from_map(map: BTreeMap<String, (f64, f64, f64)>) -> Result<Self> {
        Self::new(
            map.into_iter()
                .map(|(id, (release, duration, due))| Job::new(id, release, duration, due))
                .collect(),
        )
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn job(&self, index: usize) -> &Job {
        &self.jobs[index]
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Upper bound on any completion time of a semi-active schedule:
    /// `max(release) + Σ duration`.
    pub fn big_m(&self) -> f64 {
        self.big_m
    }

    /// Canonical position of the job with `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.jobs.iter().position(|j| j.id == id)
    }

    /// Number of disjunctive pairs, `n(n-1)/2`.
    pub fn pair_count(&self) -> usize {
        self.len() * self.len().saturating_sub(1) / 2
    }

    /// Canonical pairs `(j, k)` with `j < k`, in lexicographic order.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        let n = self.len();
        (0..n)
            .flat_map(|j| (j + 1..n).map(move |k| (j, k)))
            .collect()
    }

    /// Index of pair `(j, k)` in [`Instance::pairs`]; requires `j < k`.
    pub fn pair_index(&self, j: usize, k: usize) -> usize {
        debug_assert!(j < k && k < self.len());
        let n = self.len();
        j * n - j * (j + 1) / 2 + (k - j - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::fixtures::published;

    #[test]
    fn test_big_m() {
        let instance = published();
        assert_eq!(instance.big_m(), 9.0 + 30.0);
    }

    #[test]
    fn test_pairs_match_pair_index() {
        let instance = published();
        let pairs = instance.pairs();
        assert_eq!(pairs.len(), 21);
        assert_eq!(instance.pair_count(), 21);
        for (p, &(j, k)) in pairs.iter().enumerate() {
            assert!(j < k);
            assert_eq!(instance.pair_index(j, k), p);
        }
    }

    #[test]
    fn test_rejects_job_that_cannot_be_on_time() {
        let err = Instance::new(vec![Job::new("late", 0.0, 5.0, 4.0)]).unwrap_err();
        match err {
            SchedulingError::InvalidInstance(message) => assert!(message.contains("late")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_non_positive_duration() {
        assert!(matches!(
            Instance::new(vec![Job::new("zero", 0.0, 0.0, 4.0)]),
            Err(SchedulingError::InvalidInstance(_))
        ));
        assert!(matches!(
            Instance::new(vec![Job::new("neg", 0.0, -1.0, 4.0)]),
            Err(SchedulingError::InvalidInstance(_))
        ));
    }

    #[test]
    fn test_rejects_duplicates_and_reports_everything() {
        let err = Instance::new(vec![
            Job::new("A", 0.0, 1.0, 4.0),
            Job::new("A", 0.0, 1.0, 4.0),
            Job::new("B", -1.0, 1.0, 4.0),
        ])
        .unwrap_err()
        .to_string();
        assert!(err.contains("duplicate job id 'A'"));
        assert!(err.contains("negative release"));
    }

    #[test]
    fn test_rejects_empty_and_non_finite() {
        assert!(Instance::new(Vec::new()).is_err());
        assert!(Instance::new(vec![Job::new("nan", f64::NAN, 1.0, 4.0)]).is_err());
    }

    #[test]
    fn test_from_map_orders_by_id() {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), (0.0, 1.0, 5.0));
        map.insert("a".to_string(), (1.0, 2.0, 5.0));
        let instance = Instance::from_map(map).unwrap();
        assert_eq!(instance.job(0).id, "a");
        assert_eq!(instance.position("b"), Some(1));
        assert_eq!(instance.position("z"), None);
    }

    #[test]
    fn test_job_times() {
        let job = Job::new("x", 0.0, 3.0, 5.0);
        assert_eq!(job.finish_at(4.0), 7.0);
        assert_eq!(job.pastdue_at(4.0), 2.0);
        assert_eq!(job.pastdue_at(1.0), 0.0);
    }
}
