//! Dispatching heuristics used to seed the incumbent.
//!
//! Non-delay list scheduling: whenever the machine frees up, the released
//! job with the lowest score runs next (ties go to the canonical order).
//! If nothing is released the clock jumps to the next release.
//!
//! # Score Convention
//! Lower score = dispatched first.
//!
//! # References
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4

use super::formulation::Formulation;
use super::incumbent::{Incumbent, IncumbentSource};
use super::instance::{Instance, Job};
use super::objective::Objective;
use tracing::debug;

pub trait DispatchingRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Priority of `job` when the machine is free at `now`.
    fn score(&self, job: &Job, now: f64) -> f64;
}

/// Earliest Due Date.
#[derive(Debug, Clone, Copy)]
pub struct Edd;

impl DispatchingRule for Edd {
    fn name(&self) -> &'static str {
        "EDD"
    }

    fn score(&self, job: &Job, _now: f64) -> f64 {
        job.due
    }
}

/// Modified Due Date: `max(due, now + duration)`.
///
/// Behaves like SPT once everything is late and like EDD while
/// jobs can still make it.
#[derive(Debug, Clone, Copy)]
pub struct Mdd;

impl DispatchingRule for Mdd {
    fn name(&self) -> &'static str {
        "MDD"
    }

    fn score(&self, job: &Job, now: f64) -> f64 {
        job.due.max(now + job.duration)
    }
}

/// Shortest Processing Time.
#[derive(Debug, Clone, Copy)]
pub struct Spt;

impl DispatchingRule for Spt {
    fn name(&self) -> &'static str {
        "SPT"
    }

    fn score(&self, job: &Job, _now: f64) -> f64 {
        job.duration
    }
}

/// Earliest Release (first come, first served).
#[derive(Debug, Clone, Copy)]
pub struct Fifo;

impl DispatchingRule for Fifo {
    fn name(&self) -> &'static str {
        "FIFO"
    }

    fn score(&self, job: &Job, _now: f64) -> f64 {
        job.release
    }
}

/// Rules tried for a warm start.
pub fn default_rules() -> [&'static dyn DispatchingRule; 4] {
    [&Edd, &Mdd, &Spt, &Fifo]
}

/// Job sequence produced by `rule`.
pub fn dispatch(instance: &Instance, rule: &dyn DispatchingRule) -> Vec<usize> {
    let mut pending: Vec<usize> = (0..instance.len()).collect();
    let mut sequence = Vec::with_capacity(instance.len());
    let mut now = 0.0_f64;

    while !pending.is_empty() {
        let released = pending
            .iter()
            .enumerate()
            .filter(|&(_, &k)| instance.job(k).release <= now)
            .min_by(|&(_, &a), &(_, &b)| {
                rule.score(instance.job(a), now)
                    .total_cmp(&rule.score(instance.job(b), now))
                    .then(a.cmp(&b))
            })
            .map(|(slot, _)| slot);

        match released {
            Some(slot) => {
                let k = pending.remove(slot);
                now = now.max(instance.job(k).release) + instance.job(k).duration;
                sequence.push(k);
            }
            None => {
                now = pending
                    .iter()
                    .map(|&k| instance.job(k).release)
                    .fold(f64::INFINITY, f64::min);
            }
        }
    }

    sequence
}

/// Best incumbent among the default rules.
pub fn warm_start(
    instance: &Instance,
    formulation: &Formulation,
    objective: &Objective,
) -> Option<Incumbent> {
    let mut best: Option<Incumbent> = None;

    for rule in default_rules() {
        let sequence = dispatch(instance, rule);
        let values = formulation.sequence_values(instance, &sequence);
        let layout = formulation.layout();
        let starts: Vec<f64> = (0..instance.len()).map(|k| values[layout.start(k)]).collect();
        let cost = objective.evaluate(instance, &starts);

        debug!(rule = rule.name(), objective = cost, "Dispatching heuristic");

        if best.as_ref().map_or(true, |b| cost < b.objective) {
            best = Some(Incumbent::new(
                cost,
                values,
                IncumbentSource::WarmStart(rule.name()),
            ));
        }
    }

    best
}
