#![allow(dead_code)]

use pastdue::{Instance, Job, Schedule};
use proptest::prelude::*;

pub fn published() -> Instance {
    Instance::new(vec![
        Job::new("A", 2.0, 5.0, 10.0),
        Job::new("B", 5.0, 6.0, 21.0),
        Job::new("C", 4.0, 8.0, 15.0),
        Job::new("D", 0.0, 4.0, 10.0),
        Job::new("E", 0.0, 2.0, 5.0),
        Job::new("F", 8.0, 3.0, 15.0),
        Job::new("G", 9.0, 2.0, 22.0),
    ])
    .unwrap()
}

/// Minimum total tardiness over every job sequence, each job started as
/// early as possible.
pub fn brute_force(instance: &Instance) -> f64 {
    fn visit(instance: &Instance, used: &mut [bool], time: f64, cost: f64, best: &mut f64) {
        if cost >= *best {
            return;
        }
        if used.iter().all(|&u| u) {
            *best = cost;
            return;
        }
        for k in 0..instance.len() {
            if used[k] {
                continue;
            }
            let job = instance.job(k);
            let start = time.max(job.release);
            used[k] = true;
            visit(instance, used, start + job.duration, cost + job.pastdue_at(start), best);
            used[k] = false;
        }
    }

    let mut best = f64::INFINITY;
    visit(instance, &mut vec![false; instance.len()], 0.0, 0.0, &mut best);
    best
}

/// Panics unless `schedule` is a valid schedule of `instance`.
pub fn assert_valid(instance: &Instance, schedule: &Schedule) {
    const TOL: f64 = 1e-6;
    assert_eq!(schedule.jobs.len(), instance.len());

    for row in &schedule.jobs {
        let job = &instance.jobs()[instance.position(&row.id).unwrap()];
        assert!(row.start >= job.release - TOL, "{} starts early", row.id);
        assert!((row.finish - row.start - job.duration).abs() < TOL);
        assert!(row.finish <= job.due + row.pastdue + TOL);
        assert!((row.pastdue - (row.finish - job.due).max(0.0)).abs() < TOL);
    }
    for pair in schedule.jobs.windows(2) {
        assert!(pair[0].start <= pair[1].start);
        assert!(
            pair[0].finish <= pair[1].start + TOL,
            "{} overlaps {}",
            pair[0].id,
            pair[1].id
        );
    }
}

/// Small instances with integer times; every job fits before its due time alone.
pub fn small_instance() -> impl Strategy<Value = Instance> {
    prop::collection::vec((0u32..=6, 1u32..=4, 0u32..=6), 2..=5).prop_map(|times| {
        let jobs = times
            .into_iter()
            .enumerate()
            .map(|(k, (release, duration, slack))| {
                Job::new(
                    format!("j{}", k),
                    release as f64,
                    duration as f64,
                    (release + duration + slack) as f64,
                )
            })
            .collect();
        Instance::new(jobs).unwrap()
    })
}
