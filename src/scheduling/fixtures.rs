// Shared instances for unit tests

use super::instance::{Instance, Job};

/// The published seven-job instance.
pub(crate) fn published() -> Instance {
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

/// Two identical jobs competing for the machine at time 0.
pub(crate) fn identical_pair() -> Instance {
    Instance::new(vec![
        Job::new("first", 0.0, 5.0, 5.0),
        Job::new("second", 0.0, 5.0, 5.0),
    ])
    .unwrap()
}

/// Optimal total tardiness by enumerating every sequence and starting
/// each job as early as possible.
pub(crate) fn brute_force_total_tardiness(instance: &Instance) -> f64 {
    fn visit(instance: &Instance, used: &mut Vec<bool>, time: f64, cost: f64, best: &mut f64) {
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
            visit(
                instance,
                used,
                job.finish_at(start),
                cost + job.pastdue_at(start),
                best,
            );
            used[k] = false;
        }
    }

    let mut best = f64::INFINITY;
    visit(instance, &mut vec![false; instance.len()], 0.0, 0.0, &mut best);
    best
}

#[test]
fn test_brute_force_reference_values() {
    assert_eq!(brute_force_total_tardiness(&published()), 16.0);
    assert_eq!(brute_force_total_tardiness(&identical_pair()), 5.0);
}
