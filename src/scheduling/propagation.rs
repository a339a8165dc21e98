//! Consequences of a partial ordering, computed before a node's relaxation.
//!
//! Fixed `precedes` values are closed transitively. A cycle means the node
//! holds no schedule. Otherwise every implied ordering is fixed as well, and
//! each job gets a head: the earliest start its release and fixed
//! predecessors allow.

use super::instance::Instance;

/// Transitive closure of the fixed orderings of one node.
#[derive(Debug, Clone)]
pub struct PrecedenceClosure {
    jobs: usize,
    before: Vec<bool>,
}

impl PrecedenceClosure {
    /// `fixings[p]` is the value of `precedes` for `pairs[p]`, if fixed.
    /// Returns `None` when the fixed orderings contain a cycle.
    pub fn from_fixings(
        jobs: usize,
        pairs: &[(usize, usize)],
        fixings: &[Option<bool>],
    ) -> Option<Self> {
        let mut closure = Self {
            jobs,
            before: vec![false; jobs * jobs],
        };

        for (&(j, k), fixing) in pairs.iter().zip(fixings) {
            match fixing {
                Some(true) => closure.set(j, k),
                Some(false) => closure.set(k, j),
                None => {}
            }
        }

        // Warshall
        for m in 0..jobs {
            for a in 0..jobs {
                if !closure.precedes(a, m) {
                    continue;
                }
                for b in 0..jobs {
                    if closure.precedes(m, b) {
                        closure.set(a, b);
                    }
                }
            }
        }

        if (0..jobs).any(|a| closure.precedes(a, a)) {
            return None;
        }
        Some(closure)
    }

    /// True when job `a` must run before job `b`.
    pub fn precedes(&self, a: usize, b: usize) -> bool {
        self.before[a * self.jobs + b]
    }

    fn set(&mut self, a: usize, b: usize) {
        self.before[a * self.jobs + b] = true;
    }

    /// Fixings including everything the closure implies.
    pub fn fixings(&self, pairs: &[(usize, usize)]) -> Vec<Option<bool>> {
        pairs
            .iter()
            .map(|&(j, k)| {
                if self.precedes(j, k) {
                    Some(true)
                } else if self.precedes(k, j) {
                    Some(false)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Number of pairs whose order is decided.
    pub fn decided(&self) -> usize {
        self.before.iter().filter(|&&b| b).count()
    }

    /// Earliest start of every job given releases and fixed predecessors.
    pub fn heads(&self, instance: &Instance) -> Vec<f64> {
        let n = self.jobs;
        // a transitive relation ranks every job after all its predecessors
        // once sorted by predecessor count
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by_key(|&b| ((0..n).filter(|&a| self.precedes(a, b)).count(), b));

        let mut heads: Vec<f64> = instance.jobs().iter().map(|j| j.release).collect();
        for (i, &b) in order.iter().enumerate() {
            for &a in &order[..i] {
                if self.precedes(a, b) {
                    let ready = heads[a] + instance.job(a).duration;
                    if ready > heads[b] {
                        heads[b] = ready;
                    }
                }
            }
        }
        heads
    }
}
