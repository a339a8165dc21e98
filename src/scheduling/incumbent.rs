use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Where an incumbent came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncumbentSource {
    /// A dispatching heuristic run before the search
    WarmStart(&'static str),
    /// An integral relaxation at the given node count
    Search { node: u64 },
    /// A mixed-integer backend solving the whole model
    External,
}

impl fmt::Display for IncumbentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncumbentSource::WarmStart(rule) => write!(f, "{} dispatching", rule),
            IncumbentSource::Search { node } => write!(f, "search node {}", node),
            IncumbentSource::External => f.write_str("external MIP"),
        }
    }
}

/// Best integral assignment known so far
#[derive(Debug, Clone)]
pub struct Incumbent {
    pub objective: f64,
    /// Full variable assignment in formulation layout
    pub values: Vec<f64>,
    pub source: IncumbentSource,
}

impl Incumbent {
    pub fn new(objective: f64, values: Vec<f64>, source: IncumbentSource) -> Self {
        Self {
            objective,
            values,
            source,
        }
    }
}

/// Incumbent shared by all workers.
///
/// A candidate replaces the current value only when strictly better by
/// more than `tolerance`; earlier solutions win ties.
#[derive(Debug)]
pub(crate) struct SharedIncumbent {
    best: Mutex<Option<Incumbent>>,
    tolerance: f64,
}

impl SharedIncumbent {
    pub(crate) fn new(initial: Option<Incumbent>, tolerance: f64) -> Self {
        Self {
            best: Mutex::new(initial),
            tolerance,
        }
    }

    /// Objective of the incumbent, `+∞` when there is none
    pub(crate) fn objective(&self) -> f64 {
        self.best
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(f64::INFINITY, |i| i.objective)
    }

    /// Bounds at or above this value cannot improve the incumbent
    pub(crate) fn cutoff(&self) -> f64 {
        self.objective() - self.tolerance
    }

    /// Returns true if `candidate` became the incumbent
    pub(crate) fn offer(&self, candidate: Incumbent) -> bool {
        let mut best = self.best.lock().unwrap_or_else(PoisonError::into_inner);
        let improves = best
            .as_ref()
            .map_or(true, |current| candidate.objective < current.objective - self.tolerance);
        if improves {
            *best = Some(candidate);
        }
        improves
    }

    pub(crate) fn into_inner(self) -> Option<Incumbent> {
        self.best
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
