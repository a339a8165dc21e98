use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Order in which open nodes are taken from the worklist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeSelection {
    /// Stack order: dive towards leaves, little memory
    #[default]
    DepthFirst,
    /// Lowest relaxation bound first
    BestBound,
}

/// Which fractional `precedes` variable to branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchingRule {
    /// Closest to 0.5, ties to the first canonical pair
    #[default]
    MostFractional,
    /// First fractional pair in canonical order
    FirstFractional,
}

/// Search limits and tolerances
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of nodes whose relaxation is solved
    pub node_limit: Option<u64>,
    /// Wall-clock limit in seconds
    pub time_limit: Option<f64>,
    /// Nodes whose bound is within this of the incumbent are pruned
    pub gap_tolerance: f64,
    /// Distance from 0/1 below which a `precedes` value counts as integral
    pub integrality_tolerance: f64,
    /// Slack allowed when re-checking the extracted schedule
    pub feasibility_tolerance: f64,
    pub node_selection: NodeSelection,
    pub branching: BranchingRule,
    /// Threads exploring subtrees
    pub workers: usize,
    /// Seed the incumbent with dispatching heuristics
    pub warm_start: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            node_limit: None,
            time_limit: None,
            gap_tolerance: 1e-6,
            integrality_tolerance: 1e-6,
            feasibility_tolerance: 1e-6,
            node_selection: NodeSelection::DepthFirst,
            branching: BranchingRule::MostFractional,
            workers: 1,
            warm_start: true,
        }
    }
}

impl SearchConfig {
    pub fn with_node_limit(mut self, limit: u64) -> Self {
        self.node_limit = Some(limit);
        self
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_node_selection(mut self, selection: NodeSelection) -> Self {
        self.node_selection = selection;
        self
    }

    pub fn with_branching(mut self, branching: BranchingRule) -> Self {
        self.branching = branching;
        self
    }

    pub fn with_warm_start(mut self, warm_start: bool) -> Self {
        self.warm_start = warm_start;
        self
    }

    /// Time limit as a `Duration`; non-positive or non-finite limits are ignored
    pub fn time_budget(&self) -> Option<Duration> {
        self.time_limit
            .filter(|s| s.is_finite() && *s > 0.0)
            .map(Duration::from_secs_f64)
    }

    /// At least one worker
    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }
}

/// Shared flag a caller flips to stop a running search.
///
/// The search checks it between nodes and returns its incumbent.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
