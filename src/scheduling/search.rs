//! Branch-and-bound over the `precedes` binaries.
//!
//! A node is a partial fixing of the ordering variables. Its relaxation is
//! solved by the [`RelaxationOracle`] with every unfixed `precedes` free in
//! `[0, 1]`:
//!
//! - infeasible relaxation, or a cycle among the fixed orderings: pruned
//! - bound no better than the incumbent: pruned
//! - every `precedes` integral: the relaxation point is a schedule and is
//!   offered to the incumbent
//! - otherwise: branch on a fractional pair, one child per orientation
//!
//! The worklist is drained until empty (optimality proven) or until the
//! budget stops it, in which case the open nodes bound the gap.
//!
//! The Big-M relaxation is weak: its bound is usually 0 until enough pairs
//! are fixed, so a search stopped early reports a wide gap.
//!
//! # Reference
//! Balas (1968), "Project scheduling with resource constraints";
//! Pinedo (2016), "Scheduling", Ch. 3.2 (branch-and-bound for 1|r_j|ΣT_j)

use super::config::{BranchingRule, CancellationToken, NodeSelection, SearchConfig};
use super::error::{Result, SchedulingError};
use super::formulation::Formulation;
use super::incumbent::{Incumbent, IncumbentSource, SharedIncumbent};
use super::instance::Instance;
use super::propagation::PrecedenceClosure;
use crate::domain::{RelaxationOracle, SolutionStatus, SolverError, VariableBounds};
use serde::Serialize;
use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::ops::AddAssign;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Open subproblem
#[derive(Debug, Clone)]
struct Node {
    /// Fixed `precedes` value per canonical pair
    fixings: Vec<Option<bool>>,
    /// Lower bound inherited from the parent relaxation
    bound: f64,
    depth: u32,
}

impl Node {
    fn root(pairs: usize) -> Self {
        Self {
            fixings: vec![None; pairs],
            bound: f64::NEG_INFINITY,
            depth: 0,
        }
    }

    fn child(fixings: &[Option<bool>], pair: usize, value: bool, bound: f64, depth: u32) -> Self {
        let mut fixings = fixings.to_vec();
        fixings[pair] = Some(value);
        Self {
            fixings,
            bound,
            depth: depth + 1,
        }
    }
}

/// Heap entry: lowest bound first, then insertion order
#[derive(Debug)]
struct Ranked {
    node: Node,
    seq: u64,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == CmpOrdering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        // BinaryHeap is a max-heap
        other
            .node
            .bound
            .total_cmp(&self.node.bound)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Open nodes of one worker
#[derive(Debug)]
enum Worklist {
    Stack(Vec<Node>),
    Heap { heap: BinaryHeap<Ranked>, seq: u64 },
}

impl Worklist {
    fn new(selection: NodeSelection) -> Self {
        match selection {
            NodeSelection::DepthFirst => Worklist::Stack(Vec::new()),
            NodeSelection::BestBound => Worklist::Heap {
                heap: BinaryHeap::new(),
                seq: 0,
            },
        }
    }

    fn push(&mut self, node: Node) {
        match self {
            Worklist::Stack(stack) => stack.push(node),
            Worklist::Heap { heap, seq } => {
                *seq += 1;
                heap.push(Ranked { node, seq: *seq });
            }
        }
    }

    fn pop(&mut self) -> Option<Node> {
        match self {
            Worklist::Stack(stack) => stack.pop(),
            Worklist::Heap { heap, .. } => heap.pop().map(|r| r.node),
        }
    }

    fn len(&self) -> usize {
        match self {
            Worklist::Stack(stack) => stack.len(),
            Worklist::Heap { heap, .. } => heap.len(),
        }
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest bound among open nodes, `+∞` when empty
    fn min_bound(&self) -> f64 {
        let bounds: Box<dyn Iterator<Item = f64> + '_> = match self {
            Worklist::Stack(stack) => Box::new(stack.iter().map(|n| n.bound)),
            Worklist::Heap { heap, .. } => Box::new(heap.iter().map(|r| r.node.bound)),
        };
        bounds.fold(f64::INFINITY, f64::min)
    }

    fn drain(&mut self) -> Vec<Node> {
        match self {
            Worklist::Stack(stack) => std::mem::take(stack),
            Worklist::Heap { heap, .. } => {
                let mut ranked = std::mem::take(heap).into_sorted_vec();
                // into_sorted_vec is ascending by Ord, i.e. worst first
                ranked.reverse();
                ranked.into_iter().map(|r| r.node).collect()
            }
        }
    }
}

/// Why a search stopped before exhausting its worklist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    NodeLimit,
    TimeLimit,
    Cancelled,
}

impl From<StopReason> for SolutionStatus {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::NodeLimit => SolutionStatus::NodeLimit,
            StopReason::TimeLimit => SolutionStatus::TimeLimit,
            StopReason::Cancelled => SolutionStatus::Interrupted,
        }
    }
}

/// Node/time/cancellation budget shared by all workers
struct SearchBudget {
    node_limit: Option<u64>,
    deadline: Option<Instant>,
    cancel: Option<CancellationToken>,
    admitted: AtomicU64,
}

impl SearchBudget {
    fn new(config: &SearchConfig, cancel: Option<CancellationToken>, started: Instant) -> Self {
        Self {
            node_limit: config.node_limit,
            deadline: config.time_budget().map(|d| started + d),
            cancel,
            admitted: AtomicU64::new(0),
        }
    }

    /// Checked at every node boundary. Returns the node's sequence number.
    fn admit(&self) -> std::result::Result<u64, StopReason> {
        if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
            return Err(StopReason::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(StopReason::TimeLimit);
        }
        let node = self.admitted.fetch_add(1, Ordering::Relaxed) + 1;
        if self.node_limit.is_some_and(|limit| node > limit) {
            return Err(StopReason::NodeLimit);
        }
        Ok(node)
    }
}

/// Counters of a search
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchStatistics {
    /// Nodes taken from the worklist and processed
    pub nodes_explored: u64,
    pub relaxations_solved: u64,
    pub pruned_by_bound: u64,
    pub pruned_infeasible: u64,
    pub integral_leaves: u64,
    pub incumbent_updates: u64,
    pub relaxation_failures: u64,
    pub max_depth: u32,
    pub elapsed_ms: f64,
}

impl AddAssign for SearchStatistics {
    fn add_assign(&mut self, other: Self) {
        self.nodes_explored += other.nodes_explored;
        self.relaxations_solved += other.relaxations_solved;
        self.pruned_by_bound += other.pruned_by_bound;
        self.pruned_infeasible += other.pruned_infeasible;
        self.integral_leaves += other.integral_leaves;
        self.incumbent_updates += other.incumbent_updates;
        self.relaxation_failures += other.relaxation_failures;
        self.max_depth = self.max_depth.max(other.max_depth);
    }
}

/// Result of a search; budget stops are not errors
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// `Optimal` when the worklist was exhausted, `Feasible` when nodes were
    /// lost to relaxation failures, a budget status when stopped early,
    /// `Infeasible` when every node was pruned without an incumbent
    pub status: SolutionStatus,
    pub incumbent: Option<Incumbent>,
    /// Proven lower bound on the optimum
    pub best_bound: f64,
    /// `incumbent − best_bound`, `+∞` without an incumbent
    pub gap: f64,
    pub statistics: SearchStatistics,
}

/// Per-worker bookkeeping, merged once the workers finish
#[derive(Debug, Default)]
struct WorkerReport {
    statistics: SearchStatistics,
    stopped: Option<StopReason>,
    /// Smallest bound among nodes left open or dropped on failure
    open_bound: f64,
}

impl WorkerReport {
    fn new() -> Self {
        Self {
            open_bound: f64::INFINITY,
            ..Self::default()
        }
    }

    fn merge(&mut self, other: WorkerReport) {
        self.statistics += other.statistics;
        self.stopped = self.stopped.or(other.stopped);
        self.open_bound = self.open_bound.min(other.open_bound);
    }
}

enum Expansion {
    Pruned,
    Leaf,
    Branch([Node; 2]),
}

/// Branch-and-bound driver for one formulation
pub struct BranchAndBound<'a> {
    instance: &'a Instance,
    formulation: &'a Formulation,
    oracle: &'a dyn RelaxationOracle,
    config: &'a SearchConfig,
    cancel: Option<CancellationToken>,
}

impl<'a> BranchAndBound<'a> {
    pub fn new(
        instance: &'a Instance,
        formulation: &'a Formulation,
        oracle: &'a dyn RelaxationOracle,
        config: &'a SearchConfig,
    ) -> Self {
        Self {
            instance,
            formulation,
            oracle,
            config,
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Runs the search, starting from `warm_start` if given.
    ///
    /// Fails only when the root relaxation is infeasible or fails; any
    /// later trouble degrades the outcome's status instead.
    pub fn run(&self, warm_start: Option<Incumbent>) -> Result<SearchOutcome> {
        let started = Instant::now();
        let budget = SearchBudget::new(self.config, self.cancel.clone(), started);
        let incumbent = SharedIncumbent::new(warm_start, self.config.gap_tolerance);
        let workers = self.config.worker_count();

        info!(
            jobs = self.instance.len(),
            pairs = self.formulation.pairs().len(),
            big_m = self.formulation.big_m(),
            workers,
            oracle = self.oracle.name(),
            "Starting branch-and-bound"
        );

        let mut report = WorkerReport::new();
        let mut worklist = Worklist::new(self.config.node_selection);

        // The root is always solved so that infeasibility and failure surface.
        let root = Node::root(self.formulation.pairs().len());
        let root_node = budget.admitted.fetch_add(1, Ordering::Relaxed) + 1;
        match self.expand(&root, root_node, &incumbent, &mut report.statistics) {
            Ok(Expansion::Branch(children)) => children.into_iter().for_each(|c| worklist.push(c)),
            Ok(Expansion::Pruned) if report.statistics.pruned_infeasible > 0 => {
                return Err(SchedulingError::InfeasibleInstance(
                    "the root relaxation has no feasible point".to_string(),
                ));
            }
            Ok(_) => {}
            Err(e) => return Err(SchedulingError::RelaxationFailure(e.to_string())),
        }

        if workers > 1 {
            // grow the frontier until every worker has a subtree
            while !worklist.is_empty() && worklist.len() < workers {
                if !self.step(&mut worklist, &incumbent, &budget, &mut report) {
                    break;
                }
            }
        }

        if workers > 1 && worklist.len() > 1 && report.stopped.is_none() {
            let mut shards: Vec<Worklist> = (0..workers)
                .map(|_| Worklist::new(self.config.node_selection))
                .collect();
            for (i, node) in worklist.drain().into_iter().enumerate() {
                shards[i % workers].push(node);
            }

            let incumbent = &incumbent;
            let budget = &budget;
            let reports: Vec<WorkerReport> = std::thread::scope(|scope| {
                let handles: Vec<_> = shards
                    .into_iter()
                    .map(|mut shard| {
                        scope.spawn(move || {
                            let mut report = WorkerReport::new();
                            self.drain(&mut shard, incumbent, budget, &mut report);
                            report
                        })
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                    .collect()
            });
            for worker_report in reports {
                report.merge(worker_report);
            }
        } else {
            self.drain(&mut worklist, &incumbent, &budget, &mut report);
        }

        report.statistics.elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        let outcome = self.conclude(incumbent.into_inner(), report);

        info!(
            status = %outcome.status,
            objective = outcome.incumbent.as_ref().map(|i| i.objective),
            best_bound = outcome.best_bound,
            gap = outcome.gap,
            nodes = outcome.statistics.nodes_explored,
            elapsed_ms = outcome.statistics.elapsed_ms,
            "Branch-and-bound finished"
        );

        Ok(outcome)
    }

    /// Processes nodes until the worklist empties or the budget stops it
    fn drain(
        &self,
        worklist: &mut Worklist,
        incumbent: &SharedIncumbent,
        budget: &SearchBudget,
        report: &mut WorkerReport,
    ) {
        while self.step(worklist, incumbent, budget, report) {}
        report.open_bound = report.open_bound.min(worklist.min_bound());
    }

    /// One node boundary. Returns false when there is nothing left to do.
    fn step(
        &self,
        worklist: &mut Worklist,
        incumbent: &SharedIncumbent,
        budget: &SearchBudget,
        report: &mut WorkerReport,
    ) -> bool {
        let Some(node) = worklist.pop() else {
            return false;
        };

        let sequence = match budget.admit() {
            Ok(sequence) => sequence,
            Err(reason) => {
                debug!(?reason, open = worklist.len() + 1, "Search budget exhausted");
                worklist.push(node);
                report.stopped = Some(reason);
                return false;
            }
        };

        match self.expand(&node, sequence, incumbent, &mut report.statistics) {
            Ok(Expansion::Branch(children)) => {
                for child in children {
                    worklist.push(child);
                }
            }
            Ok(Expansion::Pruned | Expansion::Leaf) => {}
            Err(e) => {
                warn!(
                    node = sequence,
                    depth = node.depth,
                    error = %e,
                    "Relaxation failed, dropping node"
                );
                report.statistics.relaxation_failures += 1;
                report.open_bound = report.open_bound.min(node.bound);
            }
        }
        true
    }

    /// Bounds, prunes, accepts or branches one node
    fn expand(
        &self,
        node: &Node,
        sequence: u64,
        incumbent: &SharedIncumbent,
        stats: &mut SearchStatistics,
    ) -> std::result::Result<Expansion, SolverError> {
        stats.nodes_explored += 1;
        stats.max_depth = stats.max_depth.max(node.depth);

        if node.bound >= incumbent.cutoff() {
            stats.pruned_by_bound += 1;
            return Ok(Expansion::Pruned);
        }

        let pairs = self.formulation.pairs();
        let Some(closure) = PrecedenceClosure::from_fixings(self.instance.len(), pairs, &node.fixings)
        else {
            trace!(node = sequence, "Cyclic orderings");
            stats.pruned_infeasible += 1;
            return Ok(Expansion::Pruned);
        };
        let fixings = closure.fixings(pairs);
        let bounds = self.node_bounds(&fixings, &closure.heads(self.instance));

        let solution = self
            .oracle
            .solve_relaxation(self.formulation.problem(), &bounds)?;
        stats.relaxations_solved += 1;

        match solution.status {
            SolutionStatus::Optimal => {}
            SolutionStatus::Infeasible => {
                trace!(node = sequence, "Relaxation infeasible");
                stats.pruned_infeasible += 1;
                return Ok(Expansion::Pruned);
            }
            other => {
                return Err(SolverError::ExecutionFailed(format!(
                    "relaxation ended with status {}",
                    other
                )))
            }
        }

        let bound = solution.optimal_value.ok_or_else(|| {
            SolverError::ExecutionFailed("optimal relaxation without a value".to_string())
        })?;
        if solution.variable_values.len() != self.formulation.layout().len() {
            return Err(SolverError::ExecutionFailed(format!(
                "relaxation returned {} values for {} variables",
                solution.variable_values.len(),
                self.formulation.layout().len()
            )));
        }

        trace!(
            node = sequence,
            depth = node.depth,
            decided = closure.decided(),
            bound,
            "Relaxation solved"
        );

        if bound >= incumbent.cutoff() {
            stats.pruned_by_bound += 1;
            return Ok(Expansion::Pruned);
        }

        let values = solution.variable_values;
        match self.branching_pair(&fixings, &values) {
            None => {
                stats.integral_leaves += 1;
                let values = self.leaf_values(&values);
                let objective = self.formulation.objective_value(&values);
                let candidate =
                    Incumbent::new(objective, values, IncumbentSource::Search { node: sequence });
                if incumbent.offer(candidate) {
                    stats.incumbent_updates += 1;
                    debug!(
                        node = sequence,
                        depth = node.depth,
                        objective,
                        bound,
                        "New incumbent"
                    );
                }
                Ok(Expansion::Leaf)
            }
            Some(pair) => {
                let value = values[self.formulation.layout().precedes(pair)];
                let down = Node::child(&fixings, pair, false, bound, node.depth);
                let up = Node::child(&fixings, pair, true, bound, node.depth);
                // the child agreeing with the relaxation is pushed last so a
                // stack explores it first
                if value >= 0.5 {
                    Ok(Expansion::Branch([down, up]))
                } else {
                    Ok(Expansion::Branch([up, down]))
                }
            }
        }
    }

    /// Relaxation bounds for a node: fixed orderings pinned, starts raised to heads
    fn node_bounds(&self, fixings: &[Option<bool>], heads: &[f64]) -> Vec<VariableBounds> {
        let layout = self.formulation.layout();
        let mut bounds = self.formulation.root_bounds();

        for (k, &head) in heads.iter().enumerate() {
            let b = &mut bounds[layout.start(k)];
            b.lower = b.lower.max(head);
        }
        for (p, fixing) in fixings.iter().enumerate() {
            if let Some(value) = fixing {
                bounds[layout.precedes(p)] = VariableBounds::fixed(if *value { 1.0 } else { 0.0 });
            }
        }
        bounds
    }

    /// Unfixed pair to branch on, `None` when the relaxation is integral
    fn branching_pair(&self, fixings: &[Option<bool>], values: &[f64]) -> Option<usize> {
        let layout = self.formulation.layout();
        let tolerance = self.config.integrality_tolerance;
        let mut chosen: Option<(usize, f64)> = None;

        for (p, fixing) in fixings.iter().enumerate() {
            if fixing.is_some() {
                continue;
            }
            let value = values[layout.precedes(p)].clamp(0.0, 1.0);
            let fractionality = value.min(1.0 - value);
            if fractionality <= tolerance {
                continue;
            }
            match self.config.branching {
                BranchingRule::FirstFractional => return Some(p),
                BranchingRule::MostFractional => {
                    if chosen.map_or(true, |(_, best)| fractionality > best) {
                        chosen = Some((p, fractionality));
                    }
                }
            }
        }

        chosen.map(|(p, _)| p)
    }

    /// Schedule of an integral relaxation point.
    ///
    /// Only the rounded `precedes` values are kept: the jobs are ordered by
    /// how many others precede them and left-shifted from there, so start
    /// times within the integrality tolerance never leak into the incumbent.
    fn leaf_values(&self, values: &[f64]) -> Vec<f64> {
        let layout = self.formulation.layout();
        let mut predecessors = vec![0usize; self.instance.len()];
        for (p, &(j, k)) in self.formulation.pairs().iter().enumerate() {
            if values[layout.precedes(p)] >= 0.5 {
                predecessors[k] += 1;
            } else {
                predecessors[j] += 1;
            }
        }

        let mut order: Vec<usize> = (0..self.instance.len()).collect();
        order.sort_by_key(|&k| predecessors[k]);
        self.formulation.sequence_values(self.instance, &order)
    }

    fn conclude(&self, incumbent: Option<Incumbent>, report: WorkerReport) -> SearchOutcome {
        let status = match (&report.stopped, &incumbent) {
            (Some(reason), _) => SolutionStatus::from(*reason),
            (None, None) if report.statistics.relaxation_failures == 0 => {
                SolutionStatus::Infeasible
            }
            (None, _) if report.statistics.relaxation_failures > 0 => SolutionStatus::Feasible,
            (None, _) => SolutionStatus::Optimal,
        };

        let objective = incumbent.as_ref().map_or(f64::INFINITY, |i| i.objective);
        let best_bound = if status == SolutionStatus::Optimal {
            objective
        } else {
            report.open_bound.min(objective)
        };
        let gap = if incumbent.is_some() {
            (objective - best_bound).max(0.0)
        } else {
            f64::INFINITY
        };

        SearchOutcome {
            status,
            incumbent,
            best_bound,
            gap,
            statistics: report.statistics,
        }
    }
}
