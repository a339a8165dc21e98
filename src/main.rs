use clap::Parser;
use pastdue::application::mappers;
use pastdue::{
    init_tracing, load_instance, AppConfig, NodeSelection, Objective, SchedulingService,
    SolverBackend, SolverFactory, SolveStrategy,
};
use std::path::PathBuf;
use tracing::debug;

/// Single-machine scheduling with release and due times.
///
/// Finds start times that minimise total tardiness (or another linear cost)
/// by branch-and-bound over LP relaxations.
#[derive(Parser, Debug)]
#[command(name = "pastdue", version, about)]
struct Args {
    /// Instance JSON: `{"id": [release, duration, due], ...}` or `{"jobs": [...]}`
    instance: PathBuf,

    /// JSON configuration file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// LP backend: auto, microlp, cbc, highs
    #[arg(short, long)]
    backend: Option<SolverBackend>,

    /// Objective: total-tardiness or total-completion
    #[arg(short, long)]
    objective: Option<Objective>,

    /// branch-and-bound, or external to hand the whole model to a MIP backend
    #[arg(long)]
    strategy: Option<SolveStrategy>,

    /// Stop after this many nodes
    #[arg(long)]
    node_limit: Option<u64>,

    /// Stop after this many seconds
    #[arg(long)]
    time_limit: Option<f64>,

    /// Worker threads for the search
    #[arg(short, long)]
    workers: Option<usize>,

    /// Explore the lowest bound first instead of depth-first
    #[arg(long)]
    best_first: bool,

    /// Skip the dispatching warm start
    #[arg(long)]
    no_warm_start: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn app_config(&self) -> Result<AppConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            None => AppConfig::default(),
        };

        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(objective) = &self.objective {
            config.objective = objective.clone();
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(limit) = self.node_limit {
            config.search.node_limit = Some(limit);
        }
        if let Some(seconds) = self.time_limit {
            config.search.time_limit = Some(seconds);
        }
        if let Some(workers) = self.workers {
            config.search.workers = workers;
        }
        if self.best_first {
            config.search.node_selection = NodeSelection::BestBound;
        }
        if self.no_warm_start {
            config.search.warm_start = false;
        }
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = args.app_config()?;
    debug!(?config, "Configuration");

    let instance = load_instance(&args.instance)?;
    let oracle = SolverFactory::create_from_backend(config.backend)?;

    let service = SchedulingService::new(oracle)
        .with_config(config.search)
        .with_strategy(config.strategy);
    let report = service.solve(&instance, &config.objective)?;

    if args.json {
        println!("{}", mappers::report_to_json(&report)?);
    } else {
        print!("{}", mappers::render_table(&report));
    }

    Ok(())
}
