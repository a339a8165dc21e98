// Scheduling core: instance model, formulation, search and extraction

pub mod config;
pub mod dispatching;
pub mod error;
pub mod extractor;
pub mod formulation;
pub mod incumbent;
pub mod instance;
pub mod objective;
pub mod propagation;
pub mod search;

#[cfg(test)]
pub(crate) mod fixtures;

pub use config::{BranchingRule, CancellationToken, NodeSelection, SearchConfig};
pub use dispatching::{dispatch, warm_start, DispatchingRule, Edd, Fifo, Mdd, Spt};
pub use error::{Result, SchedulingError};
pub use extractor::{Schedule, ScheduleExtractor, ScheduledJob};
pub use formulation::{Formulation, VariableLayout};
pub use incumbent::{Incumbent, IncumbentSource};
pub use instance::{Instance, Job};
pub use objective::Objective;
pub use search::{BranchAndBound, SearchOutcome, SearchStatistics};
