// Application layer: use cases and wire mapping

pub mod mappers;
pub mod scheduling_service;

pub use scheduling_service::{ScheduleReport, SchedulingService, SolveStrategy};
