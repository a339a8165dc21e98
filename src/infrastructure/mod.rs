// Infrastructure layer: files, configuration and logging

pub mod config;
pub mod telemetry;

pub use config::{load_instance, AppConfig, ConfigError};
pub use telemetry::init_tracing;
