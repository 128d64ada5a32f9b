//! Core configuration and execution-context types.

mod config;
mod context;

pub use config::{
    default_penalty_grid, ConfigError, RegimeLabel, RegimeShapeSpec, StudyConfig,
    StudyConfigBuilder,
};
pub use context::{ContextError, ExecutionContext, Stage};
