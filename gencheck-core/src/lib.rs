//! gencheck core library: domain types, config file, errors.
//!
//! - [`types`]: targets, shadow copies, emit command, diff results
//! - [`config`]: optional `gencheck.yaml` defaults
//! - [`error`]: [`VerifyError`] and [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, RestoreFailure, VerifyError};
pub use types::{
    shadow_path, EmitCommand, FileDiff, RunOptions, StepKind, Target, TargetSet, VerifyReport,
    DEFAULT_CONTEXT_RADIUS, SHADOW_SUFFIX,
};
