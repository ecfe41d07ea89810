//! # gencheck-verify
//!
//! Snapshot, regenerate, compare and restore.
//!
//! Call [`verify`] to run the whole check for a set of patterns and an emit
//! command. The individual phases are public so callers can compose them:
//! [`resolve::resolve_targets`], [`resolve::validate_targets`],
//! [`shadow::ShadowSet`], [`emit::run_emit`] and [`diff::compare_target`].

pub mod diff;
pub mod emit;
pub mod pipeline;
pub mod report;
pub mod resolve;
pub mod shadow;

pub use pipeline::verify;
pub use report::{MemoryReporter, Reporter};
