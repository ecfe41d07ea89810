//! Optional YAML defaults for a gencheck run.
//!
//! ```yaml
//! paths:
//!   - src/generated/*.ts
//! command: [npm, run, codegen]
//! context: 3
//! ```
//!
//! Values given on the command line replace the file's values; lists are
//! never merged.
//!
//! # API pattern
//!
//! - `load(path)`: explicit file; a missing file is [`ConfigError::NotFound`]
//! - `load_default_at(root)`: `<root>/gencheck.yaml` if it exists, else `None`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{EmitCommand, DEFAULT_CONTEXT_RADIUS};

/// File name looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "gencheck.yaml";

/// Contents of a `gencheck.yaml` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path or glob patterns of generated files.
    #[serde(default)]
    pub paths: Vec<String>,

    /// Generator command and arguments.
    #[serde(default)]
    pub command: EmitCommand,

    /// Unified diff context radius.
    #[serde(default)]
    pub context: Option<usize>,
}

impl Config {
    /// Layer command-line values over this config.
    ///
    /// Non-empty `paths` or `command` replace the configured ones wholesale.
    pub fn with_overrides(
        mut self,
        paths: Vec<String>,
        command: EmitCommand,
        context: Option<usize>,
    ) -> Self {
        if !paths.is_empty() {
            self.paths = paths;
        }
        if !command.is_empty() {
            self.command = command;
        }
        if context.is_some() {
            self.context = context;
        }
        self
    }

    pub fn context_radius(&self) -> usize {
        self.context.unwrap_or(DEFAULT_CONTEXT_RADIUS)
    }
}

/// `<root>/gencheck.yaml`: pure, no I/O.
pub fn default_path_at(root: &Path) -> PathBuf {
    root.join(DEFAULT_CONFIG_FILE)
}

/// Load a config file that the caller asked for explicitly.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(path, &contents)
}

/// Load `<root>/gencheck.yaml` if present.
pub fn load_default_at(root: &Path) -> Result<Option<Config>, ConfigError> {
    let path = default_path_at(root);
    if !path.exists() {
        return Ok(None);
    }
    load(&path).map(Some)
}

fn parse(path: &Path, contents: &str) -> Result<Config, ConfigError> {
    // An empty file deserializes as unit, not as an empty mapping.
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
