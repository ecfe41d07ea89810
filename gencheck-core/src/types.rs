//! Domain types for a verification run.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Suffix appended to a target's path to form its shadow copy.
pub const SHADOW_SUFFIX: &str = ".tmp";

/// Lines of unchanged context around each hunk in a unified diff.
pub const DEFAULT_CONTEXT_RADIUS: usize = 3;

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// `<path>.tmp`: pure, no I/O.
pub fn shadow_path(path: &Path) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(SHADOW_SUFFIX);
    PathBuf::from(raw)
}

/// A file the generator is expected to reproduce, paired with its shadow copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub path: PathBuf,
    pub shadow: PathBuf,
}

impl Target {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let shadow = shadow_path(&path);
        Self { path, shadow }
    }

    /// The target path relative to `root`, or unchanged if it is not below it.
    pub fn display_path<'a>(&'a self, root: &Path) -> &'a Path {
        self.path.strip_prefix(root).unwrap_or(&self.path)
    }

    /// The shadow path relative to `root`, or unchanged if it is not below it.
    pub fn display_shadow<'a>(&'a self, root: &Path) -> &'a Path {
        self.shadow.strip_prefix(root).unwrap_or(&self.shadow)
    }
}

/// Ordered, deduplicated set of targets. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSet {
    targets: Vec<Target>,
}

impl TargetSet {
    /// Build a set from paths, keeping the first occurrence of each.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        for path in paths {
            let path: PathBuf = path.into();
            if seen.insert(path.clone()) {
                targets.push(Target::new(path));
            }
        }
        Self { targets }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Target> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl<'a> IntoIterator for &'a TargetSet {
    type Item = &'a Target;
    type IntoIter = std::slice::Iter<'a, Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}

// ---------------------------------------------------------------------------
// Emit command
// ---------------------------------------------------------------------------

/// The generator program and its arguments, passed through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmitCommand(pub Vec<String>);

impl EmitCommand {
    pub fn program(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.0.get(1..).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for EmitCommand {
    fn from(tokens: Vec<String>) -> Self {
        Self(tokens)
    }
}

impl From<&[&str]> for EmitCommand {
    fn from(tokens: &[&str]) -> Self {
        Self(tokens.iter().map(|t| (*t).to_owned()).collect())
    }
}

impl fmt::Display for EmitCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if needs_quoting(token) {
                write!(f, "'{}'", token.replace('\'', r"'\''"))?;
            } else {
                f.write_str(token)?;
            }
        }
        Ok(())
    }
}

/// True unless every character is safe to paste into a POSIX shell unquoted.
fn needs_quoting(token: &str) -> bool {
    token.is_empty()
        || !token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c))
}

// ---------------------------------------------------------------------------
// Run options, steps, results
// ---------------------------------------------------------------------------

/// Settings for one verification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Working directory: patterns resolve against it and targets must stay inside it.
    pub root: PathBuf,
    /// Log every side-effecting step instead of performing it.
    pub dry_run: bool,
    pub context_radius: usize,
}

impl RunOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dry_run: false,
            context_radius: DEFAULT_CONTEXT_RADIUS,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn context_radius(mut self, radius: usize) -> Self {
        self.context_radius = radius;
        self
    }
}

/// Kind of progress line emitted during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// Target copied to its shadow.
    Copy,
    /// Emit command started.
    Emit,
    /// Target compared against its shadow.
    Diff,
    /// Shadow moved back over its target.
    Move,
}

impl StepKind {
    pub fn label(self) -> &'static str {
        match self {
            StepKind::Copy => "copy",
            StepKind::Emit => "emit",
            StepKind::Diff => "diff",
            StepKind::Move => "move",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Comparison result for a single target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    /// Unified diff, shadow (old) against target (new). `None` when unchanged.
    pub unified_diff: Option<String>,
}

impl FileDiff {
    pub fn changed(&self) -> bool {
        self.unified_diff.is_some()
    }
}

/// Outcome of a run that reached the end without a fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub checked: usize,
    /// One entry per compared target, in resolution order. Empty in dry-run.
    pub diffs: Vec<FileDiff>,
    pub dry_run: bool,
}

impl VerifyReport {
    pub fn drifted(&self) -> impl Iterator<Item = &FileDiff> {
        self.diffs.iter().filter(|d| d.changed())
    }

    pub fn has_drift(&self) -> bool {
        self.drifted().next().is_some()
    }
}
