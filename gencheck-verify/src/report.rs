//! Progress reporting seam between the pipeline and its caller.

use std::sync::Mutex;

use gencheck_core::{FileDiff, StepKind};

/// Receives user-facing progress while a run is in flight.
///
/// Lines are emitted as they happen so they interleave correctly with the
/// emit command's own output.
pub trait Reporter {
    /// A step was performed, or would have been when `simulated` is set.
    fn step(&self, kind: StepKind, message: &str, simulated: bool);

    /// A target drifted; `diff.unified_diff` is always `Some`.
    fn diff(&self, diff: &FileDiff);

    /// A failure that does not by itself end the run, e.g. a single restore.
    fn error(&self, message: &str);
}

/// A recorded [`Reporter`] event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Step {
        kind: StepKind,
        message: String,
        simulated: bool,
    },
    Diff(FileDiff),
    Error(String),
}

/// Reporter that keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<Event>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.lock().clone()
    }

    /// Messages of every step of `kind`, in order.
    pub fn steps(&self, kind: StepKind) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                Event::Step { kind: k, message, .. } if *k == kind => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                Event::Error(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Event>> {
        // A poisoned log is still a valid log.
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Reporter for MemoryReporter {
    fn step(&self, kind: StepKind, message: &str, simulated: bool) {
        self.lock().push(Event::Step {
            kind,
            message: message.to_owned(),
            simulated,
        });
    }

    fn diff(&self, diff: &FileDiff) {
        self.lock().push(Event::Diff(diff.clone()));
    }

    fn error(&self, message: &str) {
        self.lock().push(Event::Error(message.to_owned()));
    }
}
