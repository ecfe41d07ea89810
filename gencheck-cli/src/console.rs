//! Colored terminal output: progress lines, diffs, errors.

use colored::{ColoredString, Colorize};

use gencheck_core::{FileDiff, StepKind};
use gencheck_verify::Reporter;

/// Prints progress and diffs to stdout and errors to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn step(&self, kind: StepKind, message: &str, simulated: bool) {
        let tag = step_tag(kind);
        if simulated {
            println!("{tag} {} {message}", "[dry-run]".dimmed());
        } else {
            println!("{tag} {message}");
        }
    }

    fn diff(&self, diff: &FileDiff) {
        let Some(text) = diff.unified_diff.as_deref() else {
            return;
        };
        for line in text.lines() {
            println!("{}", color_diff_line(line));
        }
    }

    fn error(&self, message: &str) {
        print_error(message);
    }
}

/// `[error] <message>` on stderr.
pub fn print_error(message: &str) {
    eprintln!("{} {message}", "[error]".red().bold());
}

fn step_tag(kind: StepKind) -> ColoredString {
    let tag = format!("[{kind}]");
    match kind {
        StepKind::Copy => tag.cyan(),
        StepKind::Emit => tag.magenta(),
        StepKind::Diff => tag.yellow(),
        StepKind::Move => tag.blue(),
    }
    .bold()
}

fn color_diff_line(line: &str) -> ColoredString {
    if line.starts_with("---") || line.starts_with("+++") {
        line.bold()
    } else if line.starts_with("@@") {
        line.cyan()
    } else if line.starts_with('+') {
        line.green()
    } else if line.starts_with('-') {
        line.red()
    } else {
        line.normal()
    }
}
