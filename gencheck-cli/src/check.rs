//! The `gencheck` run: merge config, verify, print a summary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use gencheck_core::{config, Config, EmitCommand, RunOptions, VerifyReport};
use gencheck_verify::verify;

use crate::console::ConsoleReporter;

/// Arguments for a gencheck run.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path or glob of a file the command is expected to generate (repeatable).
    #[arg(short = 'p', long = "path", value_name = "PATTERN")]
    pub paths: Vec<String>,

    /// Show what would be copied, run, diffed and moved without doing it.
    #[arg(long)]
    pub dry_run: bool,

    /// Lines of context around each diff hunk [default: 3].
    #[arg(long, value_name = "N")]
    pub context: Option<usize>,

    /// YAML config file [default: ./gencheck.yaml if present].
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// The generator command and its arguments.
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// How a run ended when it did not fail outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Clean,
    Drift,
    /// Nothing to run; carries the reason.
    Usage(String),
}

impl CheckArgs {
    pub fn run(self) -> Result<Status> {
        let root = std::env::current_dir().context("could not determine working directory")?;

        let file = match &self.config {
            Some(path) => config::load(path)?,
            None => config::load_default_at(&root)?.unwrap_or_default(),
        };
        let settings: Config = file.with_overrides(
            self.paths,
            EmitCommand::from(self.command),
            self.context,
        );

        if settings.command.is_empty() {
            return Ok(Status::Usage("no emit command given after `--`".into()));
        }
        if settings.paths.is_empty() {
            return Ok(Status::Usage("no --path given".into()));
        }

        let options = RunOptions::new(&root)
            .dry_run(self.dry_run)
            .context_radius(settings.context_radius());

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start async runtime")?;
        let report = runtime
            .block_on(verify(
                settings.paths.as_slice(),
                &settings.command,
                &options,
                &ConsoleReporter,
            ))
            .with_context(|| format!("verification of `{}` failed", settings.command))?;

        print_summary(&report);
        Ok(if report.has_drift() {
            Status::Drift
        } else {
            Status::Clean
        })
    }
}

fn print_summary(report: &VerifyReport) {
    if report.dry_run {
        println!("[dry-run] {} file(s) would be checked", report.checked);
        return;
    }

    let drifted = report.drifted().count();
    if drifted == 0 {
        println!(
            "{} {} file(s) checked, no drift",
            "✓".green().bold(),
            report.checked
        );
    } else {
        println!(
            "{} {} file(s) checked, {drifted} drifted",
            "✗".red().bold(),
            report.checked
        );
    }
}
