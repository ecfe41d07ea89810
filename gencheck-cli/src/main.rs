//! gencheck: verify that a code generator reproduces the checked-in files.
//!
//! # Usage
//!
//! ```text
//! gencheck -p <path-or-glob> [-p ...] [--dry-run] [--context N] [--config FILE] -- <command> [args...]
//! ```
//!
//! Exit codes: `0` no drift, `1` drift, `2` usage error, `3` fatal error.

mod check;
mod console;

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use gencheck_core::VerifyError;

use check::{CheckArgs, Status};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "gencheck",
    version,
    about = "Verify that a code generator reproduces the files committed to the repository",
    long_about = None,
    override_usage = "gencheck -p <PATTERN>... [OPTIONS] -- <COMMAND>...",
)]
struct Cli {
    #[command(flatten)]
    check: CheckArgs,
}

const EXIT_DRIFT: u8 = 1;
const EXIT_USAGE: u8 = 2;
const EXIT_FATAL: u8 = 3;

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match cli.check.run() {
        Ok(Status::Clean) => ExitCode::SUCCESS,
        Ok(Status::Drift) => ExitCode::from(EXIT_DRIFT),
        Ok(Status::Usage(message)) => {
            console::print_error(&message);
            eprintln!("{}", Cli::command().render_help());
            ExitCode::from(EXIT_USAGE)
        }
        Err(err) => {
            console::print_error(&format!("{err:#}"));
            if err
                .downcast_ref::<VerifyError>()
                .is_some_and(VerifyError::is_precondition)
            {
                eprintln!("no files were modified");
            }
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
