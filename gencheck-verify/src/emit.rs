//! Running the emit command with inherited stdio.

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use gencheck_core::{EmitCommand, VerifyError};
use tokio::process::Command;

enum Waited {
    Exited(std::io::Result<ExitStatus>),
    Signalled(&'static str),
}

/// Run `command` in `root` and wait for it.
///
/// Stdin, stdout and stderr are inherited so prompts and progress output
/// reach the caller. A non-zero exit is [`VerifyError::CommandFailed`]. If the
/// process receives SIGINT (or SIGTERM on unix) first, the child is killed and
/// [`VerifyError::Interrupted`] is returned so the caller's cleanup still runs.
pub async fn run_emit(command: &EmitCommand, root: &Path) -> Result<(), VerifyError> {
    let Some(program) = command.program() else {
        return Err(VerifyError::EmptyCommand);
    };

    let mut child = Command::new(program)
        .args(command.args())
        .current_dir(root)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| VerifyError::CommandSpawn {
            command: command.to_string(),
            source,
        })?;
    tracing::debug!("spawned `{command}` (pid {:?})", child.id());

    let waited = tokio::select! {
        status = child.wait() => Waited::Exited(status),
        signal = shutdown_signal() => Waited::Signalled(signal),
    };

    match waited {
        Waited::Exited(Ok(status)) if status.success() => Ok(()),
        Waited::Exited(Ok(status)) => Err(VerifyError::CommandFailed {
            command: command.to_string(),
            status,
        }),
        Waited::Exited(Err(e)) => Err(VerifyError::io(program, e)),
        Waited::Signalled(signal) => {
            tracing::warn!("received {signal}, stopping `{command}`");
            if let Err(e) = child.start_kill() {
                tracing::debug!("kill after {signal}: {e}");
            }
            let _ = child.wait().await;
            Err(VerifyError::Interrupted {
                command: command.to_string(),
                signal,
            })
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            tracing::warn!("SIGTERM handler unavailable: {e}");
            return ctrl_c().await;
        }
    };
    tokio::select! {
        name = ctrl_c() => name,
        _ = term.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    ctrl_c().await
}

async fn ctrl_c() -> &'static str {
    match tokio::signal::ctrl_c().await {
        Ok(()) => "SIGINT",
        Err(e) => {
            tracing::warn!("ctrl-c handler unavailable: {e}");
            std::future::pending().await
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn sh(script: &str) -> EmitCommand {
        EmitCommand::from(&["sh", "-c", script][..])
    }

    #[tokio::test]
    async fn runs_in_root() {
        let root = TempDir::new().expect("root");
        run_emit(&sh("printf B > out.txt"), root.path())
            .await
            .expect("emit");
        assert_eq!(fs::read_to_string(root.path().join("out.txt")).unwrap(), "B");
    }

    #[tokio::test]
    async fn non_zero_exit_is_command_failed() {
        let root = TempDir::new().expect("root");
        let err = run_emit(&sh("exit 7"), root.path()).await.unwrap_err();
        match err {
            VerifyError::CommandFailed { status, command } => {
                assert_eq!(status.code(), Some(7));
                assert_eq!(command, "sh -c 'exit 7'");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let root = TempDir::new().expect("root");
        let cmd = EmitCommand::from(&["gencheck-no-such-program-xyz"][..]);
        let err = run_emit(&cmd, root.path()).await.unwrap_err();
        assert!(matches!(err, VerifyError::CommandSpawn { .. }), "got: {err}");
    }

    #[tokio::test]
    async fn empty_command_is_rejected() {
        let root = TempDir::new().expect("root");
        let err = run_emit(&EmitCommand::default(), root.path())
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::EmptyCommand));
    }
}
