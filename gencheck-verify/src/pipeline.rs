//! The verification pipeline: resolve, validate, snapshot, emit, compare, restore.

use gencheck_core::{EmitCommand, FileDiff, RunOptions, StepKind, TargetSet, VerifyError, VerifyReport};

use crate::diff::compare_target;
use crate::emit::run_emit;
use crate::report::Reporter;
use crate::resolve::{resolve_targets, validate_targets};
use crate::shadow::ShadowSet;

/// Check that `command` reproduces the files matched by `patterns`.
///
/// Nothing is touched until every target passes validation. Once shadow
/// copies exist they are always moved back, whether the emit command or the
/// comparison fails. Drift is not an error: it comes back in the report.
///
/// If the run fails and restoring also fails, the restore failures are sent
/// to `reporter` and the run's own error is returned.
pub async fn verify<S: AsRef<str>>(
    patterns: &[S],
    command: &EmitCommand,
    options: &RunOptions,
    reporter: &dyn Reporter,
) -> Result<VerifyReport, VerifyError> {
    if command.is_empty() {
        return Err(VerifyError::EmptyCommand);
    }

    let targets = resolve_targets(patterns, &options.root)?;
    validate_targets(&targets, &options.root).await?;

    let shadows = ShadowSet::snapshot(&targets, &options.root, reporter, options.dry_run).await?;
    let checked = emit_and_compare(&targets, command, options, reporter).await;
    let restored = shadows.restore(&options.root, reporter).await;

    match (checked, restored) {
        (Ok(diffs), Ok(())) => {
            let report = VerifyReport {
                checked: targets.len(),
                diffs,
                dry_run: options.dry_run,
            };
            tracing::info!(
                "checked {} file(s), {} drifted",
                report.checked,
                report.drifted().count()
            );
            Ok(report)
        }
        (Ok(_), Err(restore)) => Err(restore),
        (Err(err), _) => Err(err),
    }
}

async fn emit_and_compare(
    targets: &TargetSet,
    command: &EmitCommand,
    options: &RunOptions,
    reporter: &dyn Reporter,
) -> Result<Vec<FileDiff>, VerifyError> {
    let root = &options.root;

    reporter.step(StepKind::Emit, &command.to_string(), options.dry_run);
    if !options.dry_run {
        run_emit(command, root).await?;
    }

    let mut diffs = Vec::with_capacity(targets.len());
    for target in targets {
        reporter.step(
            StepKind::Diff,
            &format!(
                "{} {}",
                target.display_shadow(root).display(),
                target.display_path(root).display()
            ),
            options.dry_run,
        );
        if options.dry_run {
            continue;
        }

        let diff = compare_target(target, root, options.context_radius).await?;
        if diff.changed() {
            reporter.diff(&diff);
        }
        diffs.push(diff);
    }
    Ok(diffs)
}
