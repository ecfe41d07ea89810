//! Shadow copies: snapshot before the emit command, move back afterwards.
//!
//! [`ShadowSet`] owns every shadow it created. The normal path awaits
//! [`ShadowSet::restore`]; if the set is dropped without it (a panic, or a
//! caller bailing early), `Drop` moves the shadows back with blocking I/O.

use std::path::Path;

use gencheck_core::{RestoreFailure, StepKind, Target, TargetSet, VerifyError};

use crate::report::Reporter;

/// Shadow copies of a validated target set.
#[derive(Debug)]
pub struct ShadowSet {
    /// Targets whose shadow exists on disk (all targets in dry-run).
    targets: Vec<Target>,
    dry_run: bool,
}

impl ShadowSet {
    /// Copy every target to its shadow path, in order.
    ///
    /// If a copy fails, shadows created so far are moved back before the
    /// error is returned. In dry-run mode only the `copy` lines are reported.
    pub async fn snapshot(
        targets: &TargetSet,
        root: &Path,
        reporter: &dyn Reporter,
        dry_run: bool,
    ) -> Result<Self, VerifyError> {
        let mut set = Self {
            targets: Vec::with_capacity(targets.len()),
            dry_run,
        };

        for target in targets {
            reporter.step(
                StepKind::Copy,
                &format!(
                    "{} -> {}",
                    target.display_path(root).display(),
                    target.display_shadow(root).display()
                ),
                dry_run,
            );
            if !dry_run {
                if let Err(e) = tokio::fs::copy(&target.path, &target.shadow).await {
                    let err = VerifyError::io(&target.path, e);
                    // Failures here are already reported; the copy error wins.
                    let _ = set.restore(root, reporter).await;
                    return Err(err);
                }
            }
            set.targets.push(target.clone());
        }

        tracing::debug!("snapshotted {} target(s)", set.targets.len());
        Ok(set)
    }

    /// Move every shadow back over its target.
    ///
    /// Each file is attempted independently; failures are reported one by
    /// one and returned together as [`VerifyError::RestoreFailed`].
    pub async fn restore(mut self, root: &Path, reporter: &dyn Reporter) -> Result<(), VerifyError> {
        let targets = std::mem::take(&mut self.targets);
        let mut failures = Vec::new();

        for target in targets {
            reporter.step(
                StepKind::Move,
                &format!(
                    "{} -> {}",
                    target.display_shadow(root).display(),
                    target.display_path(root).display()
                ),
                self.dry_run,
            );
            if self.dry_run {
                continue;
            }
            if let Err(source) = tokio::fs::rename(&target.shadow, &target.path).await {
                let failure = RestoreFailure {
                    shadow: target.shadow,
                    path: target.path,
                    source,
                };
                reporter.error(&format!("restore failed: {failure}"));
                failures.push(failure);
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(VerifyError::RestoreFailed { failures })
        }
    }
}

impl Drop for ShadowSet {
    fn drop(&mut self) {
        if self.dry_run {
            return;
        }
        for target in self.targets.drain(..) {
            tracing::warn!(
                "restoring {} from {} during unwind",
                target.path.display(),
                target.shadow.display()
            );
            if let Err(e) = std::fs::rename(&target.shadow, &target.path) {
                tracing::error!("failed to restore {}: {e}", target.path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use gencheck_core::TargetSet;
    use tempfile::TempDir;

    use super::*;
    use crate::report::MemoryReporter;

    fn targets(root: &Path, files: &[(&str, &str)]) -> TargetSet {
        for (name, content) in files {
            fs::write(root.join(name), content).expect("write");
        }
        TargetSet::from_paths(files.iter().map(|(name, _)| root.join(name)))
    }

    #[tokio::test]
    async fn snapshot_then_restore_round_trips_content() {
        let root = TempDir::new().expect("root");
        let set = targets(root.path(), &[("a.ts", "A"), ("b.ts", "B")]);
        let reporter = MemoryReporter::new();

        let shadows = ShadowSet::snapshot(&set, root.path(), &reporter, false)
            .await
            .expect("snapshot");
        assert!(root.path().join("b.ts.tmp").exists());
        assert_eq!(fs::read_to_string(root.path().join("a.ts.tmp")).unwrap(), "A");

        fs::write(root.path().join("a.ts"), "changed").expect("overwrite");
        shadows.restore(root.path(), &reporter).await.expect("restore");

        assert_eq!(fs::read_to_string(root.path().join("a.ts")).unwrap(), "A");
        assert!(!root.path().join("a.ts.tmp").exists());
        assert!(!root.path().join("b.ts.tmp").exists());
        assert_eq!(
            reporter.steps(StepKind::Copy),
            ["a.ts -> a.ts.tmp", "b.ts -> b.ts.tmp"]
        );
        assert_eq!(
            reporter.steps(StepKind::Move),
            ["a.ts.tmp -> a.ts", "b.ts.tmp -> b.ts"]
        );
    }

    #[tokio::test]
    async fn dry_run_touches_nothing_but_logs_every_step() {
        let root = TempDir::new().expect("root");
        let set = targets(root.path(), &[("a.ts", "A")]);
        let reporter = MemoryReporter::new();

        let shadows = ShadowSet::snapshot(&set, root.path(), &reporter, true)
            .await
            .expect("snapshot");
        assert!(!root.path().join("a.ts.tmp").exists());
        shadows.restore(root.path(), &reporter).await.expect("restore");

        assert_eq!(reporter.steps(StepKind::Copy).len(), 1);
        assert_eq!(reporter.steps(StepKind::Move).len(), 1);
        assert_eq!(fs::read_to_string(root.path().join("a.ts")).unwrap(), "A");
    }

    #[tokio::test]
    async fn failed_copy_rolls_back_earlier_shadows() {
        let root = TempDir::new().expect("root");
        fs::write(root.path().join("a.ts"), "A").expect("write");
        let set = TargetSet::from_paths([root.path().join("a.ts"), root.path().join("gone.ts")]);
        let reporter = MemoryReporter::new();

        let err = ShadowSet::snapshot(&set, root.path(), &reporter, false)
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::Io { .. }), "got: {err}");
        assert!(!root.path().join("a.ts.tmp").exists(), "shadow must be rolled back");
        assert_eq!(fs::read_to_string(root.path().join("a.ts")).unwrap(), "A");
    }

    #[tokio::test]
    async fn restore_attempts_every_file_and_aggregates() {
        let root = TempDir::new().expect("root");
        let set = targets(root.path(), &[("a.ts", "A"), ("b.ts", "B"), ("c.ts", "C")]);
        let reporter = MemoryReporter::new();

        let shadows = ShadowSet::snapshot(&set, root.path(), &reporter, false)
            .await
            .expect("snapshot");
        fs::remove_file(root.path().join("b.ts.tmp")).expect("remove shadow");

        let err = shadows.restore(root.path(), &reporter).await.unwrap_err();
        match &err {
            VerifyError::RestoreFailed { failures } => {
                assert_eq!(failures.len(), 1);
                assert!(failures[0].path.ends_with("b.ts"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!root.path().join("c.ts.tmp").exists(), "later files still restored");
        assert_eq!(reporter.errors().len(), 1);
    }

    #[tokio::test]
    async fn drop_without_restore_moves_shadows_back() {
        let root = TempDir::new().expect("root");
        let set = targets(root.path(), &[("a.ts", "A")]);
        let reporter = MemoryReporter::new();

        let shadows = ShadowSet::snapshot(&set, root.path(), &reporter, false)
            .await
            .expect("snapshot");
        fs::write(root.path().join("a.ts"), "generated").expect("overwrite");
        drop(shadows);

        assert_eq!(fs::read_to_string(root.path().join("a.ts")).unwrap(), "A");
        assert!(!root.path().join("a.ts.tmp").exists());
    }
}
