//! Pattern expansion and the all-or-nothing precondition check.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use gencheck_core::{TargetSet, VerifyError};

/// Expand `patterns` against `root` into an ordered, deduplicated target set.
///
/// Relative patterns are anchored at `root`. Order follows the patterns, then
/// the glob's sorted order within each pattern. A symlink inside `root` is
/// replaced by the file it points to, so the shadow copy and the restore land
/// on the real file and the link itself is never touched. Directories are skipped,
/// except `root` itself, which is kept so that [`validate_targets`] can reject
/// it explicitly.
pub fn resolve_targets<S: AsRef<str>>(
    patterns: &[S],
    root: &Path,
) -> Result<TargetSet, VerifyError> {
    let canonical_root = canonicalize(root)?;
    let escaped_root = glob::Pattern::escape(&root.to_string_lossy());

    let mut seen = HashSet::new();
    let mut paths = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let anchored = if Path::new(pattern).is_absolute() {
            PathBuf::from(pattern)
        } else {
            Path::new(&escaped_root).join(pattern)
        };

        let entries = glob::glob(&anchored.to_string_lossy()).map_err(|e| {
            VerifyError::InvalidPattern {
                pattern: pattern.to_owned(),
                message: e.to_string(),
            }
        })?;

        let mut matched = 0usize;
        for entry in entries {
            let path = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                VerifyError::io(path, e.into())
            })?;

            // Dangling symlinks still dedupe by their literal path.
            let key = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
            if path.is_dir() && key != canonical_root {
                tracing::debug!("skipping directory {}", path.display());
                continue;
            }
            if seen.insert(key.clone()) {
                paths.push(reanchor(path, &key, root, &canonical_root));
            }
            matched += 1;
        }
        tracing::debug!("pattern '{pattern}' matched {matched} path(s)");
    }

    if paths.is_empty() {
        return Err(VerifyError::NoFilesMatched {
            patterns: patterns.iter().map(|p| p.as_ref().to_owned()).collect(),
        });
    }
    Ok(TargetSet::from_paths(paths))
}

/// Check every target before anything is touched.
///
/// Fails on the first target that is the root itself, resolves outside the
/// root (symlinks followed), or already has a shadow copy on disk.
pub async fn validate_targets(targets: &TargetSet, root: &Path) -> Result<(), VerifyError> {
    let canonical_root = canonicalize(root)?;

    for target in targets {
        let resolved = tokio::fs::canonicalize(&target.path)
            .await
            .map_err(|e| VerifyError::io(&target.path, e))?;

        if resolved == canonical_root {
            return Err(VerifyError::InvalidTarget {
                path: target.path.clone(),
            });
        }
        if !resolved.starts_with(&canonical_root) {
            return Err(VerifyError::PathEscapesRoot {
                path: target.path.clone(),
                root: root.to_path_buf(),
            });
        }
        // symlink_metadata so a dangling symlink also counts as stale.
        if tokio::fs::symlink_metadata(&target.shadow).await.is_ok() {
            return Err(VerifyError::StaleTempFile {
                shadow: target.shadow.clone(),
            });
        }
    }

    tracing::debug!("validated {} target(s)", targets.len());
    Ok(())
}

/// `root` joined with the part of `canonical` below `canonical_root`.
///
/// Paths outside the root, and the root itself, keep their literal form so
/// validation reports them as written.
fn reanchor(literal: PathBuf, canonical: &Path, root: &Path, canonical_root: &Path) -> PathBuf {
    match canonical.strip_prefix(canonical_root) {
        Ok(rel) if !rel.as_os_str().is_empty() => root.join(rel),
        _ => literal,
    }
}

fn canonicalize(root: &Path) -> Result<PathBuf, VerifyError> {
    std::fs::canonicalize(root).map_err(|e| VerifyError::io(root, e))
}
