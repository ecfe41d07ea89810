//! Unified diff of a target against its shadow copy.

use std::path::Path;

use similar::{DiffTag, TextDiff};

use gencheck_core::{FileDiff, Target, VerifyError};

/// Compare the regenerated `target` against its shadow.
///
/// Both files are read as UTF-8. The diff is labelled with the shadow path
/// (old) and the target path (new), relative to `root`.
pub async fn compare_target(
    target: &Target,
    root: &Path,
    context_radius: usize,
) -> Result<FileDiff, VerifyError> {
    let old = read_text(&target.shadow).await?;
    let new = read_text(&target.path).await?;

    let old_header = target.display_shadow(root).display().to_string();
    let new_header = target.display_path(root).display().to_string();

    Ok(FileDiff {
        path: target.path.clone(),
        unified_diff: unified_diff(&old, &new, &old_header, &new_header, context_radius),
    })
}

/// `None` when `old` and `new` have no differing lines.
pub fn unified_diff(
    old: &str,
    new: &str,
    old_header: &str,
    new_header: &str,
    context_radius: usize,
) -> Option<String> {
    let diff = TextDiff::from_lines(old, new);
    if diff.ops().iter().all(|op| op.tag() == DiffTag::Equal) {
        return None;
    }
    Some(
        diff.unified_diff()
            .header(old_header, new_header)
            .context_radius(context_radius)
            .to_string(),
    )
}

async fn read_text(path: &Path) -> Result<String, VerifyError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| VerifyError::io(path, e))?;
    String::from_utf8(bytes).map_err(|source| VerifyError::NotUtf8 {
        path: path.to_path_buf(),
        source,
    })
}
