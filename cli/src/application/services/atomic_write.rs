//! Atomic remote file placement.
//!
//! Content goes to a temporary file next to the target, gets its mode, and is
//! renamed over the target. Readers of the target see the old file or the new
//! one, never a partial write.

use anyhow::{Context, Result};
use chrono::Utc;

use crate::application::ports::FileTransfer;

/// Temporary sibling of `target` for the write identified by `token`.
#[must_use]
pub fn temp_path(target: &str, token: &str) -> String {
    format!("{target}.tmp-{token}")
}

/// Uniqueness token for a temp name: UTC time with nanoseconds.
#[must_use]
pub fn unique_token() -> String {
    Utc::now().format("%Y%m%d%H%M%S%9f").to_string()
}

/// Place `content` at `target` with permission `mode`.
///
/// If the first rename fails (a target the rename cannot replace), the target
/// is removed and the rename retried once. On any failure after the upload
/// the temporary file is cleaned up best-effort.
///
/// # Errors
///
/// Returns an error if the upload, chmod, or both rename attempts fail.
pub async fn write_file(
    files: &impl FileTransfer,
    content: &[u8],
    target: &str,
    mode: u32,
) -> Result<()> {
    let tmp = temp_path(target, &unique_token());
    tracing::debug!(target, tmp = %tmp, mode = %format!("{mode:o}"), bytes = content.len(), "atomic write");

    files
        .upload(&tmp, content)
        .await
        .with_context(|| format!("uploading {tmp}"))?;

    let placed = async {
        files
            .set_mode(&tmp, mode)
            .await
            .with_context(|| format!("setting mode {mode:o} on {tmp}"))?;
        replace(files, &tmp, target).await
    }
    .await;

    if placed.is_err()
        && let Err(e) = files.remove(&tmp).await
    {
        tracing::warn!(tmp = %tmp, error = %e, "could not remove temporary file");
    }
    placed
}

async fn replace(files: &impl FileTransfer, tmp: &str, target: &str) -> Result<()> {
    match files.rename(tmp, target).await {
        Ok(()) => Ok(()),
        Err(first) => {
            tracing::debug!(target, error = %first, "rename refused; removing target and retrying");
            files
                .remove(target)
                .await
                .with_context(|| format!("removing {target} before retry"))?;
            files
                .rename(tmp, target)
                .await
                .with_context(|| format!("renaming {tmp} onto {target}"))
        }
    }
}
