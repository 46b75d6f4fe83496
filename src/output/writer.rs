//! Atomic file writer
//!
//! Files are first written next to their target under a temporary name and
//! then renamed into place, so a reader never observes a partially written
//! page or image.

use crate::{MirrorError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

/// Writes `contents` to `path`, creating parent directories as needed
///
/// # Arguments
///
/// * `path` - Absolute (or output-root joined) destination path
/// * `contents` - Full file contents
///
/// # Returns
///
/// * `Ok(())` - The file is in place
/// * `Err(MirrorError::Filesystem)` - A directory, write or rename step failed
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| MirrorError::filesystem(parent, e))?;
    }

    let temp = temp_path_for(path);
    fs::write(&temp, contents)
        .await
        .map_err(|e| MirrorError::filesystem(&temp, e))?;

    if let Err(e) = fs::rename(&temp, path).await {
        let _ = fs::remove_file(&temp).await;
        return Err(MirrorError::filesystem(path, e));
    }

    Ok(())
}

/// Writes a Markdown document, always terminated by a single newline
pub async fn write_markdown(path: &Path, markdown: &str) -> Result<()> {
    let mut contents = markdown.trim_end().to_string();
    contents.push('\n');
    write_atomic(path, contents.as_bytes()).await
}
