//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Copy a single file, creating the destination's parent directories.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(src, dst).with_context(|| {
        format!("failed to copy {} to {}", src.display(), dst.display())
    })?;
    Ok(())
}

/// Copy every file below `src` into `dst`, dropping the directory structure.
///
/// Files with the same name in different subdirectories overwrite each other
/// in walk order. A missing `src` copies nothing. Returns the copied
/// destination paths.
pub fn copy_files_flat(src: &Path, dst: &Path) -> Result<Vec<PathBuf>> {
    ensure_dir(dst)?;
    if !src.is_dir() {
        return Ok(Vec::new());
    }

    let mut copied = Vec::new();
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", src.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let target = dst.join(entry.file_name());
        copy_file(entry.path(), &target)?;
        copied.push(target);
    }
    Ok(copied)
}

/// Point `link` at `target`, replacing whatever `link` was (like `ln -sf`).
pub fn force_symlink(target: &Path, link: &Path) -> Result<()> {
    match fs::symlink_metadata(link) {
        Ok(_) => fs::remove_file(link)
            .with_context(|| format!("failed to remove {}", link.display()))?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e).with_context(|| format!("failed to inspect {}", link.display()))
        }
    }
    symlink(target, link).with_context(|| {
        format!(
            "failed to link {} -> {}",
            link.display(),
            target.display()
        )
    })
}

/// Create a symlink (platform-aware).
#[cfg(unix)]
pub fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
pub fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    if src.is_dir() {
        std::os::windows::fs::symlink_dir(src, dst)
    } else {
        std::os::windows::fs::symlink_file(src, dst)
    }
}
