//! File-system resource helpers.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Remove the file at `path`.  Returns `false` if there was nothing to remove.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_existing(path: &Path) -> Result<bool> {
    if path.symlink_metadata().is_err() {
        return Ok(false);
    }
    std::fs::remove_file(path).with_context(|| format!("remove: {}", path.display()))?;
    Ok(true)
}

/// Search `dir` recursively for a regular file called `name`.
///
/// Entries are visited in sorted order so the result is stable when an
/// archive contains more than one candidate.
///
/// # Errors
///
/// Returns an error if a directory cannot be read.
pub fn find_file_named(dir: &Path, name: &str) -> Result<Option<PathBuf>> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading directory {}", dir.display()))?
        .map(|e| e.map(|entry| entry.path()))
        .collect::<std::io::Result<_>>()
        .with_context(|| format!("reading entry in {}", dir.display()))?;
    entries.sort();

    for path in &entries {
        if path.is_file() && path.file_name().is_some_and(|n| n == name) {
            return Ok(Some(path.clone()));
        }
    }
    for path in entries.iter().filter(|p| p.is_dir()) {
        if let Some(found) = find_file_named(path, name)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// Copy `src` to `dest` and mark it executable (`0755`).
///
/// # Errors
///
/// Returns an error if the destination directory cannot be created, the
/// copy fails, or the permissions cannot be set.
pub fn install_executable(src: &Path, dest: &Path) -> Result<()> {
    ensure_parent_dir(dest)?;
    std::fs::copy(src, dest)
        .with_context(|| format!("copying {} to {}", src.display(), dest.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(dest, std::fs::Permissions::from_mode(0o755))
            .with_context(|| format!("set permissions: {}", dest.display()))?;
    }
    Ok(())
}
