use std::path::{Path, PathBuf};

/// Look for a file named `filename` in `start`, then in its immediate
/// parent. Discovery deliberately stops there: a match further up the
/// tree is treated as missing.
pub fn find_in_dir_or_parent(start: &Path, filename: &str) -> Option<PathBuf> {
    let candidate = start.join(filename);
    if candidate.is_file() {
        return Some(candidate);
    }
    let candidate = start.parent()?.join(filename);
    candidate.is_file().then_some(candidate)
}

/// Ensure a directory exists, creating it and any parents if needed.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Recreate a directory from scratch: remove it if present, then create it.
///
/// Target directories are pre-cleared at the start of every run so a mirror
/// never mixes artifacts from two runs.
pub fn recreate_dir(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        std::fs::remove_dir_all(path)?;
    }
    std::fs::create_dir_all(path)
}
