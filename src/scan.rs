use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// Directories never holding batch exports
const IGNORED_DIRS: [&str; 4] = ["target", "node_modules", "__pycache__", "venv"];

/// Check if a directory entry should be skipped while scanning
pub fn should_ignore(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }

    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') {
        return true;
    }

    entry.file_type().is_dir() && IGNORED_DIRS.contains(&name.as_ref())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension.trim_start_matches('.')))
}

/// Walk `dir` and collect batch files with the given extension, sorted.
///
/// Anything under `exclude` (typically the output directory of a previous
/// run) is left out.
pub fn find_batch_files(
    dir: &Path,
    extension: &str,
    exclude: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    info!(dir = %dir.display(), "scanning for batch files");

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            !should_ignore(e) && exclude.map_or(true, |skip| !e.path().starts_with(skip))
        })
    {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();

        if !entry.file_type().is_file() || !has_extension(path, extension) {
            continue;
        }

        debug!(path = %path.display(), "found batch file");
        files.push(path.to_path_buf());
    }

    files.sort();
    info!(count = files.len(), "batch files found");
    Ok(files)
}

/// Output directory for one batch found under `root`.
///
/// Mirrors the batch's path relative to `root`, minus its extension, so
/// `a/orders.xml` and `b/orders.xml` never share a directory.
pub fn output_dir_for(batch: &Path, root: &Path, out_root: &Path) -> PathBuf {
    let relative = batch.strip_prefix(root).unwrap_or(batch);
    match relative.file_name() {
        Some(_) => out_root.join(relative.with_extension("")),
        None => out_root.join("batch"),
    }
}
