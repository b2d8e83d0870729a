//! Discovery of chart directories under a search root.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;
use walkdir::{DirEntry, WalkDir};

use crate::constants::CHART_FILE_NAME;

/// Find every directory below `search_root` that contains a `Chart.yaml`.
///
/// Hidden directories are skipped, as is any directory whose path relative to
/// `search_root` matches one of the `ignore` glob patterns (a matched directory
/// is pruned together with everything below it). Results are sorted.
///
/// # Errors
///
/// Returns an error if an ignore pattern is not a valid glob or the search root
/// cannot be walked.
pub fn find_chart_directories(search_root: &Path, ignore: &[String]) -> Result<Vec<PathBuf>> {
    let patterns = ignore
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("Invalid ignore pattern '{p}'")))
        .collect::<Result<Vec<_>>>()?;

    let mut charts = Vec::new();
    let walker = WalkDir::new(search_root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry) && !is_ignored(entry, search_root, &patterns));

    for entry in walker {
        let entry = entry
            .with_context(|| format!("Failed to walk chart search root {}", search_root.display()))?;
        if entry.file_type().is_file() && entry.file_name() == CHART_FILE_NAME {
            if let Some(parent) = entry.path().parent() {
                tracing::debug!("Found chart directory {}", parent.display());
                charts.push(parent.to_path_buf());
            }
        }
    }

    charts.sort();
    Ok(charts)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

fn is_ignored(entry: &DirEntry, search_root: &Path, patterns: &[Pattern]) -> bool {
    if patterns.is_empty() || !entry.file_type().is_dir() {
        return false;
    }
    let Ok(relative) = entry.path().strip_prefix(search_root) else {
        return false;
    };
    if relative.as_os_str().is_empty() {
        return false;
    }
    let ignored = patterns.iter().any(|pattern| pattern.matches_path(relative));
    if ignored {
        tracing::debug!("Ignoring {}", entry.path().display());
    }
    ignored
}
