use anyhow::{Context, Result};
use glob::glob;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::PipelineError;

/// Files in `dir` with extension `ext` whose names contain any of
/// `substrings` (case-sensitive), sorted by file name.
///
/// Unreadable directory entries are logged and skipped rather than failing
/// the scan.
pub fn files_matching(dir: &Path, substrings: &[&str], ext: &str) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*.{}", dir.display(), ext);
    let mut matches = Vec::new();

    for entry in glob(&pattern).context("invalid glob pattern for input discovery")? {
        let path = match entry {
            Ok(p) => p,
            Err(e) => {
                warn!("cannot read directory entry: {:?}", e);
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        let name = match path.file_name().and_then(|f| f.to_str()) {
            Some(n) => n,
            None => continue,
        };
        if substrings.iter().any(|s| name.contains(s)) {
            matches.push(path);
        }
    }

    matches.sort();
    debug!(
        dir = %dir.display(),
        pattern = %substrings.join("|"),
        found = matches.len(),
        "scanned input directory"
    );
    Ok(matches)
}

/// The single file in `dir` matching any of `substrings`, or
/// `MissingInputFile`. When several match, the first in sorted order wins
/// and the choice is logged.
pub fn required_file(dir: &Path, substrings: &[&str], ext: &str) -> Result<PathBuf> {
    let matches = files_matching(dir, substrings, ext)?;
    if matches.len() > 1 {
        warn!(
            dir = %dir.display(),
            pattern = %substrings.join("|"),
            chosen = %file_name(&matches[0]),
            "several files match; using the first in sorted order"
        );
    }
    match matches.into_iter().next() {
        Some(first) => Ok(first),
        None => Err(PipelineError::MissingInputFile {
            dir: dir.display().to_string(),
            pattern: substrings.join("|"),
            ext: ext.to_string(),
        }
        .into()),
    }
}

/// File name of `path` as UTF-8, for diagnostics and output naming.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
