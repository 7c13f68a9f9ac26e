//! Recursive file collection

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;

/// Collect every file under `root`, at any depth.
///
/// The walk is eager and sorted by file name, so the same tree always yields
/// the same list. Symbolic links are not followed; a link to a directory is
/// neither descended into nor returned.
pub fn collect_files<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root.as_ref())
        .min_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
