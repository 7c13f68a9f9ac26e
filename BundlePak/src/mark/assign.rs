//! Folder-to-bundle assignment

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::groups::Group;
use crate::config::{BuildConfig, LooseFilePolicy};
use crate::error::{Error, Result};
use crate::labels::BundleLabel;
use crate::utils::asset_key;

/// The label one file is going to get
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// File on disk
    pub file: PathBuf,
    /// Project-relative key the label is stored under
    pub asset_path: String,
    pub label: BundleLabel,
}

/// Name of the bundle a file belongs to inside its group.
///
/// That is the first path component below the group folder. A file lying
/// directly in the group folder has none; `policy` decides what happens then.
pub fn sub_group_of(group: &Group, file: &Path, policy: LooseFilePolicy) -> Result<String> {
    let relative = file.strip_prefix(&group.root).map_err(|_| {
        Error::InvalidPath(format!(
            "{} is not inside group folder {}",
            file.display(),
            group.root.display()
        ))
    })?;

    let mut components = relative.components();
    let first = components
        .next()
        .ok_or_else(|| Error::InvalidPath(file.display().to_string()))?;

    if components.next().is_some() {
        return Ok(first.as_os_str().to_string_lossy().to_string());
    }

    match policy {
        LooseFilePolicy::OwnBundle => Ok(file
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| first.as_os_str().to_string_lossy().to_string())),
        LooseFilePolicy::Group => Ok(group.name.clone()),
        LooseFilePolicy::Reject => Err(Error::LooseFileInGroup {
            group: group.name.clone(),
            path: file.to_path_buf(),
        }),
    }
}

/// Work out the label of every file in every group.
///
/// Pure: nothing is written. Empty groups contribute nothing. Fails when a
/// file cannot be keyed against the project root or the same asset would be
/// labelled twice.
pub fn assign_labels(config: &BuildConfig, groups: &[Group]) -> Result<Vec<Assignment>> {
    let mut seen = HashSet::new();
    let mut assignments = Vec::with_capacity(groups.iter().map(|g| g.files.len()).sum());

    for group in groups {
        for file in &group.files {
            let sub_group = sub_group_of(group, file, config.loose_files)?;
            let label = BundleLabel::for_group(&group.name, &sub_group, config.variant_for(file));

            let asset_path = asset_key(file, &config.project_root).ok_or_else(|| {
                Error::AssetRecordNotFound {
                    path: file.clone(),
                }
            })?;

            if !seen.insert(asset_path.clone()) {
                return Err(Error::DuplicateAssignment(asset_path));
            }

            assignments.push(Assignment {
                file: file.clone(),
                asset_path,
                label,
            });
        }
    }

    Ok(assignments)
}
