//! Group discovery under the source folder

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::Result;
use crate::utils::{collect_files, has_extension};

/// Extension of the host's per-asset sidecar files
pub const SIDECAR_EXTENSION: &str = "meta";

/// One immediate sub-folder of the source folder and every file beneath it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Folder name; the first half of every bundle name in the group
    pub name: String,
    /// The group folder itself
    pub root: PathBuf,
    /// Files at any depth, sidecars removed, sorted
    pub files: Vec<PathBuf>,
}

impl Group {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Whether a file is a sidecar metadata file
pub fn is_sidecar(path: &Path) -> bool {
    has_extension(path, SIDECAR_EXTENSION)
}

/// Enumerate the groups of a source folder.
///
/// Only directories directly under `source_root` become groups. Files
/// lying next to them belong to no group and are skipped.
pub fn discover_groups<P: AsRef<Path>>(source_root: P) -> Result<Vec<Group>> {
    let source_root = source_root.as_ref();
    let mut groups = Vec::new();

    for entry in WalkDir::new(source_root)
        .min_depth(1) // Skip the root directory itself
        .max_depth(1) // Only immediate children
        .sort_by_file_name()
    {
        let entry = entry?;
        let path = entry.path();

        if !entry.file_type().is_dir() {
            if !is_sidecar(path) {
                tracing::debug!("Skipping {} (not inside a group folder)", path.display());
            }
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        let files: Vec<PathBuf> = collect_files(path)?
            .into_iter()
            .filter(|file| !is_sidecar(file))
            .collect();

        tracing::debug!("Group '{name}': {} files", files.len());
        groups.push(Group {
            name,
            root: path.to_path_buf(),
            files,
        });
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    #[test]
    fn test_discover_groups() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        touch(root, "Props/Env/rock.fbx");
        touch(root, "Heroes/Skins/a.png");
        touch(root, "Heroes/Skins/a.png.meta");
        touch(root, "Heroes.meta");
        touch(root, "loose.txt");
        fs::create_dir_all(root.join("Empty")).unwrap();

        let groups = discover_groups(root).unwrap();
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Empty", "Heroes", "Props"]);

        assert!(groups[0].is_empty());
        assert_eq!(groups[1].files, vec![root.join("Heroes/Skins/a.png")]);
        assert_eq!(groups[2].files, vec![root.join("Props/Env/rock.fbx")]);
    }

    #[test]
    fn test_group_of_only_sidecars_is_empty() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Only/Meta/x.png.meta");
        let groups = discover_groups(temp.path()).unwrap();
        assert_eq!(groups.len(), 1);
        assert!(groups[0].is_empty());
    }
}
