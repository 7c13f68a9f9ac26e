//! Path utilities

use std::path::{Component, Path, PathBuf};

/// Normalize path separators to forward slashes (for asset keys and archive entries)
pub fn normalize_path<P: AsRef<Path>>(path: P) -> String {
    path.as_ref().to_string_lossy().replace('\\', "/")
}

/// Get relative path and normalize separators
pub fn relative_path<P: AsRef<Path>>(path: P, base: P) -> Option<String> {
    path.as_ref()
        .strip_prefix(base.as_ref())
        .ok()
        .map(normalize_path)
}

/// Key a file by its path relative to the project root.
///
/// Returns `None` when the file is not under the root or the result would
/// be empty (the root itself).
pub fn asset_key(file: &Path, project_root: &Path) -> Option<String> {
    relative_path(file, project_root).filter(|key| !key.is_empty())
}

/// Check a file extension against a bare extension name, ignoring ASCII case.
///
/// `name` may be given with or without its leading dot.
pub fn has_extension(path: &Path, name: &str) -> bool {
    let name = name.trim_start_matches('.');
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(name))
}

/// Lexically clean a path: drop `.` segments and fold `..` into their parent.
///
/// Does not touch the file system, so it works for paths that don't exist yet.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !cleaned.pop() {
                    cleaned.push(component);
                }
            }
            other => cleaned.push(other),
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_key() {
        let root = Path::new("/project");
        assert_eq!(
            asset_key(Path::new("/project/Assets/Heroes/a.png"), root).as_deref(),
            Some("Assets/Heroes/a.png")
        );
        assert_eq!(asset_key(Path::new("/elsewhere/a.png"), root), None);
        assert_eq!(asset_key(root, root), None);
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("Level1.unity"), "unity"));
        assert!(has_extension(Path::new("Level1.UNITY"), ".unity"));
        assert!(!has_extension(Path::new("a.png"), "unity"));
        assert!(!has_extension(Path::new("Makefile"), "unity"));
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(
            clean_path(Path::new("/p/Assets/./Out/../Bundles")),
            PathBuf::from("/p/Assets/Bundles")
        );
        assert_eq!(clean_path(Path::new("../x")), PathBuf::from("../x"));
    }
}
