//! Build configuration (`bundlepak.toml`)
//!
//! A [`BuildConfig`] is built once by the host (the CLI, or an embedding
//! tool) and handed by reference to both [`crate::mark::mark_all`] and
//! [`crate::build::build`]. Nothing here is global.

mod options;
mod platform;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::path::clean_path;

pub use options::BuildOptions;
pub use platform::TargetPlatform;

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "bundlepak.toml";

fn default_project_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_extension() -> String {
    "assetBundle".to_string()
}

fn default_scene_extension() -> String {
    "unity".to_string()
}

fn default_scene_sources() -> Vec<String> {
    vec!["unity".to_string()]
}

/// What to do with a file sitting directly in a group folder.
///
/// Such a file has no sub-folder to name its bundle after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LooseFilePolicy {
    /// The file gets its own bundle named after its stem (`Heroes/readme`).
    #[default]
    OwnBundle,
    /// The file goes into a bundle named after the group (`Heroes/Heroes`).
    Group,
    /// Abort the mark with [`Error::LooseFileInGroup`].
    Reject,
}

impl LooseFilePolicy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OwnBundle => "own-bundle",
            Self::Group => "group",
            Self::Reject => "reject",
        }
    }
}

impl FromStr for LooseFilePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "own-bundle" => Ok(Self::OwnBundle),
            "group" => Ok(Self::Group),
            "reject" => Ok(Self::Reject),
            _ => Err(Error::UnknownLooseFilePolicy(s.to_string())),
        }
    }
}

impl fmt::Display for LooseFilePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the mark and build operations need to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Asset paths are keyed relative to this directory.
    #[serde(default = "default_project_root")]
    pub project_root: PathBuf,
    /// Folder whose immediate sub-folders become bundle groups.
    #[serde(default, rename = "source")]
    pub source_path: PathBuf,
    /// Folder the archives are written to. Wiped on every build.
    #[serde(default, rename = "output")]
    pub output_path: PathBuf,
    /// Variant extension for ordinary assets.
    #[serde(default = "default_extension", rename = "extension")]
    pub default_extension: String,
    /// Variant extension for scene assets.
    #[serde(default = "default_scene_extension")]
    pub scene_extension: String,
    /// File extensions that mark a source file as a scene.
    #[serde(default = "default_scene_sources")]
    pub scene_sources: Vec<String>,
    #[serde(default)]
    pub loose_files: LooseFilePolicy,
    #[serde(default, rename = "target")]
    pub target_platform: TargetPlatform,
    #[serde(default)]
    pub options: BuildOptions,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            project_root: default_project_root(),
            source_path: PathBuf::new(),
            output_path: PathBuf::new(),
            default_extension: default_extension(),
            scene_extension: default_scene_extension(),
            scene_sources: default_scene_sources(),
            loose_files: LooseFilePolicy::default(),
            target_platform: TargetPlatform::default(),
            options: BuildOptions::empty(),
        }
    }
}

/// Template written by `bundlepak init`
pub const CONFIG_TEMPLATE: &str = r#"# BundlePak configuration
#
# Relative paths are resolved against project_root, which is itself
# resolved against the directory holding this file.

project_root = "."

# Every immediate sub-folder of `source` becomes a bundle group.
source = "Assets/AssetBundle"

# Wiped and rebuilt on every `bundlepak build`.
output = "Build/AssetBundles"

# Variant extensions for ordinary assets and for scenes.
extension = "assetBundle"
scene_extension = "unity"

# Source extensions that count as scenes.
scene_sources = ["unity"]

# Files directly inside a group folder: "own-bundle", "group" or "reject".
loose_files = "own-bundle"

target = "standalone-windows64"

# Any of: "uncompressed", "chunk-based-compression", "dry-run",
# "append-hash", "strict".
options = []
"#;

impl BuildConfig {
    /// Parse a config file and resolve its paths against the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: BuildConfig = toml::from_str(&content)?;
        let base = path.parent().unwrap_or(Path::new("."));
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config.resolved(base))
    }

    /// Find and load a config file.
    ///
    /// Lookup order: `explicit` if given, `<cwd>/bundlepak.toml`, then the
    /// per-user `BundlePak/config.toml` in the platform config directory.
    /// Without any file, defaults resolved against `cwd` are returned.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = cwd.join(CONFIG_FILE_NAME);
        if local.is_file() {
            return Self::load(local);
        }

        if let Some(user) = Self::user_config_path()
            && user.is_file()
        {
            return Self::load(user);
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default().resolved(cwd))
    }

    /// Per-user config location
    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("BundlePak").join("config.toml"))
    }

    /// Expand `~` and make every path absolute-ish against `base`.
    ///
    /// `project_root` is joined onto `base`; source and output onto the
    /// resulting project root. Blank paths stay blank so validation can
    /// report them.
    #[must_use]
    pub fn resolved(mut self, base: &Path) -> Self {
        self.project_root = clean_path(&base.join(expand(&self.project_root)));
        if !is_blank(&self.source_path) {
            self.source_path = clean_path(&self.project_root.join(expand(&self.source_path)));
        }
        if !is_blank(&self.output_path) {
            self.output_path = clean_path(&self.project_root.join(expand(&self.output_path)));
        }
        self
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks that must pass before any label is touched.
    pub fn validate_for_mark(&self) -> Result<()> {
        if is_blank(&self.source_path) {
            return Err(Error::SourcePathNotSet);
        }
        self.validate_extensions()?;

        if !self.source_path.is_dir() {
            return Err(Error::SourcePathNotFound {
                path: self.source_path.clone(),
            });
        }
        if !self.source_path.starts_with(&self.project_root) {
            return Err(Error::SourceOutsideProject {
                path: self.source_path.clone(),
                root: self.project_root.clone(),
            });
        }
        Ok(())
    }

    /// Checks that must pass before the output folder is touched.
    pub fn validate_for_build(&self) -> Result<()> {
        if is_blank(&self.output_path) {
            return Err(Error::OutputPathNotSet);
        }
        self.validate_extensions()?;
        self.options.validate()?;

        let output = clean_path(&self.output_path);
        if clean_path(&self.project_root).starts_with(&output) {
            return Err(Error::OutputOverlapsSource {
                output,
                other: self.project_root.clone(),
            });
        }
        if !is_blank(&self.source_path) {
            let source = clean_path(&self.source_path);
            if output.starts_with(&source) || source.starts_with(&output) {
                return Err(Error::OutputOverlapsSource {
                    output,
                    other: self.source_path.clone(),
                });
            }
        }
        Ok(())
    }

    fn validate_extensions(&self) -> Result<()> {
        for (which, extension) in [
            ("bundle", &self.default_extension),
            ("scene bundle", &self.scene_extension),
        ] {
            let extension = extension.trim();
            if extension.is_empty() {
                return Err(Error::ExtensionNotSet { which });
            }
            // Archive names are joined onto the output folder
            if extension.contains(['/', '\\']) || extension.contains("..") {
                return Err(Error::InvalidExtension {
                    which,
                    extension: extension.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Whether a source file is a scene, judged by its extension.
    pub fn is_scene_file(&self, path: &Path) -> bool {
        self.scene_sources
            .iter()
            .any(|ext| crate::utils::has_extension(path, ext))
    }

    /// Variant extension a file gets in its bundle label.
    pub fn variant_for(&self, path: &Path) -> &str {
        if self.is_scene_file(path) {
            self.scene_extension.trim()
        } else {
            self.default_extension.trim()
        }
    }
}

/// Blank means empty or whitespace only
pub(crate) fn is_blank(path: &Path) -> bool {
    path.to_string_lossy().trim().is_empty()
}

fn expand(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_in(root: &Path) -> BuildConfig {
        BuildConfig {
            project_root: root.to_path_buf(),
            source_path: root.join("Assets/AssetBundle"),
            output_path: root.join("Build/AssetBundles"),
            ..BuildConfig::default()
        }
    }

    #[test]
    fn test_template_parses() {
        let config: BuildConfig = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.default_extension, "assetBundle");
        assert_eq!(config.scene_extension, "unity");
        assert_eq!(config.target_platform, TargetPlatform::StandaloneWindows64);
        assert_eq!(config.loose_files, LooseFilePolicy::OwnBundle);
        assert!(config.options.is_empty());
    }

    #[test]
    fn test_load_resolves_paths() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"
source = "Assets/Bundles"
output = "../Out"
options = ["chunk-based-compression", "strict"]
target = "android"
"#,
        )
        .unwrap();

        let config = BuildConfig::load(&path).unwrap();
        assert_eq!(config.project_root, clean_path(temp.path()));
        assert_eq!(config.source_path, clean_path(&temp.path().join("Assets/Bundles")));
        assert_eq!(config.output_path, clean_path(&temp.path().join("../Out")));
        assert_eq!(
            config.options,
            BuildOptions::CHUNK_BASED_COMPRESSION | BuildOptions::STRICT
        );
        assert_eq!(config.target_platform, TargetPlatform::Android);
    }

    #[test]
    fn test_load_rejects_unknown_option() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "options = [\"lzma\"]\n").unwrap();
        assert!(BuildConfig::load(&path).is_err());
    }

    #[test]
    fn test_discover_prefers_local_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "extension = \"bundle\"\n").unwrap();
        let config = BuildConfig::discover(None, temp.path()).unwrap();
        assert_eq!(config.default_extension, "bundle");
    }

    #[test]
    fn test_blank_paths_are_validation_errors() {
        let temp = TempDir::new().unwrap();
        let mut config = config_in(temp.path());
        config.output_path = PathBuf::from("   ");
        assert!(matches!(config.validate_for_build(), Err(Error::OutputPathNotSet)));

        config.source_path = PathBuf::new();
        assert!(matches!(config.validate_for_mark(), Err(Error::SourcePathNotSet)));
    }

    #[test]
    fn test_blank_extensions_are_validation_errors() {
        let temp = TempDir::new().unwrap();
        let mut config = config_in(temp.path());
        config.scene_extension = String::new();
        let err = config.validate_for_build().unwrap_err();
        assert!(matches!(err, Error::ExtensionNotSet { which: "scene bundle" }));
        assert!(err.is_validation());
    }

    #[test]
    fn test_mark_requires_existing_source_inside_project() {
        let temp = TempDir::new().unwrap();
        let mut config = config_in(temp.path());
        assert!(matches!(
            config.validate_for_mark(),
            Err(Error::SourcePathNotFound { .. })
        ));

        let outside = TempDir::new().unwrap();
        config.source_path = outside.path().to_path_buf();
        assert!(matches!(
            config.validate_for_mark(),
            Err(Error::SourceOutsideProject { .. })
        ));

        fs::create_dir_all(temp.path().join("Assets/AssetBundle")).unwrap();
        config.source_path = temp.path().join("Assets/AssetBundle");
        assert!(config.validate_for_mark().is_ok());
    }

    #[test]
    fn test_output_must_not_overlap_source() {
        let temp = TempDir::new().unwrap();
        let mut config = config_in(temp.path());
        assert!(config.validate_for_build().is_ok());

        config.output_path = temp.path().join("Assets/AssetBundle/Out");
        assert!(matches!(
            config.validate_for_build(),
            Err(Error::OutputOverlapsSource { .. })
        ));

        config.output_path = temp.path().join("Assets");
        assert!(matches!(
            config.validate_for_build(),
            Err(Error::OutputOverlapsSource { .. })
        ));

        config.output_path = temp.path().to_path_buf();
        assert!(matches!(
            config.validate_for_build(),
            Err(Error::OutputOverlapsSource { .. })
        ));
    }

    #[test]
    fn test_output_must_not_contain_project_root() {
        let temp = TempDir::new().unwrap();
        let mut config = config_in(&temp.path().join("game"));
        config.source_path = PathBuf::new();

        config.output_path = temp.path().join("game/..");
        assert!(matches!(
            config.validate_for_build(),
            Err(Error::OutputOverlapsSource { .. })
        ));

        config.output_path = temp.path().to_path_buf();
        let err = config.validate_for_build().unwrap_err();
        assert!(err.is_validation());

        config.output_path = temp.path().join("game/Build");
        assert!(config.validate_for_build().is_ok());
    }

    #[test]
    fn test_extensions_must_be_plain_names() {
        let temp = TempDir::new().unwrap();
        let mut config = config_in(temp.path());
        for bad in ["../../x", "a/b", "a\\b", ".."] {
            config.default_extension = bad.to_string();
            let err = config.validate_for_build().unwrap_err();
            assert!(matches!(err, Error::InvalidExtension { which: "bundle", .. }));
            assert!(err.is_validation());
        }

        config.default_extension = "assetBundle".to_string();
        config.scene_extension = "scenes/unity".to_string();
        assert!(matches!(
            config.validate_for_mark(),
            Err(Error::InvalidExtension { which: "scene bundle", .. })
        ));
    }

    #[test]
    fn test_variant_for() {
        let config = BuildConfig::default();
        assert_eq!(config.variant_for(Path::new("Level1.unity")), "unity");
        assert_eq!(config.variant_for(Path::new("a.png")), "assetBundle");
        assert_eq!(config.variant_for(Path::new("noext")), "assetBundle");
    }

    #[test]
    fn test_loose_file_policy_parse() {
        assert_eq!("own_bundle".parse::<LooseFilePolicy>().unwrap(), LooseFilePolicy::OwnBundle);
        assert_eq!("Reject".parse::<LooseFilePolicy>().unwrap(), LooseFilePolicy::Reject);
        assert!("skip".parse::<LooseFilePolicy>().is_err());
    }
}
