//! Build manifests written next to the archives

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{BuildOptions, TargetPlatform};
use crate::error::Result;

/// Extension of every manifest file
pub const MANIFEST_EXTENSION: &str = "manifest";

/// One asset packed into an archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestAsset {
    pub path: String,
    pub size: u32,
    pub crc32: u32,
}

/// One archive produced by a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleArtifact {
    pub bundle: String,
    pub variant: String,
    /// Archive path relative to the output folder, `/`-separated
    pub archive: String,
    pub compression: String,
    pub size_compressed: u64,
    pub size_decompressed: u64,
    /// MD5 over every asset path and payload, when hashing was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    pub assets: Vec<ManifestAsset>,
}

impl BundleArtifact {
    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// Manifest name relative to the output folder (`Heroes/Skins.assetBundle.manifest`)
    #[must_use]
    pub fn manifest_name(&self) -> String {
        format!("{}.{MANIFEST_EXTENSION}", self.archive)
    }
}

/// Everything a pipeline run produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildManifest {
    /// Folder the build wrote into
    #[serde(skip)]
    pub output_dir: PathBuf,
    pub target: TargetPlatform,
    pub options: BuildOptions,
    /// RFC 3339 build time
    pub created: String,
    pub bundles: Vec<BundleArtifact>,
}

impl BuildManifest {
    #[must_use]
    pub fn new(
        output_dir: impl Into<PathBuf>,
        target: TargetPlatform,
        options: BuildOptions,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            target,
            options,
            created: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            bundles: Vec::new(),
        }
    }

    /// `<output>/<output folder name>.manifest`
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        let name = self
            .output_dir
            .file_name()
            .map_or_else(|| "bundles".to_string(), |n| n.to_string_lossy().to_string());
        self.output_dir.join(format!("{name}.{MANIFEST_EXTENSION}"))
    }

    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.options.contains(BuildOptions::DRY_RUN)
    }

    /// Files the build is expected to have left in the output folder
    #[must_use]
    pub fn expected_files(&self) -> Vec<PathBuf> {
        let mut files = vec![self.manifest_path()];
        for bundle in &self.bundles {
            if !self.is_dry_run() {
                files.push(self.output_dir.join(&bundle.archive));
            }
            files.push(self.output_dir.join(bundle.manifest_name()));
        }
        files
    }

    /// Total number of assets across all bundles
    #[must_use]
    pub fn asset_count(&self) -> usize {
        self.bundles.iter().map(BundleArtifact::asset_count).sum()
    }

    /// Write the output-level manifest
    pub fn save(&self) -> Result<PathBuf> {
        let path = self.manifest_path();
        write_json(&path, self)?;
        Ok(path)
    }

    /// Load an output-level manifest
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut manifest: Self = serde_json::from_str(&content)?;
        if let Some(dir) = path.parent() {
            manifest.output_dir = dir.to_path_buf();
        }
        Ok(manifest)
    }
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    fs::write(path, json)?;
    Ok(())
}
