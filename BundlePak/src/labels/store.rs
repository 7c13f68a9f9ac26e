//! File-backed label store (`.bundlepak/labels.json`)

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::{AssetRecord, BundleLabel, IndexRefresh, MetadataSink};
use crate::error::{Error, Result};

/// Folder under the project root holding the store
pub const STORE_DIR: &str = ".bundlepak";
/// Store file name inside [`STORE_DIR`]
pub const STORE_FILE: &str = "labels.json";

const STORE_VERSION: u32 = 1;

/// On-disk layout
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    #[serde(default)]
    registered: BTreeSet<String>,
    #[serde(default)]
    assets: BTreeMap<String, BundleLabel>,
}

/// Label storage for one project.
///
/// Changes stay in memory until [`LabelStore::save`] or
/// [`IndexRefresh::refresh`] writes them out, so an aborted mark leaves the
/// file on disk as it was.
#[derive(Debug)]
pub struct LabelStore {
    project_root: PathBuf,
    registered: BTreeSet<String>,
    assets: BTreeMap<String, BundleLabel>,
}

impl LabelStore {
    /// Open the store for a project, starting empty if there is none yet.
    pub fn open<P: AsRef<Path>>(project_root: P) -> Result<Self> {
        let project_root = project_root.as_ref().to_path_buf();
        let path = Self::store_path(&project_root);

        let file = if path.is_file() {
            let content = fs::read_to_string(&path)?;
            let file: StoreFile = serde_json::from_str(&content)?;
            if file.version > STORE_VERSION {
                return Err(Error::InvalidFormat(format!(
                    "label store version {} is newer than supported ({STORE_VERSION})",
                    file.version
                )));
            }
            file
        } else {
            StoreFile::default()
        };

        tracing::debug!(
            "Opened label store with {} labels on {} assets",
            file.registered.len(),
            file.assets.len()
        );

        Ok(Self {
            project_root,
            registered: file.registered,
            assets: file.assets,
        })
    }

    /// Location of the store file for a project root
    #[must_use]
    pub fn store_path(project_root: &Path) -> PathBuf {
        project_root.join(STORE_DIR).join(STORE_FILE)
    }

    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Write the store atomically (temp file in the same folder, then rename).
    pub fn save(&self) -> Result<()> {
        let path = Self::store_path(&self.project_root);
        let dir = path
            .parent()
            .ok_or_else(|| Error::InvalidPath(path.display().to_string()))?;
        fs::create_dir_all(dir)?;

        let file = StoreFile {
            version: STORE_VERSION,
            registered: self.registered.clone(),
            assets: self.assets.clone(),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, &file)?;
        tmp.write_all(b"\n")?;
        tmp.persist(&path)?;
        Ok(())
    }

    /// Every labelled asset with its label, sorted by path
    pub fn labeled_assets(&self) -> impl Iterator<Item = (&str, &BundleLabel)> {
        self.assets.iter().map(|(path, label)| (path.as_str(), label))
    }

    /// Label currently on an asset
    #[must_use]
    pub fn label_of(&self, asset_path: &str) -> Option<&BundleLabel> {
        self.assets.get(asset_path)
    }

    /// Number of labelled assets
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    fn asset_exists(&self, asset_path: &str) -> bool {
        !asset_path.is_empty() && self.project_root.join(asset_path).is_file()
    }
}

impl MetadataSink for LabelStore {
    fn list_all_labels(&self) -> BTreeSet<String> {
        self.registered.clone()
    }

    fn remove_label(&mut self, name: &str, remove_file_associations: bool) -> bool {
        if !self.registered.contains(name) {
            return false;
        }

        let in_use = self.assets.values().any(|label| label.bundle_name == name);
        if in_use {
            if !remove_file_associations {
                return false;
            }
            self.assets.retain(|_, label| label.bundle_name != name);
        }

        self.registered.remove(name)
    }

    fn set_label(&mut self, asset_path: &str, label: &BundleLabel) -> Result<()> {
        if !self.asset_exists(asset_path) {
            return Err(Error::AssetRecordNotFound {
                path: PathBuf::from(asset_path),
            });
        }
        self.registered.insert(label.bundle_name.clone());
        self.assets.insert(asset_path.to_string(), label.clone());
        Ok(())
    }

    fn resolve_record(&self, asset_path: &str) -> Option<AssetRecord> {
        if !self.asset_exists(asset_path) {
            return None;
        }
        Some(AssetRecord {
            path: asset_path.to_string(),
            label: self.assets.get(asset_path).cloned(),
        })
    }
}

impl IndexRefresh for LabelStore {
    /// Forget assets whose files are gone, then persist.
    fn refresh(&mut self) -> Result<()> {
        let before = self.assets.len();
        let root = self.project_root.clone();
        self.assets.retain(|path, _| root.join(path).is_file());

        let pruned = before - self.assets.len();
        if pruned > 0 {
            tracing::info!("Dropped labels of {pruned} assets no longer on disk");
        }

        self.save()
    }
}
