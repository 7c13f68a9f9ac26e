//! Bundle labels and the metadata sink they are written to
//!
//! A label is the `(bundle name, variant)` pair attached to one asset. The
//! [`MetadataSink`] trait is the seam to whatever keeps those labels: the
//! file-backed [`LabelStore`] shipped here, or an editor host's own asset
//! database.

mod reset;
mod store;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use reset::{LabelResetReport, reset_all_labels};
pub use store::{LabelStore, STORE_DIR, STORE_FILE};

/// Which archive an asset goes into, and the file suffix of that archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BundleLabel {
    /// `<group>/<sub-group>`
    #[serde(rename = "bundle")]
    pub bundle_name: String,
    /// Archive file extension
    pub variant: String,
}

impl BundleLabel {
    #[must_use]
    pub fn new(bundle_name: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            bundle_name: bundle_name.into(),
            variant: variant.into(),
        }
    }

    /// Label for a file in `sub_group` of `group`
    #[must_use]
    pub fn for_group(group: &str, sub_group: &str, variant: impl Into<String>) -> Self {
        Self::new(format!("{group}/{sub_group}"), variant)
    }

    /// Archive file name relative to the output folder (`Heroes/Skins.assetBundle`)
    #[must_use]
    pub fn archive_name(&self) -> String {
        format!("{}.{}", self.bundle_name, self.variant)
    }
}

impl fmt::Display for BundleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.bundle_name, self.variant)
    }
}

/// A resolved asset and the label it currently carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    /// Path relative to the project root, `/`-separated
    pub path: String,
    pub label: Option<BundleLabel>,
}

/// Storage for per-asset bundle labels.
///
/// Asset paths are project-relative with forward slashes
/// (`Assets/Heroes/Skins/a.png`).
pub trait MetadataSink {
    /// Every bundle name currently registered.
    fn list_all_labels(&self) -> BTreeSet<String>;

    /// Unregister a bundle name.
    ///
    /// With `remove_file_associations`, assets carrying the name lose their
    /// label too; without it, a name still in use is left alone. Returns
    /// `false` when nothing was removed.
    fn remove_label(&mut self, name: &str, remove_file_associations: bool) -> bool;

    /// Attach `label` to an asset, registering its bundle name.
    fn set_label(&mut self, asset_path: &str, label: &BundleLabel) -> Result<()>;

    /// Look up an asset; `None` if the path is unknown to the sink.
    fn resolve_record(&self, asset_path: &str) -> Option<AssetRecord>;
}

/// Ask the host to resynchronise its view of the file system after
/// out-of-band changes (files written or deleted behind its back).
pub trait IndexRefresh {
    fn refresh(&mut self) -> Result<()>;
}

impl<F> IndexRefresh for F
where
    F: FnMut() -> Result<()>,
{
    fn refresh(&mut self) -> Result<()> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_names() {
        let label = BundleLabel::for_group("CharacterA", "Textures", "assetBundle");
        assert_eq!(label.bundle_name, "CharacterA/Textures");
        assert_eq!(label.archive_name(), "CharacterA/Textures.assetBundle");
        assert_eq!(label.to_string(), "CharacterA/Textures [assetBundle]");
    }

    #[test]
    fn test_closure_refresh() {
        let mut calls = 0;
        let mut refresh = || -> Result<()> {
            calls += 1;
            Ok(())
        };
        refresh.refresh().unwrap();
        refresh.refresh().unwrap();
        assert_eq!(calls, 2);
    }
}
