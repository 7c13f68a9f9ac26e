//! Archive pipeline: one compressed archive per labelled bundle

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use super::manifest::{BuildManifest, BundleArtifact, ManifestAsset, write_json};
use super::writer::BundleWriter;
use super::BundlePipeline;
use crate::config::{BuildOptions, TargetPlatform};
use crate::error::{Error, Result};
use crate::labels::{BundleLabel, LabelStore};
use crate::progress::{BundlePhase, BundleProgress};
use crate::utils::{content_hash, short_hash};

/// Packs the assets recorded in a project's [`LabelStore`].
///
/// The store is read fresh on every build, so labels written by a mark in the
/// same process are picked up as long as that mark refreshed (saved) it.
pub struct ArchivePipeline<'a> {
    project_root: PathBuf,
    progress: Option<&'a (dyn Fn(&BundleProgress) + Sync + Send)>,
}

impl<'a> ArchivePipeline<'a> {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            progress: None,
        }
    }

    /// Report one [`BundlePhase::BuildingBundles`] step per finished bundle
    #[must_use]
    pub fn with_progress(mut self, progress: &'a (dyn Fn(&BundleProgress) + Sync + Send)) -> Self {
        self.progress = Some(progress);
        self
    }

    fn report(&self, progress: &BundleProgress) {
        if let Some(callback) = self.progress {
            callback(progress);
        }
    }

    /// Labelled assets grouped by bundle, sorted
    fn collect_bundles(&self) -> Result<BTreeMap<BundleLabel, Vec<String>>> {
        let store = LabelStore::open(&self.project_root)?;
        let mut bundles: BTreeMap<BundleLabel, Vec<String>> = BTreeMap::new();
        for (path, label) in store.labeled_assets() {
            bundles.entry(label.clone()).or_default().push(path.to_string());
        }
        Ok(bundles)
    }

    fn build_bundle(
        &self,
        output_dir: &Path,
        label: &BundleLabel,
        assets: &[String],
        options: BuildOptions,
        target: TargetPlatform,
    ) -> Result<BundleArtifact> {
        let compression = options.compression();
        let mut writer = BundleWriter::new(target).with_compression(compression);
        let mut manifest_assets = Vec::with_capacity(assets.len());
        let mut hash_parts: Vec<Vec<u8>> = Vec::new();
        let mut size_decompressed = 0u64;

        for asset in assets {
            let path = self.project_root.join(asset);
            let data = match std::fs::read(&path) {
                Ok(data) => data,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    if options.contains(BuildOptions::STRICT) {
                        return Err(Error::LabeledAssetMissing(asset.clone()));
                    }
                    tracing::warn!("Skipping {asset}: file no longer exists");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let size: u32 = data.len().try_into().map_err(|_| {
                Error::InvalidFormat(format!("{asset} is too large: {} bytes", data.len()))
            })?;
            size_decompressed += u64::from(size);
            manifest_assets.push(ManifestAsset {
                path: asset.clone(),
                size,
                crc32: crc32fast::hash(&data),
            });

            if options.contains(BuildOptions::APPEND_HASH) {
                hash_parts.push(asset.as_bytes().to_vec());
                hash_parts.push(data.clone());
            }
            writer.add_file(asset.clone(), data);
        }

        let content_hash = options
            .contains(BuildOptions::APPEND_HASH)
            .then(|| content_hash(hash_parts.iter().map(Vec::as_slice)));

        let archive = match &content_hash {
            Some(hash) => format!("{}_{}.{}", label.bundle_name, short_hash(hash), label.variant),
            None => label.archive_name(),
        };
        let archive_path = output_dir.join(&archive);

        let size_compressed = if options.contains(BuildOptions::DRY_RUN) {
            0
        } else {
            writer.write(&archive_path)?;
            std::fs::metadata(&archive_path)?.len()
        };

        let artifact = BundleArtifact {
            bundle: label.bundle_name.clone(),
            variant: label.variant.clone(),
            archive,
            compression: compression.as_str().to_string(),
            size_compressed,
            size_decompressed,
            content_hash,
            assets: manifest_assets,
        };
        write_json(&output_dir.join(artifact.manifest_name()), &artifact)?;

        Ok(artifact)
    }
}

impl BundlePipeline for ArchivePipeline<'_> {
    fn build(
        &self,
        output_dir: &Path,
        options: BuildOptions,
        target: TargetPlatform,
    ) -> Result<BuildManifest> {
        options.validate()?;
        let bundles = self.collect_bundles()?;
        let total = bundles.len();
        tracing::info!(
            "Building {total} bundles for {target} ({})",
            options.compression().as_str()
        );

        let processed = AtomicUsize::new(0);
        let results: Vec<Result<BundleArtifact>> = bundles
            .par_iter()
            .map(|(label, assets)| {
                let artifact = self.build_bundle(output_dir, label, assets, options, target);
                let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
                self.report(&BundleProgress::with_item(
                    BundlePhase::BuildingBundles,
                    current,
                    total,
                    label.archive_name(),
                ));
                artifact
            })
            .collect();

        let mut manifest = BuildManifest::new(output_dir, target, options);
        for result in results {
            manifest.bundles.push(result?);
        }
        manifest.save()?;

        Ok(manifest)
    }
}
