//! Clean rebuild of the output folder
//!
//! A build never updates archives in place. The previous output folder (and
//! the host's `.meta` sidecar for it) is deleted, the folder is recreated
//! empty, and the pipeline writes everything from scratch.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::BuildConfig;
use crate::error::{Error, Result};
use crate::labels::IndexRefresh;
use crate::mark::SIDECAR_EXTENSION;
use crate::pipeline::{BuildManifest, BundlePipeline};
use crate::progress::{BundlePhase, BundleProgress, ProgressCallback};

/// Result of [`build`]
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Whether an earlier output folder was deleted first
    pub removed_previous: bool,
    pub manifest: BuildManifest,
    pub elapsed: Duration,
}

impl BuildReport {
    #[must_use]
    pub fn bundle_count(&self) -> usize {
        self.manifest.bundles.len()
    }
}

/// Sidecar metadata file the host keeps for the output folder itself
#[must_use]
pub fn output_sidecar(output: &Path) -> PathBuf {
    let mut name = OsString::from(output.as_os_str());
    name.push(".");
    name.push(SIDECAR_EXTENSION);
    PathBuf::from(name)
}

/// Rebuild the output folder from scratch.
///
/// See [`build_with_progress`].
pub fn build(
    config: &BuildConfig,
    pipeline: &dyn BundlePipeline,
    refresh: &mut dyn IndexRefresh,
) -> Result<BuildReport> {
    build_with_progress(config, pipeline, refresh, &|_| {})
}

/// Rebuild the output folder from scratch, reporting progress.
///
/// Steps, in order:
/// 1. validate the configuration; a validation error leaves the disk untouched;
/// 2. if the output folder exists, delete it and its sidecar, then refresh;
/// 3. create the output folder;
/// 4. run the pipeline;
/// 5. check that every file the pipeline reported is on disk;
/// 6. refresh.
///
/// A failure after step 1 leaves whatever state the failing step produced.
pub fn build_with_progress(
    config: &BuildConfig,
    pipeline: &dyn BundlePipeline,
    refresh: &mut dyn IndexRefresh,
    progress: ProgressCallback,
) -> Result<BuildReport> {
    config.validate_for_build()?;
    let started = Instant::now();
    let output = config.output_path.as_path();

    let removed_previous = output.exists();
    if removed_previous {
        progress(&BundleProgress::with_item(
            BundlePhase::RemovingOldOutput,
            0,
            1,
            output.display().to_string(),
        ));
        remove_previous_output(output)?;
        refresh.refresh()?;
    }

    progress(&BundleProgress::new(BundlePhase::CreatingOutput, 0, 1));
    fs::create_dir_all(output)?;

    progress(&BundleProgress::new(BundlePhase::BuildingBundles, 0, 1));
    let manifest = pipeline.build(output, config.options, config.target_platform)?;

    progress(&BundleProgress::new(BundlePhase::Verifying, 0, 1));
    verify_output(&manifest)?;

    progress(&BundleProgress::new(BundlePhase::Refreshing, 0, 1));
    refresh.refresh()?;

    let bundles = manifest.bundles.len();
    progress(&BundleProgress::new(BundlePhase::Complete, bundles, bundles));
    tracing::info!("AssetBundles built successfully ({bundles} bundles)");

    Ok(BuildReport {
        removed_previous,
        manifest,
        elapsed: started.elapsed(),
    })
}

fn remove_previous_output(output: &Path) -> Result<()> {
    if output.is_dir() {
        fs::remove_dir_all(output)?;
    } else {
        fs::remove_file(output)?;
    }

    let sidecar = output_sidecar(output);
    match fs::remove_file(&sidecar) {
        Ok(()) => tracing::debug!("Removed {}", sidecar.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    tracing::info!("Removed previous output {}", output.display());
    Ok(())
}

fn verify_output(manifest: &BuildManifest) -> Result<()> {
    let missing: Vec<PathBuf> = manifest
        .expected_files()
        .into_iter()
        .filter(|path| !path.is_file())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::OutputVerificationFailed { missing })
    }
}
