//! Bundling pipelines
//!
//! The build orchestrator only knows the [`BundlePipeline`] trait. The
//! crate ships one implementation, [`ArchivePipeline`], which packs every
//! labelled bundle into a `BNDL` archive (see [`format`]) and writes JSON
//! manifests beside it.

mod archive;
pub mod format;
mod manifest;
mod reader;
mod writer;

use std::path::Path;

use crate::config::{BuildOptions, TargetPlatform};
use crate::error::Result;

pub use archive::ArchivePipeline;
pub use format::{ArchiveEntry, CompressionMethod};
pub use manifest::{BuildManifest, BundleArtifact, MANIFEST_EXTENSION, ManifestAsset};
pub use reader::{BundleFile, BundleReader};
pub use writer::BundleWriter;

/// Engine that turns labelled assets into files under `output_dir`.
///
/// `output_dir` exists and is empty when `build` is called.
pub trait BundlePipeline {
    fn build(
        &self,
        output_dir: &Path,
        options: BuildOptions,
        target: TargetPlatform,
    ) -> Result<BuildManifest>;
}
