//! # BundlePak
//!
//! Folder-driven asset bundling. The layout of a source folder decides
//! which archive every asset ends up in:
//!
//! ```text
//! Assets/AssetBundle/            <- source folder
//!   CharacterA/                  <- group
//!     Textures/skin.png          -> bundle "CharacterA/Textures", variant "assetBundle"
//!     Scenes/Intro.unity         -> bundle "CharacterA/Scenes",   variant "unity"
//! ```
//!
//! Two operations, sharing nothing but a [`BuildConfig`]:
//!
//! - **mark** ([`mark::mark_all`]) clears every registered bundle label and
//!   relabels all files under the source folder;
//! - **build** ([`build::build`]) deletes the output folder, recreates it and
//!   runs a [`pipeline::BundlePipeline`] over the labels.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use bundlepak::prelude::*;
//!
//! let config = BuildConfig::discover(None, Path::new("."))?;
//!
//! let mut store = LabelStore::open(&config.project_root)?;
//! let marked = mark_all(&config, &mut store)?;
//! println!("Labelled {} files", marked.labeled());
//!
//! let pipeline = ArchivePipeline::new(&config.project_root);
//! let report = build(&config, &pipeline, &mut store)?;
//! println!("Built {} bundles", report.bundle_count());
//! # Ok::<(), bundlepak::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `bundlepak` command-line binary

pub mod build;
pub mod config;
pub mod error;
pub mod labels;
pub mod mark;
pub mod pipeline;
pub mod progress;
pub mod utils;

// Re-exports for convenience
pub use config::BuildConfig;
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::build::{BuildReport, build, build_with_progress};
    pub use crate::config::{BuildConfig, BuildOptions, LooseFilePolicy, TargetPlatform};
    pub use crate::error::{Error, Result};
    pub use crate::labels::{
        AssetRecord, BundleLabel, IndexRefresh, LabelStore, MetadataSink, reset_all_labels,
    };
    pub use crate::mark::{MarkReport, mark_all, mark_all_with_progress};
    pub use crate::pipeline::{ArchivePipeline, BuildManifest, BundlePipeline, BundleReader};
    pub use crate::progress::{BundlePhase, BundleProgress};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
