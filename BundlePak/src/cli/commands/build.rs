//! CLI command for a clean bundle rebuild

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use crate::build::{BuildReport, build_with_progress};
use crate::cli::progress::{
    DISK, PACKAGE, WASTEBASKET, format_size, print_done, print_step, step_bar, update_bar,
};
use crate::config::{BuildConfig, BuildOptions, TargetPlatform};
use crate::labels::LabelStore;
use crate::pipeline::ArchivePipeline;
use crate::progress::{BundlePhase, BundleProgress};

/// Command-line values layered over the loaded config
#[derive(Debug, Default)]
pub struct BuildOverrides {
    pub output: Option<PathBuf>,
    pub extension: Option<String>,
    pub scene_extension: Option<String>,
    /// Added to the config's options
    pub options: Vec<String>,
    pub target: Option<String>,
}

impl BuildOverrides {
    pub fn apply(self, mut config: BuildConfig) -> crate::Result<BuildConfig> {
        if let Some(output) = self.output {
            config.output_path = crate::utils::path::clean_path(&output);
        }
        if let Some(extension) = self.extension {
            config.default_extension = extension;
        }
        if let Some(scene_extension) = self.scene_extension {
            config.scene_extension = scene_extension;
        }
        if !self.options.is_empty() {
            config.options |= BuildOptions::from_names(&self.options)?;
        }
        if let Some(target) = self.target {
            config.target_platform = TargetPlatform::from_str(&target)?;
        }
        Ok(config)
    }
}

pub fn execute(config: &BuildConfig, mark_first: bool, quiet: bool) -> anyhow::Result<()> {
    let start = Instant::now();

    if mark_first {
        let marked = super::mark::run(config, quiet)?;
        if !quiet {
            println!("   Labelled {} files", marked.labeled());
        }
    }

    if !quiet {
        let verb = if config.output_path.exists() { "Replacing" } else { "Creating" };
        print_step(
            1,
            3,
            WASTEBASKET,
            &format!("{verb} {}...", config.output_path.display()),
        );
    }

    let pb = step_bar(quiet);
    let bundle_progress = |p: &BundleProgress| update_bar(&pb, p);
    let step_progress = |p: &BundleProgress| {
        if quiet {
            return;
        }
        match p.phase {
            BundlePhase::BuildingBundles => {
                pb.println(format!(
                    "{} {}Building bundles ({})...",
                    console::style("[2/3]").bold().dim(),
                    PACKAGE,
                    config.options
                ));
            }
            BundlePhase::Verifying => {
                pb.println(format!(
                    "{} {}Verifying output...",
                    console::style("[3/3]").bold().dim(),
                    DISK
                ));
            }
            _ => {}
        }
    };

    let pipeline = ArchivePipeline::new(&config.project_root).with_progress(&bundle_progress);
    let mut store = LabelStore::open(&config.project_root)?;
    let report = build_with_progress(config, &pipeline, &mut store, &step_progress);
    pb.finish_and_clear();
    let report = report?;

    if !quiet {
        print_summary(&report);
        print_done(start.elapsed());
    }
    Ok(())
}

fn print_summary(report: &BuildReport) {
    let manifest = &report.manifest;
    println!();
    if manifest.is_dry_run() {
        println!("Dry run: manifests only, no archives written");
    }
    for bundle in &manifest.bundles {
        println!(
            "  {:<40} {:>4} assets  {:>10}",
            bundle.archive,
            bundle.asset_count(),
            format_size(bundle.size_compressed)
        );
    }
    println!(
        "{} bundles ({} assets) for {} in {}",
        report.bundle_count(),
        manifest.asset_count(),
        manifest.target,
        manifest.output_dir.display()
    );
}
