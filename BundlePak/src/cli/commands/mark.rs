//! CLI command for labelling the source folder

use std::time::Instant;

use crate::cli::progress::{LABEL, LOOKING_GLASS, print_done, print_step, step_bar, update_bar};
use crate::config::BuildConfig;
use crate::labels::LabelStore;
use crate::mark::{MarkReport, mark_all_with_progress};
use crate::progress::{BundlePhase, BundleProgress};

pub fn execute(config: &BuildConfig, quiet: bool) -> anyhow::Result<()> {
    let start = Instant::now();
    let report = run(config, quiet)?;

    if !quiet {
        print_summary(&report);
        print_done(start.elapsed());
    }
    Ok(())
}

/// Mark with step output; shared with `build --mark`
pub(crate) fn run(config: &BuildConfig, quiet: bool) -> anyhow::Result<MarkReport> {
    if !quiet {
        print_step(
            1,
            2,
            LOOKING_GLASS,
            &format!("Scanning {}...", config.source_path.display()),
        );
    }

    let mut store = LabelStore::open(&config.project_root)?;
    let pb = step_bar(quiet);
    let progress = |p: &BundleProgress| {
        if p.phase == BundlePhase::AssigningLabels {
            update_bar(&pb, p);
        }
    };

    let report = mark_all_with_progress(config, &mut store, &progress);
    pb.finish_and_clear();
    let report = report?;

    if !quiet {
        print_step(
            2,
            2,
            LABEL,
            &format!(
                "Labels saved to {}",
                LabelStore::store_path(&config.project_root).display()
            ),
        );
    }
    Ok(report)
}

fn print_summary(report: &MarkReport) {
    println!();
    println!(
        "Removed {} old labels, labelled {} files into {} bundles",
        report.reset.removed.len(),
        report.labeled(),
        report.bundle_count()
    );
    for group in &report.groups {
        println!(
            "  {:<24} {:>6} files  {:>4} bundles",
            group.name,
            group.file_count,
            group.bundles.len()
        );
    }
    for name in &report.skipped_groups {
        println!("  {name:<24} (empty, skipped)");
    }
}
