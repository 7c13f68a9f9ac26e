//! CLI commands for the label store

use std::collections::BTreeMap;

use crate::config::BuildConfig;
use crate::labels::{IndexRefresh, LabelStore, MetadataSink, reset_all_labels};

/// Print every bundle and its assets
pub fn list(config: &BuildConfig) -> anyhow::Result<()> {
    let store = LabelStore::open(&config.project_root)?;

    let mut bundles: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for (path, label) in store.labeled_assets() {
        bundles.entry(label.archive_name()).or_default().push(path);
    }

    if bundles.is_empty() {
        println!("No bundle labels in {}", config.project_root.display());
        return Ok(());
    }

    for (archive, assets) in &bundles {
        println!("{archive} ({} assets)", assets.len());
        for asset in assets {
            println!("  {asset}");
        }
    }

    // Names registered without any asset left
    let orphans: Vec<String> = store
        .list_all_labels()
        .into_iter()
        .filter(|name| store.labeled_assets().all(|(_, label)| &label.bundle_name != name))
        .collect();
    if !orphans.is_empty() {
        println!();
        println!("Registered without assets: {}", orphans.join(", "));
    }

    Ok(())
}

/// Remove every label and save
pub fn clear(config: &BuildConfig) -> anyhow::Result<()> {
    let mut store = LabelStore::open(&config.project_root)?;
    let report = reset_all_labels(&mut store).into_result()?;
    store.refresh()?;
    println!("Removed {} bundle labels", report.removed.len());
    Ok(())
}
