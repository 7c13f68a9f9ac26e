//! Marking: map the source folder tree onto bundle labels
//!
//! Every immediate sub-folder of the source folder is a *group*. Every file
//! under a group (at any depth, sidecars excluded) is labelled
//! `<group>/<first folder below the group>`, with the scene or default
//! variant depending on its extension:
//!
//! ```text
//! Assets/AssetBundle/Heroes/Skins/a.png        -> Heroes/Skins [assetBundle]
//! Assets/AssetBundle/Heroes/Skins/a.png.meta   -> (sidecar, skipped)
//! Assets/AssetBundle/World/Levels/Level1.unity -> World/Levels [unity]
//! ```
//!
//! Marking always starts from a clean slate: all registered labels are
//! removed first, and a reset that leaves anything behind aborts the mark.

mod assign;
mod groups;

use std::collections::BTreeSet;

use crate::config::BuildConfig;
use crate::error::{Error, Result};
use crate::labels::{IndexRefresh, LabelResetReport, MetadataSink, reset_all_labels};
use crate::progress::{BundlePhase, BundleProgress, ProgressCallback};

pub use assign::{Assignment, assign_labels, sub_group_of};
pub use groups::{Group, SIDECAR_EXTENSION, discover_groups, is_sidecar};

/// Per-group summary of a mark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub name: String,
    pub file_count: usize,
    /// Distinct bundle names produced by the group
    pub bundles: BTreeSet<String>,
}

/// Result of [`mark_all`]
#[derive(Debug, Clone)]
pub struct MarkReport {
    /// What the label reset removed
    pub reset: LabelResetReport,
    /// Groups that produced labels
    pub groups: Vec<GroupSummary>,
    /// Groups without any file after sidecar filtering
    pub skipped_groups: Vec<String>,
    /// Every label written, in file order
    pub assignments: Vec<Assignment>,
}

impl MarkReport {
    /// Number of labelled files
    #[must_use]
    pub fn labeled(&self) -> usize {
        self.assignments.len()
    }

    /// Number of distinct bundle names
    #[must_use]
    pub fn bundle_count(&self) -> usize {
        self.groups.iter().map(|g| g.bundles.len()).sum()
    }
}

/// Label every file under the configured source folder.
///
/// See [`mark_all_with_progress`].
pub fn mark_all<H>(config: &BuildConfig, host: &mut H) -> Result<MarkReport>
where
    H: MetadataSink + IndexRefresh + ?Sized,
{
    mark_all_with_progress(config, host, &|_| {})
}

/// Label every file under the configured source folder, reporting progress.
///
/// Order of work:
/// 1. validate the configuration (nothing touched on failure);
/// 2. scan groups and compute every label;
/// 3. resolve the host record of every file, aborting with
///    [`Error::AssetRecordNotFound`] before any label changes;
/// 4. remove all registered labels, aborting with
///    [`Error::LabelResetIncomplete`] if any survives;
/// 5. write each label;
/// 6. refresh the host index.
pub fn mark_all_with_progress<H>(
    config: &BuildConfig,
    host: &mut H,
    progress: ProgressCallback,
) -> Result<MarkReport>
where
    H: MetadataSink + IndexRefresh + ?Sized,
{
    config.validate_for_mark()?;

    progress(&BundleProgress::with_item(
        BundlePhase::ScanningGroups,
        0,
        1,
        config.source_path.display().to_string(),
    ));
    let groups = discover_groups(&config.source_path)?;
    let assignments = assign_labels(config, &groups)?;

    let (summaries, skipped_groups) = summarize(&groups, &assignments);
    for name in &skipped_groups {
        tracing::info!("Group '{name}' has no files, skipping");
    }

    if let Some(unresolved) = assignments
        .iter()
        .find(|assignment| host.resolve_record(&assignment.asset_path).is_none())
    {
        return Err(Error::AssetRecordNotFound {
            path: unresolved.file.clone(),
        });
    }

    progress(&BundleProgress::new(BundlePhase::ResettingLabels, 0, 1));
    let reset = reset_all_labels(host).into_result()?;
    tracing::info!("Removed {} existing bundle labels", reset.removed.len());

    let total = assignments.len();
    for (i, assignment) in assignments.iter().enumerate() {
        progress(&BundleProgress::with_item(
            BundlePhase::AssigningLabels,
            i + 1,
            total,
            assignment.asset_path.clone(),
        ));

        host.set_label(&assignment.asset_path, &assignment.label)?;
        tracing::debug!("{} -> {}", assignment.asset_path, assignment.label);
    }

    progress(&BundleProgress::new(BundlePhase::Refreshing, 0, 1));
    host.refresh()?;

    progress(&BundleProgress::new(BundlePhase::Complete, total, total));
    tracing::info!("All selected files have been marked ({total} files)");

    Ok(MarkReport {
        reset,
        groups: summaries,
        skipped_groups,
        assignments,
    })
}

fn summarize(groups: &[Group], assignments: &[Assignment]) -> (Vec<GroupSummary>, Vec<String>) {
    let mut summaries = Vec::new();
    let mut skipped = Vec::new();

    for group in groups {
        if group.is_empty() {
            skipped.push(group.name.clone());
            continue;
        }
        let prefix = format!("{}/", group.name);
        let bundles = assignments
            .iter()
            .filter(|a| a.label.bundle_name.starts_with(&prefix))
            .map(|a| a.label.bundle_name.clone())
            .collect();
        summaries.push(GroupSummary {
            name: group.name.clone(),
            file_count: group.files.len(),
            bundles,
        });
    }

    (summaries, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{AssetRecord, BundleLabel, LabelStore};
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    fn project(files: &[&str]) -> (TempDir, BuildConfig) {
        let temp = TempDir::new().unwrap();
        for file in files {
            touch(temp.path(), file);
        }
        fs::create_dir_all(temp.path().join("Assets")).unwrap();
        let config = BuildConfig {
            project_root: temp.path().to_path_buf(),
            source_path: temp.path().join("Assets"),
            output_path: temp.path().join("Build"),
            ..BuildConfig::default()
        };
        (temp, config)
    }

    /// In-memory host that can refuse removals or lookups and counts refreshes
    #[derive(Default)]
    struct MemoryHost {
        root: PathBuf,
        registered: BTreeSet<String>,
        assets: BTreeMap<String, BundleLabel>,
        stuck: BTreeSet<String>,
        unresolvable: BTreeSet<String>,
        refreshes: usize,
    }

    impl MetadataSink for MemoryHost {
        fn list_all_labels(&self) -> BTreeSet<String> {
            self.registered.clone()
        }

        fn remove_label(&mut self, name: &str, _remove_file_associations: bool) -> bool {
            if self.stuck.contains(name) {
                return false;
            }
            self.assets.retain(|_, l| l.bundle_name != name);
            self.registered.remove(name)
        }

        fn set_label(&mut self, asset_path: &str, label: &BundleLabel) -> Result<()> {
            self.registered.insert(label.bundle_name.clone());
            self.assets.insert(asset_path.to_string(), label.clone());
            Ok(())
        }

        fn resolve_record(&self, asset_path: &str) -> Option<AssetRecord> {
            if self.unresolvable.contains(asset_path) {
                return None;
            }
            self.root.join(asset_path).is_file().then(|| AssetRecord {
                path: asset_path.to_string(),
                label: self.assets.get(asset_path).cloned(),
            })
        }
    }

    impl IndexRefresh for MemoryHost {
        fn refresh(&mut self) -> Result<()> {
            self.refreshes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_scenario_heroes_and_props() {
        let (temp, config) = project(&[
            "Assets/Heroes/Skins/a.png",
            "Assets/Heroes/Skins/a.png.meta",
            "Assets/Props/Env/rock.fbx",
        ]);
        let mut store = LabelStore::open(temp.path()).unwrap();

        let report = mark_all(&config, &mut store).unwrap();

        assert_eq!(report.labeled(), 2);
        assert_eq!(
            store.label_of("Assets/Heroes/Skins/a.png"),
            Some(&BundleLabel::new("Heroes/Skins", "assetBundle"))
        );
        assert_eq!(
            store.label_of("Assets/Props/Env/rock.fbx"),
            Some(&BundleLabel::new("Props/Env", "assetBundle"))
        );
        assert_eq!(store.label_of("Assets/Heroes/Skins/a.png.meta"), None);
        assert!(LabelStore::store_path(temp.path()).is_file());
    }

    #[test]
    fn test_remark_drops_orphaned_labels() {
        let (temp, config) = project(&["Assets/G/Old/a.png"]);
        let mut host = MemoryHost {
            root: temp.path().to_path_buf(),
            ..MemoryHost::default()
        };
        mark_all(&config, &mut host).unwrap();
        assert!(host.registered.contains("G/Old"));

        fs::rename(temp.path().join("Assets/G/Old"), temp.path().join("Assets/G/New")).unwrap();
        let report = mark_all(&config, &mut host).unwrap();

        assert_eq!(report.reset.removed, vec!["G/Old".to_string()]);
        assert_eq!(host.registered.iter().collect::<Vec<_>>(), vec!["G/New"]);
        assert_eq!(host.refreshes, 2);
    }

    #[test]
    fn test_incomplete_reset_blocks_relabel() {
        let (temp, config) = project(&["Assets/G/S/a.png"]);
        let mut host = MemoryHost {
            root: temp.path().to_path_buf(),
            registered: ["x/1", "x/2", "x/3", "x/4", "x/5"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            stuck: ["x/2", "x/5"].iter().map(ToString::to_string).collect(),
            ..MemoryHost::default()
        };

        let err = mark_all(&config, &mut host).unwrap_err();

        assert!(matches!(err, Error::LabelResetIncomplete { removed: 3, total: 5, .. }));
        assert!(host.assets.is_empty());
        assert_eq!(host.refreshes, 0);
    }

    #[test]
    fn test_unresolvable_record_aborts() {
        let (temp, config) = project(&["Assets/G/S/a.png"]);

        struct Blind(MemoryHost);
        impl MetadataSink for Blind {
            fn list_all_labels(&self) -> BTreeSet<String> {
                self.0.list_all_labels()
            }
            fn remove_label(&mut self, name: &str, assoc: bool) -> bool {
                self.0.remove_label(name, assoc)
            }
            fn set_label(&mut self, asset_path: &str, label: &BundleLabel) -> Result<()> {
                self.0.set_label(asset_path, label)
            }
            fn resolve_record(&self, _asset_path: &str) -> Option<AssetRecord> {
                None
            }
        }
        impl IndexRefresh for Blind {
            fn refresh(&mut self) -> Result<()> {
                self.0.refresh()
            }
        }

        let mut host = Blind(MemoryHost {
            root: temp.path().to_path_buf(),
            ..MemoryHost::default()
        });
        let err = mark_all(&config, &mut host).unwrap_err();
        assert!(matches!(err, Error::AssetRecordNotFound { .. }));
        assert!(!err.is_validation());
        assert!(host.0.assets.is_empty());
    }

    #[test]
    fn test_unresolvable_later_record_leaves_labels_untouched() {
        let (temp, config) = project(&["Assets/G/S/a.png", "Assets/G/S/b.png"]);
        let mut host = MemoryHost {
            root: temp.path().to_path_buf(),
            unresolvable: std::iter::once("Assets/G/S/b.png".to_string()).collect(),
            ..MemoryHost::default()
        };
        host.set_label("Assets/Old/x.png", &BundleLabel::new("Old/X", "assetBundle"))
            .unwrap();

        let err = mark_all(&config, &mut host).unwrap_err();

        assert!(matches!(
            err,
            Error::AssetRecordNotFound { ref path } if path.ends_with("G/S/b.png")
        ));
        assert_eq!(host.registered.iter().collect::<Vec<_>>(), vec!["Old/X"]);
        assert_eq!(host.assets.len(), 1);
        assert_eq!(host.assets.get("Assets/G/S/a.png"), None);
        assert_eq!(host.refreshes, 0);
    }

    #[test]
    fn test_validation_happens_before_reset() {
        let (temp, mut config) = project(&[]);
        config.source_path = PathBuf::new();
        let mut host = MemoryHost {
            root: temp.path().to_path_buf(),
            registered: std::iter::once("keep/me".to_string()).collect(),
            ..MemoryHost::default()
        };

        let err = mark_all(&config, &mut host).unwrap_err();
        assert!(err.is_validation());
        assert!(host.registered.contains("keep/me"));
    }

    #[test]
    fn test_summary_and_skipped_groups() {
        let (temp, config) = project(&[
            "Assets/A/One/x.png",
            "Assets/A/Two/y.png",
            "Assets/B/Only/z.png.meta",
        ]);
        let mut store = LabelStore::open(temp.path()).unwrap();

        let report = mark_all(&config, &mut store).unwrap();

        assert_eq!(report.skipped_groups, vec!["B".to_string()]);
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].file_count, 2);
        assert_eq!(report.bundle_count(), 2);
    }

    #[test]
    fn test_every_file_labelled_exactly_once() {
        let (temp, config) = project(&[
            "Assets/A/S/1.png",
            "Assets/A/S/deep/2.png",
            "Assets/A/T/3.unity",
            "Assets/B/U/4.wav",
        ]);
        let mut store = LabelStore::open(temp.path()).unwrap();
        let report = mark_all(&config, &mut store).unwrap();

        let unique: BTreeSet<_> = report.assignments.iter().map(|a| &a.asset_path).collect();
        assert_eq!(unique.len(), 4);
        assert_eq!(store.len(), 4);
        assert_eq!(
            store.label_of("Assets/A/T/3.unity"),
            Some(&BundleLabel::new("A/T", "unity"))
        );
    }
}
