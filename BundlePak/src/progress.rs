//! Progress reporting for mark and build operations

/// Progress callback type shared by mark and build
pub type ProgressCallback<'a> = &'a (dyn Fn(&BundleProgress) + Sync + Send);

/// Progress information during mark/build operations
#[derive(Debug, Clone)]
pub struct BundleProgress {
    /// Current operation phase
    pub phase: BundlePhase,
    /// Current item number (1-indexed)
    pub current: usize,
    /// Total number of items
    pub total: usize,
    /// Current group, bundle or file (if applicable)
    pub current_item: Option<String>,
}

impl BundleProgress {
    /// Create a new progress update
    #[must_use]
    pub fn new(phase: BundlePhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            current_item: None,
        }
    }

    /// Create a progress update with an item name
    #[must_use]
    pub fn with_item(
        phase: BundlePhase,
        current: usize,
        total: usize,
        item: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            current,
            total,
            current_item: Some(item.into()),
        }
    }

    /// Get the progress percentage (0.0 - 1.0)
    #[must_use]
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}

/// Phase of a mark or build operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundlePhase {
    /// Removing previously registered labels
    ResettingLabels,
    /// Enumerating groups and their files
    ScanningGroups,
    /// Writing labels onto assets
    AssigningLabels,
    /// Deleting the previous output folder
    RemovingOldOutput,
    /// Creating the fresh output folder
    CreatingOutput,
    /// Writing archives (one item per bundle)
    BuildingBundles,
    /// Checking the produced artifacts
    Verifying,
    /// Resynchronising the asset index
    Refreshing,
    /// Operation complete
    Complete,
}

impl BundlePhase {
    /// Get a human-readable description of this phase
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ResettingLabels => "Resetting labels",
            Self::ScanningGroups => "Scanning groups",
            Self::AssigningLabels => "Assigning labels",
            Self::RemovingOldOutput => "Removing old output",
            Self::CreatingOutput => "Creating output folder",
            Self::BuildingBundles => "Building bundles",
            Self::Verifying => "Verifying output",
            Self::Refreshing => "Refreshing index",
            Self::Complete => "Complete",
        }
    }
}
