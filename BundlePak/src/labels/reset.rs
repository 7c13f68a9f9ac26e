//! Clearing every registered bundle label

use super::MetadataSink;
use crate::error::{Error, Result};

/// Outcome of [`reset_all_labels`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelResetReport {
    /// Names registered before the reset
    pub total: usize,
    /// Names removed
    pub removed: Vec<String>,
    /// Names the sink refused to remove
    pub failed: Vec<String>,
}

impl LabelResetReport {
    /// True iff every registered name was removed
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.removed.len() == self.total
    }

    /// Turn an incomplete reset into [`Error::LabelResetIncomplete`].
    pub fn into_result(self) -> Result<Self> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(Error::LabelResetIncomplete {
                removed: self.removed.len(),
                total: self.total,
                failed: self.failed,
            })
        }
    }
}

/// Remove every registered bundle name together with its asset associations.
///
/// Every name is attempted even after a failure, so the report always
/// reflects the full picture.
pub fn reset_all_labels<S: MetadataSink + ?Sized>(sink: &mut S) -> LabelResetReport {
    let labels = sink.list_all_labels();
    let mut report = LabelResetReport {
        total: labels.len(),
        ..LabelResetReport::default()
    };

    for label in labels {
        if sink.remove_label(&label, true) {
            report.removed.push(label);
        } else {
            tracing::warn!("Could not remove bundle label '{label}'");
            report.failed.push(label);
        }
    }

    tracing::debug!(
        "Label reset removed {}/{} labels",
        report.removed.len(),
        report.total
    );
    report
}
