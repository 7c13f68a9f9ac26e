//! CLI progress display utilities
//!
//! Step lines with emojis (`[1/2] 🔍 Scanning...`) plus a single progress
//! bar fed from [`BundleProgress`] callbacks.

use std::time::Duration;

use console::{Emoji, style};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};

use crate::progress::BundleProgress;

/// Magnifying glass - for scanning operations
pub static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
/// Label - for marking operations
pub static LABEL: Emoji<'_, '_> = Emoji("🏷️  ", "");
/// Package - for bundling operations
pub static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "");
/// Wastebasket - for removal operations
pub static WASTEBASKET: Emoji<'_, '_> = Emoji("🗑️  ", "");
/// Floppy disk - for writing/saving operations
pub static DISK: Emoji<'_, '_> = Emoji("💾 ", "");
/// Sparkles - for completion
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

/// Print a step indicator: `[1/3] 📦 Message...`
pub fn print_step(current: usize, total: usize, emoji: Emoji, msg: &str) {
    println!(
        "{} {}{}",
        style(format!("[{current}/{total}]")).bold().dim(),
        emoji,
        msg
    );
}

/// Print completion message: `✨ Done in 2s`
pub fn print_done(elapsed: Duration) {
    println!("{} Done in {}", SPARKLE, HumanDuration(elapsed));
}

/// Progress bar style for determinate progress
///
/// Format: `Heroes/Skins.assetBundle [████████░░░░░░░░] 3/6`
#[must_use]
pub fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Progress bar for a step, hidden when `quiet`
#[must_use]
pub fn step_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(0);
    pb.set_style(bar_style());
    pb
}

/// Mirror a progress update onto a bar
pub fn update_bar(pb: &ProgressBar, progress: &BundleProgress) {
    pb.set_length(progress.total as u64);
    pb.set_position(progress.current as u64);
    if let Some(ref item) = progress.current_item {
        pb.set_message(item.clone());
    }
}

/// Format byte size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::BundlePhase;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_update_hidden_bar() {
        let pb = step_bar(true);
        update_bar(
            &pb,
            &BundleProgress::with_item(BundlePhase::BuildingBundles, 2, 5, "G/S.assetBundle"),
        );
        assert_eq!(pb.position(), 2);
        assert_eq!(pb.length(), Some(5));
    }
}
