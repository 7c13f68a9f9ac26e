//! Subcommand enum definitions for CLI

use clap::Subcommand;

use super::ProjectArgs;

/// Label store commands
#[derive(Subcommand)]
pub enum LabelCommands {
    /// List every bundle with the assets labelled into it
    List {
        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Remove every bundle label
    Clear {
        #[command(flatten)]
        project: ProjectArgs,
    },
}
