use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::BuildConfig;
use crate::utils::path::clean_path;

pub mod build;
pub mod definitions;
mod execute;
pub mod init;
pub mod inspect;
pub mod labels;
pub mod mark;

pub use definitions::LabelCommands;

/// Where to find the configuration and project
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Config file (default: ./bundlepak.toml, then the per-user config)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Project root asset paths are keyed against
    #[arg(long)]
    pub project: Option<PathBuf>,
}

/// Project arguments plus the source folder
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Folder whose sub-folders become bundle groups
    #[arg(long)]
    pub source: Option<PathBuf>,
}

impl ProjectArgs {
    /// Load the config and apply `--project`, resolved against `cwd`
    pub fn load(&self, cwd: &Path) -> anyhow::Result<BuildConfig> {
        let mut config = BuildConfig::discover(self.config.as_deref(), cwd)?;
        if let Some(ref project) = self.project {
            config.project_root = clean_path(&cwd.join(project));
        }
        Ok(config)
    }
}

impl ConfigArgs {
    /// Load the config and apply `--project` and `--source`
    pub fn load(&self, cwd: &Path) -> anyhow::Result<BuildConfig> {
        let mut config = self.project.load(cwd)?;
        if let Some(ref source) = self.source {
            config.source_path = clean_path(&cwd.join(source));
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter bundlepak.toml
    Init {
        /// Directory to create the config in
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Clear all bundle labels and relabel every file under the source folder
    Mark {
        #[command(flatten)]
        config: ConfigArgs,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Delete the output folder and rebuild every bundle
    Build {
        #[command(flatten)]
        config: ConfigArgs,

        /// Output folder (wiped before building)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Variant extension for ordinary assets
        #[arg(long)]
        extension: Option<String>,

        /// Variant extension for scene assets
        #[arg(long)]
        scene_extension: Option<String>,

        /// Build option, repeatable (uncompressed, chunk-based-compression,
        /// dry-run, append-hash, strict)
        #[arg(short = 'o', long = "option")]
        options: Vec<String>,

        /// Target platform (e.g. standalone-windows64, android, ios)
        #[arg(long)]
        target: Option<String>,

        /// Run `mark` before building
        #[arg(long)]
        mark: bool,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Inspect or clear the label store
    Labels {
        #[command(subcommand)]
        command: LabelCommands,
    },

    /// Show the contents of a bundle archive
    Inspect {
        /// Archive file
        archive: PathBuf,

        /// Show sizes and checksums
        #[arg(short, long)]
        detailed: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_overrides_resolve_against_cwd() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("bundlepak.toml"),
            "source = \"Assets/AssetBundle\"\noutput = \"Build\"\n",
        )
        .unwrap();

        let args = ConfigArgs {
            project: ProjectArgs::default(),
            source: Some(PathBuf::from("Other")),
        };
        let config = args.load(temp.path()).unwrap();

        assert_eq!(config.source_path, temp.path().join("Other"));
        assert_eq!(config.output_path, temp.path().join("Build"));
    }
}
