//! Command execution implementations

use super::definitions::LabelCommands;
use super::{Commands, build, init, inspect, labels, mark};

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        let cwd = std::env::current_dir()?;
        match self {
            Commands::Init { dir, force } => init::execute(&cwd.join(dir), *force),
            Commands::Mark { config, quiet } => mark::execute(&config.load(&cwd)?, *quiet),
            Commands::Build {
                config,
                output,
                extension,
                scene_extension,
                options,
                target,
                mark: mark_first,
                quiet,
            } => {
                let overrides = build::BuildOverrides {
                    output: output.as_ref().map(|p| cwd.join(p)),
                    extension: extension.clone(),
                    scene_extension: scene_extension.clone(),
                    options: options.clone(),
                    target: target.clone(),
                };
                let config = overrides.apply(config.load(&cwd)?)?;
                build::execute(&config, *mark_first, *quiet)
            }
            Commands::Labels { command } => command.execute(&cwd),
            Commands::Inspect { archive, detailed } => inspect::execute(archive, *detailed),
        }
    }
}

impl LabelCommands {
    /// Execute the selected label store command.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn execute(&self, cwd: &std::path::Path) -> anyhow::Result<()> {
        match self {
            LabelCommands::List { project } => labels::list(&project.load(cwd)?),
            LabelCommands::Clear { project } => labels::clear(&project.load(cwd)?),
        }
    }
}
