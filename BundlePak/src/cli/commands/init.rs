//! CLI command for writing a starter config

use std::fs;
use std::path::Path;

use anyhow::bail;

use crate::config::{CONFIG_FILE_NAME, CONFIG_TEMPLATE};

pub fn execute(dir: &Path, force: bool) -> anyhow::Result<()> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    fs::create_dir_all(dir)?;
    fs::write(&path, CONFIG_TEMPLATE)?;
    println!("Wrote {}", path.display());
    Ok(())
}
