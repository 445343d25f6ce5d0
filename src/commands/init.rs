//! Init command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing::info;

/// Initialize stampy configuration
pub fn cmd_init(base_dir: Option<PathBuf>, force: bool) -> Result<Config> {
    let base = base_dir.unwrap_or_else(Config::default_base_dir);
    let mut config = Config::load_from(Some(base.clone()))?;

    if config.paths.config_file.exists() && !force {
        return Err(Error::Config(format!(
            "Already initialized at {} (use --force to overwrite)",
            base.display()
        )));
    }

    std::fs::create_dir_all(&config.paths.data_dir)?;
    config.validate()?;
    config.save()?;
    info!("Created config at {:?}", config.paths.config_file);

    Ok(config)
}
