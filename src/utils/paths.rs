use anyhow::{anyhow, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the per-project configuration file.
pub const PROJECT_CONFIG_FILE: &str = "protoplan.toml";

/// Environment variable that overrides the user configuration directory.
pub const CONFIG_DIR_ENV: &str = "PROTOPLAN_CONFIG_DIR";

pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let config = dirs::config_dir().ok_or_else(|| anyhow!("Could not find config directory"))?;
    Ok(config.join("protoplan"))
}

/// User-level package defaults, layered between schema defaults and the
/// project configuration.
pub fn get_user_defaults_path() -> Result<PathBuf> {
    let config_dir = get_config_dir()?;
    Ok(config_dir.join("defaults.toml"))
}

/// Find the nearest project configuration, walking up from `start`.
pub fn find_project_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}
