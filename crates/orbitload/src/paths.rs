use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories_next::ProjectDirs;

pub const ENV_CONFIG: &str = "ORBITLOAD_CONFIG";

const QUALIFIER: &str = "org";
const ORGANISATION: &str = "Orbitload";
const APPLICATION: &str = "orbitload";
const CONFIG_FILE: &str = "config.toml";

/// Where the configuration file is expected, and whether the user asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub path: PathBuf,
    /// Set for `--config` or `ORBITLOAD_CONFIG`; such a file must exist.
    pub explicit: bool,
}

impl ConfigLocation {
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = explicit.or_else(env_override) {
            return Ok(Self {
                path,
                explicit: true,
            });
        }
        Ok(Self {
            path: default_config_path()?,
            explicit: false,
        })
    }
}

fn env_override() -> Option<PathBuf> {
    env::var_os(ENV_CONFIG)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

pub fn default_config_path() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from(QUALIFIER, ORGANISATION, APPLICATION)
        .ok_or_else(|| anyhow!("failed to determine user directories"))?;
    Ok(project_dirs.config_dir().join(CONFIG_FILE))
}
