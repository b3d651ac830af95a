// Configuration loader
// Loads ~/.roundtable/config.toml (or an explicit path) and fills API keys
// from the environment

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::CONFIG_DIR_NAME;
use super::settings::DebateConfig;

/// Load configuration.
///
/// Lookup order: `explicit` path (must exist), then
/// `~/.roundtable/config.toml`, then built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<DebateConfig> {
    let config = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("Configuration file not found: {}", path.display());
            }
            load_config_from_path(path)?
        }
        None => match default_config_path() {
            Some(path) if path.exists() => load_config_from_path(&path)?,
            _ => {
                tracing::debug!("No config file found, using built-in defaults");
                DebateConfig::default()
            }
        },
    };

    finish(config)
}

/// Parse a TOML config file. Missing sections and fields take their defaults.
pub fn load_config_from_path(path: &Path) -> Result<DebateConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    let config: DebateConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config TOML at {}", path.display()))?;

    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// `~/.roundtable/config.toml`, if a home directory can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join("config.toml"))
}

fn finish(mut config: DebateConfig) -> Result<DebateConfig> {
    config.api_keys = config.api_keys.with_env_fallback();
    config
        .validate()
        .context("Configuration validation failed")?;
    Ok(config)
}
