//! Config inspection commands

use anyhow::{Context, Result};
use std::path::PathBuf;

use gw_core::config::{self, EngineConfig};

/// Print the effective configuration as TOML
pub fn config_show(path: Option<&PathBuf>) -> Result<()> {
    let config = load_or_default(path);
    let rendered = toml::to_string_pretty(&config).context("Failed to render config")?;
    print!("{}", rendered);
    Ok(())
}

/// Print the config file path in use
pub fn config_path(path: Option<&PathBuf>) -> Result<()> {
    let path = path
        .cloned()
        .unwrap_or_else(config::default_config_path);
    println!("{}", path.display());
    Ok(())
}

/// Load the config file, falling back to defaults when it is missing or
/// unreadable
pub fn load_or_default(path: Option<&PathBuf>) -> EngineConfig {
    let path = path
        .cloned()
        .unwrap_or_else(config::default_config_path);
    if !path.exists() {
        return EngineConfig::default();
    }
    config::load_config(&path).unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from {:?}: {}", path, e);
        EngineConfig::default()
    })
}
