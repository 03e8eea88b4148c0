//! Store configuration for flatmapctl
//!
//! Config file lookup, first match wins:
//! 1. `--config PATH`
//! 2. `$FLATMAP_KNOWLEDGE_CONFIG`
//! 3. `<config dir>/flatmap-knowledge/config.toml` if it exists
//!
//! Command-line flags override values from the file, in either direction:
//! `--read-only`/`--read-write` and `--no-create`/`--create`.

use crate::cli::Cli;
use anyhow::{Context, Result};
use flatmap_knowledge::StoreConfig;
use std::path::PathBuf;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "FLATMAP_KNOWLEDGE_CONFIG";

/// User config file location
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("flatmap-knowledge").join("config.toml"))
}

/// Pick the config file to load, if any
pub fn config_file(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    user_config_path().filter(|path| path.exists())
}

/// Build the store configuration for a parsed command line
pub fn resolve(cli: &Cli) -> Result<StoreConfig> {
    let mut config = match config_file(cli.config.clone()) {
        Some(path) => StoreConfig::load(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => StoreConfig::default(),
    };

    apply_overrides(&mut config, cli);
    Ok(config)
}

fn apply_overrides(config: &mut StoreConfig, cli: &Cli) {
    if let Some(dir) = &cli.store_dir {
        config.store_directory = dir.clone();
    }
    if let Some(name) = &cli.knowledge_base {
        config.knowledge_base = name.clone();
    }
    if let Some(version) = &cli.sckan_version {
        config.sckan_version = version.clone();
    }
    if cli.read_only {
        config.read_only = true;
    } else if cli.read_write {
        config.read_only = false;
    }
    if cli.no_create {
        config.create = false;
    } else if cli.create {
        config.create = true;
    }
}
