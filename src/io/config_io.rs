use std::fs;
use std::path::{Path, PathBuf};

use crate::io::paths;
use crate::model::config::Config;

/// Error type for reading the config file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Default location of config.toml
pub fn default_config_path() -> PathBuf {
    paths::config_dir().join("config.toml")
}

/// Read the config from `explicit` if given, else from the default path.
/// A missing default file yields the default config; a missing explicit
/// file is an error.
pub fn read_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = default_config_path();
            if !p.exists() {
                log::debug!("no config at {}, using defaults", p.display());
                return Ok(Config::default());
            }
            p
        }
    };
    read_config_from(&path)
}

/// Read and parse a config file
pub fn read_config_from(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    log::info!("loaded config from {}", path.display());
    Ok(config)
}
