use std::fs;
use std::path::{Path, PathBuf};

use crate::model::EngineConfig;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "ordo.toml";

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Read and parse one config file.
pub fn read_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Resolve the engine config.
///
/// An explicit path must exist. Without one, `ordo.toml` in `dir` is used if
/// present, and the defaults otherwise.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<EngineConfig, ConfigError> {
    match explicit {
        Some(path) => read_config(path),
        None => {
            let path = dir.join(DEFAULT_CONFIG_FILE);
            if path.is_file() {
                read_config(&path)
            } else {
                tracing::debug!(dir = %dir.display(), "no {} found, using defaults", DEFAULT_CONFIG_FILE);
                Ok(EngineConfig::default())
            }
        }
    }
}
