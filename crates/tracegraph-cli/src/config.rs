//! Locating and reading the layout configuration file.
//!
//! A `--config` path always wins. Without one, `tracegraph/config.toml` in
//! the working directory is tried, then `config.toml` in the platform config
//! directory. When neither exists the built-in layout is used.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use tracegraph::{TracegraphError, config::AppConfig};

const LOCAL_CONFIG: &str = "tracegraph/config.toml";

/// Reasons a configuration file could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for TracegraphError {
    fn from(err: ConfigError) -> Self {
        TracegraphError::Config(err.to_string())
    }
}

/// Load the configuration for a run.
///
/// # Errors
///
/// Fails when `explicit_path` names a file that does not exist, or when the
/// selected file is not valid TOML or holds values the layout cannot use.
/// A missing file in one of the implicit locations is not an error.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, TracegraphError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from --config");
        return load_config_file(path);
    }

    let local_config = Path::new(LOCAL_CONFIG);
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from working directory");
        return load_config_file(local_config);
    }

    match platform_config_path() {
        Some(path) if path.exists() => {
            info!(path = path.display().to_string(); "Loading configuration from platform directory");
            return load_config_file(path);
        }
        Some(path) => {
            debug!(path = path.display().to_string(); "No configuration in platform directory");
        }
        None => debug!("Platform config directory is unknown"),
    }

    debug!("Using built-in layout configuration");
    Ok(AppConfig::default())
}

fn platform_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "tracegraph", "tracegraph")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Read, decode and validate one configuration file.
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, TracegraphError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate().map_err(ConfigError::Validation)?;

    Ok(config)
}
