use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::config::{path_display, Config, ConfigError};

#[derive(Debug)]
pub enum InitError {
    AlreadyExists(PathBuf),
    Config(ConfigError),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::AlreadyExists(path) => write!(
                f,
                "Configuration file {} already exists. Use `rpchat init --force` to overwrite it.",
                path_display(path)
            ),
            InitError::Config(err) => write!(f, "{err}"),
        }
    }
}

impl Error for InitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            InitError::AlreadyExists(_) => None,
            InitError::Config(err) => Some(err),
        }
    }
}

impl From<ConfigError> for InitError {
    fn from(err: ConfigError) -> Self {
        InitError::Config(err)
    }
}

/// Write [`Config::starter`] to `config_path`. An existing file is only
/// replaced when `force` is set.
pub fn write_starter_config(config_path: &Path, force: bool) -> Result<(), InitError> {
    if config_path.exists() && !force {
        return Err(InitError::AlreadyExists(config_path.to_path_buf()));
    }
    Config::starter().save_to_path(config_path)?;
    Ok(())
}
