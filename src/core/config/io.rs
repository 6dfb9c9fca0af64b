use crate::core::config::data::{path_display, Config};
use directories::ProjectDirs;
use std::collections::HashSet;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Errors that can occur when loading or writing configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// No configuration file exists at the expected path.
    NotFound { path: PathBuf },

    /// Failed to read the configuration file from disk.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse the configuration file as valid TOML.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Failed to write the configuration file.
    Write {
        path: PathBuf,
        source: Box<dyn StdError + Send + Sync>,
    },

    /// Two scenarios share the same name.
    DuplicateScenario { path: PathBuf, name: String },

    /// The platform has no usable configuration directory.
    NoConfigDir,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NotFound { path } => write!(
                f,
                "No config found at {}. Run `rpchat init` to create one.",
                path_display(path)
            ),
            ConfigError::Read { path, source } => {
                write!(
                    f,
                    "Failed to read config at {}: {}",
                    path_display(path),
                    source
                )
            }
            ConfigError::Parse { path, source } => {
                write!(
                    f,
                    "Failed to parse config at {}: {}",
                    path_display(path),
                    source
                )
            }
            ConfigError::Write { path, source } => {
                write!(
                    f,
                    "Failed to write config at {}: {}",
                    path_display(path),
                    source
                )
            }
            ConfigError::DuplicateScenario { path, name } => write!(
                f,
                "Scenario '{}' is defined more than once in {}",
                name,
                path_display(path)
            ),
            ConfigError::NoConfigDir => {
                write!(f, "Failed to determine config directory; pass --config")
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Write { source, .. } => Some(source.as_ref()),
            ConfigError::NotFound { .. }
            | ConfigError::DuplicateScenario { .. }
            | ConfigError::NoConfigDir => None,
        }
    }
}

impl Config {
    pub fn load_from_path(config_path: &Path) -> Result<Config, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::NotFound {
                path: config_path.to_path_buf(),
            });
        }

        let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })?;

        let mut seen = HashSet::new();
        if let Some(duplicate) = config
            .scenarios
            .iter()
            .find(|scenario| !seen.insert(scenario.name.as_str()))
        {
            return Err(ConfigError::DuplicateScenario {
                path: config_path.to_path_buf(),
                name: duplicate.name.clone(),
            });
        }
        Ok(config)
    }

    pub fn save_to_path(&self, config_path: &Path) -> Result<(), ConfigError> {
        self.write_atomically(config_path)
            .map_err(|source| ConfigError::Write {
                path: config_path.to_path_buf(),
                source,
            })
    }

    fn write_atomically(
        &self,
        config_path: &Path,
    ) -> Result<(), Box<dyn StdError + Send + Sync>> {
        let parent = config_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty());

        if let Some(dir) = parent {
            fs::create_dir_all(dir)?;
        }

        let contents = toml::to_string_pretty(self)?;
        let mut temp_file = match parent {
            Some(dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new()?,
        };

        temp_file.write_all(contents.as_bytes())?;
        temp_file.as_file_mut().sync_all()?;
        temp_file.persist(config_path)?;
        Ok(())
    }

    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let proj_dirs =
            ProjectDirs::from("org", "rpchat", "rpchat").ok_or(ConfigError::NoConfigDir)?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}
