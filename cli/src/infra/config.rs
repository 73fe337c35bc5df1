//! YAML configuration file loading.

use std::path::{Path, PathBuf};

use crate::domain::config::DiscoveryConfig;
use crate::domain::error::ConfigError;

/// Environment variable overriding the configuration path.
pub const CONFIG_ENV: &str = "DISCOVERY_CONFIG";

/// Default file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Reads `config.yaml` (or the file named by `--config` / `DISCOVERY_CONFIG`).
pub struct YamlConfigStore {
    path: PathBuf,
}

impl YamlConfigStore {
    /// `--config` wins over the environment, which wins over the default.
    #[must_use]
    pub fn new(cli_path: Option<&Path>) -> Self {
        let path = cli_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file. Validation happens later, in `resolve`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or is not YAML.
    pub fn load(&self) -> Result<DiscoveryConfig, ConfigError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError {
            problems: vec![format!("cannot read {}: {e}", self.path.display())],
        })?;
        if content.trim().is_empty() {
            return Ok(DiscoveryConfig::default());
        }
        serde_yaml::from_str(&content).map_err(|e| ConfigError {
            problems: vec![format!("cannot parse {}: {e}", self.path.display())],
        })
    }
}
