//! Configuration loading functions.

use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::error::ConfigError;
use super::types::Config;

/// Project-level config file names, in search order.
pub const CONFIG_FILENAMES: &[&str] = &[
    ".lure-scan.yaml",
    ".lure-scan.yml",
    ".lure-scan.json",
    ".lure-scan.toml",
];

impl Config {
    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.display().to_string(),
            source: e,
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let config: Self = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseYaml {
                path: path.display().to_string(),
                source: e,
            })?,
            "json" => serde_json::from_str(&content).map_err(|e| ConfigError::ParseJson {
                path: path.display().to_string(),
                source: e,
            })?,
            "toml" => toml::from_str(&content).map_err(|e| ConfigError::ParseToml {
                path: path.display().to_string(),
                source: e,
            })?,
            _ => {
                return Err(ConfigError::UnsupportedFormat(
                    path.display().to_string(),
                    ext,
                ));
            }
        };

        config.validate(path)?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        match self.disabled_modules.iter().find(|id| id.is_reserved()) {
            Some(module) => Err(ConfigError::ReservedModule {
                path: path.display().to_string(),
                module: *module,
            }),
            None => Ok(()),
        }
    }

    /// Load configuration from the project directory or global config.
    ///
    /// Search order:
    /// 1. `.lure-scan.yaml` in project root
    /// 2. `.lure-scan.yml` in project root
    /// 3. `.lure-scan.json` in project root
    /// 4. `.lure-scan.toml` in project root
    /// 5. `~/.config/lure-scan/config.yaml`
    /// 6. Default configuration
    ///
    /// A file that exists but fails to load is skipped with a warning.
    pub fn load(project_root: Option<&Path>) -> Self {
        if let Some(root) = project_root {
            for filename in CONFIG_FILENAMES {
                if let Some(config) = Self::try_load(&root.join(filename)) {
                    return config;
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let global_config = config_dir.join("lure-scan").join("config.yaml");
            if let Some(config) = Self::try_load(&global_config) {
                return config;
            }
        }

        Self::default()
    }

    fn try_load(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match Self::from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable config");
                None
            }
        }
    }
}
