//! Configuration Management
//!
//! This module handles locating and loading the Codelens configuration:
//! - Explicit configuration files
//! - Automatic discovery of `codelens.toml`
//! - Environment variable overrides
//! - Writing a starter configuration

use codelens_shared::{CodelensConfig, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

const CONFIG_FILE_NAME: &str = "codelens.toml";

/// Configuration manager for Codelens
#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// Current configuration
    config: CodelensConfig,

    /// File the configuration was loaded from, if any
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new(config: CodelensConfig) -> Self {
        Self {
            config,
            config_path: None,
        }
    }

    /// Load an explicit file when given, otherwise discover one
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path).await,
            None => Self::auto_discover().await,
        }
    }

    /// Create configuration manager from file
    #[instrument]
    pub async fn from_file<P: AsRef<Path> + std::fmt::Debug>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let config = if path.exists() {
            CodelensConfig::load_from_file(path)?
        } else {
            warn!("Configuration file not found, using defaults");
            CodelensConfig::load_with_env()?
        };

        Ok(Self {
            config,
            config_path: Some(path.to_path_buf()),
        })
    }

    /// Create with automatic configuration discovery
    #[instrument]
    pub async fn auto_discover() -> Result<Self> {
        Self::discover_in(&Self::get_config_search_paths()).await
    }

    /// First existing file among `candidates` wins; none means env over defaults
    async fn discover_in(candidates: &[PathBuf]) -> Result<Self> {
        for path in candidates {
            if path.exists() {
                debug!("Found configuration at: {}", path.display());
                return Self::from_file(path).await;
            }
        }

        debug!("No configuration file found, using defaults with environment overrides");
        Ok(Self::new(CodelensConfig::load_with_env()?))
    }

    /// Current configuration
    pub fn config(&self) -> &CodelensConfig {
        &self.config
    }

    /// Consume the manager, keeping the configuration
    pub fn into_config(self) -> CodelensConfig {
        self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Save current configuration to file
    #[instrument(skip(self))]
    pub async fn save_to_file<P: AsRef<Path> + std::fmt::Debug>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        debug!("Saving configuration to: {}", path.display());

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        self.config.save_to_file(path)?;

        info!("Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Get configuration search paths
    fn get_config_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".").join(CONFIG_FILE_NAME),
            PathBuf::from("./config").join(CONFIG_FILE_NAME),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("codelens").join(CONFIG_FILE_NAME));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".codelens.toml"));
        }

        paths
    }

    /// Where `config init` writes when no path is given
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("codelens").join(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_discovery_picks_first_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        let present = temp_dir.path().join("codelens.toml");
        std::fs::write(&present, "[complexity]\nlow_max = 2.0\nmedium_max = 6.0\n").unwrap();

        let manager = ConfigManager::discover_in(&[missing, present.clone()])
            .await
            .unwrap();

        assert_eq!(manager.config().complexity.low_max, 2.0);
        assert_eq!(manager.config().complexity.medium_max, 6.0);
        assert_eq!(manager.config_path(), Some(present.as_path()));
    }

    #[tokio::test]
    async fn test_discovery_without_files_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::discover_in(&[temp_dir.path().join("nope.toml")])
            .await
            .unwrap();

        assert!(manager.config_path().is_none());
        assert_eq!(manager.config().profile.long_function_lines, 50);
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("codelens.toml");

        let mut config = CodelensConfig::default();
        config.profile.debug_log_max = 25;
        let manager = ConfigManager::new(config);
        manager.save_to_file(&path).await.unwrap();

        let reloaded = ConfigManager::load(Some(path.as_path())).await.unwrap();
        assert_eq!(reloaded.config().profile.debug_log_max, 25);
    }

    #[tokio::test]
    async fn test_invalid_file_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("codelens.toml");
        std::fs::write(&path, "[complexity]\nlow_max = 9.0\nmedium_max = 1.0\n").unwrap();

        assert!(ConfigManager::from_file(&path).await.is_err());
    }
}
