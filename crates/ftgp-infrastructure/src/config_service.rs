//! Configuration service implementation.
//!
//! Loads [`FtgpConfig`] from a TOML file, by default
//! `~/.config/ftgp/config.toml`.

use ftgp_core::config::FtgpConfig;
use ftgp_core::error::{FtgpError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Configuration service that loads and caches the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<FtgpConfig>>>,
}

impl ConfigService {
    /// Creates a service reading from `path`. Nothing is read until first access.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a service for the platform config directory.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(Self::default_path()?))
    }

    /// `<config_dir>/ftgp/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("ftgp").join("config.toml"))
            .ok_or_else(|| FtgpError::config("Cannot find config directory"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<FtgpConfig> {
        if let Some(cached) = self
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Ok(cached.clone());
        }

        let loaded = self.load()?;
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Some(loaded.clone());
        Ok(loaded)
    }

    /// Reads the file. A missing or empty file yields the defaults.
    fn load(&self) -> Result<FtgpConfig> {
        if !self.path.exists() {
            tracing::debug!(
                "[ConfigService] No config at {:?}, using defaults",
                self.path
            );
            return Ok(FtgpConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(FtgpConfig::default());
        }

        let config = FtgpConfig::from_toml_str(&content)?;
        tracing::info!("[ConfigService] Loaded config from {:?}", self.path);
        Ok(config)
    }

    /// Validates and writes `config`, creating parent directories as needed.
    pub fn save(&self, config: &FtgpConfig) -> Result<()> {
        config.validate()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, config.to_toml_string()?)?;
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Some(config.clone());
        tracing::info!("[ConfigService] Saved config to {:?}", self.path);
        Ok(())
    }
}
