//! src/config.rs
//! ============================================================================
//! # Config: slot limits, diagnostics and logging settings
//!
//! Loads and saves settings as TOML from the platform config directory
//! resolved through [`directories`](https://docs.rs/directories). A missing
//! file is created with defaults on first load.
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! let mut table = EventTable::<&str, u32>::with_limits(config.slot.limits());
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs as TokioFs;
use tracing::info;

use crate::error::AppError;
use crate::logging::LoggerConfig;
use crate::registry::RemovePolicy;
use crate::sink::{SinkLevel, TracingSink};
use crate::slot::SlotLimits;

/// Limits and defaults applied to slots created from config.
///
/// TOML has no null, so an unbounded slot is written as a missing
/// `max_units` key and read back the same way.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    /// Maximum handlers per slot, duplicates included. Absent = unbounded.
    pub max_units: Option<usize>,

    /// Policy used when an owner removes without choosing one.
    pub remove_policy: RemovePolicy,
}

impl SlotConfig {
    pub fn limits(&self) -> SlotLimits {
        SlotLimits {
            max_units: self.max_units,
        }
    }
}

/// Where slot diagnostics go when the owner uses the configured sink.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub level: SinkLevel,
}

impl SinkConfig {
    pub fn tracing_sink(&self) -> TracingSink {
        TracingSink::new(self.level)
    }
}

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub slot: SlotConfig,

    pub sink: SinkConfig,

    pub logging: LoggerConfig,
}

impl Config {
    /// Loads config from the platform config dir, creating it with defaults
    /// when absent.
    ///
    /// The config is expected at `$XDG_CONFIG_HOME/hookslot/config.toml`
    /// (Linux), or equivalent on Windows/macOS.
    pub async fn load() -> Result<Self, AppError> {
        let path = Self::config_path()?;
        Self::load_from_path(&path).await
    }

    pub async fn save(&self) -> Result<(), AppError> {
        let path = Self::config_path()?;
        self.save_to_path(&path).await
    }

    pub async fn load_from_path(path: &Path) -> Result<Self, AppError> {
        if TokioFs::try_exists(path)
            .await
            .map_err(|e| AppError::config_io(path, e))?
        {
            info!("Loading config from {}", path.display());
            let text = TokioFs::read_to_string(path)
                .await
                .map_err(|e| AppError::config_io(path, e))?;

            Ok(toml::from_str(&text)?)
        } else {
            info!(
                "No config file found at {}, creating it with defaults",
                path.display()
            );

            let default_config = Self::default();
            default_config.save_to_path(path).await?;

            Ok(default_config)
        }
    }

    pub async fn save_to_path(&self, path: &Path) -> Result<(), AppError> {
        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::config_io(parent, e))?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        TokioFs::write(path, toml_str)
            .await
            .map_err(|e| AppError::config_io(path, e))?;

        Ok(())
    }

    /// Canonical config file path.
    pub fn config_path() -> Result<PathBuf, AppError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn config_dir() -> Result<PathBuf, AppError> {
        let proj_dirs = ProjectDirs::from("org", "hookslot", "hookslot")
            .ok_or(AppError::ConfigDirUnavailable)?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }
}
