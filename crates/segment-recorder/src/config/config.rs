//! Configuration management for segment-recorder.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, lazy validation, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{
        CaptureSettings, DriverConfig, LoggingConfig, MergeConfig, MergeStrategy, RecordingConfig,
    },
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Main configuration struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Output locations.
    pub recording: RecordingConfig,
    /// Capture parameters.
    #[serde(default)]
    pub capture: CaptureSettings,
    /// External encoder process.
    #[serde(default)]
    pub driver: DriverConfig,
    /// Segment merge strategy.
    #[serde(default)]
    pub merge: MergeConfig,
    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from `path`, or from the platform config dir when
    /// `path` is `None`. A missing file is created with defaults.
    ///
    /// Note: This does NOT validate the driver or capture settings. Call
    /// `validate()` before building a session.
    #[track_caller]
    pub fn load(path: Option<PathBuf>) -> AppResult<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_path()?,
        };
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, creating a default file if
    /// none exists.
    #[track_caller]
    pub fn load_from(config_path: &Path) -> AppResult<Self> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path).map_err(|e| AppError::ConfigError {
                reason: format!("Failed to read config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

            let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
                reason: format!("Failed to parse config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

            Ok(config)
        } else {
            let config = Self::defaults_for(&Self::data_dir()?);
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    /// Default configuration rooted at `data_dir`.
    pub fn defaults_for(data_dir: &Path) -> Self {
        Config {
            recording: RecordingConfig {
                target_path: data_dir.join("recordings").join("recording.ts"),
                scratch_dir: None,
                session_id: None,
            },
            capture: CaptureSettings::default(),
            driver: DriverConfig::default(),
            merge: MergeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validate the settings a session needs before it can record.
    ///
    /// Kept separate from loading so a broken driver section can be fixed
    /// in the file without the app refusing to read it.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn validate(&self) -> AppResult<()> {
        self.capture.to_capture_config()?;

        if self.driver.program.trim().is_empty() {
            return Err(AppError::ConfigError {
                reason: "[driver] program must not be empty".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.merge.strategy == MergeStrategy::Command
            && self
                .merge
                .program
                .as_deref()
                .is_none_or(|p| p.trim().is_empty())
        {
            return Err(AppError::ConfigError {
                reason: "[merge] strategy \"command\" requires a program".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.recording.target_path.as_os_str().is_empty() {
            return Err(AppError::ConfigError {
                reason: "[recording] target_path must not be empty".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }

    /// Scratch directory for in-progress segments.
    #[track_caller]
    pub fn scratch_dir(&self) -> AppResult<PathBuf> {
        match &self.recording.scratch_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.cache_dir().join("segments")),
        }
    }

    /// Save configuration to `config_path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if let Some(config_dir) = config_path.parent().filter(|d| !d.exists()) {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        // Atomic write: write to temp file then rename
        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    #[track_caller]
    fn data_dir() -> AppResult<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "segment-recorder", "Segment-Recorder").ok_or_else(|| {
            AppError::ConfigError {
                reason: "Failed to get project directories".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }
}
