//! Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EditError, EditResult};

/// Global configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Command pipeline behaviour.
    pub pipeline: PipelineConfig,

    /// Default export parameters.
    pub export: ExportDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Command pipeline settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// What the scheduler does when a command's effect fails.
    pub failure_policy: FailurePolicy,
}

/// Policy applied when a command fails while the queue is drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failure, discard the remaining commands, and
    /// surface the error to the caller.
    #[default]
    AbortOnFirstFailure,
    /// Log the failure, record it in the drain report, and keep going.
    BestEffort,
}

/// Default export parameters.
///
/// Values are kept as plain strings/numbers here; the project model parses
/// them into typed export parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportDefaults {
    /// Export preset (e.g. "highest_quality", "1920x1080", "hevc_1920x1080").
    pub preset: String,

    /// Target frame rate.
    pub frame_rate: u32,

    /// Whether the output is arranged for progressive download.
    pub optimize_for_network: bool,

    /// Output container ("mp4", "mov", "m4v", "m4a").
    pub container: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "framecut=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for ExportDefaults {
    fn default() -> Self {
        Self {
            preset: "highest_quality".to_string(),
            frame_rate: 30,
            optimize_for_network: true,
            container: "mp4".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path, reporting any failure.
    pub fn load_from(path: impl AsRef<Path>) -> EditResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EditError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    fn validate(&self) -> EditResult<()> {
        if self.export.frame_rate == 0 {
            return Err(EditError::config("export.frame_rate must be positive"));
        }
        Ok(())
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("framecut").join("config.json")
}
