// SPDX-License-Identifier: MPL-2.0
//! This module handles the persisted webcam preferences, stored in a
//! `settings.toml` file.
//!
//! # Configuration Sections
//!
//! - `[capture]` - Audio toggle and preferred device identifiers
//! - `[display]` - Mirroring, rotation, muting and rendered size
//! - `[snapshot]` - Screenshot format, JPEG quality and output directory
//!
//! # Path Resolution
//!
//! 1. Use `load_from_path()`/`save_to_path()` with explicit path
//! 2. Set `ICED_WEBCAM_CONFIG_DIR` environment variable
//! 3. Falls back to platform-specific config directory
//!
//! # Examples
//!
//! ```no_run
//! use iced_webcam::config::{self, Config};
//! use iced_webcam::media::RotateMode;
//!
//! let (mut config, _warning) = config::load();
//! config.display.rotate = RotateMode::Left;
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use crate::media::{RotateMode, ScreenshotFormat};
use crate::ui::webcam::Dimension;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "IcedWebcam";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "ICED_WEBCAM_CONFIG_DIR";

// =============================================================================
// Section Structs
// =============================================================================

/// Capture request settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureConfig {
    /// Request a microphone track alongside the camera.
    #[serde(default = "default_true")]
    pub audio: bool,

    /// Preferred microphone device identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_source: Option<String>,

    /// Preferred camera device identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_source: Option<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            audio: true,
            audio_source: None,
            video_source: None,
        }
    }
}

/// Preview settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    #[serde(default)]
    pub mirror: bool,

    #[serde(default)]
    pub rotate: RotateMode,

    #[serde(default)]
    pub muted: bool,

    #[serde(default = "default_width")]
    pub width: Dimension,

    #[serde(default = "default_height")]
    pub height: Dimension,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            mirror: false,
            rotate: RotateMode::None,
            muted: false,
            width: default_width(),
            height: default_height(),
        }
    }
}

/// Screenshot settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotConfig {
    #[serde(default)]
    pub format: ScreenshotFormat,

    /// JPEG quality (1-100). Ignored by the lossless formats.
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Where the demo application writes saved snapshots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            format: ScreenshotFormat::default(),
            quality: DEFAULT_JPEG_QUALITY,
            output_dir: None,
        }
    }
}

/// Webcam configuration with logical sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

impl Config {
    /// JPEG quality clamped to the supported range.
    #[must_use]
    pub fn snapshot_quality(&self) -> u8 {
        self.snapshot.quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
    }
}

fn default_true() -> bool {
    true
}

fn default_width() -> Dimension {
    Dimension::Pixels(DEFAULT_WIDTH)
}

fn default_height() -> Dimension {
    Dimension::Pixels(DEFAULT_HEIGHT)
}

fn default_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

// =============================================================================
// Config Path Resolution
// =============================================================================

fn get_config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    let dir = base_dir
        .or_else(|| std::env::var_os(ENV_CONFIG_DIR).map(PathBuf::from))
        .or_else(|| {
            dirs::config_dir().map(|mut path| {
                path.push(APP_NAME);
                path
            })
        })?;
    Some(dir.join(CONFIG_FILE))
}

// =============================================================================
// Load / Save
// =============================================================================

/// Loads the configuration from the default path.
///
/// Returns a tuple of (config, optional_warning). An unreadable or invalid
/// file yields the defaults together with a warning describing the problem.
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

/// Loads the configuration from a custom directory.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = get_config_path_with_override(base_dir) {
        if path.exists() {
            match load_from_path(&path) {
                Ok(config) => return (config, None),
                Err(err) => {
                    return (
                        Config::default(),
                        Some(format!("{}: {}", path.display(), err)),
                    );
                }
            }
        }
    }
    (Config::default(), None)
}

/// Loads configuration from a specific path.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Saves the configuration to the default path.
pub fn save(config: &Config) -> Result<()> {
    save_with_override(config, None)
}

/// Saves the configuration to a custom directory.
pub fn save_with_override(config: &Config, base_dir: Option<PathBuf>) -> Result<()> {
    if let Some(path) = get_config_path_with_override(base_dir) {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Saves configuration to a specific path.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).map_err(Error::from)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip_preserves_settings() {
        let config = Config {
            capture: CaptureConfig {
                audio: false,
                audio_source: None,
                video_source: Some("cam-2".to_string()),
            },
            display: DisplayConfig {
                mirror: true,
                rotate: RotateMode::Right,
                muted: true,
                width: Dimension::Css("100%".to_string()),
                height: Dimension::Pixels(360),
            },
            snapshot: SnapshotConfig {
                format: ScreenshotFormat::Jpeg,
                quality: 80,
                output_dir: Some(PathBuf::from("/tmp/snaps")),
            },
        };
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        save_to_path(&config, &config_path).expect("failed to save config");
        let loaded = load_from_path(&config_path).expect("failed to load config");

        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "[display]\nmirror = true\n").expect("failed to write toml");

        let loaded = load_from_path(&config_path).expect("load should succeed");
        assert!(loaded.display.mirror);
        assert_eq!(loaded.display.rotate, RotateMode::None);
        assert!(loaded.capture.audio);
        assert_eq!(loaded.snapshot.format, ScreenshotFormat::WebP);
        assert_eq!(loaded.snapshot.quality, DEFAULT_JPEG_QUALITY);
    }

    #[test]
    fn invalid_toml_is_reported_by_load_with_override() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        fs::write(temp_dir.path().join(CONFIG_FILE), "not = valid = toml")
            .expect("failed to write invalid toml");

        let (config, warning) = load_with_override(Some(temp_dir.path().to_path_buf()));
        assert_eq!(config, Config::default());
        assert!(warning.is_some());
    }

    #[test]
    fn load_with_override_without_file_returns_defaults_silently() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let (config, warning) = load_with_override(Some(temp_dir.path().to_path_buf()));
        assert_eq!(config, Config::default());
        assert!(warning.is_none());
    }

    #[test]
    fn save_with_override_creates_parent_directories() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let base = temp_dir.path().join("deep").join("path");

        save_with_override(&Config::default(), Some(base.clone()))
            .expect("save should create directories");
        assert!(base.join(CONFIG_FILE).exists());
    }

    #[test]
    fn rotate_accepts_lowercase_names() {
        let config: Config = toml::from_str("[display]\nrotate = \"left\"\n").expect("valid toml");
        assert_eq!(config.display.rotate, RotateMode::Left);
    }

    #[test]
    fn snapshot_quality_is_clamped() {
        let mut config = Config::default();
        config.snapshot.quality = 0;
        assert_eq!(config.snapshot_quality(), MIN_JPEG_QUALITY);
        config.snapshot.quality = 250;
        assert_eq!(config.snapshot_quality(), MAX_JPEG_QUALITY);
    }
}
