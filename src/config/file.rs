//! Configuration file management for specbars.
//!
//! This module handles loading and saving application configuration from TOML files.
//! Configuration is stored in the user's config directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisSettings, CalibrationPolicy, SlicePolicy};

/// Audio input configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `specbars list-devices`
    /// - device name from `specbars list-devices`
    #[serde(default = "default_device")]
    pub device: String,
    /// Capture sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Longest wait for audio before giving up, in milliseconds
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

/// Frame, transform and calibration constants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Samples read per frame
    #[serde(default = "default_frame_size")]
    pub frame_size: usize,
    /// Transform length (at most frame_size)
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,
    /// Displayed bins including the hidden DC bin (at most fft_size / 2)
    #[serde(default = "default_nb_bins")]
    pub nb_bins: usize,
    /// Learning steps before the display range freezes
    #[serde(default = "default_calibration_steps")]
    pub calibration_steps: u64,
    /// "per-value" counts every bin value, "per-frame" counts whole frames
    #[serde(default)]
    pub calibration_policy: CalibrationPolicy,
    /// Which part of a larger frame is transformed: "leading" or "trailing"
    #[serde(default)]
    pub slice_policy: SlicePolicy,
}

/// Terminal display configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    /// Character columns of a full-scale bar
    #[serde(default = "default_width")]
    pub width: usize,
}

fn default_device() -> String {
    "default".to_string()
}

fn default_sample_rate() -> u32 {
    11025
}

fn default_read_timeout_ms() -> u64 {
    2000
}

fn default_frame_size() -> usize {
    1024
}

fn default_fft_size() -> usize {
    64
}

fn default_nb_bins() -> usize {
    32
}

fn default_calibration_steps() -> u64 {
    10
}

fn default_width() -> usize {
    80
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            sample_rate: default_sample_rate(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_size: default_frame_size(),
            fft_size: default_fft_size(),
            nb_bins: default_nb_bins(),
            calibration_steps: default_calibration_steps(),
            calibration_policy: CalibrationPolicy::default(),
            slice_policy: SlicePolicy::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SpecbarsConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl SpecbarsConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// Returns defaults when the file does not exist.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Loads configuration from `path`, or defaults if it does not exist.
    ///
    /// # Errors
    /// - If the file exists but cannot be read or parsed
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        tracing::debug!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    /// - If the TOML is malformed or has wrongly typed values
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serializes the configuration as pretty TOML.
    ///
    /// # Errors
    /// - If serialization fails
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Writes the configuration to `path`, creating parent directories.
    ///
    /// # Errors
    /// - If the directory cannot be created or the file cannot be written
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Longest wait for audio on a live capture.
    ///
    /// # Errors
    /// - If `read_timeout_ms` is zero, which would time out every read
    pub fn read_timeout(&self) -> anyhow::Result<Duration> {
        if self.audio.read_timeout_ms == 0 {
            anyhow::bail!("Invalid audio configuration: read_timeout_ms must be greater than zero");
        }
        Ok(Duration::from_millis(self.audio.read_timeout_ms))
    }

    /// Session constants for audio delivered at `sample_rate`.
    ///
    /// # Errors
    /// - If the configured sizes are inconsistent
    /// - If the read timeout is zero
    pub fn settings(&self, sample_rate: u32) -> anyhow::Result<AnalysisSettings> {
        self.read_timeout()?;
        let settings = AnalysisSettings {
            frame_size: self.analysis.frame_size,
            fft_size: self.analysis.fft_size,
            nb_bins: self.analysis.nb_bins,
            sample_rate,
            calibration_steps: self.analysis.calibration_steps,
            calibration_policy: self.analysis.calibration_policy,
            slice_policy: self.analysis.slice_policy,
            display_width: self.display.width,
        };
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid analysis configuration: {e}"))?;
        Ok(settings)
    }
}

/// Retrieves the path to the config file.
///
/// # Errors
/// - If the home directory cannot be determined
pub fn config_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home.join(".config").join("specbars").join("specbars.toml"))
}
