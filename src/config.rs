//! Configuration management for the tone-detection engine.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub upload_processing: UploadProcessingConfig,
    pub audio_processing: AudioProcessingConfig,
    pub stream_defaults: StreamDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::default(),
            upload_processing: UploadProcessingConfig::default(),
            audio_processing: AudioProcessingConfig::default(),
            stream_defaults: StreamDefaults::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub threshold_percent: f64,
    pub quick_call_enabled: bool,
    pub long_tone_enabled: bool,
    pub hi_low_tone_enabled: bool,
    pub dtmf_enabled: bool,
    pub len_second_tone_frames: usize,
    pub len_long_run_frames: usize,
    pub hi_low_bucket_gap_s: f64,
    pub hi_low_min_points: usize,
    pub dtmf_precision_s: f64,
    pub dtmf_freq_error_hz: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            threshold_percent: 2.0,
            quick_call_enabled: true,
            long_tone_enabled: true,
            hi_low_tone_enabled: true,
            dtmf_enabled: true,
            len_second_tone_frames: 28,
            len_long_run_frames: 15,
            hi_low_bucket_gap_s: 0.35,
            hi_low_min_points: 6,
            dtmf_precision_s: 0.04,
            dtmf_freq_error_hz: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadProcessingConfig {
    pub check_for_split: bool,
    pub maximum_split_length: f64,
    pub maximum_split_interval: f64,
    pub minimum_audio_length: f64,
}

impl Default for UploadProcessingConfig {
    fn default() -> Self {
        Self {
            check_for_split: true,
            maximum_split_length: 30.0,
            maximum_split_interval: 45.0,
            minimum_audio_length: 4.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioProcessingConfig {
    pub trim_tones: bool,
    pub trim_post_cut: f64,
    pub trim_pre_cut: f64,
    pub trim_group_tone_gap: f64,
    pub normalize: bool,
    pub ffmpeg_filter: String,
}

impl Default for AudioProcessingConfig {
    fn default() -> Self {
        Self {
            trim_tones: true,
            trim_post_cut: 5.5,
            trim_pre_cut: 2.0,
            trim_group_tone_gap: 6.5,
            normalize: true,
            ffmpeg_filter: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamDefaults {
    pub tone_tolerance_percent: f64,
    pub ignore_seconds: f64,
}

impl Default for StreamDefaults {
    fn default() -> Self {
        Self {
            tone_tolerance_percent: 2.0,
            ignore_seconds: 300.0,
        }
    }
}

impl Config {
    /// Get the path to the configuration file
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "github", "icad-tone-core")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Load configuration from disk, or return defaults if not found
    pub fn load() -> Self {
        Self::try_load().unwrap_or_default()
    }

    /// Try to load configuration from disk
    pub fn try_load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Reset to default values and save
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        *self = Self::default();
        self.save()
    }
}
