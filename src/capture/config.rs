//! Capture and pipeline configuration.
//!
//! Presets and orientation are fixed per run. The device inventory for the
//! simulated backend is part of the file so demos can model different
//! handsets.

use super::backend::SessionPreset;
use super::device::{Device, DeviceType, Dimensions, Position, StaticDirectory};
use super::frame::Orientation;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration of the capture graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Preset used when the session supports it.
    pub preferred_preset: SessionPreset,
    /// Preset used otherwise.
    pub fallback_preset: SessionPreset,
    /// Frames per second delivered by the simulated producer.
    pub fps: u32,
    /// Orientation forced on every connection.
    pub orientation: Orientation,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            preferred_preset: SessionPreset::Hd1920x1080,
            fallback_preset: SessionPreset::Photo,
            fps: 30,
            orientation: Orientation::Portrait,
        }
    }
}

impl CaptureConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 || self.fps > 120 {
            return Err(ConfigError::InvalidFrameRate);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid frame rate (must be 1-120 fps)")]
    InvalidFrameRate,
    #[error("invalid noir contrast (must be in (0, 4])")]
    InvalidContrast,
    #[error("device {0} has zero-sized frames")]
    InvalidDevice(String),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Noir filter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Contrast multiplier applied around mid-grey.
    pub contrast: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { contrast: 1.35 }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Run until interrupted (true) or for a fixed number of frames (false).
    pub continuous: bool,
    /// Number of frames to render if not continuous.
    pub frame_count: u32,
    /// Metrics server port (0 to disable).
    pub metrics_port: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            continuous: false,
            frame_count: 90,
            metrics_port: 9090,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// A simulated device entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSpec {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub position: Position,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub width: u32,
    pub height: u32,
}

impl DeviceSpec {
    pub fn to_device(&self) -> Device {
        let mut device = Device::new(
            self.id.clone(),
            self.position,
            self.device_type,
            Dimensions::new(self.width, self.height),
        );
        if let Some(name) = &self.name {
            device.name = name.clone();
        }
        device
    }
}

fn default_devices() -> Vec<DeviceSpec> {
    StaticDirectory::handset()
        .devices()
        .iter()
        .map(|d| DeviceSpec {
            id: d.id.clone(),
            name: None,
            position: d.position,
            device_type: d.device_type,
            width: d.dimensions.width,
            height: d.dimensions.height,
        })
        .collect()
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "default_devices")]
    pub devices: Vec<DeviceSpec>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            filter: FilterConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
            devices: default_devices(),
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capture.validate()?;
        if !(self.filter.contrast > 0.0 && self.filter.contrast <= 4.0) {
            return Err(ConfigError::InvalidContrast);
        }
        if let Some(bad) = self.devices.iter().find(|d| d.width == 0 || d.height == 0) {
            return Err(ConfigError::InvalidDevice(bad.id.clone()));
        }
        Ok(())
    }

    /// Builds the device directory described by `[[devices]]`.
    pub fn directory(&self) -> StaticDirectory {
        StaticDirectory::new(self.devices.iter().map(DeviceSpec::to_device).collect())
    }
}
