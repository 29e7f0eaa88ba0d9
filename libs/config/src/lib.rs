//! Runtime configuration
//!
//! TOML-backed settings for a Tarn process. Every field has a default tuned
//! for a 60 Hz local session, so an empty file (or no file at all) yields a
//! working configuration; `validate()` catches values that would misbehave
//! at runtime rather than letting them surface as frame glitches later.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Baseline values used by the `Default` impls and profile constructors
pub mod defaults {
    /// Machine name when none is configured
    pub const MACHINE_NAME: &str = "tarn-local";
    /// Simulation seconds per real second
    pub const TIME_SCALE: f32 = 1.0;
    /// Bound on the cross-thread message inlet
    pub const INLET_CAPACITY: usize = 1024;
    /// Target frame rate for drivers, frames per second
    pub const FRAME_RATE_HZ: f64 = 60.0;
    /// Frame rate for headless servers, frames per second
    pub const HEADLESS_FRAME_RATE_HZ: f64 = 30.0;
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(String),

    #[error("failed to parse config file: {0}")]
    Parse(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub frame: FrameSettings,
}

/// Settings consumed by the GameManager itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Human-readable name for this runtime process
    #[serde(default = "default_machine_name")]
    pub machine_name: String,
    /// Simulation seconds advanced per real second
    #[serde(default = "default_time_scale")]
    pub time_scale: f32,
    /// Capacity of the bounded cross-thread message inlet
    #[serde(default = "default_inlet_capacity")]
    pub inlet_capacity: usize,
}

/// Settings consumed by frame drivers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSettings {
    /// Target frame rate, frames per second
    #[serde(default = "default_frame_rate")]
    pub rate_hz: f64,
}

fn default_machine_name() -> String {
    defaults::MACHINE_NAME.to_string()
}

fn default_time_scale() -> f32 {
    defaults::TIME_SCALE
}

fn default_inlet_capacity() -> usize {
    defaults::INLET_CAPACITY
}

fn default_frame_rate() -> f64 {
    defaults::FRAME_RATE_HZ
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            machine_name: default_machine_name(),
            time_scale: defaults::TIME_SCALE,
            inlet_capacity: defaults::INLET_CAPACITY,
        }
    }
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            rate_hz: defaults::FRAME_RATE_HZ,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            engine: EngineSettings::default(),
            frame: FrameSettings::default(),
        }
    }
}

impl RuntimeConfig {
    /// Configuration for an interactive local session (60 Hz)
    pub fn local_session() -> Self {
        Self::default()
    }

    /// Configuration for a headless server process (30 Hz, server name)
    pub fn headless_server() -> Self {
        Self {
            engine: EngineSettings {
                machine_name: "tarn-server".to_string(),
                ..EngineSettings::default()
            },
            frame: FrameSettings {
                rate_hz: defaults::HEADLESS_FRAME_RATE_HZ,
            },
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: Self =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded runtime config");
        Ok(config)
    }

    /// Check every field for values the runtime cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.machine_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "engine.machine_name must not be empty".to_string(),
            ));
        }
        if !self.engine.time_scale.is_finite() || self.engine.time_scale <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "engine.time_scale must be a positive finite number, got {}",
                self.engine.time_scale
            )));
        }
        if self.engine.inlet_capacity == 0 {
            return Err(ConfigError::Invalid(
                "engine.inlet_capacity must be at least 1".to_string(),
            ));
        }
        if !self.frame.rate_hz.is_finite() || self.frame.rate_hz <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "frame.rate_hz must be a positive finite number, got {}",
                self.frame.rate_hz
            )));
        }
        Ok(())
    }
}
