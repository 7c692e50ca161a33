//! Configuration for runs and playback.
//!
//! This module defines the configuration structures used to parameterize the
//! trace engine. It provides:
//! 1. **Defaults:** Baseline constants (matrix size, presets, timer interval, speed bounds).
//! 2. **Structures:** `Config` with `matrix` and `playback` sections plus the selected model.
//! 3. **Loading:** JSON parsing from a string or a file.
//!
//! Every field is optional in JSON; missing fields take the values in `defaults`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::common::{Matrix, Preset, Result, SimError};
use crate::models::Model;

/// Default configuration constants.
mod defaults {
    use crate::common::Preset;

    /// Matrix dimension N used by the visualizer.
    pub const SIZE: usize = 8;

    /// Preset for both operands.
    pub const PRESET: Preset = Preset::Ones;

    /// Seed for [`Preset::Random`].
    pub const SEED: u64 = 42;

    /// Timer interval at speed 1.0, in milliseconds.
    pub const BASE_INTERVAL_MS: u64 = 1000;

    /// Initial speed multiplier.
    pub const SPEED: f64 = 1.0;

    /// Slowest accepted speed multiplier.
    pub const MIN_SPEED: f64 = 0.5;

    /// Fastest accepted speed multiplier.
    pub const MAX_SPEED: f64 = 10.0;
}

/// Root configuration.
///
/// # Examples
///
/// ```
/// use matviz_core::config::Config;
/// use matviz_core::models::Model;
///
/// let config: Config = Config::from_json(r#"{
///     "model": "Parallel",
///     "matrix": { "size": 4, "preset_a": "Identity" },
///     "playback": { "speed": 2.0 }
/// }"#).unwrap();
///
/// assert_eq!(config.model, Model::Parallel);
/// assert_eq!(config.matrix.size, 4);
/// assert_eq!(config.playback.base_interval_ms, 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Execution model to simulate.
    #[serde(default)]
    pub model: Model,
    /// Operand settings.
    #[serde(default)]
    pub matrix: MatrixConfig,
    /// Playback timer settings.
    #[serde(default)]
    pub playback: PlaybackConfig,
}

impl Config {
    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] for malformed JSON or unknown enum values.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be read and
    /// [`SimError::Config`] if it cannot be parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Operand generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixConfig {
    /// Dimension N of both operands.
    #[serde(default = "MatrixConfig::default_size")]
    pub size: usize,

    /// Pattern for operand A.
    #[serde(default = "MatrixConfig::default_preset")]
    pub preset_a: Preset,

    /// Pattern for operand B.
    #[serde(default = "MatrixConfig::default_preset")]
    pub preset_b: Preset,

    /// Seed for random operands; B uses `seed + 1` so the two differ.
    #[serde(default = "MatrixConfig::default_seed")]
    pub seed: u64,
}

impl MatrixConfig {
    /// Returns the default matrix dimension.
    const fn default_size() -> usize {
        defaults::SIZE
    }

    /// Returns the default operand preset.
    const fn default_preset() -> Preset {
        defaults::PRESET
    }

    /// Returns the default random seed.
    const fn default_seed() -> u64 {
        defaults::SEED
    }

    /// Builds the `(A, B)` operand pair described by this configuration.
    pub fn operands(&self) -> (Matrix, Matrix) {
        (
            Matrix::preset(self.preset_a, self.size, self.seed),
            Matrix::preset(self.preset_b, self.size, self.seed.wrapping_add(1)),
        )
    }
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            size: defaults::SIZE,
            preset_a: defaults::PRESET,
            preset_b: defaults::PRESET,
            seed: defaults::SEED,
        }
    }
}

/// Playback timer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Interval between ticks at speed 1.0, in milliseconds.
    #[serde(default = "PlaybackConfig::default_base_interval_ms")]
    pub base_interval_ms: u64,

    /// Initial speed multiplier.
    #[serde(default = "PlaybackConfig::default_speed")]
    pub speed: f64,

    /// Slowest accepted speed multiplier.
    #[serde(default = "PlaybackConfig::default_min_speed")]
    pub min_speed: f64,

    /// Fastest accepted speed multiplier.
    #[serde(default = "PlaybackConfig::default_max_speed")]
    pub max_speed: f64,
}

impl PlaybackConfig {
    /// Returns the default base interval.
    const fn default_base_interval_ms() -> u64 {
        defaults::BASE_INTERVAL_MS
    }

    /// Returns the default speed multiplier.
    const fn default_speed() -> f64 {
        defaults::SPEED
    }

    /// Returns the default lower speed bound.
    const fn default_min_speed() -> f64 {
        defaults::MIN_SPEED
    }

    /// Returns the default upper speed bound.
    const fn default_max_speed() -> f64 {
        defaults::MAX_SPEED
    }

    /// Interval at speed 1.0.
    pub const fn base_interval(&self) -> Duration {
        Duration::from_millis(self.base_interval_ms)
    }

    /// Checks `speed` against `[min_speed, max_speed]`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::SpeedOutOfRange`] for values outside the bounds or NaN.
    pub fn validate_speed(&self, speed: f64) -> Result<f64> {
        if speed.is_finite() && speed >= self.min_speed && speed <= self.max_speed {
            Ok(speed)
        } else {
            Err(SimError::SpeedOutOfRange {
                value: speed,
                min: self.min_speed,
                max: self.max_speed,
            })
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: defaults::BASE_INTERVAL_MS,
            speed: defaults::SPEED,
            min_speed: defaults::MIN_SPEED,
            max_speed: defaults::MAX_SPEED,
        }
    }
}
