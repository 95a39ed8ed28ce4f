//! # Configuration Module
//!
//! Tunable constants of the wheel, loaded from an optional JSON file.
//! Every field has a default, so a file only needs the values it overrides.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::rotation::{DEFAULT_DRAG_THRESHOLD, WheelGeometry};
use crate::synth::Envelope;

/// Environment variable naming the JSON configuration file.
pub const CONFIG_ENV_VAR: &str = "SCALE_WHEEL_CONFIG";

/// Complete configuration of the wheel and its synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    pub geometry: WheelGeometry,
    /// Per-event pointer movement (degrees) that turns a click into a drag.
    pub drag_threshold_degrees: f64,
    /// Length of eased transitions in milliseconds.
    pub animation_millis: u64,
    /// How long a clicked note is held, in seconds.
    pub note_seconds: f32,
    /// How long a chord is held, in seconds.
    pub chord_seconds: f32,
    pub envelope: Envelope,
    /// Output gain applied to the mix of all voices.
    pub master_gain: f32,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            geometry: WheelGeometry::default(),
            drag_threshold_degrees: DEFAULT_DRAG_THRESHOLD,
            animation_millis: 200,
            note_seconds: 0.5,
            chord_seconds: 0.8,
            envelope: Envelope::default(),
            master_gain: 0.2,
        }
    }
}

impl WheelConfig {
    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_millis)
    }

    /// Parses a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid wheel configuration")
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Arguments
    /// * `path` - File path to load the configuration from
    ///
    /// # Returns
    /// * `Ok(WheelConfig)` - Parsed configuration, defaults filled in
    /// * `Err(e)` - File I/O or JSON error
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)
            .with_context(|| format!("Cannot open config file {}", path.display()))?;
        let mut data = String::new();
        file.read_to_string(&mut data)?;
        Self::from_json_str(&data).with_context(|| format!("While reading {}", path.display()))
    }

    /// Loads the file named by [`CONFIG_ENV_VAR`], or returns the defaults
    /// when the variable is unset. A file that cannot be read is logged and
    /// the defaults are used instead.
    pub fn from_env() -> Self {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => match Self::load(&path) {
                Ok(config) => {
                    log::info!("[CONFIG] Loaded {}", Path::new(&path).display());
                    config
                }
                Err(e) => {
                    log::error!("[CONFIG] {:#}. Using defaults.", e);
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_the_default() {
        let config = WheelConfig::from_json_str("{}").unwrap();
        assert_eq!(config, WheelConfig::default());
        assert_eq!(config.animation_duration(), Duration::from_millis(200));
        assert_eq!(config.drag_threshold_degrees, 0.5);
    }

    #[test]
    fn partial_overrides_keep_other_defaults() {
        let config = WheelConfig::from_json_str(
            r#"{ "animation_millis": 350, "geometry": { "long_radius": 250.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.animation_millis, 350);
        assert_eq!(config.geometry.long_radius, 250.0);
        assert_eq!(config.geometry.short_radius, 160.0);
        assert_eq!(config.note_seconds, 0.5);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = WheelConfig::from_json_str("{ \"animation_millis\": \"slow\" }").unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid wheel configuration"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(WheelConfig::load("/definitely/not/here/wheel.json").is_err());
    }
}
