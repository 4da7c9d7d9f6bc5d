// SPDX-License-Identifier: MIT OR Apache-2.0
//! Session configuration.
//!
//! Settings are stored as RON. Every field has a default, so a config file
//! only needs to name what it changes.

use crate::keyframe::Frame;
use crate::parameters::{ParameterSchema, ParameterSpec};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default last frame of a timeline
pub const DEFAULT_TOTAL_FRAMES: Frame = 120;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// RON parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// RON write error
    #[error("Write error: {0}")]
    Write(#[from] ron::Error),

    /// A setting holds an unusable value
    #[error("Invalid setting `{field}`: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Last frame of the timeline (at least 1)
    pub total_frames: Frame,
    /// Frames per second, used to report playhead time
    pub frame_rate: f64,
    /// Width of the keyframe track in pixels
    pub track_width: f64,
    /// Horizontal zoom factor (positive)
    pub zoom: f64,
    /// Horizontal distance in pixels within which a marker counts as hit
    pub hit_radius: f64,
    /// Maximum undo depth
    pub history_depth: usize,
    /// Animatable parameters
    pub parameters: Vec<ParameterSpec>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            total_frames: DEFAULT_TOTAL_FRAMES,
            frame_rate: 30.0,
            track_width: 600.0,
            zoom: 1.0,
            hit_radius: 6.0,
            history_depth: crate::history::MAX_HISTORY,
            parameters: ParameterSchema::kinetic_type().specs().to_vec(),
        }
    }
}

impl SessionConfig {
    /// Check that every setting is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_frames < 1 {
            return Err(invalid("total_frames", "must be at least 1"));
        }
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(invalid("frame_rate", "must be a positive number"));
        }
        if !(self.track_width.is_finite() && self.track_width > 0.0) {
            return Err(invalid("track_width", "must be a positive number"));
        }
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            return Err(invalid("zoom", "must be a positive number"));
        }
        if !(self.hit_radius.is_finite() && self.hit_radius >= 0.0) {
            return Err(invalid("hit_radius", "must not be negative"));
        }
        if self.parameters.is_empty() {
            return Err(invalid("parameters", "at least one parameter is required"));
        }
        Ok(())
    }

    /// Parameter schema declared by this config
    pub fn schema(&self) -> ParameterSchema {
        ParameterSchema::new(self.parameters.iter().cloned())
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Deserialize from RON format and validate
    pub fn from_ron(s: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&contents)?;
        tracing::info!("Loaded session config from {}", path.display());
        Ok(config)
    }

    /// Save settings to a RON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let config = SessionConfig::default();
        assert_eq!(config.total_frames, 120);
        assert_eq!(config.zoom, 1.0);
        assert!(config.validate().is_ok());
        assert_eq!(config.schema().len(), 9);
    }

    #[test]
    fn test_serialization() {
        let config = SessionConfig {
            total_frames: 240,
            ..SessionConfig::default()
        };
        let ron_str = config.to_ron().unwrap();
        let loaded = SessionConfig::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded = SessionConfig::from_ron("(total_frames: 60, zoom: 2.0)").unwrap();
        assert_eq!(loaded.total_frames, 60);
        assert_eq!(loaded.zoom, 2.0);
        assert_eq!(loaded.track_width, 600.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = SessionConfig::from_ron("(total_frames: 0)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "total_frames", .. }));

        let err = SessionConfig::from_ron("(zoom: -1.0)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "zoom", .. }));

        let err = SessionConfig::from_ron("(parameters: [])").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "parameters", .. }));
    }
}
