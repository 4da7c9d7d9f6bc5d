// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions for the timeline.

use crate::parameters::ParameterSet;
use serde::{Deserialize, Serialize};

/// Discrete timeline position. Keyframes are keyed by frame.
pub type Frame = u32;

/// Clamp a possibly out-of-range frame into `[0, total_frames]`
pub fn clamp_frame(frame: i64, total_frames: Frame) -> Frame {
    // Lossless: the clamped value lies in [0, total_frames].
    frame.clamp(0, i64::from(total_frames)) as Frame
}

/// Curve applied on the segment leaving a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationMode {
    /// Constant (step) until the next keyframe
    Hold,
    /// Linear interpolation
    #[default]
    Linear,
    /// Ease in/out (smoothstep)
    Smooth,
}

impl InterpolationMode {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hold => "Hold",
            Self::Linear => "Linear",
            Self::Smooth => "Smooth",
        }
    }

    /// Shape a linear segment fraction `t` in `[0, 1]`
    pub fn shape(&self, t: f64) -> f64 {
        match self {
            Self::Hold => 0.0,
            Self::Linear => t,
            Self::Smooth => Interpolation::smoothstep(t),
        }
    }
}

/// A keyframe: an authored parameter snapshot.
///
/// The frame is the key in the store, so it is not repeated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Captured values (full or partial)
    pub values: ParameterSet,
    /// Interpolation mode to next keyframe
    #[serde(default)]
    pub interpolation: InterpolationMode,
}

impl Keyframe {
    /// Create a new linear keyframe
    pub fn new(values: ParameterSet) -> Self {
        Self {
            values,
            interpolation: InterpolationMode::Linear,
        }
    }

    /// Set interpolation mode
    pub fn with_interpolation(mut self, mode: InterpolationMode) -> Self {
        self.interpolation = mode;
        self
    }

    /// Value of a parameter, if this keyframe sets it
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name)
    }
}

impl From<ParameterSet> for Keyframe {
    fn from(values: ParameterSet) -> Self {
        Self::new(values)
    }
}

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two values
    pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + (b - a) * t
    }

    /// Hermite smoothstep on `[0, 1]`
    pub fn smoothstep(t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }

    /// Fraction of `frame` between `start` and `end`; zero-width spans yield 0
    pub fn fraction(start: f64, end: f64, frame: f64) -> f64 {
        let width = end - start;
        if width.abs() < f64::EPSILON {
            0.0
        } else {
            (frame - start) / width
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_frame() {
        assert_eq!(clamp_frame(-5, 120), 0);
        assert_eq!(clamp_frame(60, 120), 60);
        assert_eq!(clamp_frame(500, 120), 120);
    }

    #[test]
    fn test_interpolation_modes() {
        assert_eq!(InterpolationMode::Linear.shape(0.25), 0.25);
        assert_eq!(InterpolationMode::Hold.shape(0.75), 0.0);
        assert_eq!(InterpolationMode::Smooth.shape(0.5), 0.5);
        assert!(InterpolationMode::Smooth.shape(0.1) < 0.1);
    }

    #[test]
    fn test_zero_width_fraction() {
        assert_eq!(Interpolation::fraction(10.0, 10.0, 10.0), 0.0);
        assert_eq!(Interpolation::fraction(0.0, 10.0, 5.0), 0.5);
    }

    #[test]
    fn test_default_mode_is_linear() {
        let kf = Keyframe::new(ParameterSet::new().with("x", 1.0));
        assert_eq!(kf.interpolation, InterpolationMode::Linear);
        assert_eq!(kf.value("x"), Some(1.0));
        assert_eq!(kf.value("y"), None);
    }
}
