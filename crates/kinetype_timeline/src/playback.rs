// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback clock driving the playhead.

use crate::keyframe::Frame;
use serde::{Deserialize, Serialize};

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Stopped
    #[default]
    Stopped,
    /// Playing forward
    Playing,
}

/// Playhead position and transport state.
///
/// The clock only moves the playhead; evaluation and rendering happen in the
/// session after each tick.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    /// Current playhead position, in frames
    playhead: f64,
    /// Playback state
    state: PlaybackState,
    /// Last valid frame
    total_frames: Frame,
}

impl PlaybackClock {
    /// Create a stopped clock at frame 0
    pub fn new(total_frames: Frame) -> Self {
        Self {
            playhead: 0.0,
            state: PlaybackState::Stopped,
            total_frames: total_frames.max(1),
        }
    }

    /// Advance one frame if playing, wrapping past the last frame to 0.
    ///
    /// Returns whether the playhead moved.
    pub fn tick(&mut self) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }
        let next = (u64::from(self.frame()) + 1) % (u64::from(self.total_frames) + 1);
        self.playhead = next as f64;
        true
    }

    /// Toggle play/stop
    pub fn toggle_play(&mut self) {
        self.state = match self.state {
            PlaybackState::Playing => PlaybackState::Stopped,
            PlaybackState::Stopped => PlaybackState::Playing,
        };
        tracing::debug!(state = ?self.state, "Toggled playback");
    }

    /// Play from current position
    pub fn play(&mut self) {
        self.state = PlaybackState::Playing;
    }

    /// Stop and keep the current position
    pub fn pause(&mut self) {
        self.state = PlaybackState::Stopped;
    }

    /// Stop and rewind to the first frame
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.playhead = 0.0;
    }

    /// Seek to a (possibly fractional) frame, clamped to the timeline
    pub fn seek(&mut self, frame: f64) {
        let frame = if frame.is_nan() { 0.0 } else { frame };
        self.playhead = frame.clamp(0.0, f64::from(self.total_frames));
    }

    /// Move by `delta` whole frames, wrapping at both ends
    pub fn step(&mut self, delta: i64) {
        let span = i64::from(self.total_frames) + 1;
        let frame = (i64::from(self.frame()) + delta).rem_euclid(span);
        self.playhead = frame as f64;
    }

    /// Playhead position
    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    /// Playhead rounded to the nearest whole frame
    pub fn frame(&self) -> Frame {
        // The playhead is kept within [0, total_frames].
        self.playhead.round().clamp(0.0, f64::from(self.total_frames)) as Frame
    }

    /// Playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Is currently playing
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Last valid frame
    pub fn total_frames(&self) -> Frame {
        self.total_frames
    }

    /// Playhead time in seconds at `frame_rate`
    pub fn time_seconds(&self, frame_rate: f64) -> f64 {
        if frame_rate > 0.0 {
            self.playhead / frame_rate
        } else {
            0.0
        }
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TOTAL_FRAMES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The last frame is part of the loop: 119 -> 120 -> 0 on a 120 frame timeline
    #[test]
    fn test_wraparound_includes_last_frame() {
        let mut clock = PlaybackClock::new(120);
        clock.seek(119.0);
        clock.play();
        assert!(clock.tick());
        assert_eq!(clock.frame(), 120);
        assert!(clock.tick());
        assert_eq!(clock.frame(), 0);
    }

    /// A loop whose last frame is 119 goes straight from 119 to 0
    #[test]
    fn test_wraparound_from_last_frame_to_zero() {
        let mut clock = PlaybackClock::new(119);
        clock.seek(119.0);
        clock.play();
        assert!(clock.tick());
        assert_eq!(clock.frame(), 0);
    }

    #[test]
    fn test_stopped_clock_does_not_advance() {
        let mut clock = PlaybackClock::new(120);
        clock.seek(10.0);
        assert!(!clock.tick());
        assert_eq!(clock.frame(), 10);
    }

    #[test]
    fn test_toggle_play() {
        let mut clock = PlaybackClock::new(10);
        clock.toggle_play();
        assert!(clock.is_playing());
        clock.tick();
        clock.toggle_play();
        assert_eq!(clock.state(), PlaybackState::Stopped);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_seek_clamps_and_allows_subframes() {
        let mut clock = PlaybackClock::new(120);
        clock.seek(-4.0);
        assert_eq!(clock.playhead(), 0.0);
        clock.seek(500.0);
        assert_eq!(clock.playhead(), 120.0);
        clock.seek(12.5);
        assert_eq!(clock.playhead(), 12.5);
    }

    #[test]
    fn test_step_wraps_both_ways() {
        let mut clock = PlaybackClock::new(120);
        clock.step(-1);
        assert_eq!(clock.frame(), 120);
        clock.step(2);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_stop_rewinds() {
        let mut clock = PlaybackClock::new(120);
        clock.seek(50.0);
        clock.play();
        clock.stop();
        assert!(!clock.is_playing());
        assert_eq!(clock.frame(), 0);
    }
}
