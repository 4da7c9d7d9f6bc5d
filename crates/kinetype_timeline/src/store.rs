// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe store: the frame-to-snapshot mapping of a timeline.
//!
//! Frames are unique keys. Every operation that could place two keyframes on
//! the same frame is rejected with [`TimelineError::Collision`] instead.

use crate::error::{Result, TimelineError};
use crate::keyframe::{clamp_frame, Frame, InterpolationMode, Keyframe};
use crate::parameters::ParameterSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Ordered mapping from frame to keyframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframeStore {
    /// Last valid frame; frames live in `[0, total_frames]`
    total_frames: Frame,
    /// Keyframes by frame
    keyframes: BTreeMap<Frame, Keyframe>,
}

impl KeyframeStore {
    /// Create an empty store
    pub fn new(total_frames: Frame) -> Self {
        Self {
            total_frames: total_frames.max(1),
            keyframes: BTreeMap::new(),
        }
    }

    /// Last valid frame
    pub fn total_frames(&self) -> Frame {
        self.total_frames
    }

    /// Clamp a frame into this store's range
    pub fn clamp(&self, frame: i64) -> Frame {
        clamp_frame(frame, self.total_frames)
    }

    /// Insert or overwrite the keyframe at `frame`. Returns the clamped frame.
    pub fn capture(&mut self, frame: i64, values: ParameterSet) -> Frame {
        self.insert(frame, Keyframe::new(values))
    }

    /// Insert or overwrite a full keyframe at `frame`. Returns the clamped frame.
    pub fn insert(&mut self, frame: i64, keyframe: Keyframe) -> Frame {
        let frame = self.clamp(frame);
        if self.keyframes.insert(frame, keyframe).is_some() {
            tracing::debug!(frame, "Overwrote keyframe");
        } else {
            tracing::debug!(frame, "Captured keyframe");
        }
        frame
    }

    /// Insert a keyframe only if `frame` is free
    pub fn place(&mut self, frame: i64, values: ParameterSet) -> Result<Frame> {
        let frame = self.clamp(frame);
        if self.keyframes.contains_key(&frame) {
            return Err(TimelineError::Collision { frame });
        }
        self.keyframes.insert(frame, Keyframe::new(values));
        tracing::debug!(frame, "Placed keyframe");
        Ok(frame)
    }

    /// Remove the keyframe at `frame`, if any
    pub fn delete(&mut self, frame: Frame) -> Option<Keyframe> {
        let removed = self.keyframes.remove(&frame);
        if removed.is_some() {
            tracing::debug!(frame, "Deleted keyframe");
        }
        removed
    }

    /// Relocate a keyframe. Returns the clamped destination.
    ///
    /// A move onto the keyframe's own frame succeeds without change. A move
    /// onto another keyframe is rejected and leaves the store untouched.
    pub fn move_keyframe(&mut self, from: Frame, to: i64) -> Result<Frame> {
        let to = self.clamp(to);
        if !self.keyframes.contains_key(&from) {
            return Err(TimelineError::MissingKeyframe { frame: from });
        }
        if to == from {
            return Ok(to);
        }
        if self.keyframes.contains_key(&to) {
            return Err(TimelineError::Collision { frame: to });
        }
        if let Some(keyframe) = self.keyframes.remove(&from) {
            self.keyframes.insert(to, keyframe);
        }
        tracing::debug!(from, to, "Moved keyframe");
        Ok(to)
    }

    /// Relocate several keyframes at once.
    ///
    /// Destinations are clamped, then the whole batch is validated: every
    /// source must exist, destinations must be pairwise distinct, and no
    /// destination may hold a keyframe outside the batch. Nothing is applied
    /// unless all checks pass. Returns the destinations in input order.
    pub fn move_batch(&mut self, moves: &[(Frame, i64)]) -> Result<Vec<Frame>> {
        let sources: HashSet<Frame> = moves.iter().map(|(from, _)| *from).collect();
        let mut targets = Vec::with_capacity(moves.len());
        let mut seen = HashSet::with_capacity(moves.len());

        for &(from, to) in moves {
            if !self.keyframes.contains_key(&from) {
                return Err(TimelineError::MissingKeyframe { frame: from });
            }
            let to = self.clamp(to);
            let occupied_by_other = self.keyframes.contains_key(&to) && !sources.contains(&to);
            if !seen.insert(to) || occupied_by_other {
                return Err(TimelineError::Collision { frame: to });
            }
            targets.push(to);
        }

        let taken: Vec<Keyframe> = moves
            .iter()
            .filter_map(|(from, _)| self.keyframes.remove(from))
            .collect();
        for (to, keyframe) in targets.iter().zip(taken) {
            self.keyframes.insert(*to, keyframe);
        }

        tracing::debug!(count = moves.len(), "Moved keyframe batch");
        Ok(targets)
    }

    /// Get the keyframe at `frame`
    pub fn get(&self, frame: Frame) -> Option<&Keyframe> {
        self.keyframes.get(&frame)
    }

    /// Whether a keyframe exists at `frame`
    pub fn contains(&self, frame: Frame) -> bool {
        self.keyframes.contains_key(&frame)
    }

    /// Change the interpolation mode of an existing keyframe
    pub fn set_interpolation(&mut self, frame: Frame, mode: InterpolationMode) -> Result<()> {
        let keyframe = self
            .keyframes
            .get_mut(&frame)
            .ok_or(TimelineError::MissingKeyframe { frame })?;
        keyframe.interpolation = mode;
        Ok(())
    }

    /// All keyframed frames in ascending order
    pub fn frames_sorted(&self) -> Vec<Frame> {
        self.keyframes.keys().copied().collect()
    }

    /// Iterate over keyframes in frame order
    pub fn iter(&self) -> impl Iterator<Item = (Frame, &Keyframe)> {
        self.keyframes.iter().map(|(f, k)| (*f, k))
    }

    /// Nearest keyframe strictly before `frame`
    pub fn previous(&self, frame: Frame) -> Option<Frame> {
        self.keyframes.range(..frame).next_back().map(|(f, _)| *f)
    }

    /// Nearest keyframe strictly after `frame`
    pub fn next(&self, frame: Frame) -> Option<Frame> {
        self.keyframes
            .range(frame.saturating_add(1)..)
            .next()
            .map(|(f, _)| *f)
    }

    /// Get keyframe count
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Remove every keyframe
    pub fn clear(&mut self) {
        self.keyframes.clear();
    }
}

impl Default for KeyframeStore {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TOTAL_FRAMES)
    }
}
