// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for timeline editing.

use crate::history::HistoryError;
use crate::keyframe::Frame;
use thiserror::Error;

/// Errors raised by keyframe store, controller and session operations
#[derive(Debug, Error)]
pub enum TimelineError {
    /// The target frame already holds a different keyframe
    #[error("Frame {frame} already holds a keyframe")]
    Collision {
        /// The occupied frame
        frame: Frame,
    },

    /// No keyframe exists at the given frame
    #[error("No keyframe at frame {frame}")]
    MissingKeyframe {
        /// The empty frame
        frame: Frame,
    },

    /// An operation needs exactly one selected keyframe
    #[error("Expected exactly one selected keyframe, found {count}")]
    SelectionNotSingle {
        /// Current selection size
        count: usize,
    },

    /// Parameter name not declared in the schema
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    /// Undo/redo failure
    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

impl TimelineError {
    /// Whether this error is a collision that should be surfaced to the user
    pub fn is_collision(&self) -> bool {
        matches!(self, Self::Collision { .. })
    }
}

/// Result type for timeline operations
pub type Result<T> = std::result::Result<T, TimelineError>;
