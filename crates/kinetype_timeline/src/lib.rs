// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe timeline for Kinetype kinetic typography.
//!
//! This crate animates the numeric parameters of a typography sketch:
//! - Keyframe store keyed by frame, with collision-checked moves
//! - Interpolation of parameter snapshots at any playhead position
//! - Single and multi keyframe selection
//! - Pointer-driven dragging, placement and scrubbing
//! - Looping playback clock
//!
//! ## Architecture
//!
//! A [`Session`] owns every piece of mutable state and is the only entry
//! point for edits. Rendering and parameter input stay outside the crate,
//! behind the [`Renderer`] and [`ParameterSource`] traits.

pub mod config;
pub mod controller;
pub mod document;
pub mod error;
pub mod history;
pub mod interpolation;
pub mod keyframe;
pub mod parameters;
pub mod playback;
pub mod selection;
pub mod session;
pub mod store;

pub use config::{ConfigError, SessionConfig, DEFAULT_TOTAL_FRAMES};
pub use controller::{
    DragController, DragOperation, DragSession, EditContext, Modifiers, PointerEvent,
    PointerOutcome, TimelineView,
};
pub use document::{DocumentError, DocumentFormat, TimelineDocument, DOCUMENT_FORMAT_VERSION};
pub use error::{Result, TimelineError};
pub use history::{History, HistoryError, HistoryStats};
pub use interpolation::{bracket, value_at, Bracket};
pub use keyframe::{clamp_frame, Frame, Interpolation, InterpolationMode, Keyframe};
pub use parameters::{
    LiveParameters, ParameterSchema, ParameterSet, ParameterSource, ParameterSpec, Renderer,
};
pub use playback::{PlaybackClock, PlaybackState};
pub use selection::Selection;
pub use session::Session;
pub use store::KeyframeStore;
