// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scripted sessions.
//!
//! A script is a list of actions replayed against a [`Session`] in order,
//! the way a pointer surface and transport buttons would drive it. Scripts
//! are RON by default, JSON when the file ends in `.json`.

use anyhow::Context as _;
use kinetype_timeline::{
    Frame, InterpolationMode, PointerEvent, PointerOutcome, Renderer, Session, TimelineError,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One scripted step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Set a live parameter
    Set {
        /// Parameter name
        name: String,
        /// New value
        value: f64,
    },
    /// Capture live values at a frame, or at the playhead when omitted
    Capture {
        /// Target frame
        #[serde(default)]
        frame: Option<i64>,
    },
    /// Capture a subset of the live values
    CapturePartial {
        /// Target frame
        frame: i64,
        /// Parameters to capture
        names: Vec<String>,
    },
    /// Delete the keyframe at a frame
    Delete {
        /// Frame to clear
        frame: Frame,
    },
    /// Delete every selected keyframe
    DeleteSelected,
    /// Move a keyframe
    Move {
        /// Source frame
        from: Frame,
        /// Destination frame
        to: i64,
    },
    /// Move the single selected keyframe to an exact frame
    SetPosition {
        /// Destination frame
        frame: i64,
    },
    /// Change a keyframe's interpolation
    Interpolation {
        /// Keyframe frame
        frame: Frame,
        /// New mode
        mode: InterpolationMode,
    },
    /// Pointer input on the keyframe track
    Pointer(PointerEvent),
    /// Select every keyframe
    SelectAll,
    /// Clear the selection
    ClearSelection,
    /// Start playback
    Play,
    /// Stop and rewind
    Stop,
    /// Toggle play/stop
    TogglePlay,
    /// Move the playhead
    Seek {
        /// Target frame
        frame: f64,
    },
    /// Step the playhead
    Step {
        /// Frames to move (negative goes back)
        delta: i64,
    },
    /// Jump the playhead to the next keyframe
    NextKeyframe,
    /// Jump the playhead to the previous keyframe
    PreviousKeyframe,
    /// Render ticks
    Tick {
        /// Number of ticks
        #[serde(default = "one")]
        count: u32,
    },
    /// Change the track zoom
    Zoom {
        /// Zoom factor
        zoom: f64,
    },
    /// Undo the last keyframe edit
    Undo,
    /// Redo the last undone edit
    Redo,
}

fn one() -> u32 {
    1
}

/// Ordered list of actions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Actions, replayed in order
    pub actions: Vec<Action>,
}

/// Tally of a replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Actions applied
    pub applied: usize,
    /// Actions rejected because their target frame was occupied
    pub collisions: usize,
    /// Actions rejected for any other reason
    pub rejected: usize,
    /// Frames rendered
    pub rendered: usize,
}

impl Script {
    /// Parse a RON script
    pub fn from_ron(s: &str) -> anyhow::Result<Self> {
        Ok(ron::from_str(s)?)
    }

    /// Parse a JSON script
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a script, format chosen by extension
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let script = if is_json {
            Self::from_json(&contents)
        } else {
            Self::from_ron(&contents)
        };
        script.with_context(|| format!("parsing script {}", path.display()))
    }

    /// Replay every action against `session`.
    ///
    /// Rejected actions are logged and skipped; the replay never stops early.
    pub fn replay(&self, session: &mut Session, renderer: &mut impl Renderer) -> ReplaySummary {
        let mut summary = ReplaySummary::default();
        for (index, action) in self.actions.iter().enumerate() {
            match apply(session, action, renderer) {
                Ok(rendered) => {
                    summary.applied += 1;
                    summary.rendered += rendered;
                }
                Err(e) if e.is_collision() => {
                    summary.collisions += 1;
                    tracing::warn!(index, "Collision: {e}");
                }
                Err(e) => {
                    summary.rejected += 1;
                    tracing::warn!(index, ?action, "Action rejected: {e}");
                }
            }
        }
        summary
    }
}

/// Apply one action. Returns the number of rendered frames.
pub fn apply(
    session: &mut Session,
    action: &Action,
    renderer: &mut impl Renderer,
) -> Result<usize, TimelineError> {
    match action {
        Action::Set { name, value } => session.set_parameter(name, *value)?,
        Action::Capture { frame: Some(frame) } => {
            session.capture(*frame)?;
        }
        Action::Capture { frame: None } => {
            session.capture_at_playhead()?;
        }
        Action::CapturePartial { frame, names } => {
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            session.capture_partial(*frame, &names)?;
        }
        Action::Delete { frame } => {
            session.delete(*frame)?;
        }
        Action::DeleteSelected => {
            session.delete_selected()?;
        }
        Action::Move { from, to } => {
            session.move_keyframe(*from, *to)?;
        }
        Action::SetPosition { frame } => {
            session.set_exact_position(*frame)?;
        }
        Action::Interpolation { frame, mode } => session.set_interpolation(*frame, *mode)?,
        Action::Pointer(event) => {
            if let PointerOutcome::Placed { frame } = session.dispatch(*event)? {
                tracing::info!(frame, "Placed keyframe");
            }
        }
        Action::SelectAll => session.select_all(),
        Action::ClearSelection => session.clear_selection(),
        Action::Play => session.play(),
        Action::Stop => session.stop(),
        Action::TogglePlay => session.toggle_play(),
        Action::Seek { frame } => session.seek(*frame),
        Action::Step { delta } => session.step(*delta),
        Action::NextKeyframe => {
            session.jump_to_next_keyframe();
        }
        Action::PreviousKeyframe => {
            session.jump_to_previous_keyframe();
        }
        Action::Tick { count } => {
            for _ in 0..*count {
                session.tick(renderer);
            }
            return Ok(*count as usize);
        }
        Action::Zoom { zoom } => session.set_zoom(*zoom),
        Action::Undo => session.undo()?,
        Action::Redo => session.redo()?,
    }
    Ok(0)
}
