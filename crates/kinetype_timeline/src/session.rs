// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editing session.
//!
//! The session is the single owner of the mutable timeline state: live
//! parameters, keyframes, selection, playhead, pointer controller and undo
//! history. Every handler runs to completion before the next one starts, so
//! a render tick never observes a half-applied edit.

use crate::config::{ConfigError, SessionConfig};
use crate::controller::{
    DragController, DragOperation, EditContext, PointerEvent, PointerOutcome, TimelineView,
};
use crate::document::{DocumentError, TimelineDocument};
use crate::error::{Result, TimelineError};
use crate::history::History;
use crate::interpolation::value_at;
use crate::keyframe::{Frame, InterpolationMode, Keyframe};
use crate::parameters::{LiveParameters, ParameterSet, ParameterSource, Renderer};
use crate::playback::PlaybackClock;
use crate::selection::Selection;
use crate::store::KeyframeStore;

/// Timeline editing session
#[derive(Debug)]
pub struct Session {
    /// Settings the session was created with
    config: SessionConfig,
    /// Live parameter values
    live: LiveParameters,
    /// Keyframes
    store: KeyframeStore,
    /// Selected keyframes
    selection: Selection,
    /// Playhead and transport
    clock: PlaybackClock,
    /// Pointer gesture handling
    controller: DragController,
    /// Undo/redo of keyframe edits
    history: History,
    /// Store as it was when the current gesture started
    gesture_before: Option<KeyframeStore>,
}

impl Session {
    /// Create a session from validated settings
    pub fn new(config: SessionConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let view = TimelineView::new(config.track_width, config.zoom, config.hit_radius);
        let session = Self {
            live: LiveParameters::new(config.schema()),
            store: KeyframeStore::new(config.total_frames),
            selection: Selection::new(),
            clock: PlaybackClock::new(config.total_frames),
            controller: DragController::new(view),
            history: History::with_max_depth(config.history_depth),
            gesture_before: None,
            config,
        };
        tracing::debug!(
            total_frames = session.config.total_frames,
            parameters = session.live.schema().len(),
            "Created session"
        );
        Ok(session)
    }

    // ---- State access ----

    /// Session settings
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Keyframes
    pub fn store(&self) -> &KeyframeStore {
        &self.store
    }

    /// Selected keyframes
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Playhead and transport
    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Pointer controller
    pub fn controller(&self) -> &DragController {
        &self.controller
    }

    /// Undo history
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Live parameters
    pub fn live(&self) -> &LiveParameters {
        &self.live
    }

    /// Last valid frame
    pub fn total_frames(&self) -> Frame {
        self.store.total_frames()
    }

    // ---- Parameters ----

    /// Set a live parameter
    pub fn set_parameter(&mut self, name: &str, value: f64) -> Result<()> {
        self.live.set(name, value)
    }

    /// Effective parameters at the playhead
    pub fn evaluate(&self) -> ParameterSet {
        self.evaluate_at(self.clock.playhead())
    }

    /// Effective parameters at any frame
    pub fn evaluate_at(&self, frame: f64) -> ParameterSet {
        value_at(&self.store, frame, &self.live.current())
    }

    // ---- Keyframe edits ----

    /// Capture the live parameters at the playhead
    pub fn capture_at_playhead(&mut self) -> Result<Frame> {
        let frame = i64::from(self.clock.frame());
        self.capture(frame)
    }

    /// Capture the live parameters at `frame`, overwriting any keyframe there
    pub fn capture(&mut self, frame: i64) -> Result<Frame> {
        let values = self.live.current();
        self.edit("Capture keyframe", |s| Ok(s.store.capture(frame, values)))
    }

    /// Capture only some parameters at `frame`
    pub fn capture_partial(&mut self, frame: i64, names: &[&str]) -> Result<Frame> {
        if let Some(unknown) = names.iter().find(|n| !self.live.schema().contains(n)) {
            return Err(TimelineError::UnknownParameter((*unknown).to_string()));
        }
        let values = self.live.current().subset(names.iter().copied());
        self.edit("Capture partial keyframe", |s| Ok(s.store.capture(frame, values)))
    }

    /// Delete the keyframe at `frame`; no-op if absent
    pub fn delete(&mut self, frame: Frame) -> Result<Option<Keyframe>> {
        self.edit("Delete keyframe", |s| {
            s.selection.remove(frame);
            Ok(s.store.delete(frame))
        })
    }

    /// Delete every selected keyframe. Returns how many were removed.
    pub fn delete_selected(&mut self) -> Result<usize> {
        let frames = self.selection.frames();
        self.edit("Delete keyframes", |s| {
            let mut removed = 0;
            for frame in frames {
                s.selection.remove(frame);
                if s.store.delete(frame).is_some() {
                    removed += 1;
                }
            }
            Ok(removed)
        })
    }

    /// Move a keyframe; the selection follows it
    pub fn move_keyframe(&mut self, from: Frame, to: i64) -> Result<Frame> {
        self.edit("Move keyframe", |s| {
            let to = s.store.move_keyframe(from, to)?;
            if s.selection.remove(from) {
                s.selection.add(to);
            }
            Ok(to)
        })
    }

    /// Move the single selected keyframe to an exact frame
    pub fn set_exact_position(&mut self, frame: i64) -> Result<Frame> {
        self.edit("Set keyframe position", |s| {
            let live = s.live.current();
            let mut ctx = EditContext {
                store: &mut s.store,
                selection: &mut s.selection,
                clock: &mut s.clock,
                live: &live,
            };
            s.controller.set_exact_position(frame, &mut ctx)
        })
    }

    /// Change how a keyframe interpolates toward the next one
    pub fn set_interpolation(&mut self, frame: Frame, mode: InterpolationMode) -> Result<()> {
        self.edit("Set interpolation", |s| s.store.set_interpolation(frame, mode))
    }

    /// Run a keyframe edit and record it as one undo step
    fn edit<T>(
        &mut self,
        description: &str,
        apply: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let before = self.store.clone();
        let out = apply(self)?;
        self.history.record(description, &before, &self.store)?;
        debug_assert!(self.selection.is_subset_of(&self.store));
        Ok(out)
    }

    // ---- Selection ----

    /// Select every keyframe
    pub fn select_all(&mut self) {
        self.selection.select_all(&self.store);
    }

    /// Select a single existing keyframe
    pub fn select_only(&mut self, frame: Frame) -> Result<()> {
        if !self.store.contains(frame) {
            return Err(TimelineError::MissingKeyframe { frame });
        }
        self.selection.select_only(frame);
        Ok(())
    }

    /// Click-select an existing keyframe
    pub fn toggle_selection(&mut self, frame: Frame, multi: bool) -> Result<()> {
        if !self.store.contains(frame) {
            return Err(TimelineError::MissingKeyframe { frame });
        }
        self.selection.toggle(frame, multi);
        Ok(())
    }

    /// Clear the selection
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ---- Pointer input ----

    /// Feed one pointer event to the controller.
    ///
    /// A keyframe drag becomes a single undo step when the pointer is
    /// released. A rejected move leaves the gesture alive at its last
    /// accepted position.
    pub fn dispatch(&mut self, event: PointerEvent) -> Result<PointerOutcome> {
        if matches!(event, PointerEvent::Down { .. }) {
            // A press without the previous release still closes that drag
            let unreleased = matches!(
                self.controller.drag_op(),
                DragOperation::Keyframes(drag) if drag.has_moved()
            );
            if unreleased {
                self.commit_gesture("Drag keyframes")?;
            }
            self.gesture_before = Some(self.store.clone());
        }

        let live = self.live.current();
        let mut ctx = EditContext {
            store: &mut self.store,
            selection: &mut self.selection,
            clock: &mut self.clock,
            live: &live,
        };
        let outcome = self.controller.handle(event, &mut ctx)?;

        match &outcome {
            PointerOutcome::Placed { .. } => self.commit_gesture("Place keyframe")?,
            PointerOutcome::Released { moved: true } => self.commit_gesture("Drag keyframes")?,
            PointerOutcome::Released { moved: false } => self.gesture_before = None,
            _ => {}
        }
        debug_assert!(self.selection.is_subset_of(&self.store));
        Ok(outcome)
    }

    fn commit_gesture(&mut self, description: &str) -> Result<()> {
        if let Some(before) = self.gesture_before.take() {
            self.history.record(description, &before, &self.store)?;
        }
        Ok(())
    }

    /// Set the horizontal zoom; non-positive values are ignored
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() && zoom > 0.0 {
            self.controller.view.zoom = zoom;
        }
    }

    /// Set the frame shown at the left edge of the track
    pub fn set_scroll(&mut self, scroll: f64) {
        if scroll.is_finite() {
            self.controller.view.scroll = scroll.clamp(0.0, f64::from(self.total_frames()));
        }
    }

    /// Set the keyframe track width in pixels; non-positive values are ignored
    pub fn set_track_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.controller.view.track_width = width;
        }
    }

    // ---- Transport ----

    /// Advance the clock, evaluate and render one frame
    pub fn tick(&mut self, renderer: &mut impl Renderer) -> Frame {
        self.clock.tick();
        let frame = self.clock.frame();
        let parameters = self.evaluate();
        tracing::trace!(frame, "Rendering frame");
        renderer.render(&parameters, frame);
        frame
    }

    /// Toggle play/stop
    pub fn toggle_play(&mut self) {
        self.clock.toggle_play();
    }

    /// Start playback
    pub fn play(&mut self) {
        self.clock.play();
    }

    /// Stop playback and rewind
    pub fn stop(&mut self) {
        self.clock.stop();
    }

    /// Move the playhead
    pub fn seek(&mut self, frame: f64) {
        self.clock.seek(frame);
    }

    /// Step the playhead by whole frames, wrapping
    pub fn step(&mut self, delta: i64) {
        self.clock.step(delta);
    }

    /// Jump to the next keyframe after the playhead
    pub fn jump_to_next_keyframe(&mut self) -> Option<Frame> {
        let next = self.store.next(self.clock.frame())?;
        self.clock.seek(f64::from(next));
        Some(next)
    }

    /// Jump to the keyframe before the playhead
    pub fn jump_to_previous_keyframe(&mut self) -> Option<Frame> {
        let prev = self.store.previous(self.clock.frame())?;
        self.clock.seek(f64::from(prev));
        Some(prev)
    }

    // ---- History ----

    /// Undo the last keyframe edit
    pub fn undo(&mut self) -> Result<()> {
        self.end_gesture();
        self.store = self.history.undo()?;
        self.selection.retain_existing(&self.store);
        tracing::debug!(keyframes = self.store.len(), "Undo");
        Ok(())
    }

    /// Redo the last undone keyframe edit
    pub fn redo(&mut self) -> Result<()> {
        self.end_gesture();
        self.store = self.history.redo()?;
        self.selection.retain_existing(&self.store);
        tracing::debug!(keyframes = self.store.len(), "Redo");
        Ok(())
    }

    fn end_gesture(&mut self) {
        self.controller.pointer_up();
        self.gesture_before = None;
    }

    // ---- Persistence ----

    /// Snapshot the timeline as a document
    pub fn to_document(&self) -> TimelineDocument {
        TimelineDocument::from_store(&self.store, self.live.schema().names())
    }

    /// Replace the timeline with a document's keyframes.
    ///
    /// The frame count follows the document. The playhead is clamped into
    /// the new range and keeps its transport state. Selection and history are
    /// reset; names the schema does not declare are kept in the keyframes but
    /// ignored by evaluation.
    pub fn load_document(&mut self, document: &TimelineDocument) -> std::result::Result<(), DocumentError> {
        let store = document.to_store()?;
        let unknown: Vec<&str> = document
            .parameters
            .iter()
            .map(String::as_str)
            .filter(|name| !self.live.schema().contains(name))
            .collect();
        if !unknown.is_empty() {
            tracing::warn!(?unknown, "Document uses parameters this session does not declare");
        }

        self.end_gesture();
        let playhead = self.clock.playhead();
        let playing = self.clock.is_playing();
        self.clock = PlaybackClock::new(store.total_frames());
        self.clock.seek(playhead);
        if playing {
            self.clock.play();
        }
        self.store = store;
        self.selection.clear();
        self.history.clear();
        tracing::info!(keyframes = self.store.len(), total_frames = self.total_frames(), "Loaded timeline");
        Ok(())
    }
}
