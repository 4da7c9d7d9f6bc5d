// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pointer handling for the keyframe track.
//!
//! Features:
//! - Marker hit testing and click selection
//! - Atomic multi-keyframe dragging
//! - Click placement of new keyframes
//! - Playhead scrubbing on the empty track
//! - Zoom/scroll aware pixel-to-frame mapping

use crate::error::{Result, TimelineError};
use crate::keyframe::Frame;
use crate::parameters::ParameterSet;
use crate::playback::PlaybackClock;
use crate::selection::Selection;
use crate::store::KeyframeStore;
use serde::{Deserialize, Serialize};

/// Modifier keys held during a pointer-down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    /// Extend/toggle the selection instead of replacing it (shift/ctrl)
    #[serde(default)]
    pub multi: bool,
    /// Place a keyframe on an empty part of the track (alt)
    #[serde(default)]
    pub place: bool,
}

impl Modifiers {
    /// No modifiers held
    pub const NONE: Self = Self { multi: false, place: false };
    /// Multi-select modifier held
    pub const MULTI: Self = Self { multi: true, place: false };
    /// Placement modifier held
    pub const PLACE: Self = Self { multi: false, place: true };
}

/// Events reported by the pointer surface, in screen coordinates relative
/// to the left edge of the keyframe track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// Button pressed
    Down {
        /// Horizontal position in pixels
        x: f64,
        /// Vertical position in pixels
        y: f64,
        /// Held modifiers
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Pointer moved
    Move {
        /// Horizontal position in pixels
        x: f64,
        /// Vertical position in pixels
        y: f64,
    },
    /// Button released
    Up,
}

/// Mapping between track pixels and frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineView {
    /// Width of the keyframe track in pixels
    pub track_width: f64,
    /// Horizontal zoom factor
    pub zoom: f64,
    /// Frame shown at the left edge of the track
    pub scroll: f64,
    /// Marker hit distance in pixels
    pub hit_radius: f64,
}

impl TimelineView {
    /// Create a view with no scroll
    pub fn new(track_width: f64, zoom: f64, hit_radius: f64) -> Self {
        Self {
            track_width,
            zoom,
            scroll: 0.0,
            hit_radius,
        }
    }

    /// Frames per pixel at the current zoom
    fn frames_per_pixel(&self, total_frames: Frame) -> f64 {
        if self.track_width <= 0.0 || self.zoom <= 0.0 {
            return 0.0;
        }
        f64::from(total_frames) / self.track_width / self.zoom
    }

    /// Frame under track position `x` (unclamped)
    pub fn x_to_frame(&self, x: f64, total_frames: Frame) -> i64 {
        round_to_frame(x * self.frames_per_pixel(total_frames)) + round_to_frame(self.scroll)
    }

    /// Track position of `frame`
    pub fn frame_to_x(&self, frame: Frame, total_frames: Frame) -> f64 {
        let fpp = self.frames_per_pixel(total_frames);
        if fpp == 0.0 {
            return 0.0;
        }
        (f64::from(frame) - self.scroll) / fpp
    }

    /// Whole frames covered by a horizontal pointer displacement
    pub fn delta_frames(&self, dx: f64, total_frames: Frame) -> i64 {
        round_to_frame(dx * self.frames_per_pixel(total_frames))
    }

    /// Keyframe whose marker is nearest to `x`, within the hit radius
    pub fn hit_test(&self, store: &KeyframeStore, x: f64) -> Option<Frame> {
        let total = store.total_frames();
        store
            .iter()
            .map(|(frame, _)| (frame, (self.frame_to_x(frame, total) - x).abs()))
            .filter(|(_, distance)| *distance <= self.hit_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(frame, _)| frame)
    }
}

impl Default for TimelineView {
    fn default() -> Self {
        Self::new(600.0, 1.0, 6.0)
    }
}

fn round_to_frame(value: f64) -> i64 {
    if value.is_finite() {
        // Saturating float-to-int conversion; clamped to the timeline later.
        value.round() as i64
    } else {
        0
    }
}

/// State of an in-progress keyframe drag
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// Pointer x where the drag started
    pub anchor_x: f64,
    /// Frames of the dragged keyframes when the drag started
    pub start_frames: Vec<Frame>,
    /// Frames the dragged keyframes occupy now
    pub current_frames: Vec<Frame>,
}

impl DragSession {
    /// Whether any keyframe left its starting frame
    pub fn has_moved(&self) -> bool {
        self.start_frames != self.current_frames
    }
}

/// Drag operation state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragOperation {
    /// Not dragging
    #[default]
    Idle,
    /// Dragging keyframe(s)
    Keyframes(DragSession),
    /// Dragging the playhead along the empty track
    Scrubbing,
}

/// Mutable timeline state a pointer gesture may touch
pub struct EditContext<'a> {
    /// Keyframes
    pub store: &'a mut KeyframeStore,
    /// Selected keyframes
    pub selection: &'a mut Selection,
    /// Playhead
    pub clock: &'a mut PlaybackClock,
    /// Live parameters, captured by click placement
    pub live: &'a ParameterSet,
}

/// What a pointer event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerOutcome {
    /// Nothing changed
    Ignored,
    /// A marker was pressed and a drag started
    Grabbed {
        /// Marker under the pointer
        frame: Frame,
    },
    /// A multi-select press removed the marker from the selection; no drag starts
    Deselected {
        /// Marker under the pointer
        frame: Frame,
    },
    /// A keyframe was placed on the empty track
    Placed {
        /// Frame of the new keyframe
        frame: Frame,
    },
    /// The playhead was moved
    Scrubbed {
        /// New playhead frame
        frame: Frame,
    },
    /// The dragged keyframes moved
    Moved {
        /// Their new frames
        frames: Vec<Frame>,
    },
    /// The gesture ended
    Released {
        /// Whether a keyframe drag changed the store
        moved: bool,
    },
}

/// Translates pointer events into timeline edits
#[derive(Debug, Clone, Default)]
pub struct DragController {
    /// Pixel-to-frame mapping
    pub view: TimelineView,
    /// Current drag operation
    drag_op: DragOperation,
}

impl DragController {
    /// Create an idle controller
    pub fn new(view: TimelineView) -> Self {
        Self {
            view,
            drag_op: DragOperation::Idle,
        }
    }

    /// Current drag operation
    pub fn drag_op(&self) -> &DragOperation {
        &self.drag_op
    }

    /// Whether a keyframe drag is in progress
    pub fn is_dragging(&self) -> bool {
        matches!(self.drag_op, DragOperation::Keyframes(_))
    }

    /// Handle one pointer event
    pub fn handle(&mut self, event: PointerEvent, ctx: &mut EditContext<'_>) -> Result<PointerOutcome> {
        match event {
            PointerEvent::Down { x, modifiers, .. } => self.pointer_down(x, modifiers, ctx),
            PointerEvent::Move { x, .. } => self.pointer_move(x, ctx),
            PointerEvent::Up => Ok(self.pointer_up()),
        }
    }

    /// Pointer pressed on the track
    pub fn pointer_down(
        &mut self,
        x: f64,
        modifiers: Modifiers,
        ctx: &mut EditContext<'_>,
    ) -> Result<PointerOutcome> {
        // A missed release never leaves a stale drag behind
        self.drag_op = DragOperation::Idle;
        let total = ctx.store.total_frames();

        if let Some(frame) = self.view.hit_test(ctx.store, x) {
            ctx.selection.toggle(frame, modifiers.multi);
            if !ctx.selection.contains(frame) {
                return Ok(PointerOutcome::Deselected { frame });
            }
            let start_frames = ctx.selection.frames();
            self.drag_op = DragOperation::Keyframes(DragSession {
                anchor_x: x,
                current_frames: start_frames.clone(),
                start_frames,
            });
            return Ok(PointerOutcome::Grabbed { frame });
        }

        let frame = self.view.x_to_frame(x, total);
        if modifiers.place {
            let frame = ctx.store.place(frame, ctx.live.clone()).inspect_err(|e| {
                tracing::warn!("Keyframe placement rejected: {e}");
            })?;
            ctx.selection.select_only(frame);
            return Ok(PointerOutcome::Placed { frame });
        }

        if !modifiers.multi {
            ctx.selection.clear();
        }
        ctx.clock.seek(frame as f64);
        self.drag_op = DragOperation::Scrubbing;
        Ok(PointerOutcome::Scrubbed { frame: ctx.clock.frame() })
    }

    /// Pointer moved
    pub fn pointer_move(&mut self, x: f64, ctx: &mut EditContext<'_>) -> Result<PointerOutcome> {
        let total = ctx.store.total_frames();
        match &mut self.drag_op {
            DragOperation::Idle => Ok(PointerOutcome::Ignored),
            DragOperation::Scrubbing => {
                ctx.clock.seek(self.view.x_to_frame(x, total) as f64);
                Ok(PointerOutcome::Scrubbed { frame: ctx.clock.frame() })
            }
            DragOperation::Keyframes(session) => {
                let delta = self.view.delta_frames(x - session.anchor_x, total);
                let moves: Vec<(Frame, i64)> = session
                    .start_frames
                    .iter()
                    .zip(&session.current_frames)
                    .map(|(start, current)| (*current, i64::from(*start) + delta))
                    .collect();

                let unchanged = moves
                    .iter()
                    .all(|(current, target)| i64::from(*current) == i64::from(ctx.store.clamp(*target)));
                if unchanged {
                    return Ok(PointerOutcome::Ignored);
                }

                let targets = ctx.store.move_batch(&moves).inspect_err(|e| {
                    tracing::warn!(delta, "Keyframe drag rejected: {e}");
                })?;
                ctx.selection.replace(targets.iter().copied());
                session.current_frames.clone_from(&targets);
                Ok(PointerOutcome::Moved { frames: targets })
            }
        }
    }

    /// Pointer released. Always ends the gesture.
    pub fn pointer_up(&mut self) -> PointerOutcome {
        let moved = match std::mem::take(&mut self.drag_op) {
            DragOperation::Keyframes(session) => session.has_moved(),
            DragOperation::Idle | DragOperation::Scrubbing => false,
        };
        PointerOutcome::Released { moved }
    }

    /// Move the single selected keyframe to an exact frame
    pub fn set_exact_position(&mut self, frame: i64, ctx: &mut EditContext<'_>) -> Result<Frame> {
        let Some(from) = ctx.selection.single() else {
            return Err(TimelineError::SelectionNotSingle {
                count: ctx.selection.len(),
            });
        };
        let to = ctx.store.move_keyframe(from, frame)?;
        ctx.selection.select_only(to);
        Ok(to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 120 frames over 120 pixels: one pixel per frame at zoom 1
    fn fixture(frames: &[Frame]) -> (DragController, KeyframeStore, Selection, PlaybackClock) {
        let mut store = KeyframeStore::new(120);
        for &f in frames {
            store.capture(i64::from(f), ParameterSet::new().with("x", f64::from(f)));
        }
        let controller = DragController::new(TimelineView::new(120.0, 1.0, 2.0));
        (controller, store, Selection::new(), PlaybackClock::new(120))
    }

    macro_rules! ctx {
        ($store:expr, $sel:expr, $clock:expr, $live:expr) => {
            EditContext {
                store: &mut $store,
                selection: &mut $sel,
                clock: &mut $clock,
                live: &$live,
            }
        };
    }

    #[test]
    fn test_view_mapping() {
        let view = TimelineView::new(600.0, 1.0, 6.0);
        assert_eq!(view.x_to_frame(300.0, 120), 60);
        assert_eq!(view.frame_to_x(60, 120), 300.0);
        assert_eq!(view.delta_frames(-50.0, 120), -10);

        let zoomed = TimelineView::new(600.0, 2.0, 6.0);
        assert_eq!(zoomed.x_to_frame(300.0, 120), 30);
        assert_eq!(zoomed.frame_to_x(30, 120), 300.0);
    }

    #[test]
    fn test_hit_test_picks_nearest_within_radius() {
        let (c, store, ..) = fixture(&[10, 13]);
        assert_eq!(c.view.hit_test(&store, 11.0), Some(10));
        assert_eq!(c.view.hit_test(&store, 12.0), Some(13));
        assert_eq!(c.view.hit_test(&store, 40.0), None);
    }

    #[test]
    fn test_single_drag_moves_keyframe() {
        let (mut c, mut store, mut sel, mut clock) = fixture(&[10, 50]);
        let live = ParameterSet::new();
        let mut ctx = ctx!(store, sel, clock, live);

        let out = c.pointer_down(10.0, Modifiers::NONE, &mut ctx).unwrap();
        assert_eq!(out, PointerOutcome::Grabbed { frame: 10 });
        assert!(c.is_dragging());

        let out = c.pointer_move(25.0, &mut ctx).unwrap();
        assert_eq!(out, PointerOutcome::Moved { frames: vec![25] });
        assert_eq!(c.pointer_up(), PointerOutcome::Released { moved: true });
        assert!(!c.is_dragging());

        assert_eq!(store.frames_sorted(), vec![25, 50]);
        assert_eq!(sel.frames(), vec![25]);
        assert_eq!(store.get(25).and_then(|k| k.value("x")), Some(10.0));
    }

    #[test]
    fn test_multi_drag_is_atomic() {
        let (mut c, mut store, mut sel, mut clock) = fixture(&[10, 20, 40]);
        let live = ParameterSet::new();
        let mut ctx = ctx!(store, sel, clock, live);

        c.pointer_down(10.0, Modifiers::NONE, &mut ctx).unwrap();
        c.pointer_up();
        c.pointer_down(20.0, Modifiers::MULTI, &mut ctx).unwrap();
        assert_eq!(ctx.selection.frames(), vec![10, 20]);

        // +5: both move
        c.pointer_move(25.0, &mut ctx).unwrap();
        assert_eq!(ctx.store.frames_sorted(), vec![15, 25, 40]);

        // +20: 20 -> 40 would land on the unselected keyframe, nothing moves
        let err = c.pointer_move(40.0, &mut ctx).unwrap_err();
        assert!(err.is_collision());
        assert_eq!(ctx.store.frames_sorted(), vec![15, 25, 40]);
        assert_eq!(ctx.selection.frames(), vec![15, 25]);

        // Back to +1: still anchored to the starting frames
        c.pointer_move(21.0, &mut ctx).unwrap();
        assert_eq!(ctx.store.frames_sorted(), vec![11, 21, 40]);
        assert_eq!(c.pointer_up(), PointerOutcome::Released { moved: true });
    }

    #[test]
    fn test_multi_press_that_deselects_does_not_drag() {
        let (mut c, mut store, mut sel, mut clock) = fixture(&[10, 20]);
        let live = ParameterSet::new();
        let mut ctx = ctx!(store, sel, clock, live);

        ctx.selection.replace([10, 20]);
        let out = c.pointer_down(20.0, Modifiers::MULTI, &mut ctx).unwrap();
        assert_eq!(out, PointerOutcome::Deselected { frame: 20 });
        assert_eq!(ctx.selection.frames(), vec![10]);
        assert!(!c.is_dragging());

        assert_eq!(c.pointer_move(35.0, &mut ctx).unwrap(), PointerOutcome::Ignored);
        assert_eq!(ctx.store.frames_sorted(), vec![10, 20]);
    }

    #[test]
    fn test_multi_drag_clamps_at_edges_without_merging() {
        let (mut c, mut store, mut sel, mut clock) = fixture(&[2, 6]);
        let live = ParameterSet::new();
        let mut ctx = ctx!(store, sel, clock, live);

        ctx.selection.replace([2, 6]);
        c.pointer_down(6.0, Modifiers::NONE, &mut ctx).unwrap();
        assert_eq!(ctx.selection.frames(), vec![2, 6]);

        // -4: 2 -> 0 (clamped from -2), 6 -> 2
        c.pointer_move(2.0, &mut ctx).unwrap();
        assert_eq!(ctx.store.frames_sorted(), vec![0, 2]);

        // -10: both clamp to 0, rejected
        assert!(c.pointer_move(-4.0, &mut ctx).is_err());
        assert_eq!(ctx.store.frames_sorted(), vec![0, 2]);
    }

    #[test]
    fn test_up_always_ends_drag() {
        let (mut c, mut store, mut sel, mut clock) = fixture(&[10, 11]);
        let live = ParameterSet::new();
        let mut ctx = ctx!(store, sel, clock, live);

        c.pointer_down(10.0, Modifiers::NONE, &mut ctx).unwrap();
        assert!(c.pointer_move(11.0, &mut ctx).is_err());
        assert_eq!(c.pointer_up(), PointerOutcome::Released { moved: false });
        assert_eq!(c.drag_op(), &DragOperation::Idle);
        assert_eq!(c.pointer_move(50.0, &mut ctx).unwrap(), PointerOutcome::Ignored);
    }

    #[test]
    fn test_place_on_empty_track() {
        let (mut c, mut store, mut sel, mut clock) = fixture(&[10]);
        let live = ParameterSet::new().with("x", 7.0);
        let mut ctx = ctx!(store, sel, clock, live);

        let out = c.pointer_down(60.0, Modifiers::PLACE, &mut ctx).unwrap();
        assert_eq!(out, PointerOutcome::Placed { frame: 60 });
        assert_eq!(ctx.selection.frames(), vec![60]);
        assert_eq!(ctx.store.get(60).and_then(|k| k.value("x")), Some(7.0));
        assert!(!c.is_dragging());
    }

    #[test]
    fn test_place_collision_when_zoomed_out() {
        // 1200 frames on 120 px: neighbouring frames share a pixel
        let mut store = KeyframeStore::new(1200);
        store.capture(500, ParameterSet::new());
        let mut c = DragController::new(TimelineView::new(120.0, 1.0, 0.0));
        let (mut sel, mut clock, live) = (Selection::new(), PlaybackClock::new(1200), ParameterSet::new());
        let mut ctx = ctx!(store, sel, clock, live);

        let err = c.pointer_down(50.04, Modifiers::PLACE, &mut ctx).unwrap_err();
        assert!(matches!(err, TimelineError::Collision { frame: 500 }));
        assert_eq!(ctx.store.len(), 1);
    }

    #[test]
    fn test_scrub_on_empty_track() {
        let (mut c, mut store, mut sel, mut clock) = fixture(&[10]);
        let live = ParameterSet::new();
        let mut ctx = ctx!(store, sel, clock, live);

        ctx.selection.select_only(10);
        let out = c.pointer_down(70.0, Modifiers::NONE, &mut ctx).unwrap();
        assert_eq!(out, PointerOutcome::Scrubbed { frame: 70 });
        assert!(ctx.selection.is_empty());

        c.pointer_move(500.0, &mut ctx).unwrap();
        assert_eq!(ctx.clock.frame(), 120);
        c.pointer_up();
        assert_eq!(c.pointer_move(5.0, &mut ctx).unwrap(), PointerOutcome::Ignored);
    }

    #[test]
    fn test_set_exact_position() {
        let (mut c, mut store, mut sel, mut clock) = fixture(&[10, 20]);
        let live = ParameterSet::new();
        let mut ctx = ctx!(store, sel, clock, live);

        let err = c.set_exact_position(30, &mut ctx).unwrap_err();
        assert!(matches!(err, TimelineError::SelectionNotSingle { count: 0 }));

        ctx.selection.select_only(10);
        assert!(c.set_exact_position(20, &mut ctx).unwrap_err().is_collision());
        assert_eq!(c.set_exact_position(33, &mut ctx).unwrap(), 33);
        assert_eq!(ctx.store.frames_sorted(), vec![20, 33]);
        assert_eq!(ctx.selection.frames(), vec![33]);
    }
}
