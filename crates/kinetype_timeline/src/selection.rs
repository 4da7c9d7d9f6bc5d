// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe selection.

use crate::keyframe::Frame;
use crate::store::KeyframeStore;
use std::collections::BTreeSet;

/// Selected keyframes, by frame.
///
/// Always a subset of the store's frames: the session removes a frame from
/// the selection in the same call that deletes or moves it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    frames: BTreeSet<Frame>,
}

impl Selection {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection becomes `{frame}`
    pub fn select_only(&mut self, frame: Frame) {
        self.frames.clear();
        self.frames.insert(frame);
    }

    /// Click semantics.
    ///
    /// With `multi`, `frame` is added or removed. Without it an unselected
    /// frame replaces the selection, while an already selected frame keeps
    /// the selection as is so the whole group can be dragged.
    pub fn toggle(&mut self, frame: Frame, multi: bool) {
        if multi {
            if !self.frames.remove(&frame) {
                self.frames.insert(frame);
            }
        } else if !self.frames.contains(&frame) {
            self.select_only(frame);
        }
    }

    /// Add a frame
    pub fn add(&mut self, frame: Frame) {
        self.frames.insert(frame);
    }

    /// Remove a frame; returns whether it was selected
    pub fn remove(&mut self, frame: Frame) -> bool {
        self.frames.remove(&frame)
    }

    /// Select every keyframe of the store
    pub fn select_all(&mut self, store: &KeyframeStore) {
        self.frames = store.frames_sorted().into_iter().collect();
    }

    /// Replace the selection
    pub fn replace(&mut self, frames: impl IntoIterator<Item = Frame>) {
        self.frames = frames.into_iter().collect();
    }

    /// Drop frames that no longer hold a keyframe
    pub fn retain_existing(&mut self, store: &KeyframeStore) {
        self.frames.retain(|f| store.contains(*f));
    }

    /// Selection becomes empty
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Whether `frame` is selected
    pub fn contains(&self, frame: Frame) -> bool {
        self.frames.contains(&frame)
    }

    /// Selected frames, ascending
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.iter().copied().collect()
    }

    /// The selected frame when exactly one is selected
    pub fn single(&self) -> Option<Frame> {
        if self.frames.len() == 1 {
            self.frames.first().copied()
        } else {
            None
        }
    }

    /// Number of selected frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether nothing is selected
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Whether every selected frame holds a keyframe in `store`
    pub fn is_subset_of(&self, store: &KeyframeStore) -> bool {
        self.frames.iter().all(|f| store.contains(*f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ParameterSet;

    #[test]
    fn test_toggle_without_modifier() {
        let mut sel = Selection::new();
        sel.toggle(10, false);
        assert_eq!(sel.frames(), vec![10]);

        sel.toggle(20, false);
        assert_eq!(sel.frames(), vec![20]);
    }

    #[test]
    fn test_toggle_keeps_group_when_clicking_selected() {
        let mut sel = Selection::new();
        sel.toggle(10, false);
        sel.toggle(20, true);
        sel.toggle(10, false);
        assert_eq!(sel.frames(), vec![10, 20]);
    }

    #[test]
    fn test_toggle_with_modifier_flips_membership() {
        let mut sel = Selection::new();
        sel.toggle(10, true);
        sel.toggle(20, true);
        assert_eq!(sel.len(), 2);
        sel.toggle(10, true);
        assert_eq!(sel.frames(), vec![20]);
        assert_eq!(sel.single(), Some(20));
    }

    #[test]
    fn test_retain_existing() {
        let mut store = KeyframeStore::new(60);
        store.capture(5, ParameterSet::new());
        store.capture(6, ParameterSet::new());

        let mut sel = Selection::new();
        sel.select_all(&store);
        store.delete(5);
        assert!(!sel.is_subset_of(&store));

        sel.retain_existing(&store);
        assert!(sel.is_subset_of(&store));
        assert_eq!(sel.frames(), vec![6]);
    }
}
