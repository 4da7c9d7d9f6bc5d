// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history of keyframe edits.
//!
//! Each edit keeps encoded images of the keyframe store before and after it.
//! Undo and redo decode one of those images and hand it back to the session.

use crate::store::KeyframeStore;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

/// Default undo history depth
pub const MAX_HISTORY: usize = 100;

/// History errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Nothing to undo
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Nothing to redo
    #[error("Nothing to redo")]
    NothingToRedo,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Unique edit ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditId(u64);

impl EditId {
    /// Get the raw ID value
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Encoded keyframe store
#[derive(Debug, Clone)]
pub struct StoreImage {
    data: Vec<u8>,
}

impl StoreImage {
    /// Encode a store
    pub fn capture(store: &KeyframeStore) -> Result<Self> {
        Ok(Self {
            data: bincode::serialize(store)?,
        })
    }

    /// Decode back into a store
    pub fn restore(&self) -> Result<KeyframeStore> {
        Ok(bincode::deserialize(&self.data)?)
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// A recorded edit
#[derive(Debug, Clone)]
pub struct Edit {
    /// Unique edit ID
    pub id: EditId,
    /// Human-readable description
    pub description: String,
    /// Store before the edit (for undo)
    pub before: StoreImage,
    /// Store after the edit (for redo)
    pub after: StoreImage,
}

impl Edit {
    /// Get memory size of this edit
    pub fn memory_size(&self) -> usize {
        self.before.size() + self.after.size()
    }
}

/// History statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryStats {
    /// Edits in the undo stack
    pub undo_count: usize,
    /// Edits in the redo stack
    pub redo_count: usize,
    /// Total memory used by history (bytes)
    pub memory_used: usize,
    /// Maximum history depth
    pub max_depth: usize,
}

/// Undo/redo history manager
#[derive(Debug)]
pub struct History {
    /// Undo stack
    undo_stack: VecDeque<Edit>,
    /// Redo stack
    redo_stack: VecDeque<Edit>,
    /// Next edit ID
    next_id: u64,
    /// Maximum history depth
    max_depth: usize,
    /// Total memory used
    memory_used: usize,
}

impl History {
    /// Create a history manager
    pub fn new() -> Self {
        Self::with_max_depth(MAX_HISTORY)
    }

    /// Create with custom maximum depth
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            next_id: 1,
            max_depth: max_depth.max(1),
            memory_used: 0,
        }
    }

    /// Record an edit. Identical before/after stores are not recorded.
    pub fn record(
        &mut self,
        description: impl Into<String>,
        before: &KeyframeStore,
        after: &KeyframeStore,
    ) -> Result<Option<EditId>> {
        if before == after {
            return Ok(None);
        }

        let id = EditId(self.next_id);
        self.next_id += 1;
        let edit = Edit {
            id,
            description: description.into(),
            before: StoreImage::capture(before)?,
            after: StoreImage::capture(after)?,
        };

        self.redo_stack.clear();
        self.memory_used += edit.memory_size();
        self.undo_stack.push_back(edit);

        // Enforce history limit
        while self.undo_stack.len() > self.max_depth {
            if let Some(old) = self.undo_stack.pop_front() {
                self.memory_used = self.memory_used.saturating_sub(old.memory_size());
            }
        }

        Ok(Some(id))
    }

    /// Undo the last edit, returning the store to restore
    pub fn undo(&mut self) -> Result<KeyframeStore> {
        let edit = self
            .undo_stack
            .back()
            .ok_or(HistoryError::NothingToUndo)?;
        let store = edit.before.restore()?;

        if let Some(edit) = self.undo_stack.pop_back() {
            self.memory_used = self.memory_used.saturating_sub(edit.memory_size());
            self.redo_stack.push_back(edit);
        }
        Ok(store)
    }

    /// Redo the last undone edit, returning the store to restore
    pub fn redo(&mut self) -> Result<KeyframeStore> {
        let edit = self
            .redo_stack
            .back()
            .ok_or(HistoryError::NothingToRedo)?;
        let store = edit.after.restore()?;

        if let Some(edit) = self.redo_stack.pop_back() {
            self.memory_used += edit.memory_size();
            self.undo_stack.push_back(edit);
        }
        Ok(store)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.memory_used = 0;
    }

    /// Get history statistics
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            undo_count: self.undo_stack.len(),
            redo_count: self.redo_stack.len(),
            memory_used: self.memory_used,
            max_depth: self.max_depth,
        }
    }

    /// Get description of next undo edit
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|e| e.description.as_str())
    }

    /// Get description of next redo edit
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|e| e.description.as_str())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
