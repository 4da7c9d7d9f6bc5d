// SPDX-License-Identifier: MIT OR Apache-2.0
//! Saved timelines.
//!
//! A document holds the frame count, the parameter names of the session and
//! every keyframe. Saving and loading a document reproduces the store
//! exactly. RON is the native format; JSON is accepted for exchange with
//! browser tooling.

use crate::keyframe::{Frame, Keyframe};
use crate::store::KeyframeStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Current document format version
pub const DOCUMENT_FORMAT_VERSION: u32 = 1;

/// Document errors
#[derive(Debug, Error)]
pub enum DocumentError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// RON parse error
    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    /// RON write error
    #[error("RON write error: {0}")]
    RonWrite(#[from] ron::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Written by an incompatible version
    #[error("Unsupported document version {found} (expected {})", DOCUMENT_FORMAT_VERSION)]
    Version {
        /// Version found in the file
        found: u32,
    },

    /// Frame count below 1
    #[error("Document declares {0} total frames")]
    InvalidFrameCount(Frame),
}

/// On-disk format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Rusty Object Notation
    Ron,
    /// JSON
    Json,
}

impl DocumentFormat {
    /// Pick a format from a file extension; anything but `.json` is RON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Ron,
        }
    }
}

/// Serializable timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineDocument {
    /// Format version
    pub version: u32,
    /// Last frame of the timeline
    pub total_frames: Frame,
    /// Parameter names of the authoring session
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Keyframes by frame
    pub keyframes: BTreeMap<Frame, Keyframe>,
}

impl TimelineDocument {
    /// Build a document from a store
    pub fn from_store<'a>(
        store: &KeyframeStore,
        parameters: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            version: DOCUMENT_FORMAT_VERSION,
            total_frames: store.total_frames(),
            parameters: parameters.into_iter().map(str::to_string).collect(),
            keyframes: store.iter().map(|(f, k)| (f, k.clone())).collect(),
        }
    }

    /// Rebuild the store.
    ///
    /// Keyframes past `total_frames` are clamped onto the last frame, the
    /// later one winning.
    pub fn to_store(&self) -> Result<KeyframeStore, DocumentError> {
        self.check()?;
        let mut store = KeyframeStore::new(self.total_frames);
        for (frame, keyframe) in &self.keyframes {
            store.insert(i64::from(*frame), keyframe.clone());
        }
        Ok(store)
    }

    fn check(&self) -> Result<(), DocumentError> {
        if self.version != DOCUMENT_FORMAT_VERSION {
            return Err(DocumentError::Version { found: self.version });
        }
        if self.total_frames < 1 {
            return Err(DocumentError::InvalidFrameCount(self.total_frames));
        }
        Ok(())
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, DocumentError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Deserialize from RON format
    pub fn from_ron(s: &str) -> Result<Self, DocumentError> {
        let doc: Self = ron::from_str(s)?;
        doc.check()?;
        Ok(doc)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON
    pub fn from_json(s: &str) -> Result<Self, DocumentError> {
        let doc: Self = serde_json::from_str(s)?;
        doc.check()?;
        Ok(doc)
    }

    /// Save to a file, format chosen by extension
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let contents = match DocumentFormat::from_path(path) {
            DocumentFormat::Ron => self.to_ron()?,
            DocumentFormat::Json => self.to_json()?,
        };
        std::fs::write(path, contents)?;
        tracing::info!(keyframes = self.keyframes.len(), "Saved timeline to {}", path.display());
        Ok(())
    }

    /// Load from a file, format chosen by extension
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let contents = std::fs::read_to_string(path)?;
        let doc = match DocumentFormat::from_path(path) {
            DocumentFormat::Ron => Self::from_ron(&contents)?,
            DocumentFormat::Json => Self::from_json(&contents)?,
        };
        tracing::info!(keyframes = doc.keyframes.len(), "Loaded timeline from {}", path.display());
        Ok(doc)
    }
}
