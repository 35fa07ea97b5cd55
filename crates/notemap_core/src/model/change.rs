//! Staged operation model.
//!
//! # Responsibility
//! - Describe one pending edit to a note map as an immutable value.
//! - Keep the wire shape stable for commit layers that encode operations.
//!
//! # Invariants
//! - Every variant targets exactly one note, returned by `target()`.
//! - Operations are never rewritten after they are appended to a batch.

use crate::model::note::NoteId;
use serde::{Deserialize, Serialize};

/// One staged edit.
///
/// Matched exhaustively wherever a log is interpreted, so a new variant has
/// to be handled by every replay site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Replaces the scalar value and datatype reference of note `id`.
    SetValue {
        id: NoteId,
        lexical: String,
        datatype: NoteId,
    },
    /// Appends `add` to the content sequence of note `id`.
    AddContent { id: NoteId, add: NoteId },
}

impl Operation {
    pub fn set_value(id: NoteId, lexical: impl Into<String>, datatype: NoteId) -> Self {
        Self::SetValue {
            id,
            lexical: lexical.into(),
            datatype,
        }
    }

    pub fn add_content(id: NoteId, add: NoteId) -> Self {
        Self::AddContent { id, add }
    }

    /// Note edited by this operation.
    pub fn target(&self) -> NoteId {
        match self {
            Self::SetValue { id, .. } | Self::AddContent { id, .. } => *id,
        }
    }

    /// Returns whether replaying this operation can change note `id`.
    pub fn affects(&self, id: NoteId) -> bool {
        self.target() == id
    }

    /// Stable short name used in `batch_commit` log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetValue { .. } => "set_value",
            Self::AddContent { .. } => "add_content",
        }
    }
}
