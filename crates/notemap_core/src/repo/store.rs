//! Write-side contracts for committed note state.
//!
//! # Responsibility
//! - Define how a finished operation log becomes durable note state.
//! - Share one error type across store implementations.
//!
//! # Invariants
//! - `commit` applies operations in log order and is all-or-nothing.
//! - Operations targeting `UNASSIGNED_NOTE_ID` are rejected, never stored.
//! - Committing never creates notes: every target must already be stored,
//!   mirroring the overlay, whose reads fail for ids missing from the base.

use crate::db::DbError;
use crate::model::change::Operation;
use crate::model::note::{NoteId, NoteRecord, UNASSIGNED_NOTE_ID};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from note store writes and bootstrap.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Operation at `index` targets the reserved unassigned id.
    UnassignedId { index: usize },
    /// Operation at `index` targets a note the store does not hold.
    NotFound { index: usize, id: NoteId },
    /// Value cannot be represented by the store.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UnassignedId { index } => {
                write!(f, "operation {index} targets the unassigned note id 0")
            }
            Self::NotFound { index, id } => {
                write!(f, "operation {index} targets missing note {id}")
            }
            Self::InvalidData(message) => write!(f, "invalid note data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UnassignedId { .. } | Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl StoreError {
    /// Index of the operation that was rejected, when one is to blame.
    pub fn operation_index(&self) -> Option<usize> {
        match self {
            Self::UnassignedId { index } | Self::NotFound { index, .. } => Some(*index),
            Self::Db(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable note state that accepts committed batches.
pub trait NoteStore {
    /// Stores `record`, replacing every attribute of an existing note.
    fn insert_note(&mut self, record: &NoteRecord) -> StoreResult<()>;
    /// Applies `operations` in order and returns how many were applied.
    ///
    /// # Errors
    /// - `UnassignedId` / `NotFound` when a target cannot be edited; nothing
    ///   is written in that case.
    fn commit(&mut self, operations: &[Operation]) -> StoreResult<usize>;
}

/// Returns the index of the first operation targeting the unassigned id.
pub(crate) fn first_unassigned(operations: &[Operation]) -> Option<usize> {
    operations
        .iter()
        .position(|op| op.target() == UNASSIGNED_NOTE_ID)
}
