//! Read-side contracts for committed note state.
//!
//! # Responsibility
//! - Define the `Loader` contract that resolves a note id to its committed
//!   attributes.
//! - Define the `Note` read capability shared by committed notes and
//!   staged overlay views.
//! - Provide the canonical empty loader.
//!
//! # Invariants
//! - Loaders are read-only: a lookup never mutates stored state.
//! - Lookup errors are tagged with the id that was requested.
//! - Note handles resolve references lazily; holding a handle does not
//!   pin any stored state.

use crate::db::DbError;
use crate::model::note::{NoteId, NoteRecord};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

pub type LoadResult<T> = Result<T, LoadError>;

/// Failure to resolve one note id.
#[derive(Debug)]
pub enum LoadError {
    /// No committed note exists for the id.
    NotFound(NoteId),
    /// Underlying storage failed while reading the id.
    Db { id: NoteId, source: DbError },
    /// Persisted state for the id cannot be converted to a record.
    InvalidData { id: NoteId, message: String },
}

impl LoadError {
    /// Id whose lookup failed.
    pub fn id(&self) -> NoteId {
        match self {
            Self::NotFound(id) | Self::Db { id, .. } | Self::InvalidData { id, .. } => *id,
        }
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Db { id, source } => write!(f, "failed to load note {id}: {source}"),
            Self::InvalidData { id, message } => {
                write!(f, "invalid persisted data for note {id}: {message}")
            }
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db { source, .. } => Some(source),
            Self::NotFound(_) | Self::InvalidData { .. } => None,
        }
    }
}

/// Owned handle to any note implementation living at least as long as `'a`.
pub type NoteBox<'a> = Box<dyn Note<'a> + 'a>;

/// Read capability of one note.
///
/// `'a` is the lifetime of whatever the note reads through (a loader or a
/// batch). Returned handles borrow that source, not `self`, so they can
/// outlive the handle that produced them.
pub trait Note<'a> {
    fn id(&self) -> NoteId;
    fn types(&self) -> LoadResult<Vec<NoteBox<'a>>>;
    fn supertypes(&self) -> LoadResult<Vec<NoteBox<'a>>>;
    /// Lexical value and datatype note.
    fn value(&self) -> LoadResult<(String, NoteBox<'a>)>;
    fn contents(&self) -> LoadResult<Vec<NoteBox<'a>>>;
}

impl Debug for dyn Note<'_> + '_ {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Note({})", self.id())
    }
}

/// Source of committed note state.
pub trait Loader {
    /// Resolves the committed attributes of `id`.
    ///
    /// # Errors
    /// - `LoadError::NotFound` when the id is unknown to this loader.
    /// - `LoadError::Db` / `LoadError::InvalidData` on storage failures.
    fn lookup(&self, id: NoteId) -> LoadResult<NoteRecord>;
}

/// Loads `id` from `loader` and wraps it as a `Note`.
pub fn load_note(loader: &dyn Loader, id: NoteId) -> LoadResult<NoteBox<'_>> {
    let record = loader.lookup(id)?;
    Ok(Box::new(LoadedNote { loader, record }))
}

/// Returns the ids of `notes`, preserving order.
pub fn note_ids(notes: &[NoteBox<'_>]) -> Vec<NoteId> {
    notes.iter().map(|note| note.id()).collect()
}

/// Loader that knows no notes.
///
/// Every lookup resolves to an attribute-less record, which is how an
/// empty note map answers for an id it has never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyLoader;

/// Canonical empty loader instance.
pub static EMPTY_LOADER: EmptyLoader = EmptyLoader;

impl Loader for EmptyLoader {
    fn lookup(&self, id: NoteId) -> LoadResult<NoteRecord> {
        Ok(NoteRecord::empty(id))
    }
}

/// Committed note backed by an already loaded record.
pub struct LoadedNote<'a> {
    loader: &'a dyn Loader,
    record: NoteRecord,
}

impl<'a> LoadedNote<'a> {
    fn refs(&self, ids: &[NoteId]) -> Vec<NoteBox<'a>> {
        ids.iter()
            .map(|&id| Box::new(NoteRef::new(self.loader, id)) as NoteBox<'a>)
            .collect()
    }
}

impl<'a> Note<'a> for LoadedNote<'a> {
    fn id(&self) -> NoteId {
        self.record.id
    }

    fn types(&self) -> LoadResult<Vec<NoteBox<'a>>> {
        Ok(self.refs(&self.record.types))
    }

    fn supertypes(&self) -> LoadResult<Vec<NoteBox<'a>>> {
        Ok(self.refs(&self.record.supertypes))
    }

    fn value(&self) -> LoadResult<(String, NoteBox<'a>)> {
        let datatype: NoteBox<'a> = Box::new(NoteRef::new(self.loader, self.record.datatype));
        Ok((self.record.lexical.clone(), datatype))
    }

    fn contents(&self) -> LoadResult<Vec<NoteBox<'a>>> {
        Ok(self.refs(&self.record.contents))
    }
}

/// Unresolved reference to a committed note.
///
/// Each read performs a fresh lookup, so a missing target only fails when
/// its attributes are actually read.
#[derive(Clone, Copy)]
pub struct NoteRef<'a> {
    loader: &'a dyn Loader,
    id: NoteId,
}

impl<'a> NoteRef<'a> {
    pub fn new(loader: &'a dyn Loader, id: NoteId) -> Self {
        Self { loader, id }
    }
}

impl<'a> Note<'a> for NoteRef<'a> {
    fn id(&self) -> NoteId {
        self.id
    }

    fn types(&self) -> LoadResult<Vec<NoteBox<'a>>> {
        load_note(self.loader, self.id)?.types()
    }

    fn supertypes(&self) -> LoadResult<Vec<NoteBox<'a>>> {
        load_note(self.loader, self.id)?.supertypes()
    }

    fn value(&self) -> LoadResult<(String, NoteBox<'a>)> {
        load_note(self.loader, self.id)?.value()
    }

    fn contents(&self) -> LoadResult<Vec<NoteBox<'a>>> {
        load_note(self.loader, self.id)?.contents()
    }
}
