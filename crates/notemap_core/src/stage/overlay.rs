//! Per-note view of a batch applied over its base.
//!
//! # Responsibility
//! - Read the hypothetical state of one note as if its batch were
//!   committed.
//! - Stage edits to that note by appending to the batch.
//!
//! # Invariants
//! - Every read loads the base note first; a failed lookup returns before
//!   the log is scanned.
//! - Reads scan the whole log in append order on every call. Nothing is
//!   memoized, so edits appended between reads are always visible.
//! - Mutations never target `UNASSIGNED_NOTE_ID`.

use crate::model::change::Operation;
use crate::model::note::{NoteId, UNASSIGNED_NOTE_ID};
use crate::repo::loader::{load_note, LoadResult, Note, NoteBox};
use crate::stage::batch::Batch;

/// Read/write projection of one note under a batch.
///
/// Views are plain `(batch, id)` pairs: cheap to copy, never owning the
/// batch and never caching what they read.
#[derive(Debug, Clone, Copy)]
pub struct OverlayView<'a> {
    batch: &'a Batch<'a>,
    id: NoteId,
}

impl<'a> OverlayView<'a> {
    pub(crate) fn new(batch: &'a Batch<'a>, id: NoteId) -> Self {
        Self { batch, id }
    }

    /// Batch this view reads through and appends to.
    pub fn batch(&self) -> &'a Batch<'a> {
        self.batch
    }

    /// Stages a replacement of this note's value and datatype.
    ///
    /// The new value is visible to subsequent `value()` calls only.
    ///
    /// # Panics
    /// - When this view targets the unassigned id `0`.
    pub fn set_value(&self, lexical: impl Into<String>, datatype: NoteId) {
        self.assert_assigned();
        self.batch
            .append(Operation::set_value(self.id, lexical, datatype));
    }

    /// Stages appending `child` to this note's contents.
    ///
    /// Returns a view of `child` on the same batch so nested edits chain.
    ///
    /// # Panics
    /// - When this view targets the unassigned id `0`.
    pub fn add_content(&self, child: NoteId) -> OverlayView<'a> {
        self.assert_assigned();
        self.batch.append(Operation::add_content(self.id, child));
        Self::new(self.batch, child)
    }

    fn assert_assigned(&self) {
        assert!(
            self.id != UNASSIGNED_NOTE_ID,
            "cannot stage edits for a note whose id is still unassigned (0)"
        );
    }

    fn base_note(&self) -> LoadResult<NoteBox<'a>> {
        load_note(self.batch.resolved_base(), self.id)
    }
}

impl<'a> Note<'a> for OverlayView<'a> {
    fn id(&self) -> NoteId {
        self.id
    }

    // No staged operation edits types; they are read from the base as is.
    fn types(&self) -> LoadResult<Vec<NoteBox<'a>>> {
        self.base_note()?.types()
    }

    fn supertypes(&self) -> LoadResult<Vec<NoteBox<'a>>> {
        self.base_note()?.supertypes()
    }

    fn value(&self) -> LoadResult<(String, NoteBox<'a>)> {
        let (mut lexical, base_datatype) = self.base_note()?.value()?;
        let mut datatype = base_datatype.id();

        for op in self.batch.replay().iter() {
            if !op.affects(self.id) {
                continue;
            }
            match op {
                Operation::SetValue {
                    lexical: staged_lexical,
                    datatype: staged_datatype,
                    ..
                } => {
                    lexical.clone_from(staged_lexical);
                    datatype = *staged_datatype;
                }
                Operation::AddContent { .. } => {}
            }
        }

        let datatype: NoteBox<'a> = Box::new(self.batch.note(datatype));
        Ok((lexical, datatype))
    }

    fn contents(&self) -> LoadResult<Vec<NoteBox<'a>>> {
        let mut contents = self.base_note()?.contents()?;

        for op in self.batch.replay().iter() {
            if !op.affects(self.id) {
                continue;
            }
            match op {
                Operation::AddContent { add, .. } => {
                    contents.push(Box::new(self.batch.note(*add)));
                }
                Operation::SetValue { .. } => {}
            }
        }

        Ok(contents)
    }
}
