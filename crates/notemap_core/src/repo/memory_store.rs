//! In-memory note store.

use crate::model::change::Operation;
use crate::model::note::{NoteId, NoteRecord, UNASSIGNED_NOTE_ID};
use crate::repo::loader::{LoadError, LoadResult, Loader};
use crate::repo::store::{first_unassigned, NoteStore, StoreError, StoreResult};
use std::collections::BTreeMap;

/// `BTreeMap`-backed note store, mostly useful as a base for tests and
/// short-lived note maps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryNoteStore {
    notes: BTreeMap<NoteId, NoteRecord>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn contains(&self, id: NoteId) -> bool {
        self.notes.contains_key(&id)
    }
}

impl FromIterator<NoteRecord> for MemoryNoteStore {
    fn from_iter<I: IntoIterator<Item = NoteRecord>>(iter: I) -> Self {
        Self {
            notes: iter
                .into_iter()
                .map(|record| (record.id, record))
                .collect(),
        }
    }
}

impl Loader for MemoryNoteStore {
    fn lookup(&self, id: NoteId) -> LoadResult<NoteRecord> {
        self.notes.get(&id).cloned().ok_or(LoadError::NotFound(id))
    }
}

impl NoteStore for MemoryNoteStore {
    fn insert_note(&mut self, record: &NoteRecord) -> StoreResult<()> {
        if record.id == UNASSIGNED_NOTE_ID {
            return Err(StoreError::InvalidData(
                "cannot store a note with the unassigned id".to_string(),
            ));
        }
        self.notes.insert(record.id, record.clone());
        Ok(())
    }

    fn commit(&mut self, operations: &[Operation]) -> StoreResult<usize> {
        // Checked up front so a rejected commit leaves the map untouched.
        if let Some(index) = first_unassigned(operations) {
            return Err(StoreError::UnassignedId { index });
        }
        if let Some((index, op)) = operations
            .iter()
            .enumerate()
            .find(|(_, op)| !self.contains(op.target()))
        {
            return Err(StoreError::NotFound {
                index,
                id: op.target(),
            });
        }

        for op in operations {
            if let Some(record) = self.notes.get_mut(&op.target()) {
                record.apply(op);
            }
        }
        Ok(operations.len())
    }
}
