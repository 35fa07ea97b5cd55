//! Committed note record.
//!
//! # Responsibility
//! - Define the plain attribute shape a `Loader` resolves for one note id.
//! - Provide the committed-state semantics of each staged operation.
//!
//! # Invariants
//! - `UNASSIGNED_NOTE_ID` (`0`) never identifies a stored note.
//! - `contents` order is significant and only ever extended by `apply`.

use crate::model::change::Operation;
use serde::{Deserialize, Serialize};

/// Stable note identifier.
pub type NoteId = u64;

/// Reserved id meaning "not yet assigned".
pub const UNASSIGNED_NOTE_ID: NoteId = 0;

/// Committed attributes of one note.
///
/// References to other notes are kept as ids; read handles resolve them
/// lazily through the loader that produced this record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: NoteId,
    /// Type references, in assignment order.
    pub types: Vec<NoteId>,
    /// Supertype references, in assignment order.
    pub supertypes: Vec<NoteId>,
    /// Lexical form of the scalar value.
    pub lexical: String,
    /// Datatype reference for `lexical`. `0` when unset.
    pub datatype: NoteId,
    /// Ordered content (child) references.
    pub contents: Vec<NoteId>,
}

impl NoteRecord {
    /// Returns a record with no attributes.
    pub fn empty(id: NoteId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Returns a record holding only a scalar value.
    pub fn with_value(id: NoteId, lexical: impl Into<String>, datatype: NoteId) -> Self {
        Self {
            id,
            lexical: lexical.into(),
            datatype,
            ..Self::default()
        }
    }

    /// Applies one operation as a commit would.
    ///
    /// Operations targeting another note are ignored.
    pub fn apply(&mut self, op: &Operation) {
        if !op.affects(self.id) {
            return;
        }
        match op {
            Operation::SetValue {
                lexical, datatype, ..
            } => {
                self.lexical.clone_from(lexical);
                self.datatype = *datatype;
            }
            Operation::AddContent { add, .. } => self.contents.push(*add),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NoteRecord;
    use crate::model::change::Operation;

    #[test]
    fn apply_ignores_operations_for_other_notes() {
        let mut record = NoteRecord::with_value(7, "kept", 3);
        record.apply(&Operation::set_value(8, "other", 4));
        record.apply(&Operation::add_content(8, 9));

        assert_eq!(record, NoteRecord::with_value(7, "kept", 3));
    }

    #[test]
    fn apply_replaces_value_and_appends_contents() {
        let mut record = NoteRecord::empty(7);
        record.apply(&Operation::add_content(7, 10));
        record.apply(&Operation::set_value(7, "a", 2));
        record.apply(&Operation::add_content(7, 11));
        record.apply(&Operation::set_value(7, "b", 3));

        assert_eq!(record.lexical, "b");
        assert_eq!(record.datatype, 3);
        assert_eq!(record.contents, vec![10, 11]);
    }
}
