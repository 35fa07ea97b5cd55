//! SQLite-backed note store.
//!
//! # Responsibility
//! - Resolve committed notes for overlays (`Loader`).
//! - Apply committed operation logs atomically (`NoteStore`).
//!
//! # Invariants
//! - Reference sequences are read back ordered by `position ASC`.
//! - `commit` runs in one transaction; a failing operation rolls back
//!   every earlier one.
//! - `commit` only updates existing note rows.
//! - Ids must fit in SQLite's signed 64-bit integers.

use crate::db::{ensure_schema_ready, DbError};
use crate::model::change::Operation;
use crate::model::note::{NoteId, NoteRecord, UNASSIGNED_NOTE_ID};
use crate::repo::loader::{LoadError, LoadResult, Loader};
use crate::repo::store::{first_unassigned, NoteStore, StoreError, StoreResult};
use log::{error, info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::time::Instant;

/// Ordered reference tables attached to a note row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefTable {
    Types,
    Supertypes,
    Contents,
}

impl RefTable {
    const ALL: [Self; 3] = [Self::Types, Self::Supertypes, Self::Contents];

    fn name(self) -> &'static str {
        match self {
            Self::Types => "note_types",
            Self::Supertypes => "note_supertypes",
            Self::Contents => "note_contents",
        }
    }

    fn ids(self, record: &NoteRecord) -> &[NoteId] {
        match self {
            Self::Types => &record.types,
            Self::Supertypes => &record.supertypes,
            Self::Contents => &record.contents,
        }
    }
}

/// Note store over a migrated SQLite connection.
pub struct SqliteNoteStore<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNoteStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> StoreResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn })
    }
}

impl Loader for SqliteNoteStore<'_> {
    fn lookup(&self, id: NoteId) -> LoadResult<NoteRecord> {
        read_record(&*self.conn, id)
    }
}

impl NoteStore for SqliteNoteStore<'_> {
    fn insert_note(&mut self, record: &NoteRecord) -> StoreResult<()> {
        if record.id == UNASSIGNED_NOTE_ID {
            return Err(StoreError::InvalidData(
                "cannot store a note with the unassigned id".to_string(),
            ));
        }

        let key = store_key(record.id)?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO notes (id, lexical, datatype)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (id) DO UPDATE SET
                lexical = excluded.lexical,
                datatype = excluded.datatype,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, record.lexical.as_str(), store_key(record.datatype)?],
        )?;

        for table in RefTable::ALL {
            tx.execute(
                &format!("DELETE FROM {} WHERE note_id = ?1;", table.name()),
                [key],
            )?;
            let sql = format!(
                "INSERT INTO {} (note_id, position, ref_id) VALUES (?1, ?2, ?3);",
                table.name()
            );
            for (position, ref_id) in table.ids(record).iter().enumerate() {
                tx.execute(&sql, params![key, position as i64, store_key(*ref_id)?])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn commit(&mut self, operations: &[Operation]) -> StoreResult<usize> {
        let started_at = Instant::now();
        if let Some(index) = first_unassigned(operations) {
            warn!(
                "event=batch_commit module=repo status=rejected ops={} error_code=unassigned_id index={index} kind={}",
                operations.len(),
                operations[index].kind()
            );
            return Err(StoreError::UnassignedId { index });
        }

        match apply_all(self.conn, operations) {
            Ok(()) => {
                info!(
                    "event=batch_commit module=repo status=ok ops={} duration_ms={}",
                    operations.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(operations.len())
            }
            Err(err) => {
                let kind = err
                    .operation_index()
                    .and_then(|index| operations.get(index))
                    .map_or("none", Operation::kind);
                error!(
                    "event=batch_commit module=repo status=error ops={} kind={kind} duration_ms={} error={err}",
                    operations.len(),
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }
}

fn apply_all(conn: &mut Connection, operations: &[Operation]) -> StoreResult<()> {
    let tx = conn.transaction()?;
    for (index, op) in operations.iter().enumerate() {
        apply_operation(&tx, index, op)?;
    }
    tx.commit()?;
    Ok(())
}

/// Applies one operation inside an open transaction.
///
/// Targets are updated, never inserted; a missing row aborts the commit.
fn apply_operation(conn: &Connection, index: usize, op: &Operation) -> StoreResult<()> {
    let key = store_key(op.target())?;
    let updated = match op {
        Operation::SetValue {
            lexical, datatype, ..
        } => conn.execute(
            "UPDATE notes
             SET lexical = ?2,
                 datatype = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![key, lexical.as_str(), store_key(*datatype)?],
        )?,
        Operation::AddContent { .. } => conn.execute(
            "UPDATE notes
             SET updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            [key],
        )?,
    };
    if updated == 0 {
        return Err(StoreError::NotFound {
            index,
            id: op.target(),
        });
    }

    if let Operation::AddContent { add, .. } = op {
        conn.execute(
            "INSERT INTO note_contents (note_id, position, ref_id)
             VALUES (
                ?1,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM note_contents WHERE note_id = ?1),
                ?2
             );",
            params![key, store_key(*add)?],
        )?;
    }
    Ok(())
}

fn read_record(conn: &Connection, id: NoteId) -> LoadResult<NoteRecord> {
    let key = i64::try_from(id).map_err(|_| LoadError::InvalidData {
        id,
        message: "id exceeds the SQLite integer range".to_string(),
    })?;
    let db_error = |err: rusqlite::Error| LoadError::Db {
        id,
        source: DbError::Sqlite(err),
    };

    let row: Option<(String, i64)> = conn
        .query_row(
            "SELECT lexical, datatype FROM notes WHERE id = ?1;",
            [key],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(db_error)?;
    let Some((lexical, datatype)) = row else {
        return Err(LoadError::NotFound(id));
    };

    Ok(NoteRecord {
        id,
        types: read_refs(conn, RefTable::Types, id, key)?,
        supertypes: read_refs(conn, RefTable::Supertypes, id, key)?,
        lexical,
        datatype: parse_id(id, "notes.datatype", datatype)?,
        contents: read_refs(conn, RefTable::Contents, id, key)?,
    })
}

fn read_refs(
    conn: &Connection,
    table: RefTable,
    id: NoteId,
    key: i64,
) -> LoadResult<Vec<NoteId>> {
    let db_error = |err: rusqlite::Error| LoadError::Db {
        id,
        source: DbError::Sqlite(err),
    };
    let mut stmt = conn
        .prepare(&format!(
            "SELECT ref_id FROM {} WHERE note_id = ?1 ORDER BY position ASC;",
            table.name()
        ))
        .map_err(db_error)?;

    let mut rows = stmt.query([key]).map_err(db_error)?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next().map_err(db_error)? {
        let value: i64 = row.get(0).map_err(db_error)?;
        ids.push(parse_id(id, table.name(), value)?);
    }
    Ok(ids)
}

fn parse_id(id: NoteId, column: &str, value: i64) -> LoadResult<NoteId> {
    NoteId::try_from(value).map_err(|_| LoadError::InvalidData {
        id,
        message: format!("invalid note reference `{value}` in {column}"),
    })
}

fn store_key(id: NoteId) -> StoreResult<i64> {
    i64::try_from(id)
        .map_err(|_| StoreError::InvalidData(format!("note id {id} exceeds the SQLite range")))
}
