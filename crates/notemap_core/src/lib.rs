//! Core domain logic for notemap.
//!
//! Stages edits to a graph of interlinked notes and reads the resulting
//! state without touching the committed note map.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod stage;

pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::change::Operation;
pub use model::note::{NoteId, NoteRecord, UNASSIGNED_NOTE_ID};
pub use repo::loader::{
    load_note, note_ids, EmptyLoader, LoadError, LoadResult, LoadedNote, Loader, Note, NoteBox,
    NoteRef, EMPTY_LOADER,
};
pub use repo::memory_store::MemoryNoteStore;
pub use repo::sqlite_store::SqliteNoteStore;
pub use repo::store::{NoteStore, StoreError, StoreResult};
pub use stage::batch::Batch;
pub use stage::overlay::OverlayView;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
