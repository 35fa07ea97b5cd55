//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `notemap_core` linkage from a standalone executable.
//! - Show one staged read next to its committed read-back.
//! - Route core log events to a rolling file under the temp directory.

use notemap_core::db::open_db_in_memory;
use notemap_core::{
    default_log_level, init_logging, note_ids, Batch, Note, NoteRecord, NoteStore,
    SqliteNoteStore,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("notemap_core version={}", notemap_core::core_version());
    let log_dir = std::env::temp_dir().join("notemap_cli_logs");
    match init_logging(default_log_level(), &log_dir.to_string_lossy()) {
        Ok(()) => println!("logging to {}", log_dir.display()),
        Err(err) => eprintln!("logging disabled: {err}"),
    }
    match run_demo() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("notemap demo failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_demo() -> Result<(), Box<dyn Error>> {
    let mut conn = open_db_in_memory()?;
    let mut store = SqliteNoteStore::try_new(&mut conn)?;
    store.insert_note(&NoteRecord::with_value(1, "inbox", 0))?;
    // Commits only edit notes that already hold an id.
    store.insert_note(&NoteRecord::empty(2))?;

    let batch = Batch::with_base(&store);
    let inbox = batch.note(1);
    inbox.add_content(2).set_value("first staged note", 0);
    inbox.set_value("inbox (draft)", 0);

    let (lexical, _) = inbox.value()?;
    println!(
        "staged value={lexical:?} contents={:?} ops={}",
        note_ids(&inbox.contents()?),
        batch.len()
    );

    let operations = batch.into_operations();
    let applied = store.commit(&operations)?;
    let committed = notemap_core::load_note(&store, 1)?;
    println!(
        "committed ops={applied} value={:?} contents={:?}",
        committed.value()?.0,
        note_ids(&committed.contents()?)
    );
    Ok(())
}
