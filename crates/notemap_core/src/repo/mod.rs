//! Committed note state: read contracts, write contracts and stores.
//!
//! # Responsibility
//! - Define the `Loader` / `Note` read capability consumed by overlays.
//! - Define the `NoteStore` commit contract.
//! - Provide in-memory and SQLite store implementations.
//!
//! # Invariants
//! - Reads never mutate stored state.
//! - Lookup failures carry the id that was requested.

pub mod loader;
pub mod memory_store;
pub mod sqlite_store;
pub mod store;
