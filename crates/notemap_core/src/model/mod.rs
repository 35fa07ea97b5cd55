//! Domain model for committed notes and staged changes.
//!
//! # Responsibility
//! - Define the committed attribute shape of one note.
//! - Define the closed set of operations a batch can stage.
//!
//! # Invariants
//! - Note ids are `u64`; `0` is reserved as "not yet assigned".
//! - Operations carry ids only, never resolved note handles.

pub mod change;
pub mod note;
