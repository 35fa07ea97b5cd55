//! Staged changes over an immutable note map.
//!
//! # Responsibility
//! - Collect pending edits in a `Batch` without touching the base.
//! - Read any note as if the batch were already committed through
//!   `OverlayView`.
//!
//! # Invariants
//! - Observed state is a pure function of (base state, log prefix) and is
//!   recomputed on every read.
//! - Only the log order decides which staged write wins.

pub mod batch;
pub mod overlay;
