//! Pending operation log over a base note map.
//!
//! # Responsibility
//! - Own the ordered log of staged operations.
//! - Hold an optional, borrowed base loader and resolve it per read.
//! - Hand out overlay views bound to one note id.
//!
//! # Invariants
//! - Operations are only appended through shared access; the log is never
//!   reordered or rewritten. Truncation needs exclusive access, so no view
//!   can observe it mid-read.
//! - The base is never mutated, and the empty-loader fallback is resolved
//!   on every call instead of being stored.

use crate::model::change::Operation;
use crate::model::note::NoteId;
use crate::repo::loader::{Loader, EMPTY_LOADER};
use crate::stage::overlay::OverlayView;
use std::cell::{Ref, RefCell};
use std::fmt::{Debug, Formatter};

/// A set of changes that might be made to a note map.
///
/// `Batch::default()` describes no changes to an empty note map.
///
/// The log uses interior mutability so views borrowed from the batch can
/// append to it. A batch is therefore `!Sync`; callers that append from
/// several threads must use one batch per thread or serialize access.
#[derive(Default)]
pub struct Batch<'l> {
    operations: RefCell<Vec<Operation>>,
    base: Option<&'l dyn Loader>,
}

impl<'l> Batch<'l> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty batch staged over `base`.
    pub fn with_base(base: &'l dyn Loader) -> Self {
        Self {
            operations: RefCell::default(),
            base: Some(base),
        }
    }

    /// Replaces the base loader. `None` falls back to the empty loader.
    pub fn set_base(&mut self, base: Option<&'l dyn Loader>) {
        self.base = base;
    }

    /// Configured base loader, without the empty fallback.
    pub fn base(&self) -> Option<&'l dyn Loader> {
        self.base
    }

    /// Returns the configured base, or the canonical empty loader.
    pub fn resolved_base(&self) -> &dyn Loader {
        match self.base {
            Some(base) => base,
            None => &EMPTY_LOADER,
        }
    }

    /// Appends `op` to the end of the log.
    pub fn append(&self, op: Operation) -> &Self {
        self.operations.borrow_mut().push(op);
        self
    }

    /// Returns a view of note `id` with this batch applied.
    ///
    /// The id is not checked; reads of an unknown id fail at the base.
    pub fn note(&self, id: NoteId) -> OverlayView<'_> {
        OverlayView::new(self, id)
    }

    /// Snapshot of the current log in append order.
    pub fn operations(&self) -> Vec<Operation> {
        self.operations.borrow().clone()
    }

    /// Borrows the log for a replay. The guard must not outlive the read
    /// that took it.
    pub(crate) fn replay(&self) -> Ref<'_, [Operation]> {
        Ref::map(self.operations.borrow(), Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.operations.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.borrow().is_empty()
    }

    /// Drops every operation after the first `len`, undoing later edits.
    ///
    /// Has no effect when `len` is not shorter than the log.
    pub fn truncate(&mut self, len: usize) {
        self.operations.get_mut().truncate(len);
    }

    /// Consumes the batch, handing the log to a commit layer.
    pub fn into_operations(self) -> Vec<Operation> {
        self.operations.into_inner()
    }
}

impl Debug for Batch<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batch")
            .field("operations", &*self.operations.borrow())
            .field("has_base", &self.base.is_some())
            .finish()
    }
}
