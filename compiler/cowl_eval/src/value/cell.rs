//! Owner-counted storage for compound values.

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// The unit of copy-on-write.
///
/// Every handle to the same storage is one logical owner: a binding, a
/// parameter slot, an element of another compound, or a temporary the
/// evaluator is holding. Handles are created with
/// [`clone_handle`](SharedCell::clone_handle) and release their ownership on
/// drop, so the owner count is exactly the number of live handles.
///
/// Storage is only ever mutated through [`get_mut`](SharedCell::get_mut),
/// which refuses unless the calling handle is the sole owner. Deciding what
/// to do when it refuses (copying first) belongs to
/// [`crate::ownership`].
pub struct SharedCell<T>(Rc<T>);

impl<T> SharedCell<T> {
    /// Wrap freshly built storage; the new cell has exactly one owner.
    #[inline]
    pub(crate) fn new(value: T) -> Self {
        SharedCell(Rc::new(value))
    }

    /// Create another logical owner of the same storage. Never copies.
    #[inline]
    #[must_use]
    pub fn clone_handle(&self) -> Self {
        SharedCell(Rc::clone(&self.0))
    }

    /// Number of handles currently sharing this storage.
    #[inline]
    pub fn owner_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Whether this handle is the only owner.
    #[inline]
    pub fn is_unique(&self) -> bool {
        self.owner_count() == 1
    }

    /// Whether two handles share the same storage.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Mutable access, granted only to a sole owner.
    #[inline]
    pub(crate) fn get_mut(&mut self) -> Option<&mut T> {
        Rc::get_mut(&mut self.0)
    }
}

impl<T> Clone for SharedCell<T> {
    #[inline]
    fn clone(&self) -> Self {
        self.clone_handle()
    }
}

impl<T> Deref for SharedCell<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
