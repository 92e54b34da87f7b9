//! Reference-counted heap wrapper for value payloads.

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// A shared, immutable heap allocation.
///
/// All heap payloads in `Value` go through this wrapper so construction is
/// funneled through the `Value` factory methods. Uses `Rc` rather than
/// `Arc`: the evaluator is single-threaded by contract.
#[repr(transparent)]
pub struct Heap<T>(Rc<T>);

impl<T> Heap<T> {
    /// Allocate a new heap value.
    #[inline]
    pub(crate) fn new(value: T) -> Self {
        Heap(Rc::new(value))
    }

    /// Identity comparison: do both handles point at the same allocation?
    #[inline]
    pub fn ptr_eq(a: &Heap<T>, b: &Heap<T>) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl<T> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Rc::clone(&self.0))
    }
}

impl<T> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<T: PartialEq> PartialEq for Heap<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
