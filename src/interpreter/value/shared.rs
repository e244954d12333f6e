use std::{fmt, ops::Deref, rc::Rc};

use crate::{
    error::AllocError,
    interpreter::alloc::{AllocRef, Charged},
};

/// A reference-counted handle to a heap object.
///
/// Cloning a handle adds a reference and dropping one removes it; when the
/// last counted handle goes away the object's destructor runs and its charge
/// is returned to the allocator. Persistent handles point at immortal objects
/// and are exempt from counting.
pub enum Shared<T: 'static> {
    /// A counted object, charged to an allocator.
    Counted(Rc<Charged<T>>),
    /// An immortal object.
    Persistent(&'static T),
}

impl<T: 'static> Shared<T> {
    /// Charges `size` bytes to `alloc` and wraps `value` with a reference
    /// count of one.
    ///
    /// # Errors
    /// Returns [`AllocError`] if the allocator refuses the request.
    pub fn new(alloc: &AllocRef, value: T, size: usize) -> Result<Self, AllocError> {
        Ok(Self::Counted(Rc::new(Charged::new(alloc, value, size)?)))
    }

    /// Wraps an immortal object.
    #[must_use]
    pub const fn persistent(value: &'static T) -> Self {
        Self::Persistent(value)
    }

    /// The number of counted handles to this object, or `None` if it is
    /// persistent.
    #[must_use]
    pub fn ref_count(&self) -> Option<usize> {
        match self {
            Self::Counted(rc) => Some(Rc::strong_count(rc)),
            Self::Persistent(_) => None,
        }
    }

    /// Whether this handle points at an immortal object.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        matches!(self, Self::Persistent(_))
    }

    /// Whether two handles point at the same object.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        std::ptr::eq::<T>(&**a, &**b)
    }
}

impl<T: 'static> Clone for Shared<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Counted(rc) => Self::Counted(Rc::clone(rc)),
            Self::Persistent(value) => Self::Persistent(value),
        }
    }
}

impl<T: 'static> Deref for Shared<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self {
            Self::Counted(rc) => rc,
            Self::Persistent(value) => value,
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
