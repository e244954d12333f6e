use std::{
    cell::Cell,
    ops::{Deref, DerefMut},
    rc::Rc,
};

use tracing::{trace, warn};

use crate::error::AllocError;

/// A `realloc`-shaped allocation hook.
///
/// Every object, tree node, table entry and bucket array created by a
/// [`State`](crate::interpreter::state::State) reports its footprint through
/// the state's allocator. Storage itself comes from the global allocator; the
/// hook decides whether a request is admitted and keeps whatever accounting it
/// wants.
///
/// The request is described by the old and new sizes:
/// - `old_size == 0, new_size > 0`: allocate.
/// - `old_size > 0, new_size > 0`: resize.
/// - `new_size == 0`: free. Freeing always succeeds.
pub trait Allocator {
    /// Admits or refuses a request.
    ///
    /// # Errors
    /// Returns [`AllocError`] when a nonzero request is refused.
    fn realloc(&self, old_size: usize, new_size: usize) -> Result<(), AllocError>;
}

/// The handle a state and everything it allocates hold on the allocator.
pub type AllocRef = Rc<dyn Allocator>;

/// Admits every request and keeps no books.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    fn realloc(&self, _old_size: usize, _new_size: usize) -> Result<(), AllocError> {
        Ok(())
    }
}

/// A snapshot of the counters kept by [`CountingAllocator`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AllocStats {
    /// Number of admitted fresh allocations.
    pub allocations: usize,
    /// Number of frees.
    pub frees:       usize,
    /// Number of admitted resizes.
    pub resizes:     usize,
    /// Number of refused requests.
    pub refused:     usize,
    /// Bytes currently outstanding.
    pub live_bytes:  usize,
    /// Highest value `live_bytes` has reached.
    pub peak_bytes:  usize,
}

impl AllocStats {
    /// Number of allocations that have not been freed yet.
    #[must_use]
    pub const fn outstanding(&self) -> usize {
        self.allocations.saturating_sub(self.frees)
    }
}

impl std::fmt::Display for AllocStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "allocations: {}", self.allocations)?;
        writeln!(f, "frees:       {}", self.frees)?;
        writeln!(f, "resizes:     {}", self.resizes)?;
        writeln!(f, "refused:     {}", self.refused)?;
        writeln!(f, "live bytes:  {}", self.live_bytes)?;
        write!(f, "peak bytes:  {}", self.peak_bytes)
    }
}

/// An allocator that counts every request and can enforce a byte limit.
///
/// # Example
/// ```
/// use winter::interpreter::alloc::{Allocator, CountingAllocator};
///
/// let counting = CountingAllocator::with_limit(64);
/// assert!(counting.realloc(0, 48).is_ok());
/// assert!(counting.realloc(0, 32).is_err());
/// assert!(counting.realloc(48, 0).is_ok());
///
/// let stats = counting.stats();
/// assert_eq!(stats.live_bytes, 0);
/// assert_eq!(stats.refused, 1);
/// ```
#[derive(Debug, Default)]
pub struct CountingAllocator {
    stats: Cell<AllocStats>,
    limit: Cell<Option<usize>>,
}

impl CountingAllocator {
    /// Creates an allocator with no limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an allocator refusing any request that would take the live
    /// byte count above `limit`.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self { stats: Cell::default(),
               limit: Cell::new(Some(limit)), }
    }

    /// Replaces the byte limit. `None` removes it.
    pub fn set_limit(&self, limit: Option<usize>) {
        self.limit.set(limit);
    }

    /// Returns a snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> AllocStats {
        self.stats.get()
    }
}

impl Allocator for CountingAllocator {
    fn realloc(&self, old_size: usize, new_size: usize) -> Result<(), AllocError> {
        let mut stats = self.stats.get();

        if new_size == 0 {
            if old_size > 0 {
                stats.frees += 1;
                stats.live_bytes = stats.live_bytes.saturating_sub(old_size);
                self.stats.set(stats);
            }
            return Ok(());
        }

        let live = stats.live_bytes.saturating_sub(old_size) + new_size;

        if let Some(limit) = self.limit.get()
           && live > limit
        {
            stats.refused += 1;
            self.stats.set(stats);
            warn!(old_size, new_size, limit, "allocation refused");
            return Err(AllocError { requested: new_size });
        }

        if old_size == 0 {
            stats.allocations += 1;
        } else {
            stats.resizes += 1;
        }
        stats.live_bytes = live;
        stats.peak_bytes = stats.peak_bytes.max(live);
        self.stats.set(stats);

        trace!(old_size, new_size, live, "realloc");
        Ok(())
    }
}

/// A charge of `size` bytes held against an allocator.
///
/// The charge is taken when created and released when dropped, so the owner of
/// a `Charge` cannot forget to free it.
pub struct Charge {
    alloc: AllocRef,
    size:  usize,
}

impl Charge {
    /// Takes a fresh charge of `size` bytes.
    ///
    /// # Errors
    /// Returns [`AllocError`] if the allocator refuses the request.
    pub fn new(alloc: &AllocRef, size: usize) -> Result<Self, AllocError> {
        alloc.realloc(0, size)?;
        Ok(Self { alloc: Rc::clone(alloc),
                  size })
    }

    /// Grows or shrinks the charge to `new_size` bytes.
    ///
    /// # Errors
    /// Returns [`AllocError`] if the allocator refuses the request. The charge
    /// keeps its old size in that case.
    pub fn resize(&mut self, new_size: usize) -> Result<(), AllocError> {
        if new_size == self.size {
            return Ok(());
        }
        self.alloc.realloc(self.size, new_size)?;
        self.size = new_size;
        Ok(())
    }

    /// The number of bytes currently charged.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// The allocator this charge is held against.
    #[must_use]
    pub const fn allocator(&self) -> &AllocRef {
        &self.alloc
    }
}

impl Drop for Charge {
    fn drop(&mut self) {
        if self.size > 0 {
            // Frees are always admitted.
            let _ = self.alloc.realloc(self.size, 0);
        }
    }
}

impl std::fmt::Debug for Charge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Charge").field("size", &self.size).finish()
    }
}

/// A value paired with the charge that accounts for it.
#[derive(Debug)]
pub struct Charged<T> {
    value:   T,
    _charge: Charge,
}

impl<T> Charged<T> {
    /// Charges `size` bytes and wraps `value`.
    ///
    /// # Errors
    /// Returns [`AllocError`] if the allocator refuses the request.
    pub fn new(alloc: &AllocRef, value: T, size: usize) -> Result<Self, AllocError> {
        Ok(Self { value,
                  _charge: Charge::new(alloc, size)? })
    }
}

impl<T> Deref for Charged<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Charged<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_is_released_on_drop() {
        let counting = Rc::new(CountingAllocator::new());
        let alloc: AllocRef = counting.clone();

        let mut charge = Charge::new(&alloc, 16).unwrap();
        charge.resize(40).unwrap();
        assert_eq!(counting.stats().live_bytes, 40);
        assert_eq!(counting.stats().peak_bytes, 40);

        drop(charge);
        let stats = counting.stats();
        assert_eq!(stats.live_bytes, 0);
        assert_eq!(stats.allocations, 1);
        assert_eq!(stats.resizes, 1);
        assert_eq!(stats.frees, 1);
        assert_eq!(stats.outstanding(), 0);
    }

    #[test]
    fn refused_resize_keeps_old_size() {
        let counting = Rc::new(CountingAllocator::with_limit(32));
        let alloc: AllocRef = counting.clone();

        let mut charge = Charge::new(&alloc, 16).unwrap();
        assert_eq!(charge.resize(64), Err(AllocError { requested: 64 }));
        assert_eq!(charge.size(), 16);
        assert_eq!(counting.stats().live_bytes, 16);
    }

    #[test]
    fn zero_sized_charge_is_not_counted() {
        let counting = Rc::new(CountingAllocator::with_limit(0));
        let alloc: AllocRef = counting.clone();

        let charge = Charge::new(&alloc, 0).unwrap();
        drop(charge);
        assert_eq!(counting.stats(), AllocStats::default());
    }
}
