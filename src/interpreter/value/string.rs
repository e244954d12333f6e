use std::{
    borrow::Cow,
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{
    error::AllocError,
    interpreter::{alloc::AllocRef, value::shared::Shared},
    util::hash::{UNCOMPUTED, hash_bytes},
};

/// The persistent empty string used for `""` literals.
static EMPTY: WString = WString::from_static(b"");

/// An immutable Winter string.
///
/// Holds raw bytes (escape sequences in literals can produce any byte) and a
/// lazily computed djb2 hash. A cached hash of zero means the hash has not been
/// computed yet.
pub struct WString {
    hash: AtomicU64,
    text: Cow<'static, [u8]>,
}

impl WString {
    /// Builds a string over static bytes without allocating.
    #[must_use]
    pub const fn from_static(text: &'static [u8]) -> Self {
        Self { hash: AtomicU64::new(UNCOMPUTED),
               text: Cow::Borrowed(text), }
    }

    /// Allocates a counted string holding a copy of `bytes`.
    ///
    /// # Errors
    /// Returns [`AllocError`] if the allocator refuses the request.
    ///
    /// # Example
    /// ```
    /// use std::rc::Rc;
    ///
    /// use winter::interpreter::{
    ///     alloc::{AllocRef, SystemAllocator},
    ///     value::string::WString,
    /// };
    ///
    /// let alloc: AllocRef = Rc::new(SystemAllocator);
    /// let s = WString::allocate(&alloc, b"snow").unwrap();
    /// assert_eq!(s.as_bytes(), b"snow");
    /// assert_eq!(s.ref_count(), Some(1));
    /// ```
    pub fn allocate(alloc: &AllocRef, bytes: &[u8]) -> Result<Shared<Self>, AllocError> {
        let string = Self { hash: AtomicU64::new(UNCOMPUTED),
                            text: Cow::Owned(bytes.to_vec()), };
        Shared::new(alloc, string, Self::footprint(bytes.len()))
    }

    /// A handle to the persistent empty string.
    #[must_use]
    pub const fn empty() -> Shared<Self> {
        Shared::persistent(&EMPTY)
    }

    /// Allocates the concatenation of `left` and `right`.
    ///
    /// # Errors
    /// Returns [`AllocError`] if the allocator refuses the request.
    pub fn concat(alloc: &AllocRef, left: &Self, right: &Self) -> Result<Shared<Self>, AllocError> {
        let mut bytes = Vec::with_capacity(left.len() + right.len());
        bytes.extend_from_slice(left.as_bytes());
        bytes.extend_from_slice(right.as_bytes());

        let string = Self { hash: AtomicU64::new(UNCOMPUTED),
                            text: Cow::Owned(bytes), };
        let size = Self::footprint(string.len());
        Shared::new(alloc, string, size)
    }

    /// The bytes charged for a string of `len` bytes.
    const fn footprint(len: usize) -> usize {
        size_of::<Self>() + len
    }

    /// The raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.text
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the string holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns the djb2 hash, computing and caching it on first use.
    #[must_use]
    pub fn hash_value(&self) -> u64 {
        let cached = self.hash.load(Ordering::Relaxed);
        if cached != UNCOMPUTED {
            return cached;
        }
        let hash = hash_bytes(&self.text);
        self.hash.store(hash, Ordering::Relaxed);
        hash
    }
}

impl PartialEq for WString {
    /// Compares hashes first and bytes only when they agree.
    fn eq(&self, other: &Self) -> bool {
        self.hash_value() == other.hash_value() && self.text == other.text
    }
}

impl Eq for WString {}

impl fmt::Display for WString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.text))
    }
}

impl fmt::Debug for WString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.text))
    }
}
