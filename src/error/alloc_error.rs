#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// An allocator refused a request for storage.
pub struct AllocError {
    /// The size, in bytes, that was requested.
    pub requested: usize,
}

impl std::fmt::Display for AllocError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f,
               "Allocation error: the allocator refused a request for {} bytes.",
               self.requested)
    }
}

impl std::error::Error for AllocError {}
