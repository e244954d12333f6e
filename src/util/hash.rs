use std::hash::Hasher;

/// The hash value reserved to mean "not computed yet".
pub const UNCOMPUTED: u64 = 0;

/// Initial state of the djb2 hash.
const DJB2_SEED: u64 = 5381;

/// The djb2 string hash by Dan Bernstein, exposed as a [`Hasher`].
///
/// Finishing never yields [`UNCOMPUTED`]: a computed zero is remapped to `1`
/// so callers can cache hashes lazily behind a zero sentinel.
///
/// ## Example
/// ```
/// use std::hash::Hasher;
///
/// use winter::util::hash::{Djb2, UNCOMPUTED};
///
/// let mut hasher = Djb2::default();
/// hasher.write(b"winter");
/// assert_ne!(hasher.finish(), UNCOMPUTED);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Djb2 {
    state: u64,
}

impl Default for Djb2 {
    fn default() -> Self {
        Self { state: DJB2_SEED }
    }
}

impl Hasher for Djb2 {
    fn finish(&self) -> u64 {
        if self.state == UNCOMPUTED { 1 } else { self.state }
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state = (self.state << 5).wrapping_add(self.state)
                                          .wrapping_add(u64::from(byte));
        }
    }
}

/// Hashes a byte string with djb2.
///
/// ## Example
/// ```
/// use winter::util::hash::hash_bytes;
///
/// assert_eq!(hash_bytes(b""), 5381);
/// assert_eq!(hash_bytes(b"a"), 5381 * 33 + 97);
/// ```
#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = Djb2::default();
    hasher.write(bytes);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_state_is_remapped() {
        let hasher = Djb2 { state: UNCOMPUTED };
        assert_eq!(hasher.finish(), 1);
    }

    #[test]
    fn equal_bytes_hash_equal() {
        assert_eq!(hash_bytes(b"name"), hash_bytes(b"name"));
        assert_ne!(hash_bytes(b"name"), hash_bytes(b"mane"));
    }
}
