//! # Memory Provider
//!
//! Thin indirection to a caller-supplied resize function backing growable
//! pools. The fixed-pool variant never calls a provider at all — see
//! [`crate::Pool::new_fixed`].

/// A caller-supplied resize function backing a growable [`crate::Pool`].
///
/// Takes ownership of the pool's current backing buffer and the requested
/// new size in bytes, and returns the new buffer, or `None` if the resize
/// could not be satisfied. A `new_size` of `0` is a release request, sent
/// once by a growable pool's [`Drop`](std::ops::Drop) impl.
///
/// Implementations must preserve the existing bytes (zero-extended to
/// `new_size`) when growing, since live cell payloads occupy that range.
pub trait MemoryProvider {
    /// Resizes `buf` to `new_size` bytes, returning the new buffer or
    /// `None` on failure.
    fn resize(&mut self, buf: Vec<u8>, new_size: usize) -> Option<Vec<u8>>;
}

/// The default [`MemoryProvider`], backed directly by the platform
/// allocator via [`Vec::resize`].
///
/// This is the provider most callers want; a custom provider is only
/// needed when cell storage must live in caller-managed memory (a
/// memory-mapped region, an arena shared with other subsystems, etc.).
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericMemoryProvider;

impl MemoryProvider for GenericMemoryProvider {
    fn resize(&mut self, mut buf: Vec<u8>, new_size: usize) -> Option<Vec<u8>> {
        buf.resize(new_size, 0);
        Some(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_provider_grows_and_zero_fills() {
        let mut provider = GenericMemoryProvider;
        let buf = vec![0xAAu8; 4];
        let grown = provider.resize(buf, 8).unwrap();
        assert_eq!(grown.len(), 8);
        assert_eq!(&grown[..4], &[0xAA; 4]);
        assert_eq!(&grown[4..], &[0; 4]);
    }

    #[test]
    fn generic_provider_releases_to_empty() {
        let mut provider = GenericMemoryProvider;
        let buf = vec![1u8; 16];
        let released = provider.resize(buf, 0).unwrap();
        assert!(released.is_empty());
    }
}
