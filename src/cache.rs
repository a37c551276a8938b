//! Split-value cache: reconstructs a primitive whose encoding straddles a
//! chunk boundary.
//!
//! The original state machine swaps the driver's chunk pointer to point at
//! a 16-byte scratch buffer and remembers the real chunk as a "tail" so
//! that reads straddling the boundary transparently pull from both. Rust's
//! ownership rules make that pointer swap awkward, and it buys nothing here
//! that a plain copy into an owned scratch buffer doesn't: every primitive
//! this cache ever assembles is at most 16 bytes, so copying both halves
//! into one contiguous buffer is just as cheap and a good deal easier to
//! reason about. The observable contract — a completed primitive always
//! appears contiguous to the caller — is unchanged.

/// Maximum number of bytes a single primitive read may request from the
/// cache. Nothing in this codec ever assembles a wider value in one piece.
pub const MAX_SPAN: usize = 16;

/// Buffers the first bytes of a multi-byte value when a chunk boundary
/// splits it, and reassembles the value once the remaining bytes arrive.
#[derive(Debug, Default, Clone)]
pub struct SplitCache {
    staging: [u8; MAX_SPAN],
    /// Total width of the value currently being reassembled; `0` means idle.
    pending_bytes: usize,
    /// Bytes already copied into `staging`.
    have: usize,
}

impl SplitCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of bytes still needed to complete the in-flight
    /// value, or `0` if the cache is idle.
    pub fn pending_bytes(&self) -> usize {
        self.pending_bytes
    }

    /// Attempts to obtain `bytes` contiguous bytes starting at
    /// `chunk[*pos..]`, advancing `*pos` by however much of `chunk` this
    /// call consumes.
    ///
    /// On success, the `bytes` assembled bytes are written to
    /// `scratch[..bytes]` and this returns `true`. On failure (the chunk
    /// ran out before `bytes` bytes were available), the available prefix
    /// is staged internally, `*pos` is advanced to `chunk.len()`, and this
    /// returns `false` — the caller must suspend and retry with the next
    /// chunk.
    ///
    /// # Panics
    ///
    /// Panics if `bytes` exceeds [`MAX_SPAN`] or `scratch` is shorter than
    /// `bytes`.
    pub fn try_get(&mut self, chunk: &[u8], pos: &mut usize, bytes: usize, scratch: &mut [u8]) -> bool {
        assert!(bytes <= MAX_SPAN, "primitive span {bytes} exceeds cache capacity");
        assert!(scratch.len() >= bytes, "scratch buffer too small");
        let remaining = chunk.len() - *pos;

        if self.pending_bytes > 0 {
            let need = self.pending_bytes - self.have;
            let take = need.min(remaining);
            self.staging[self.have..self.have + take].copy_from_slice(&chunk[*pos..*pos + take]);
            self.have += take;
            *pos += take;
            if self.have == self.pending_bytes {
                scratch[..self.pending_bytes].copy_from_slice(&self.staging[..self.pending_bytes]);
                self.pending_bytes = 0;
                self.have = 0;
                true
            } else {
                false
            }
        } else if bytes <= remaining {
            scratch[..bytes].copy_from_slice(&chunk[*pos..*pos + bytes]);
            *pos += bytes;
            true
        } else {
            self.staging[..remaining].copy_from_slice(&chunk[*pos..]);
            self.have = remaining;
            self.pending_bytes = bytes;
            *pos += remaining;
            false
        }
    }

    /// Clears any in-flight partial value. Called by `reset()` on the owning
    /// driver.
    pub fn clear(&mut self) {
        self.pending_bytes = 0;
        self.have = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_read_when_chunk_has_enough_bytes() {
        let mut cache = SplitCache::new();
        let chunk = [1, 2, 3, 4, 5];
        let mut pos = 1;
        let mut scratch = [0u8; MAX_SPAN];
        assert!(cache.try_get(&chunk, &mut pos, 3, &mut scratch));
        assert_eq!(&scratch[..3], &[2, 3, 4]);
        assert_eq!(pos, 4);
        assert_eq!(cache.pending_bytes(), 0);
    }

    #[test]
    fn split_across_two_chunks_reassembles_transparently() {
        let mut cache = SplitCache::new();
        let mut scratch = [0u8; MAX_SPAN];

        // u64 field split after 3 bytes.
        let first = [0xAA, 0xBB, 0xCC];
        let mut pos = 0;
        assert!(!cache.try_get(&first, &mut pos, 8, &mut scratch));
        assert_eq!(pos, 3);
        assert_eq!(cache.pending_bytes(), 8);

        let second = [0xDD, 0xEE, 0xFF, 0x11, 0x22, 0x99];
        let mut pos2 = 0;
        assert!(cache.try_get(&second, &mut pos2, 8, &mut scratch));
        assert_eq!(pos2, 5);
        assert_eq!(&scratch[..8], &[0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, 0x11, 0x22]);
        assert_eq!(cache.pending_bytes(), 0);
    }

    #[test]
    fn split_spanning_more_than_two_chunks() {
        let mut cache = SplitCache::new();
        let mut scratch = [0u8; MAX_SPAN];

        let chunks: [&[u8]; 4] = [&[1], &[2], &[3], &[4, 5, 6, 7]];
        let mut done = false;
        for chunk in chunks {
            let mut pos = 0;
            done = cache.try_get(chunk, &mut pos, 7, &mut scratch);
            if done {
                break;
            }
        }
        assert!(done);
        assert_eq!(&scratch[..7], &[1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn clear_resets_pending_state() {
        let mut cache = SplitCache::new();
        let mut scratch = [0u8; MAX_SPAN];
        let chunk = [1, 2];
        let mut pos = 0;
        assert!(!cache.try_get(&chunk, &mut pos, 4, &mut scratch));
        assert_eq!(cache.pending_bytes(), 4);
        cache.clear();
        assert_eq!(cache.pending_bytes(), 0);
    }
}
