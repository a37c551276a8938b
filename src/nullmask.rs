//! Null-field bitmask preceding any composite with optional fields.
//!
//! One byte, bit `i` set means field `i` is present. The decoder exposes
//! this as a plain boolean query rather than the source's goto-style jump
//! to a per-field resume label: Rust has no computed-goto, and ordinary
//! `if`/`match` control flow in the generated reader/writer does the same
//! job without it.

/// Accumulates a null-field mask while fields are written.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMaskWriter {
    bits: u8,
}

impl NullMaskWriter {
    /// Starts a mask with `initial_bits` already set (normally `0`).
    pub fn new(initial_bits: u8) -> Self {
        Self { bits: initial_bits }
    }

    /// Marks field `field_bit` (0..8) as present.
    ///
    /// # Panics
    ///
    /// Panics if `field_bit >= 8`.
    pub fn set(&mut self, field_bit: u8) {
        assert!(field_bit < 8, "field_bit must be in 0..8");
        self.bits |= 1 << field_bit;
    }

    /// Flushes the accumulated mask byte.
    pub fn finish(self) -> u8 {
        self.bits
    }
}

/// A decoded null-field mask, queried per field.
#[derive(Debug, Clone, Copy)]
pub struct NullMaskReader {
    bits: u8,
}

impl NullMaskReader {
    /// Wraps an already-read mask byte.
    pub fn new(bits: u8) -> Self {
        Self { bits }
    }

    /// Returns `true` if field `field_bit` (0..8) is absent.
    ///
    /// # Panics
    ///
    /// Panics if `field_bit >= 8`.
    pub fn is_null(&self, field_bit: u8) -> bool {
        assert!(field_bit < 8, "field_bit must be in 0..8");
        self.bits & (1 << field_bit) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_sets_only_requested_bits() {
        let mut writer = NullMaskWriter::new(0);
        writer.set(1);
        writer.set(3);
        assert_eq!(writer.finish(), 0b0000_1010);
    }

    #[test]
    fn reader_reflects_presence() {
        let reader = NullMaskReader::new(0b0000_1010);
        assert!(reader.is_null(0));
        assert!(!reader.is_null(1));
        assert!(reader.is_null(2));
        assert!(!reader.is_null(3));
    }

    #[test]
    fn initial_bits_seed_the_writer() {
        let writer = NullMaskWriter::new(0b0000_0001);
        assert_eq!(writer.finish(), 0b0000_0001);
    }
}
