//! Driver configuration.
//!
//! Plain structs with a validating constructor rather than a `#[must_use]`
//! builder: direct struct literals with `Default` cover every caller this
//! crate has, with no need for a chained builder.

use crate::error::{ProtoResult, ProtocolError};

const MIN_ID_BYTES: u8 = 1;
const MAX_ID_BYTES: u8 = 7;

fn validate_id_bytes(id_bytes: u8) -> ProtoResult<()> {
    if (MIN_ID_BYTES..=MAX_ID_BYTES).contains(&id_bytes) {
        Ok(())
    } else {
        Err(ProtocolError::InternalError("id_bytes must be in 1..=7"))
    }
}

/// Configuration for a [`crate::decoder::Decoder`].
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecoderConfig {
    /// Width, in bytes, of every top-level packet id.
    pub id_bytes: u8,
    /// Ceiling on decoded string length, in UTF-16 code units.
    pub max_chars: u32,
}

impl DecoderConfig {
    /// Builds a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::InternalError` if `id_bytes` is outside
    /// `1..=7`.
    pub fn new(id_bytes: u8, max_chars: u32) -> ProtoResult<Self> {
        validate_id_bytes(id_bytes)?;
        Ok(Self { id_bytes, max_chars })
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self { id_bytes: 1, max_chars: 64 * 1024 }
    }
}

/// Configuration for an [`crate::encoder::Encoder`].
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncoderConfig {
    /// Width, in bytes, of every top-level packet id.
    pub id_bytes: u8,
}

impl EncoderConfig {
    /// Builds a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::InternalError` if `id_bytes` is outside
    /// `1..=7`.
    pub fn new(id_bytes: u8) -> ProtoResult<Self> {
        validate_id_bytes(id_bytes)?;
        Ok(Self { id_bytes })
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self { id_bytes: 1 }
    }
}
