//! Length-prefixed UTF-16 string codec.
//!
//! Wire shape: a continuation-varint length (in UTF-16 code units) followed
//! by that many continuation-varints, each one 16-bit code unit. Both
//! directions are byte-at-a-time state machines so a suspension can land on
//! any byte of the length prefix or any code unit without extra
//! bookkeeping — the same shape [`crate::varint::ContinuationVarintDecoder`]
//! and [`crate::varint::ContinuationVarintEncoder`] already provide for a
//! single varint.

use crate::error::{ProtoResult, ProtocolError};
use crate::varint::{ContinuationVarintDecoder, ContinuationVarintEncoder, MAX_BYTES_32};

/// Incremental string decode state.
#[derive(Debug)]
pub struct StringDecoder {
    max_chars: u32,
    len: Option<u32>,
    len_state: ContinuationVarintDecoder,
    unit_state: ContinuationVarintDecoder,
    units: Vec<u16>,
}

impl StringDecoder {
    /// Starts decoding a string whose length must not exceed `max_chars`.
    pub fn new(max_chars: u32) -> Self {
        Self {
            max_chars,
            len: None,
            len_state: ContinuationVarintDecoder::new(),
            unit_state: ContinuationVarintDecoder::new(),
            units: Vec::new(),
        }
    }

    /// Feeds one more wire byte. Returns `Ok(Some(string))` once the whole
    /// string has been decoded, `Ok(None)` if more bytes are needed, or
    /// `Err(ProtocolError::Overflow)` if the length prefix exceeds
    /// `max_chars`.
    pub fn push_byte(&mut self, byte: u8) -> ProtoResult<Option<String>> {
        let Some(len) = self.len else {
            let Some(raw_len) = self.len_state.push_byte(byte, MAX_BYTES_32)? else {
                return Ok(None);
            };
            let len = raw_len as u32;
            if len > self.max_chars {
                return Err(ProtocolError::Overflow("string length exceeds max_chars"));
            }
            self.len = Some(len);
            self.units.reserve(len as usize);
            return if len == 0 { Ok(Some(String::new())) } else { Ok(None) };
        };

        let Some(unit) = self.unit_state.push_byte(byte, MAX_BYTES_32)? else {
            return Ok(None);
        };
        self.units.push(unit as u16);
        self.unit_state = ContinuationVarintDecoder::new();
        if self.units.len() as u32 == len {
            Ok(Some(String::from_utf16_lossy(&self.units)))
        } else {
            Ok(None)
        }
    }
}

/// Incremental string encode state.
#[derive(Debug)]
pub struct StringEncoder {
    units: Vec<u16>,
    index: usize,
    len_encoder: Option<ContinuationVarintEncoder>,
    unit_encoder: Option<ContinuationVarintEncoder>,
}

impl StringEncoder {
    /// Starts encoding `value`.
    pub fn new(value: &str) -> Self {
        let units: Vec<u16> = value.encode_utf16().collect();
        let len_encoder = Some(ContinuationVarintEncoder::new(units.len() as u64));
        Self { units, index: 0, len_encoder, unit_encoder: None }
    }

    /// Produces the next wire byte, or `None` once the whole string has
    /// been emitted.
    pub fn next_byte(&mut self) -> Option<u8> {
        if let Some(enc) = self.len_encoder.as_mut() {
            if let Some(byte) = enc.next_byte() {
                return Some(byte);
            }
            self.len_encoder = None;
        }
        loop {
            if let Some(enc) = self.unit_encoder.as_mut() {
                if let Some(byte) = enc.next_byte() {
                    return Some(byte);
                }
                self.unit_encoder = None;
                self.index += 1;
            }
            if self.index >= self.units.len() {
                return None;
            }
            self.unit_encoder = Some(ContinuationVarintEncoder::new(u64::from(self.units[self.index])));
        }
    }

    /// Returns `true` once every byte has been produced.
    pub fn is_done(&self) -> bool {
        self.len_encoder.is_none() && self.unit_encoder.is_none() && self.index >= self.units.len()
    }
}

/// Bulk-encodes `value` into a freshly allocated `Vec<u8>`. A convenience
/// wrapper for callers with a complete string and no need to suspend
/// (tests, property tests, and any caller holding the whole value already).
pub fn encode_to_vec(value: &str) -> Vec<u8> {
    let mut encoder = StringEncoder::new(value);
    let mut out = Vec::new();
    while let Some(byte) = encoder.next_byte() {
        out.push(byte);
    }
    out
}

/// Bulk-decodes a string from the front of `buf`. Returns the decoded
/// string and the unread remainder.
///
/// # Panics
///
/// Panics if `buf` runs out of bytes before the string completes. A bulk
/// helper for callers holding a complete buffer; see
/// [`crate::varint::decode_varint`] for the same caveat.
pub fn decode_from_slice(buf: &[u8], max_chars: u32) -> ProtoResult<(String, &[u8])> {
    let mut decoder = StringDecoder::new(max_chars);
    let mut i = 0;
    loop {
        if let Some(value) = decoder.push_byte(buf[i])? {
            return Ok((value, &buf[i + 1..]));
        }
        i += 1;
    }
}
