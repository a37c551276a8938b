//! Encoder driver: pulls the next source object from a producer, drives
//! its writer, and suspends cleanly whenever the output buffer fills.
//!
//! Mirrors [`crate::decoder::Decoder`]: `Encoder` holds state that must
//! survive across `read` calls, while [`EncodeCursor`] borrows the output
//! buffer for one call's duration only.

use crate::bits::BitWriter;
use crate::buffer;
use crate::config::EncoderConfig;
use crate::error::{ProtoResult, ProtocolError};
use crate::packet::{EncoderEvents, NoopEvents, PacketWriter};
use crate::slot::SlotArena;
use crate::strcodec::StringEncoder;
use crate::varint::{BitsBytesVarint, ContinuationVarintEncoder};

/// The output buffer view for one `Encoder::read` call.
pub struct EncodeCursor<'a> {
    bytes: &'a mut [u8],
    pos: usize,
}

impl<'a> EncodeCursor<'a> {
    fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Bytes of room left in this call's output buffer.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Number of bytes written so far in this call.
    pub fn written(&self) -> usize {
        self.pos
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    Active,
}

/// Drives encoding of a stream of framed packets pulled from a producer.
pub struct Encoder {
    config: EncoderConfig,
    mode: Mode,
    bits: BitWriter,
    varint: Option<ContinuationVarintEncoder>,
    str_encoder: Option<StringEncoder>,
    slots: SlotArena,
    active: Option<Box<dyn PacketWriter>>,
    events: Box<dyn EncoderEvents>,
    next_source: Box<dyn FnMut() -> Option<Box<dyn PacketWriter>>>,
    closed: bool,
}

impl Encoder {
    /// Builds an encoder. `next_source` is polled whenever no packet is
    /// currently in flight; returning `None` signals end-of-stream.
    pub fn new<P, E>(config: EncoderConfig, next_source: P, events: E) -> Self
    where
        P: FnMut() -> Option<Box<dyn PacketWriter>> + 'static,
        E: EncoderEvents + 'static,
    {
        Self {
            config,
            mode: Mode::Idle,
            bits: BitWriter::new(),
            varint: None,
            str_encoder: None,
            slots: SlotArena::new(),
            active: None,
            events: Box::new(events),
            next_source: Box::new(next_source),
            closed: false,
        }
    }

    /// Builds an encoder with a no-op event handler.
    pub fn without_events<P>(config: EncoderConfig, next_source: P) -> Self
    where
        P: FnMut() -> Option<Box<dyn PacketWriter>> + 'static,
    {
        Self::new(config, next_source, NoopEvents)
    }

    /// Clears all slots and in-flight scratch state, abandoning any
    /// packet in progress.
    pub fn reset(&mut self) {
        self.mode = Mode::Idle;
        self.bits = BitWriter::new();
        self.varint = None;
        self.str_encoder = None;
        self.slots.clear();
        self.active = None;
    }

    /// `true` once `close`/`abort` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Stops the encoder; any in-flight packet is abandoned.
    pub fn close(&mut self) {
        self.closed = true;
        self.reset();
    }

    /// Fills as much of `dst_chunk` as possible with the next serialized
    /// bytes. Returns the number of bytes written, or `-1` if the output
    /// remains empty and the producer has signaled end-of-stream.
    pub fn read(&mut self, dst_chunk: &mut [u8]) -> ProtoResult<isize> {
        let mut cursor = EncodeCursor::new(dst_chunk);
        while !self.closed && cursor.remaining() > 0 {
            match self.mode {
                Mode::Idle => match (self.next_source)() {
                    Some(src) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(packet_id = src.packet_id(), "serializing packet");
                        self.slots.push();
                        let mut events = std::mem::replace(&mut self.events, Box::new(NoopEvents));
                        let rejection = events.on_serializing(self, src.as_ref());
                        self.events = events;
                        if self.closed {
                            return Ok(cursor.written() as isize);
                        }
                        if let Some(reason) = rejection.filter(|r| !r.is_empty()) {
                            #[cfg(feature = "tracing")]
                            tracing::warn!(packet_id = src.packet_id(), reason = %reason, "packet rejected");
                            self.reset();
                            return Err(ProtocolError::Rejected(reason));
                        }
                        self.active = Some(src);
                        self.mode = Mode::Active;
                    }
                    None => {
                        if cursor.written() == 0 {
                            return Ok(-1);
                        }
                        break;
                    }
                },
                Mode::Active => {
                    let src = self.active.take().ok_or(ProtocolError::InternalError("active mode without source"))?;
                    let outcome = src.get_bytes(self, &mut cursor);
                    match outcome {
                        Ok(true) => {
                            #[cfg(feature = "tracing")]
                            tracing::debug!(packet_id = src.packet_id(), "packet serialized");
                            let mut events = std::mem::replace(&mut self.events, Box::new(NoopEvents));
                            events.on_serialized(self, src.as_ref());
                            self.events = events;
                            if self.closed {
                                return Ok(cursor.written() as isize);
                            }
                            self.slots.pop();
                            self.mode = Mode::Idle;
                        }
                        Ok(false) => {
                            self.active = Some(src);
                            #[cfg(feature = "tracing")]
                            tracing::trace!(slot_depth = self.slots.depth(), "encoder suspended");
                            break;
                        }
                        Err(err) => {
                            self.active = Some(src);
                            #[cfg(feature = "tracing")]
                            tracing::warn!(error = %err, "encoder error");
                            return Err(err);
                        }
                    }
                }
            }
        }
        Ok(cursor.written() as isize)
    }

    /// Direct access to the nesting stack, for generated writer code.
    pub fn slots_mut(&mut self) -> &mut SlotArena {
        &mut self.slots
    }

    /// Writes the `id_bytes`-wide little-endian packet id configured for
    /// this encoder.
    pub fn write_id(&self, id: u64, cursor: &mut EncodeCursor) -> bool {
        let width = self.config.id_bytes as usize;
        if cursor.remaining() < width {
            return false;
        }
        buffer::write_uint_le(&mut cursor.bytes[cursor.pos..cursor.pos + width], id, width);
        cursor.pos += width;
        true
    }

    fn write_fixed(&self, width: usize, value: u64, cursor: &mut EncodeCursor) -> bool {
        if cursor.remaining() < width {
            return false;
        }
        buffer::write_uint_le(&mut cursor.bytes[cursor.pos..cursor.pos + width], value, width);
        cursor.pos += width;
        true
    }

    /// Writes an unsigned integer of `width` bytes (1..=8).
    pub fn write_uint(&self, width: usize, value: u64, cursor: &mut EncodeCursor) -> bool {
        self.write_fixed(width, value, cursor)
    }

    /// Writes a signed integer of `width` bytes (1..=8).
    pub fn write_int(&self, width: usize, value: i64, cursor: &mut EncodeCursor) -> bool {
        self.write_fixed(width, value as u64, cursor)
    }

    /// Writes a `u8`.
    pub fn write_u8(&self, value: u8, cursor: &mut EncodeCursor) -> bool {
        self.write_fixed(1, u64::from(value), cursor)
    }

    /// Writes a `bool` as one byte.
    pub fn write_bool(&self, value: bool, cursor: &mut EncodeCursor) -> bool {
        self.write_fixed(1, u64::from(value), cursor)
    }

    /// Writes a `u16`.
    pub fn write_u16(&self, value: u16, cursor: &mut EncodeCursor) -> bool {
        self.write_fixed(2, u64::from(value), cursor)
    }

    /// Writes a `u32`.
    pub fn write_u32(&self, value: u32, cursor: &mut EncodeCursor) -> bool {
        self.write_fixed(4, u64::from(value), cursor)
    }

    /// Writes a `u64`.
    pub fn write_u64(&self, value: u64, cursor: &mut EncodeCursor) -> bool {
        self.write_fixed(8, value, cursor)
    }

    /// Writes an `f32`.
    pub fn write_f32(&self, value: f32, cursor: &mut EncodeCursor) -> bool {
        if cursor.remaining() < 4 {
            return false;
        }
        buffer::write_f32_le(&mut cursor.bytes[cursor.pos..cursor.pos + 4], value);
        cursor.pos += 4;
        true
    }

    /// Writes an `f64`.
    pub fn write_f64(&self, value: f64, cursor: &mut EncodeCursor) -> bool {
        if cursor.remaining() < 8 {
            return false;
        }
        buffer::write_f64_le(&mut cursor.bytes[cursor.pos..cursor.pos + 8], value);
        cursor.pos += 8;
        true
    }

    /// Streams `value` as a continuation varint, suspending between any
    /// two bytes if the output fills.
    pub fn write_varint(&mut self, value: u64, cursor: &mut EncodeCursor) -> bool {
        if self.varint.is_none() {
            self.varint = Some(ContinuationVarintEncoder::new(value));
        }
        while cursor.remaining() > 0 {
            // Re-borrowed fresh each iteration so `self.varint` can be
            // cleared below without the borrow checker seeing a
            // conflicting live reference from a prior iteration.
            match self.varint.as_mut().expect("just set above").next_byte() {
                Some(byte) => {
                    cursor.bytes[cursor.pos] = byte;
                    cursor.pos += 1;
                }
                None => {
                    self.varint = None;
                    return true;
                }
            }
        }
        false
    }

    /// Streams a zig-zag encoded signed varint.
    pub fn write_zigzag(&mut self, value: i64, cursor: &mut EncodeCursor) -> bool {
        self.write_varint(crate::varint::encode_zigzag64(value), cursor)
    }

    /// Streams `value` as a length-prefixed UTF-16 string.
    pub fn write_string(&mut self, value: &str, cursor: &mut EncodeCursor) -> bool {
        if self.str_encoder.is_none() {
            self.str_encoder = Some(StringEncoder::new(value));
        }
        while cursor.remaining() > 0 {
            match self.str_encoder.as_mut().expect("just set above").next_byte() {
                Some(byte) => {
                    cursor.bytes[cursor.pos] = byte;
                    cursor.pos += 1;
                }
                None => {
                    self.str_encoder = None;
                    return true;
                }
            }
        }
        false
    }

    /// Appends `n` bits (1..=8) of `value` to the current bit-packed run.
    /// The run's bytes are flushed into `cursor` as they complete;
    /// callers should only begin a transaction once enough room for its
    /// total size has been confirmed (see [`Self::end_bits`]).
    pub fn put_bits(&mut self, value: u32, n: u8, cursor: &mut EncodeCursor) {
        let mut pos = cursor.pos;
        self.bits.put_bits(value, n, cursor.bytes, &mut pos);
        cursor.pos = pos;
    }

    /// Flushes the trailing partial byte of a bit-packed run, if any.
    pub fn end_bits(&mut self, cursor: &mut EncodeCursor) {
        let mut pos = cursor.pos;
        self.bits.end_bits(cursor.bytes, &mut pos);
        cursor.pos = pos;
    }

    /// Writes `value` as a bits+bytes varint (see
    /// [`crate::varint::BitsBytesVarint`]), choosing the smallest width
    /// `shape` allows. Returns `false` without touching `cursor` if the
    /// header-plus-payload transaction doesn't fit in the room left.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Overflow` if `value` exceeds `shape`'s
    /// maximum width.
    pub fn write_bits_bytes(&mut self, shape: &BitsBytesVarint, value: u64, cursor: &mut EncodeCursor) -> ProtoResult<bool> {
        self.write_bits_bytes_nulls(shape, value, 0, 0, cursor)
    }

    /// Writes `value` with a `null_bits`-wide nullability field folded
    /// into the same header byte, above the width bits. Symmetric to
    /// [`Self::write_bits_bytes`].
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Overflow` if `value` exceeds `shape`'s
    /// maximum width.
    pub fn write_bits_bytes_nulls(
        &mut self,
        shape: &BitsBytesVarint,
        value: u64,
        null_bits: u8,
        null_value: u32,
        cursor: &mut EncodeCursor,
    ) -> ProtoResult<bool> {
        let width = shape.min_width(value)?;
        let have = self.bits.avail();
        let info_bits = usize::from(shape.header_bits()) + usize::from(null_bits);
        let header_bytes = (usize::from(have) + info_bits + 7) / 8;
        if cursor.remaining() < header_bytes + usize::from(width) {
            return Ok(false);
        }
        let mut pos = cursor.pos;
        shape.write_plus_nulls(value, null_bits, null_value, &mut self.bits, cursor.bytes, &mut pos)?;
        cursor.pos = pos;
        Ok(true)
    }
}
