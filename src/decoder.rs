//! Decoder driver: dispatches by packet id, drives the per-packet reader,
//! and resumes cleanly after a suspension at any byte boundary.
//!
//! `Decoder` holds every field that must survive across `write` calls
//! (scratch registers, the split-value cache, the bit accumulator, the
//! slot stack, the active destination). The chunk being processed by one
//! `write` call is borrowed only for that call's duration, via
//! [`DecodeCursor`] — see the note on `PacketReader::put_bytes` for why the
//! two are kept separate.

use crate::bits::BitReader;
use crate::buffer;
use crate::cache::{SplitCache, MAX_SPAN};
use crate::config::DecoderConfig;
use crate::error::{ProtoResult, ProtocolError};
use crate::packet::{DecoderEvents, NoopEvents, PacketReader};
use crate::slot::SlotArena;
use crate::strcodec::StringDecoder;
use crate::varint::{BitsBytesVarint, ContinuationVarintDecoder, MAX_BYTES_64};

/// The chunk view for one `Decoder::write` call: an immutable byte slice
/// plus a cursor that every primitive read advances.
pub struct DecodeCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> DecodeCursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Bytes not yet consumed in this call.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Number of bytes this call has consumed so far.
    pub fn consumed(&self) -> usize {
        self.pos
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    AwaitId,
    Active,
}

/// Resume state for a bits+bytes varint whose header has been parsed but
/// whose payload bytes have not yet all arrived. The header bits are
/// consumed from the input the moment they're available and cannot be
/// "put back" for a later chunk, so `width`/`nulls` must be carried here
/// rather than re-derived on the next call.
#[derive(Debug, Clone, Copy)]
struct BitsBytesReadState {
    width: usize,
    nulls: u32,
}

/// Drives decoding of a stream of framed packets.
pub struct Decoder {
    config: DecoderConfig,
    mode: Mode,
    cache: SplitCache,
    bits: BitReader,
    bits_bytes: Option<BitsBytesReadState>,
    varint: Option<ContinuationVarintDecoder>,
    str_decoder: Option<StringDecoder>,
    slots: SlotArena,
    active: Option<Box<dyn PacketReader>>,
    events: Box<dyn DecoderEvents>,
    allocate: Box<dyn FnMut(u64) -> Option<Box<dyn PacketReader>>>,
    closed: bool,
}

impl Decoder {
    /// Builds a decoder. `allocate` maps a packet id to a fresh decode
    /// target, returning `None` for an id it does not recognize.
    pub fn new<A, E>(config: DecoderConfig, allocate: A, events: E) -> Self
    where
        A: FnMut(u64) -> Option<Box<dyn PacketReader>> + 'static,
        E: DecoderEvents + 'static,
    {
        Self {
            config,
            mode: Mode::Idle,
            cache: SplitCache::new(),
            bits: BitReader::new(),
            bits_bytes: None,
            varint: None,
            str_decoder: None,
            slots: SlotArena::new(),
            active: None,
            events: Box::new(events),
            allocate: Box::new(allocate),
            closed: false,
        }
    }

    /// Builds a decoder with a no-op event handler.
    pub fn without_events<A>(config: DecoderConfig, allocate: A) -> Self
    where
        A: FnMut(u64) -> Option<Box<dyn PacketReader>> + 'static,
    {
        Self::new(config, allocate, NoopEvents)
    }

    /// Clears all slots and in-flight scratch state. Any packet in
    /// progress is abandoned.
    pub fn reset(&mut self) {
        self.mode = Mode::Idle;
        self.cache.clear();
        self.bits = BitReader::new();
        self.bits_bytes = None;
        self.varint = None;
        self.str_decoder = None;
        self.slots.clear();
        self.active = None;
    }

    /// `true` once `close`/`abort` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Stops the decoder; any in-flight packet is abandoned.
    pub fn close(&mut self) {
        self.closed = true;
        self.reset();
    }

    /// Feeds the next chunk of the stream. Drives the active packet (or
    /// starts the next one) until the chunk is exhausted or the decoder
    /// suspends waiting for more bytes. Returns the number of bytes
    /// consumed from `chunk`, which is `chunk.len()` unless the decoder is
    /// closed.
    pub fn write(&mut self, chunk: &[u8]) -> ProtoResult<usize> {
        let mut cursor = DecodeCursor::new(chunk);
        while !self.closed && cursor.remaining() > 0 {
            match self.mode {
                Mode::Idle => {
                    self.mode = Mode::AwaitId;
                }
                Mode::AwaitId => {
                    let id_bytes = self.config.id_bytes as usize;
                    let mut scratch = [0u8; MAX_SPAN];
                    if !self.cache.try_get(cursor.bytes, &mut cursor.pos, id_bytes, &mut scratch) {
                        break;
                    }
                    let id = buffer::read_uint_le(&scratch, id_bytes);
                    match (self.allocate)(id) {
                        Some(mut dst) => {
                            #[cfg(feature = "tracing")]
                            tracing::debug!(packet_id = id, "dispatching packet");
                            self.slots.push();
                            let mut events = std::mem::replace(&mut self.events, Box::new(NoopEvents));
                            let rejection = events.on_receiving(self, dst.as_mut());
                            self.events = events;
                            if self.closed {
                                return Ok(cursor.consumed());
                            }
                            if let Some(reason) = rejection.filter(|r| !r.is_empty()) {
                                #[cfg(feature = "tracing")]
                                tracing::warn!(packet_id = id, reason = %reason, "packet rejected");
                                self.reset();
                                return Err(ProtocolError::Rejected(reason));
                            }
                            self.active = Some(dst);
                            self.mode = Mode::Active;
                        }
                        None => {
                            #[cfg(feature = "tracing")]
                            tracing::warn!(packet_id = id, "unrecognized packet id");
                            self.reset();
                            return Err(ProtocolError::InvalidId(id));
                        }
                    }
                }
                Mode::Active => {
                    let mut dst = self.active.take().ok_or(ProtocolError::InternalError("active mode without destination"))?;
                    let outcome = dst.put_bytes(self, &mut cursor);
                    match outcome {
                        Ok(true) => {
                            #[cfg(feature = "tracing")]
                            tracing::debug!(packet_id = dst.packet_id(), "packet complete");
                            let mut events = std::mem::replace(&mut self.events, Box::new(NoopEvents));
                            events.on_received(self, dst.as_mut());
                            self.events = events;
                            if self.closed {
                                return Ok(cursor.consumed());
                            }
                            self.slots.pop();
                            self.mode = Mode::Idle;
                        }
                        Ok(false) => {
                            self.active = Some(dst);
                            #[cfg(feature = "tracing")]
                            tracing::trace!(slot_depth = self.slots.depth(), "decoder suspended");
                            break;
                        }
                        Err(err) => {
                            self.active = Some(dst);
                            #[cfg(feature = "tracing")]
                            tracing::warn!(error = %err, "decoder error");
                            return Err(err);
                        }
                    }
                }
            }
        }
        Ok(cursor.consumed())
    }

    /// Direct access to the nesting stack, for generated reader code that
    /// needs to push/pop a child frame (see [`crate::slot::SlotArena`]).
    pub fn slots_mut(&mut self) -> &mut SlotArena {
        &mut self.slots
    }

    fn read_fixed(&mut self, width: usize, cursor: &mut DecodeCursor) -> Option<[u8; MAX_SPAN]> {
        let mut scratch = [0u8; MAX_SPAN];
        if self.cache.try_get(cursor.bytes, &mut cursor.pos, width, &mut scratch) {
            Some(scratch)
        } else {
            None
        }
    }

    /// Reads an unsigned little-endian integer of `width` bytes (1..=8).
    pub fn read_uint(&mut self, width: usize, cursor: &mut DecodeCursor) -> Option<u64> {
        self.read_fixed(width, cursor).map(|scratch| buffer::read_uint_le(&scratch, width))
    }

    /// Reads a signed little-endian integer of `width` bytes (1..=8).
    pub fn read_int(&mut self, width: usize, cursor: &mut DecodeCursor) -> Option<i64> {
        self.read_fixed(width, cursor).map(|scratch| buffer::read_int_le_signed(&scratch, width))
    }

    /// Reads a `u8`.
    pub fn read_u8(&mut self, cursor: &mut DecodeCursor) -> Option<u8> {
        self.read_uint(1, cursor).map(|v| v as u8)
    }

    /// Reads a `bool` from one byte (nonzero is `true`).
    pub fn read_bool(&mut self, cursor: &mut DecodeCursor) -> Option<bool> {
        self.read_uint(1, cursor).map(|v| v != 0)
    }

    /// Reads a `u16`.
    pub fn read_u16(&mut self, cursor: &mut DecodeCursor) -> Option<u16> {
        self.read_uint(2, cursor).map(|v| v as u16)
    }

    /// Reads a `u32`.
    pub fn read_u32(&mut self, cursor: &mut DecodeCursor) -> Option<u32> {
        self.read_uint(4, cursor).map(|v| v as u32)
    }

    /// Reads a `u64`.
    pub fn read_u64(&mut self, cursor: &mut DecodeCursor) -> Option<u64> {
        self.read_uint(8, cursor)
    }

    /// Reads an `f32`.
    pub fn read_f32(&mut self, cursor: &mut DecodeCursor) -> Option<f32> {
        self.read_fixed(4, cursor).map(|scratch| buffer::read_f32_le(&scratch))
    }

    /// Reads an `f64`.
    pub fn read_f64(&mut self, cursor: &mut DecodeCursor) -> Option<f64> {
        self.read_fixed(8, cursor).map(|scratch| buffer::read_f64_le(&scratch))
    }

    /// Reads one continuation varint (up to 64 bits).
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Overflow` if the varint exceeds 10 bytes.
    pub fn read_varint(&mut self, cursor: &mut DecodeCursor) -> ProtoResult<Option<u64>> {
        if self.varint.is_none() {
            self.varint = Some(ContinuationVarintDecoder::new());
        }
        while cursor.pos < cursor.bytes.len() {
            let byte = cursor.bytes[cursor.pos];
            cursor.pos += 1;
            // Re-borrowed fresh each iteration so `self.varint` can be
            // cleared below without a conflicting live reference from a
            // prior iteration.
            let step = self.varint.as_mut().expect("just set above").push_byte(byte, MAX_BYTES_64)?;
            if let Some(value) = step {
                self.varint = None;
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Reads a zig-zag encoded signed varint.
    pub fn read_zigzag(&mut self, cursor: &mut DecodeCursor) -> ProtoResult<Option<i64>> {
        Ok(self.read_varint(cursor)?.map(crate::varint::decode_zigzag64))
    }

    /// Reads a length-prefixed UTF-16 string (see [`crate::strcodec`]).
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Overflow` if the encoded length exceeds
    /// `max_chars`.
    pub fn read_string(&mut self, cursor: &mut DecodeCursor) -> ProtoResult<Option<String>> {
        if self.str_decoder.is_none() {
            self.str_decoder = Some(StringDecoder::new(self.config.max_chars));
        }
        while cursor.pos < cursor.bytes.len() {
            let byte = cursor.bytes[cursor.pos];
            cursor.pos += 1;
            match self.str_decoder.as_mut().expect("just set above").push_byte(byte) {
                Ok(Some(value)) => {
                    self.str_decoder = None;
                    return Ok(Some(value));
                }
                Ok(None) => continue,
                Err(err) => {
                    self.str_decoder = None;
                    return Err(err);
                }
            }
        }
        Ok(None)
    }

    /// Reads `n` bits (1..=8) from the current bit-packed run, fetching
    /// whole bytes from `cursor` only when needed. Returns `None` (no
    /// bytes consumed) if the chunk does not yet hold enough bytes.
    pub fn read_bits(&mut self, n: u8, cursor: &mut DecodeCursor) -> Option<u32> {
        let have = self.bits.avail();
        if have < n {
            let need_more_bits = n - have;
            let need_more_bytes = usize::from((need_more_bits + 7) / 8);
            if cursor.remaining() < need_more_bytes {
                return None;
            }
        }
        Some(self.bits.get_bits(n, cursor.bytes, &mut cursor.pos))
    }

    /// Discards any unconsumed buffered bits, realigning to a byte
    /// boundary (mirrors the writer's header flush).
    pub fn align_bits(&mut self) {
        self.bits.align();
    }

    /// Reads a value written by [`crate::varint::BitsBytesVarint::write_plus_nulls`],
    /// returning `(value, null_bits_field)`. Suspends cleanly at either the
    /// header or the payload: once the header bits have been pulled from
    /// the input they are gone for good, so the parsed width/nulls are
    /// kept in driver state until the payload bytes arrive.
    pub fn read_bits_bytes_nulls(&mut self, shape: &BitsBytesVarint, null_bits: u8, cursor: &mut DecodeCursor) -> Option<(u64, u32)> {
        if self.bits_bytes.is_none() {
            let info_bits = shape.header_bits() + null_bits;
            let have = self.bits.avail();
            if have < info_bits {
                let need_more_bits = info_bits - have;
                let need_more_bytes = usize::from((need_more_bits + 7) / 8);
                if cursor.remaining() < need_more_bytes {
                    return None;
                }
            }
            let header = self.bits.get_bits(info_bits, cursor.bytes, &mut cursor.pos);
            self.bits.align();
            let width = usize::from((header & ((1u32 << shape.header_bits()) - 1)) + 1);
            let nulls = header >> shape.header_bits();
            self.bits_bytes = Some(BitsBytesReadState { width, nulls });
        }
        let state = *self.bits_bytes.as_ref().expect("just set above");
        let mut scratch = [0u8; MAX_SPAN];
        if !self.cache.try_get(cursor.bytes, &mut cursor.pos, state.width, &mut scratch) {
            return None;
        }
        self.bits_bytes = None;
        Some((buffer::read_uint_le(&scratch, state.width), state.nulls))
    }

    /// Reads a value written by [`crate::varint::BitsBytesVarint::write`]
    /// (no nullability field folded into the header).
    pub fn read_bits_bytes(&mut self, shape: &BitsBytesVarint, cursor: &mut DecodeCursor) -> Option<u64> {
        self.read_bits_bytes_nulls(shape, 0, cursor).map(|(value, _)| value)
    }

    /// Accumulates raw bytes into `buf` until it holds `total_len` bytes,
    /// for blobs too large for the split-value cache. Returns `true` once
    /// complete. The accumulation progress lives in `buf` itself (owned by
    /// the calling packet reader, which must preserve it across
    /// suspension in its own slot-tracked state).
    pub fn read_raw(total_len: usize, buf: &mut Vec<u8>, cursor: &mut DecodeCursor) -> bool {
        let need = total_len - buf.len();
        let take = need.min(cursor.remaining());
        buf.extend_from_slice(&cursor.bytes[cursor.pos..cursor.pos + take]);
        cursor.pos += take;
        buf.len() == total_len
    }
}
