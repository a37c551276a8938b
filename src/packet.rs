//! Per-packet reader/writer contracts and the event-handler traits
//! implemented by generated code.
//!
//! This crate defines the contracts only; code-generated per-packet
//! readers/writers are out of scope here (see `SPEC_FULL.md` §1). The
//! `examples` integration tests supply one hand-written pair so the
//! drivers in `decoder`/`encoder` have something concrete to exercise.

use crate::decoder::{Decoder, DecodeCursor};
use crate::encoder::{Encoder, EncodeCursor};
use crate::error::ProtoResult;

/// Implemented by generated or hand-written decode targets.
///
/// `put_bytes` takes the active chunk view (`cursor`) as an explicit
/// parameter rather than folding it into `decoder` itself: the chunk's
/// borrow only lives for one `Decoder::write` call, while `decoder` holds
/// state that persists across calls, and Rust has no way to let one struct
/// field's lifetime shrink and grow across method calls the way the
/// source's implicit "current chunk" closure variable does.
pub trait PacketReader {
    /// Stable packet identifier.
    fn packet_id(&self) -> u64;

    /// Called repeatedly until it returns `Ok(true)` (packet complete).
    /// Implementations must use only the primitive operations on `decoder`
    /// and must preserve their own progress in the active slot's
    /// `state`/`index0..2` fields so a suspension mid-packet can resume.
    fn put_bytes(&mut self, decoder: &mut Decoder, cursor: &mut DecodeCursor) -> ProtoResult<bool>;
}

/// Implemented by generated or hand-written encode sources.
pub trait PacketWriter {
    /// Stable packet identifier.
    fn packet_id(&self) -> u64;

    /// Called repeatedly until it returns `Ok(true)` (packet complete).
    /// Symmetric to [`PacketReader::put_bytes`].
    fn get_bytes(&self, encoder: &mut Encoder, cursor: &mut EncodeCursor) -> ProtoResult<bool>;
}

/// Decoder-side lifecycle hooks.
///
/// Both hooks take `driver` so a handler can call [`Decoder::close`] to
/// stop the driver outright; the driver checks its `closed` flag
/// immediately after every handler invocation and returns as soon as it
/// sees it set, mid-packet or not.
pub trait DecoderEvents {
    /// Fired once the destination packet has been allocated, before any
    /// bytes are read into it. Returning `Some(reason)` with a non-empty
    /// `reason` rejects the packet: the driver aborts it and surfaces
    /// `ProtocolError::Rejected(reason)` to the caller of `write`.
    fn on_receiving(&mut self, driver: &mut Decoder, dst: &mut dyn PacketReader) -> Option<String>;

    /// Fired once `dst` has fully received its packet.
    fn on_received(&mut self, driver: &mut Decoder, dst: &mut dyn PacketReader);
}

/// Encoder-side lifecycle hooks. Symmetric to [`DecoderEvents`].
pub trait EncoderEvents {
    /// Fired once the source packet has been selected, before any bytes
    /// are emitted. A non-empty returned reason rejects the packet the
    /// same way [`DecoderEvents::on_receiving`] does.
    fn on_serializing(&mut self, driver: &mut Encoder, src: &dyn PacketWriter) -> Option<String>;

    /// Fired once `src` has been fully emitted.
    fn on_serialized(&mut self, driver: &mut Encoder, src: &dyn PacketWriter);
}

/// A [`DecoderEvents`]/[`EncoderEvents`] implementation that does nothing,
/// used as the default when a driver is built without an explicit handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEvents;

impl DecoderEvents for NoopEvents {
    fn on_receiving(&mut self, _driver: &mut Decoder, _dst: &mut dyn PacketReader) -> Option<String> {
        None
    }
    fn on_received(&mut self, _driver: &mut Decoder, _dst: &mut dyn PacketReader) {}
}

impl EncoderEvents for NoopEvents {
    fn on_serializing(&mut self, _driver: &mut Encoder, _src: &dyn PacketWriter) -> Option<String> {
        None
    }
    fn on_serialized(&mut self, _driver: &mut Encoder, _src: &dyn PacketWriter) {}
}
