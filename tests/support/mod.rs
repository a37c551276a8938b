//! Hand-written example packet pair shared by the integration tests.
//!
//! Fields, in wire order: `u32`, `bool`, `u16`. Deliberately the same shape
//! as the golden scenario in `SPEC_FULL.md` §8 so the byte sequence it
//! produces is independently checkable by hand.

use adhoc_protocol::decoder::{DecodeCursor, Decoder};
use adhoc_protocol::encoder::{EncodeCursor, Encoder};
use adhoc_protocol::error::ProtoResult;
use adhoc_protocol::packet::{PacketReader, PacketWriter};
use adhoc_protocol::varint::VARINT73;

pub const DEMO_PACKET_ID: u64 = 3;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DemoPacket {
    pub a: u32,
    pub b: bool,
    pub c: u16,
}

impl PacketReader for DemoPacket {
    fn packet_id(&self) -> u64 {
        DEMO_PACKET_ID
    }

    fn put_bytes(&mut self, decoder: &mut Decoder, cursor: &mut DecodeCursor) -> ProtoResult<bool> {
        loop {
            match decoder.slots_mut().active().index0 {
                0 => match decoder.read_u32(cursor) {
                    Some(v) => {
                        self.a = v;
                        decoder.slots_mut().active_mut().index0 = 1;
                    }
                    None => return Ok(false),
                },
                1 => match decoder.read_bool(cursor) {
                    Some(v) => {
                        self.b = v;
                        decoder.slots_mut().active_mut().index0 = 2;
                    }
                    None => return Ok(false),
                },
                2 => match decoder.read_u16(cursor) {
                    Some(v) => {
                        self.c = v;
                        return Ok(true);
                    }
                    None => return Ok(false),
                },
                other => unreachable!("unexpected resume state {other}"),
            }
        }
    }
}

impl PacketWriter for DemoPacket {
    fn packet_id(&self) -> u64 {
        DEMO_PACKET_ID
    }

    fn get_bytes(&self, encoder: &mut Encoder, cursor: &mut EncodeCursor) -> ProtoResult<bool> {
        loop {
            match encoder.slots_mut().active().index0 {
                0 => {
                    if !encoder.write_id(self.packet_id(), cursor) {
                        return Ok(false);
                    }
                    encoder.slots_mut().active_mut().index0 = 1;
                }
                1 => {
                    if !encoder.write_u32(self.a, cursor) {
                        return Ok(false);
                    }
                    encoder.slots_mut().active_mut().index0 = 2;
                }
                2 => {
                    if !encoder.write_bool(self.b, cursor) {
                        return Ok(false);
                    }
                    encoder.slots_mut().active_mut().index0 = 3;
                }
                3 => {
                    if !encoder.write_u16(self.c, cursor) {
                        return Ok(false);
                    }
                    return Ok(true);
                }
                other => unreachable!("unexpected resume state {other}"),
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmptyPing;

pub const EMPTY_PING_ID: u64 = 7;

impl PacketReader for EmptyPing {
    fn packet_id(&self) -> u64 {
        EMPTY_PING_ID
    }

    fn put_bytes(&mut self, _decoder: &mut Decoder, _cursor: &mut DecodeCursor) -> ProtoResult<bool> {
        Ok(true)
    }
}

impl PacketWriter for EmptyPing {
    fn packet_id(&self) -> u64 {
        EMPTY_PING_ID
    }

    fn get_bytes(&self, encoder: &mut Encoder, cursor: &mut EncodeCursor) -> ProtoResult<bool> {
        if !encoder.write_id(self.packet_id(), cursor) {
            return Ok(false);
        }
        Ok(true)
    }
}

/// A packet whose trailing field is wide enough to usefully exercise the
/// split-value cache when a chunk boundary lands inside it.
pub const SPLIT_U64_PACKET_ID: u64 = 9;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SplitU64Packet {
    pub header: u32,
    pub value: u64,
}

impl PacketReader for SplitU64Packet {
    fn packet_id(&self) -> u64 {
        SPLIT_U64_PACKET_ID
    }

    fn put_bytes(&mut self, decoder: &mut Decoder, cursor: &mut DecodeCursor) -> ProtoResult<bool> {
        loop {
            match decoder.slots_mut().active().index0 {
                0 => match decoder.read_u32(cursor) {
                    Some(v) => {
                        self.header = v;
                        decoder.slots_mut().active_mut().index0 = 1;
                    }
                    None => return Ok(false),
                },
                1 => match decoder.read_u64(cursor) {
                    Some(v) => {
                        self.value = v;
                        return Ok(true);
                    }
                    None => return Ok(false),
                },
                other => unreachable!("unexpected resume state {other}"),
            }
        }
    }
}

impl PacketWriter for SplitU64Packet {
    fn packet_id(&self) -> u64 {
        SPLIT_U64_PACKET_ID
    }

    fn get_bytes(&self, encoder: &mut Encoder, cursor: &mut EncodeCursor) -> ProtoResult<bool> {
        loop {
            match encoder.slots_mut().active().index0 {
                0 => {
                    if !encoder.write_id(self.packet_id(), cursor) {
                        return Ok(false);
                    }
                    encoder.slots_mut().active_mut().index0 = 1;
                }
                1 => {
                    if !encoder.write_u32(self.header, cursor) {
                        return Ok(false);
                    }
                    encoder.slots_mut().active_mut().index0 = 2;
                }
                2 => {
                    if !encoder.write_u64(self.value, cursor) {
                        return Ok(false);
                    }
                    return Ok(true);
                }
                other => unreachable!("unexpected resume state {other}"),
            }
        }
    }
}

/// A packet whose payload field is a bits+bytes varint (`VARINT73`) with a
/// folded nullability bit, bracketed by a fixed-width header and trailer so
/// the accessor's suspend/resume behaves correctly mid-composite.
pub const BITS_BYTES_PACKET_ID: u64 = 11;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BitsBytesPacket {
    pub header: u32,
    pub value: u64,
    pub is_null: bool,
    pub trailer: u16,
}

impl PacketReader for BitsBytesPacket {
    fn packet_id(&self) -> u64 {
        BITS_BYTES_PACKET_ID
    }

    fn put_bytes(&mut self, decoder: &mut Decoder, cursor: &mut DecodeCursor) -> ProtoResult<bool> {
        loop {
            match decoder.slots_mut().active().index0 {
                0 => match decoder.read_u32(cursor) {
                    Some(v) => {
                        self.header = v;
                        decoder.slots_mut().active_mut().index0 = 1;
                    }
                    None => return Ok(false),
                },
                1 => match decoder.read_bits_bytes_nulls(&VARINT73, 1, cursor) {
                    Some((value, nulls)) => {
                        self.value = value;
                        self.is_null = nulls != 0;
                        decoder.slots_mut().active_mut().index0 = 2;
                    }
                    None => return Ok(false),
                },
                2 => match decoder.read_u16(cursor) {
                    Some(v) => {
                        self.trailer = v;
                        return Ok(true);
                    }
                    None => return Ok(false),
                },
                other => unreachable!("unexpected resume state {other}"),
            }
        }
    }
}

impl PacketWriter for BitsBytesPacket {
    fn packet_id(&self) -> u64 {
        BITS_BYTES_PACKET_ID
    }

    fn get_bytes(&self, encoder: &mut Encoder, cursor: &mut EncodeCursor) -> ProtoResult<bool> {
        loop {
            match encoder.slots_mut().active().index0 {
                0 => {
                    if !encoder.write_id(self.packet_id(), cursor) {
                        return Ok(false);
                    }
                    encoder.slots_mut().active_mut().index0 = 1;
                }
                1 => {
                    if !encoder.write_u32(self.header, cursor) {
                        return Ok(false);
                    }
                    encoder.slots_mut().active_mut().index0 = 2;
                }
                2 => {
                    if !encoder.write_bits_bytes_nulls(&VARINT73, self.value, 1, u32::from(self.is_null), cursor)? {
                        return Ok(false);
                    }
                    encoder.slots_mut().active_mut().index0 = 3;
                }
                3 => {
                    if !encoder.write_u16(self.trailer, cursor) {
                        return Ok(false);
                    }
                    return Ok(true);
                }
                other => unreachable!("unexpected resume state {other}"),
            }
        }
    }
}
