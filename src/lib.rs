//! A resumable streaming wire-format codec.
//!
//! # Overview
//!
//! This crate implements the AdHoc protocol runtime: a pair of driver
//! state machines ([`decoder::Decoder`], [`encoder::Encoder`]) that
//! serialize and deserialize framed packets against a byte stream that may
//! arrive or depart in arbitrarily sized fragments. Every primitive
//! operation — fixed-width integers, variable-byte integers, bit-packed
//! fields, length-prefixed strings — can suspend at any byte boundary and
//! resume exactly where it left off on the next call.
//!
//! # Design
//!
//! The codec is layered bottom-up:
//!
//! - [`buffer`] and [`cache`]: primitive little-endian access and the
//!   split-value cache that reassembles a value straddling a chunk
//!   boundary.
//! - [`bits`] and [`varint`]: bit-packed fields and the two varint
//!   encodings (continuation-bit and bits+bytes).
//! - [`strcodec`] and [`nullmask`]: length-prefixed UTF-16 strings and the
//!   per-composite null-field mask.
//! - [`slot`]: the arena-backed nesting stack for composite values.
//! - [`packet`] and [`channel`]: the contracts generated or hand-written
//!   packet types, and transports, implement against this crate.
//! - [`decoder`] and [`encoder`]: the top-level drivers that tie all of
//!   the above into `write`/`read` loops.
//!
//! # Errors
//!
//! Every fallible operation returns [`error::ProtoResult`], aliasing
//! [`Result<T, error::ProtocolError>`].
//!
//! # Examples
//!
//! ```
//! use adhoc_protocol::config::EncoderConfig;
//! use adhoc_protocol::encoder::Encoder;
//!
//! let mut encoder = Encoder::without_events(EncoderConfig::new(1).unwrap(), || None);
//! let mut out = [0u8; 8];
//! assert_eq!(encoder.read(&mut out).unwrap(), -1);
//! ```

pub mod bits;
pub mod buffer;
pub mod cache;
pub mod channel;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod nullmask;
pub mod packet;
pub mod slot;
pub mod strcodec;
pub mod varint;

pub use config::{DecoderConfig, EncoderConfig};
pub use decoder::{DecodeCursor, Decoder};
pub use encoder::{EncodeCursor, Encoder};
pub use error::{ProtoResult, ProtocolError};
pub use packet::{DecoderEvents, EncoderEvents, PacketReader, PacketWriter};
