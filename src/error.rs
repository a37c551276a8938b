//! Error types for the AdHoc protocol codec.

use thiserror::Error;

/// Result type returned by the codec's fallible operations.
pub type ProtoResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while driving the encoder or decoder.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The decoder's packet allocator returned `None` for an unrecognized id.
    #[error("invalid packet id: {0}")]
    InvalidId(u64),

    /// A varint, length, or string exceeded its maximum encodable size.
    #[error("protocol overflow: {0}")]
    Overflow(&'static str),

    /// A pipeline stage rejected the packet from an event handler.
    #[error("packet rejected: {0}")]
    Rejected(String),

    /// The channel's configured timeout elapsed.
    #[error("channel timeout")]
    Timeout,

    /// The generated reader/writer detected a schema violation.
    #[error("protocol violation: {0}")]
    ProtocolViolation(&'static str),

    /// An invariant of the driver itself was violated.
    #[error("internal error: {0}")]
    InternalError(&'static str),

    /// The underlying channel I/O failed.
    #[error("channel I/O error: {0}")]
    Io(
        #[from]
        #[source]
        std::io::Error,
    ),
}
