//! Channel adapter: the external interface between a raw byte-stream
//! endpoint and the codec drivers.
//!
//! Split into two narrow traits rather than one fat interface: the
//! transport only ever needs the external face (`ByteSource`/`ByteSink`),
//! while the codec only ever needs the internal face (`Decoder`/`Encoder`).
//! Control-plane concerns (timeouts, close, abort) are kept separate from
//! both, since they govern the channel's lifecycle rather than its byte
//! flow.

/// Lifecycle notifications delivered to a channel's owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalEvent {
    Connected,
    RemoteDisconnect,
    LocalDisconnect,
    Timeout,
    ProtocolError,
    InternalError,
}

/// Byte-producing side of a channel, implemented by the encoder's channel
/// wiring and consumed by the transport.
pub trait ByteSource {
    /// Fills as much of `dst` as possible with the next bytes of the
    /// serialized stream, returning the count written.
    ///
    /// Returns `0` if no packet currently has bytes ready (more may still
    /// arrive later) and `-1` once the producer has signaled end-of-stream.
    fn read(&mut self, dst: &mut [u8]) -> i64;

    /// Registers a notifier invoked when the source becomes non-empty
    /// after being empty, returning whichever callback was previously
    /// registered, if any.
    fn subscribe_on_new_bytes(&mut self, callback: Box<dyn FnMut() + Send>) -> Option<Box<dyn FnMut() + Send>>;

    /// Returns `true` while the source may still produce bytes.
    fn is_open(&self) -> bool;

    /// Releases the source's resources.
    fn close(&mut self);
}

/// Byte-consuming side of a channel, implemented by the decoder's channel
/// wiring and driven by the transport.
pub trait ByteSink {
    /// Consumes up to `src.len()` bytes, returning the number actually
    /// consumed in this call. The reference implementation has no bounded
    /// internal capacity, so it always consumes the whole slice; callers
    /// needing bounded capacity implement their own `ByteSink`.
    fn write(&mut self, src: &[u8]) -> usize;

    /// Returns `true` while the sink will still accept bytes.
    fn is_open(&self) -> bool;

    /// Releases the sink's resources.
    fn close(&mut self);
}

/// Control-plane operations common to both directions of a channel. A
/// negative timeout signals a graceful-close request whose magnitude is
/// the grace period in milliseconds (zero magnitude means immediate);
/// see the design note on negative timeouts in `DESIGN.md`.
pub trait ChannelControl {
    /// Current receive-side timeout, in milliseconds.
    fn receive_timeout(&self) -> i64;
    /// Sets the receive-side timeout.
    fn set_receive_timeout(&mut self, millis: i64);
    /// Current transmit-side timeout, in milliseconds.
    fn transmit_timeout(&self) -> i64;
    /// Sets the transmit-side timeout.
    fn set_transmit_timeout(&mut self, millis: i64);

    /// Requests a graceful close: finish in-flight work, then stop.
    fn close(&mut self);
    /// Stops immediately, abandoning any in-flight packet.
    fn abort(&mut self);
    /// Closes and releases every resource the channel owns.
    fn close_and_dispose(&mut self);

    /// Delivers a lifecycle notification to the channel's owner.
    fn on_external_event(&mut self, kind: ExternalEvent);
}
