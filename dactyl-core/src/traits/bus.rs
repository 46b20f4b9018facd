//! Slave bus abstractions
//!
//! The slaves share one half-duplex serial line; an external multiplexer
//! routes it to a single chip at a time. Implementations select a channel
//! by driving the multiplexer address pins and move bytes through the
//! board's UART.

/// Multiplexer that routes the shared serial bus to one slave chip.
pub trait ChannelMux {
    /// Address the given slave channel.
    ///
    /// Takes effect before the next byte is written; implementations must
    /// not buffer the selection.
    fn select(&mut self, channel: u8);
}

/// Byte link to whichever slave the multiplexer currently addresses.
///
/// Delivery is best-effort: the bus has no checksums or retransmission,
/// so callers that care about a reply poll for it explicitly.
pub trait SlaveSerial {
    /// Write one byte to the selected slave.
    fn write_byte(&mut self, byte: u8);

    /// Take the next byte from the slave-facing receive path, if any.
    ///
    /// Non-blocking; state machines call this once per scheduler pass.
    fn read_byte(&mut self) -> Option<u8>;
}
