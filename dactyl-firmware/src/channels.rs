//! Inter-task communication channels
//!
//! Static channels between the UART tasks and the controller task. Both
//! serial links are drained byte-wise into channels so the cooperative
//! state machines can poll without blocking.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// Queue depth for operator keystrokes.
const OPERATOR_CHANNEL_SIZE: usize = 64;

/// Queue depth for slave reply bytes.
const SLAVE_CHANNEL_SIZE: usize = 64;

/// Bytes typed on the operator terminal.
pub static OPERATOR_BYTES: Channel<CriticalSectionRawMutex, u8, OPERATOR_CHANNEL_SIZE> =
    Channel::new();

/// Bytes coming back from whichever slave the mux addresses.
pub static SLAVE_BYTES: Channel<CriticalSectionRawMutex, u8, SLAVE_CHANNEL_SIZE> = Channel::new();
