//! Shared test doubles for the sequencing state machines.

use heapless::{Deque, Vec};

use crate::traits::{ActuatorPort, DispatchError};

/// Records every `(channel, value)` write and serves scripted replies.
pub(crate) struct MockPort {
    pub(crate) writes: Vec<(u8, u8), 128>,
    pub(crate) replies: Deque<u8, 64>,
}

impl MockPort {
    pub(crate) fn new() -> Self {
        Self {
            writes: Vec::new(),
            replies: Deque::new(),
        }
    }
}

impl ActuatorPort for MockPort {
    fn output_to_motor(&mut self, channel: u8, value: u8) -> Result<(), DispatchError> {
        if channel == 0 || channel > dactyl_protocol::MAX_CHANNEL {
            return Err(DispatchError::InvalidChannel(channel));
        }
        self.writes
            .push((channel, value))
            .expect("mock write log overflow");
        Ok(())
    }

    fn poll_reply(&mut self) -> Option<u8> {
        self.replies.pop_front()
    }
}
