//! Command and reply bytes for the joint bus.
//!
//! Every command is a single byte; the typed enums exist so the master and
//! slave state machines agree on the wire values in exactly one place.

/// Number of pre-configured setpoint slots per joint.
pub const SETPOINT_SLOTS: usize = 5;

/// A command byte sent from the master to the selected slave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Seek one of the five pre-configured setpoint slots (0-4).
    Setpoint(u8),
    /// Disable the drive stage and brake.
    Stop,
    /// Enable the drive stage.
    Go,
    /// Toggle calibration mode; leaving calibration re-bases the count.
    Calibrate,
    /// Assign this chip the identity (and profile) of motor 1-10.
    Identify(u8),
    /// Read back the encoder count, scaled to one byte.
    ReadCount,
    /// Ask whether the last setpoint has been reached. Reserved.
    QueryDone,
}

impl Command {
    /// Encode this command as its wire byte.
    ///
    /// Slot and motor numbers out of range are clamped into range rather
    /// than silently aliasing another command.
    pub fn to_byte(self) -> u8 {
        match self {
            Command::Setpoint(slot) => b'a' + slot.min(SETPOINT_SLOTS as u8 - 1),
            Command::Stop => b'S',
            Command::Go => b'G',
            Command::Calibrate => b'C',
            Command::Identify(motor) => {
                // '1'..'9' for motors 1-9, '0' for motor 10
                match motor.clamp(1, 10) {
                    10 => b'0',
                    n => b'0' + n,
                }
            }
            Command::ReadCount => b'E',
            Command::QueryDone => b'Q',
        }
    }

    /// Decode a wire byte into a command.
    ///
    /// Returns `None` for bytes outside the protocol; slaves ignore those.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'a'..=b'e' => Some(Command::Setpoint(byte - b'a')),
            b'S' => Some(Command::Stop),
            b'G' => Some(Command::Go),
            b'C' => Some(Command::Calibrate),
            b'1'..=b'9' => Some(Command::Identify(byte - b'0')),
            b'0' => Some(Command::Identify(10)),
            b'E' => Some(Command::ReadCount),
            b'Q' => Some(Command::QueryDone),
            _ => None,
        }
    }

    /// The acknowledgement byte this command expects, if any.
    ///
    /// `Setpoint` returns `None`: the current slave revision does not ack
    /// slot selection (the legacy `'!'` ack may still arrive from old
    /// boards and is tolerated by callers). `ReadCount` replies with data
    /// rather than a fixed ack, and `QueryDone` is reserved.
    pub fn expected_ack(self) -> Option<u8> {
        match self {
            Command::Stop => Some(Reply::Stopped.to_byte()),
            Command::Go => Some(Reply::Enabled.to_byte()),
            Command::Calibrate => Some(Reply::Calibrated.to_byte()),
            Command::Identify(_) => Some(Reply::Identified.to_byte()),
            _ => None,
        }
    }
}

/// A fixed acknowledgement byte sent from a slave to the master.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    /// Drive disabled (`'s'`).
    Stopped,
    /// Drive enabled (`'g'`).
    Enabled,
    /// Calibration toggled (`'c'`).
    Calibrated,
    /// Identity accepted (`'!'`), also the legacy setpoint ack.
    Identified,
}

impl Reply {
    /// Encode this reply as its wire byte.
    pub fn to_byte(self) -> u8 {
        match self {
            Reply::Stopped => b's',
            Reply::Enabled => b'g',
            Reply::Calibrated => b'c',
            Reply::Identified => b'!',
        }
    }

    /// Decode a wire byte into a fixed reply.
    ///
    /// Encoder count replies are arbitrary bytes and cannot be classified
    /// here; callers that just sent `ReadCount` must treat the next byte as
    /// data instead.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b's' => Some(Reply::Stopped),
            b'g' => Some(Reply::Enabled),
            b'c' => Some(Reply::Calibrated),
            b'!' => Some(Reply::Identified),
            _ => None,
        }
    }
}
