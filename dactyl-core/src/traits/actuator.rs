//! Actuator output abstractions
//!
//! All master output funnels through [`ActuatorPort::output_to_motor`],
//! the single seam between the sequencing state machines and the physical
//! actuators. Channels 1-10 are slave motors on the bus, 11 is a GPIO
//! switch, 12 and 13 are directly wired hobby servos.

/// Hobby servo on a PWM output.
pub trait ServoDrive {
    /// Command the servo to an angle in degrees (0-180).
    fn set_angle(&mut self, degrees: u8);
}

/// Single binary output (index finger spread solenoid).
pub trait SwitchDrive {
    /// Drive the output high (`true`) or low (`false`).
    fn set(&mut self, on: bool);
}

/// Errors from actuator dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// Channel 0 or above 13 was requested; nothing was written.
    InvalidChannel(u8),
}

/// The physical-write primitive for all 13 logical actuator channels.
pub trait ActuatorPort {
    /// Route `value` to the actuator behind `channel`.
    ///
    /// For motor channels the value is a protocol byte written after the
    /// multiplexer select; for the switch it is 0/1; for servos it is an
    /// angle in degrees. This primitive never waits for a reply.
    fn output_to_motor(&mut self, channel: u8, value: u8) -> Result<(), DispatchError>;

    /// Poll the slave-facing return path for a reply byte.
    fn poll_reply(&mut self) -> Option<u8>;
}
