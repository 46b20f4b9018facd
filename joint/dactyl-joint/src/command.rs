//! Command interpreter and controller state
//!
//! Owns everything on the slave except the encoder count: the desired
//! count, the enable and calibration flags, and the assigned motor
//! profile. Bytes arrive one at a time from the bus; most commands
//! answer with a single ack byte, setpoint selection answers with
//! nothing at all.

use dactyl_protocol::{pack_count, Command, Reply};

use crate::control::{ControlLoop, Drive};
use crate::profile::{profile_for, slot_count, MotorProfile};
use crate::quadrature::EncoderCell;

/// One slave joint: command handling plus the position loop.
#[derive(Debug)]
pub struct JointController<'a> {
    encoder: &'a EncoderCell,
    control: ControlLoop,
    profile: MotorProfile,
    desired: u16,
    enabled: bool,
    calibrating: bool,
}

impl<'a> JointController<'a> {
    /// Power-on state: disabled, on-target at the re-based count, with
    /// motor 1's profile until the master assigns an identity.
    pub fn new(encoder: &'a EncoderCell) -> Self {
        Self {
            encoder,
            control: ControlLoop::new(),
            profile: *profile_for(1),
            desired: 1,
            enabled: false,
            calibrating: false,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn calibrating(&self) -> bool {
        self.calibrating
    }

    pub fn desired(&self) -> u16 {
        self.desired
    }

    pub fn profile(&self) -> &MotorProfile {
        &self.profile
    }

    /// Interpret one received byte. Returns the reply byte to send, if
    /// the command calls for one; unknown bytes are ignored.
    pub fn handle_byte(&mut self, byte: u8) -> Option<u8> {
        match Command::from_byte(byte)? {
            Command::Setpoint(slot) => {
                self.desired = slot_count(self.profile.slots[slot as usize]);
                None
            }
            Command::Stop => {
                self.enabled = false;
                Some(Reply::Stopped.to_byte())
            }
            Command::Go => {
                self.enabled = true;
                Some(Reply::Enabled.to_byte())
            }
            Command::Calibrate => {
                // Entering changes nothing; leaving re-bases the count
                self.calibrating = !self.calibrating;
                if !self.calibrating {
                    self.encoder.set_count(1);
                }
                Some(Reply::Calibrated.to_byte())
            }
            Command::Identify(motor) => {
                self.profile = *profile_for(motor);
                Some(Reply::Identified.to_byte())
            }
            Command::ReadCount => Some(pack_count(self.encoder.count())),
            // Reserved: no reply until position tracking reports done
            Command::QueryDone => None,
        }
    }

    /// Advance the position loop one state.
    pub fn poll_motor(&mut self) -> Option<Drive> {
        self.control.poll(
            self.enabled,
            self.encoder.count(),
            self.desired,
            self.profile.kp,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quadrature::Motion;

    #[test]
    fn test_powers_on_disabled_and_on_target() {
        let encoder = EncoderCell::new();
        let mut joint = JointController::new(&encoder);
        assert!(!joint.enabled());
        assert_eq!(joint.desired(), 1);
        // First drive pass is a brake
        assert_eq!(joint.poll_motor(), None);
        assert_eq!(joint.poll_motor(), Some(Drive::Brake));
    }

    #[test]
    fn test_stop_and_go_gate_the_loop() {
        let encoder = EncoderCell::new();
        let mut joint = JointController::new(&encoder);
        assert_eq!(joint.handle_byte(b'G'), Some(b'g'));
        assert!(joint.enabled());
        assert_eq!(joint.handle_byte(b'S'), Some(b's'));
        assert!(!joint.enabled());
    }

    #[test]
    fn test_setpoint_selection_is_silent() {
        let encoder = EncoderCell::new();
        let mut joint = JointController::new(&encoder);
        joint.handle_byte(b'3'); // identify as motor 3
        assert_eq!(joint.handle_byte(b'c'), None);
        // Slot c of motor 3 sits at position 90
        assert_eq!(joint.desired(), slot_count(90));
        assert_eq!(joint.handle_byte(b'a'), None);
        assert_eq!(joint.desired(), 1);
    }

    #[test]
    fn test_identity_loads_the_profile() {
        let encoder = EncoderCell::new();
        let mut joint = JointController::new(&encoder);
        assert_eq!(joint.handle_byte(b'7'), Some(b'!'));
        assert_eq!(joint.profile(), profile_for(7));
        // '0' is motor 10
        assert_eq!(joint.handle_byte(b'0'), Some(b'!'));
        assert_eq!(joint.profile(), profile_for(10));
    }

    #[test]
    fn test_calibration_rebases_on_the_way_out() {
        let encoder = EncoderCell::new();
        for _ in 0..41 {
            encoder.apply(Motion::Clockwise);
        }
        assert_eq!(encoder.count(), 42);

        let mut joint = JointController::new(&encoder);
        // Entering calibration leaves the count alone
        assert_eq!(joint.handle_byte(b'C'), Some(b'c'));
        assert!(joint.calibrating());
        assert_eq!(encoder.count(), 42);
        // The count can still move while calibrating
        encoder.apply(Motion::CounterClockwise);
        assert_eq!(encoder.count(), 41);
        // Leaving re-bases to 1
        assert_eq!(joint.handle_byte(b'C'), Some(b'c'));
        assert!(!joint.calibrating());
        assert_eq!(encoder.count(), 1);
    }

    #[test]
    fn test_count_query_scales_to_one_byte() {
        let encoder = EncoderCell::new();
        encoder.set_count(400);
        let mut joint = JointController::new(&encoder);
        assert_eq!(joint.handle_byte(b'E'), Some(100));
    }

    #[test]
    fn test_done_query_is_reserved() {
        let encoder = EncoderCell::new();
        let mut joint = JointController::new(&encoder);
        assert_eq!(joint.handle_byte(b'Q'), None);
        // And it changed nothing
        assert!(!joint.enabled());
        assert_eq!(joint.desired(), 1);
    }

    #[test]
    fn test_unknown_bytes_are_ignored() {
        let encoder = EncoderCell::new();
        let mut joint = JointController::new(&encoder);
        for byte in [0x00, 0x1B, b'z', 0xFF] {
            assert_eq!(joint.handle_byte(byte), None);
        }
        assert!(!joint.enabled());
        // Still responsive afterwards
        assert_eq!(joint.handle_byte(b'G'), Some(b'g'));
    }

    #[test]
    fn test_seeks_a_new_setpoint() {
        let encoder = EncoderCell::new();
        encoder.set_count(100);
        let mut joint = JointController::new(&encoder);
        joint.handle_byte(b'1');
        joint.handle_byte(b'G');
        joint.handle_byte(b'b'); // slot b of motor 1: position 45, count 181

        assert_eq!(joint.poll_motor(), None); // check
        assert_eq!(joint.poll_motor(), None); // compute
        // error = 100 - 181 = -81: ceiling gain slams reverse
        assert_eq!(joint.poll_motor(), Some(Drive::Reverse(255)));
    }
}
