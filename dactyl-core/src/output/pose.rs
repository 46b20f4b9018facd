//! Pose code interpretation.
//!
//! Translates the abstract per-axis configuration codes from the gesture
//! table into concrete setpoint commands for the actuators behind each
//! axis. A finger axis fans out to one or two bus motors, the thumb to
//! four; the spread axis is the switch and the wrist axes are servo
//! angles passed through unchanged.

use dactyl_protocol::Command;

use crate::gesture::{Finger, Joint};

/// Number of output slots; index 0 is never used, 1-13 are live channels.
pub(crate) const OUTPUT_SLOTS: usize = 14;

/// Curl level of a finger axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FingerCurl {
    Straight,
    Curl,
    Clench,
    /// Base joint clenched, tip straight.
    VerticalClench,
    /// Base joint straight, tip clenched.
    HorizontalStraight,
    /// Tip half-curled over a straight base (the `R` cross).
    SlantedStraight,
}

impl FingerCurl {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FingerCurl::Straight),
            1 => Some(FingerCurl::Curl),
            2 => Some(FingerCurl::Clench),
            3 => Some(FingerCurl::VerticalClench),
            4 => Some(FingerCurl::HorizontalStraight),
            5 => Some(FingerCurl::SlantedStraight),
            _ => None,
        }
    }
}

/// Named thumb position, realized across the four thumb motors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ThumbPose {
    /// Relaxed against the side of the palm.
    FlatSide,
    /// Stuck straight out sideways.
    OutSide,
    /// Folded flat across the palm.
    FoldFlat,
    /// Folded over, tip pointing out.
    FoldStraightOut,
    /// Folded over, tip pointing up.
    FoldStraightUp,
    /// Curled over the fingers.
    ThumbCurl,
}

impl ThumbPose {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ThumbPose::FlatSide),
            1 => Some(ThumbPose::OutSide),
            2 => Some(ThumbPose::FoldFlat),
            3 => Some(ThumbPose::FoldStraightOut),
            4 => Some(ThumbPose::FoldStraightUp),
            5 => Some(ThumbPose::ThumbCurl),
            _ => None,
        }
    }
}

/// Wire byte for a setpoint slot.
fn slot(index: u8) -> u8 {
    Command::Setpoint(index).to_byte()
}

/// Bus motor channels behind each finger, base joint last.
pub(crate) fn finger_channels(finger: Finger) -> &'static [u8] {
    match finger {
        Finger::Thumb => &[10, 9, 8, 7],
        Finger::Index => &[2, 1],
        Finger::Middle => &[4, 3],
        Finger::Ring => &[5],
        Finger::Pinky => &[6],
    }
}

/// The neutral open command for a finger motor (setpoint slot 0).
pub(crate) fn open_value() -> u8 {
    slot(0)
}

/// Write one axis's configuration code into the output slots.
///
/// Returns `Err(code)` for a code the axis cannot realize; the slots keep
/// their previous values so the hand holds its last good pose there.
pub(crate) fn apply_axis(outputs: &mut [u8; OUTPUT_SLOTS], joint: Joint, code: u8) -> Result<(), u8> {
    match joint {
        Joint::Pinky | Joint::Ring => {
            let motor = if joint == Joint::Pinky { 6 } else { 5 };
            let value = match FingerCurl::from_code(code) {
                Some(FingerCurl::Straight) => slot(0),
                Some(FingerCurl::Curl) => slot(2),
                Some(FingerCurl::Clench) => slot(4),
                _ => return Err(code),
            };
            outputs[motor] = value;
        }
        Joint::Middle => {
            // Tip motor 4, base motor 3
            let (tip, base) = match FingerCurl::from_code(code) {
                Some(FingerCurl::Straight) => (0, 0),
                Some(FingerCurl::Curl) => (2, 2),
                Some(FingerCurl::Clench) => (4, 4),
                Some(FingerCurl::VerticalClench) => (4, 0),
                Some(FingerCurl::HorizontalStraight) => (0, 4),
                _ => return Err(code),
            };
            outputs[4] = slot(tip);
            outputs[3] = slot(base);
        }
        Joint::Index => {
            // Tip motor 2, base motor 1
            let (tip, base) = match FingerCurl::from_code(code) {
                Some(FingerCurl::Straight) => (0, 0),
                Some(FingerCurl::Curl) => (2, 2),
                Some(FingerCurl::Clench) => (4, 4),
                Some(FingerCurl::VerticalClench) => (0, 4),
                Some(FingerCurl::HorizontalStraight) => (4, 0),
                Some(FingerCurl::SlantedStraight) => (0, 2),
                None => return Err(code),
            };
            outputs[2] = slot(tip);
            outputs[1] = slot(base);
        }
        Joint::IndexSpread => match code {
            0 | 1 => outputs[11] = code,
            _ => return Err(code),
        },
        Joint::Thumb => {
            let values: [u8; 4] = match ThumbPose::from_code(code) {
                Some(ThumbPose::FlatSide) => [0, 0, 0, 0],
                Some(ThumbPose::OutSide) => [0, 4, 0, 0],
                Some(ThumbPose::FoldFlat) => [3, 1, 3, 0],
                Some(ThumbPose::FoldStraightOut) => [4, 4, 0, 0],
                Some(ThumbPose::FoldStraightUp) => [4, 0, 0, 0],
                Some(ThumbPose::ThumbCurl) => [4, 2, 1, 2],
                None => return Err(code),
            };
            for (channel, value) in [10, 9, 8, 7].into_iter().zip(values) {
                outputs[channel as usize] = slot(value);
            }
        }
        // Wrist codes are already servo degrees
        Joint::WristFlex => outputs[12] = code,
        Joint::WristTwist => outputs[13] = code,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> [u8; OUTPUT_SLOTS] {
        [0; OUTPUT_SLOTS]
    }

    #[test]
    fn test_single_motor_fingers() {
        let mut outputs = fresh();
        apply_axis(&mut outputs, Joint::Pinky, 2).unwrap();
        assert_eq!(outputs[6], b'e');
        apply_axis(&mut outputs, Joint::Ring, 1).unwrap();
        assert_eq!(outputs[5], b'c');
        apply_axis(&mut outputs, Joint::Ring, 0).unwrap();
        assert_eq!(outputs[5], b'a');
    }

    #[test]
    fn test_paired_finger_splits() {
        let mut outputs = fresh();
        // Middle vertical clench: tip down, base straight
        apply_axis(&mut outputs, Joint::Middle, 3).unwrap();
        assert_eq!((outputs[4], outputs[3]), (b'e', b'a'));
        // Index slanted straight only half-curls the base
        apply_axis(&mut outputs, Joint::Index, 5).unwrap();
        assert_eq!((outputs[2], outputs[1]), (b'a', b'c'));
    }

    #[test]
    fn test_thumb_fans_out_to_four_motors() {
        let mut outputs = fresh();
        apply_axis(&mut outputs, Joint::Thumb, 2).unwrap();
        assert_eq!(
            [outputs[10], outputs[9], outputs[8], outputs[7]],
            [b'd', b'b', b'd', b'a']
        );
        apply_axis(&mut outputs, Joint::Thumb, 0).unwrap();
        assert_eq!(
            [outputs[10], outputs[9], outputs[8], outputs[7]],
            [b'a', b'a', b'a', b'a']
        );
    }

    #[test]
    fn test_spread_and_wrist_pass_through() {
        let mut outputs = fresh();
        apply_axis(&mut outputs, Joint::IndexSpread, 1).unwrap();
        assert_eq!(outputs[11], 1);
        apply_axis(&mut outputs, Joint::WristFlex, 90).unwrap();
        assert_eq!(outputs[12], 90);
        apply_axis(&mut outputs, Joint::WristTwist, 45).unwrap();
        assert_eq!(outputs[13], 45);
    }

    #[test]
    fn test_bad_codes_leave_outputs_alone() {
        let mut outputs = fresh();
        apply_axis(&mut outputs, Joint::Pinky, 2).unwrap();
        // Pinky has no slanted variant
        assert_eq!(apply_axis(&mut outputs, Joint::Pinky, 5), Err(5));
        assert_eq!(outputs[6], b'e');
        assert_eq!(apply_axis(&mut outputs, Joint::IndexSpread, 7), Err(7));
        assert_eq!(apply_axis(&mut outputs, Joint::Thumb, 9), Err(9));
    }
}
