//! Per-motor setpoint and gain profiles
//!
//! A slave chip is generic until the master assigns it an identity; the
//! identity selects one of these rows. Slot positions are 8-bit travel
//! fractions the five setpoint letters map onto; the encoder count for a
//! slot is `(position << 2) + 1`, keeping counts in the 10-bit range the
//! wire protocol can report back.

use dactyl_protocol::SETPOINT_SLOTS;

/// Setpoint positions and loop gain for one motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorProfile {
    /// Travel positions for setpoint slots a-e, straight to clenched.
    pub slots: [u8; SETPOINT_SLOTS],
    /// Proportional gain for the position loop.
    pub kp: u8,
}

/// Profiles for motors 1-10.
///
/// 1,2 index base/tip - 3,4 middle base/tip - 5 ring - 6 pinky -
/// 7-10 thumb, palm joint outward. Tip joints travel further than base
/// joints; the short thumb links run a hotter gain to stay crisp.
pub const MOTOR_PROFILES: [MotorProfile; 10] = [
    MotorProfile { slots: [0, 45, 90, 135, 180], kp: 4 },
    MotorProfile { slots: [0, 50, 100, 150, 200], kp: 4 },
    MotorProfile { slots: [0, 45, 90, 135, 180], kp: 4 },
    MotorProfile { slots: [0, 50, 100, 150, 200], kp: 4 },
    MotorProfile { slots: [0, 55, 110, 165, 220], kp: 3 },
    MotorProfile { slots: [0, 55, 110, 165, 220], kp: 3 },
    MotorProfile { slots: [0, 30, 60, 90, 120], kp: 5 },
    MotorProfile { slots: [0, 35, 70, 105, 140], kp: 5 },
    MotorProfile { slots: [0, 35, 70, 105, 140], kp: 5 },
    MotorProfile { slots: [0, 40, 80, 120, 160], kp: 5 },
];

/// Profile for motor `number` (1-10). Out-of-range numbers clamp.
pub fn profile_for(number: u8) -> &'static MotorProfile {
    let index = (number.clamp(1, 10) - 1) as usize;
    &MOTOR_PROFILES[index]
}

/// Encoder count for a slot position.
pub fn slot_count(position: u8) -> u16 {
    ((position as u16) << 2) + 1
}
