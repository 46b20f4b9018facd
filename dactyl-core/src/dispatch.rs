//! Actuator dispatch
//!
//! Routes logical channel writes to the physical actuators: the serial
//! multiplexer plus bus for channels 1-10, the spread switch on 11, and
//! the two wrist servos on 12 and 13. This is the only place that touches
//! hardware on the output side; everything above it deals in
//! `(channel, value)` pairs.

use dactyl_protocol::{
    is_motor_channel, SWITCH_CHANNEL, WRIST_FLEX_CHANNEL, WRIST_TWIST_CHANNEL,
};

use crate::traits::{
    ActuatorPort, ChannelMux, DispatchError, ServoDrive, SlaveSerial, SwitchDrive,
};

/// Full servo travel in degrees.
pub const SERVO_MAX_DEGREES: u8 = 180;

/// Timer compare value for a servo angle.
///
/// The servo timer runs a 20 ms frame; 2500 ticks is the 1 ms minimum
/// pulse and each degree adds 2500/180 ticks on top, so 180 degrees is
/// the 2 ms maximum pulse.
pub fn servo_compare(degrees: u8) -> u16 {
    let degrees = degrees.min(SERVO_MAX_DEGREES) as u32;
    (2500 * degrees / 180) as u16 + 2500
}

/// Concrete actuator routing over the board's hardware.
pub struct ActuatorDispatch<M, L, F, T, W> {
    mux: M,
    link: L,
    flex_servo: F,
    twist_servo: T,
    spread_switch: W,
}

impl<M, L, F, T, W> ActuatorDispatch<M, L, F, T, W>
where
    M: ChannelMux,
    L: SlaveSerial,
    F: ServoDrive,
    T: ServoDrive,
    W: SwitchDrive,
{
    pub fn new(mux: M, link: L, flex_servo: F, twist_servo: T, spread_switch: W) -> Self {
        Self {
            mux,
            link,
            flex_servo,
            twist_servo,
            spread_switch,
        }
    }
}

impl<M, L, F, T, W> ActuatorPort for ActuatorDispatch<M, L, F, T, W>
where
    M: ChannelMux,
    L: SlaveSerial,
    F: ServoDrive,
    T: ServoDrive,
    W: SwitchDrive,
{
    fn output_to_motor(&mut self, channel: u8, value: u8) -> Result<(), DispatchError> {
        if is_motor_channel(channel) {
            // The select must land before the byte; the bus is shared
            self.mux.select(channel);
            self.link.write_byte(value);
            Ok(())
        } else if channel == SWITCH_CHANNEL {
            match value {
                0 => self.spread_switch.set(false),
                1 => self.spread_switch.set(true),
                _ => {}
            }
            Ok(())
        } else if channel == WRIST_FLEX_CHANNEL {
            self.flex_servo.set_angle(value.min(SERVO_MAX_DEGREES));
            Ok(())
        } else if channel == WRIST_TWIST_CHANNEL {
            self.twist_servo.set_angle(value.min(SERVO_MAX_DEGREES));
            Ok(())
        } else {
            Err(DispatchError::InvalidChannel(channel))
        }
    }

    fn poll_reply(&mut self) -> Option<u8> {
        self.link.read_byte()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    #[derive(Default)]
    struct Trace {
        selected: Option<u8>,
        bus: Vec<(u8, u8), 16>,
        angles: Vec<(char, u8), 16>,
        switch: Option<bool>,
    }

    struct TraceMux<'a>(&'a core::cell::RefCell<Trace>);
    impl ChannelMux for TraceMux<'_> {
        fn select(&mut self, channel: u8) {
            self.0.borrow_mut().selected = Some(channel);
        }
    }

    struct TraceLink<'a>(&'a core::cell::RefCell<Trace>);
    impl SlaveSerial for TraceLink<'_> {
        fn write_byte(&mut self, byte: u8) {
            let mut t = self.0.borrow_mut();
            let selected = t.selected.expect("write before select");
            t.bus.push((selected, byte)).unwrap();
        }
        fn read_byte(&mut self) -> Option<u8> {
            None
        }
    }

    struct TraceServo<'a>(char, &'a core::cell::RefCell<Trace>);
    impl ServoDrive for TraceServo<'_> {
        fn set_angle(&mut self, degrees: u8) {
            self.1.borrow_mut().angles.push((self.0, degrees)).unwrap();
        }
    }

    struct TraceSwitch<'a>(&'a core::cell::RefCell<Trace>);
    impl SwitchDrive for TraceSwitch<'_> {
        fn set(&mut self, on: bool) {
            self.0.borrow_mut().switch = Some(on);
        }
    }

    fn dispatch(
        trace: &core::cell::RefCell<Trace>,
    ) -> ActuatorDispatch<TraceMux<'_>, TraceLink<'_>, TraceServo<'_>, TraceServo<'_>, TraceSwitch<'_>>
    {
        ActuatorDispatch::new(
            TraceMux(trace),
            TraceLink(trace),
            TraceServo('f', trace),
            TraceServo('t', trace),
            TraceSwitch(trace),
        )
    }

    #[test]
    fn test_motor_channels_select_then_write() {
        let trace = core::cell::RefCell::new(Trace::default());
        let mut port = dispatch(&trace);
        port.output_to_motor(3, b'c').unwrap();
        port.output_to_motor(10, b'S').unwrap();
        assert_eq!(&trace.borrow().bus[..], &[(3, b'c'), (10, b'S')]);
    }

    #[test]
    fn test_switch_channel_understands_binary_only() {
        let trace = core::cell::RefCell::new(Trace::default());
        let mut port = dispatch(&trace);
        port.output_to_motor(11, 1).unwrap();
        assert_eq!(trace.borrow().switch, Some(true));
        port.output_to_motor(11, 0).unwrap();
        assert_eq!(trace.borrow().switch, Some(false));
        // Anything else leaves the switch alone
        port.output_to_motor(11, 7).unwrap();
        assert_eq!(trace.borrow().switch, Some(false));
    }

    #[test]
    fn test_servo_channels_route_and_clamp() {
        let trace = core::cell::RefCell::new(Trace::default());
        let mut port = dispatch(&trace);
        port.output_to_motor(12, 90).unwrap();
        port.output_to_motor(13, 200).unwrap();
        assert_eq!(&trace.borrow().angles[..], &[('f', 90), ('t', 180)]);
    }

    #[test]
    fn test_invalid_channels_have_no_side_effect() {
        let trace = core::cell::RefCell::new(Trace::default());
        let mut port = dispatch(&trace);
        assert_eq!(
            port.output_to_motor(0, b'a'),
            Err(DispatchError::InvalidChannel(0))
        );
        assert_eq!(
            port.output_to_motor(14, b'a'),
            Err(DispatchError::InvalidChannel(14))
        );
        let t = trace.borrow();
        assert!(t.bus.is_empty() && t.angles.is_empty() && t.switch.is_none());
    }

    #[test]
    fn test_servo_compare_linear_map() {
        assert_eq!(servo_compare(0), 2500);
        assert_eq!(servo_compare(90), 3750);
        assert_eq!(servo_compare(180), 5000);
        // Out-of-range angles clamp to full deflection
        assert_eq!(servo_compare(255), 5000);
    }
}
