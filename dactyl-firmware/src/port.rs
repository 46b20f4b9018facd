//! Hardware bindings for the core traits
//!
//! Implements the board side of `dactyl-core`'s abstractions: the mux
//! address pins, the slave bus UART, the two wrist servo PWM slices, the
//! spread switch GPIO, and a `fmt::Write` wrapper for the operator
//! terminal.

use embassy_rp::gpio::Output;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::BufferedUartTx;
use embedded_io::Write as _;

use dactyl_core::dispatch::{servo_compare, ActuatorDispatch};
use dactyl_core::traits::{ChannelMux, ServoDrive, SlaveSerial, SwitchDrive};

use crate::channels::SLAVE_BYTES;

/// The fully wired actuator port for this board.
pub type HandPort = ActuatorDispatch<MuxPins, SlaveBus, PwmServo, PwmServo, SpreadSwitch>;

/// Servo PWM frame: 125 MHz / 50 divider / 50000 ticks = 50 Hz.
pub const SERVO_PWM_TOP: u16 = 49_999;
pub const SERVO_PWM_DIVIDER: u8 = 50;

/// Four address lines feeding both multiplexer chips in parallel.
pub struct MuxPins {
    pins: [Output<'static>; 4],
}

impl MuxPins {
    pub fn new(pins: [Output<'static>; 4]) -> Self {
        Self { pins }
    }
}

impl ChannelMux for MuxPins {
    fn select(&mut self, channel: u8) {
        for (bit, pin) in self.pins.iter_mut().enumerate() {
            if channel & (1 << bit) != 0 {
                pin.set_high();
            } else {
                pin.set_low();
            }
        }
    }
}

/// Slave-facing UART: writes go straight out, reads come from the byte
/// channel the RX task fills.
pub struct SlaveBus {
    tx: BufferedUartTx,
}

impl SlaveBus {
    pub fn new(tx: BufferedUartTx) -> Self {
        Self { tx }
    }
}

impl SlaveSerial for SlaveBus {
    fn write_byte(&mut self, byte: u8) {
        let _ = self.tx.write_all(&[byte]);
    }

    fn read_byte(&mut self) -> Option<u8> {
        SLAVE_BYTES.try_receive().ok()
    }
}

/// One hobby servo on a PWM slice output A.
pub struct PwmServo {
    pwm: Pwm<'static>,
    config: PwmConfig,
}

impl PwmServo {
    /// Takes a slice already configured for the 20 ms servo frame.
    pub fn new(pwm: Pwm<'static>, config: PwmConfig) -> Self {
        Self { pwm, config }
    }

    /// PWM config for the servo frame, parked at center.
    pub fn frame_config() -> PwmConfig {
        let mut config = PwmConfig::default();
        config.top = SERVO_PWM_TOP;
        config.divider = fixed::FixedU16::from_num(SERVO_PWM_DIVIDER);
        config.compare_a = servo_compare(90);
        config
    }
}

impl ServoDrive for PwmServo {
    fn set_angle(&mut self, degrees: u8) {
        self.config.compare_a = servo_compare(degrees);
        self.pwm.set_config(&self.config);
    }
}

/// The index spread solenoid switch.
pub struct SpreadSwitch {
    pin: Output<'static>,
}

impl SpreadSwitch {
    pub fn new(pin: Output<'static>) -> Self {
        Self { pin }
    }
}

impl SwitchDrive for SpreadSwitch {
    fn set(&mut self, on: bool) {
        if on {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
    }
}

/// Operator terminal as a `fmt::Write` sink for console text.
pub struct ConsoleWriter {
    tx: BufferedUartTx,
}

impl ConsoleWriter {
    pub fn new(tx: BufferedUartTx) -> Self {
        Self { tx }
    }
}

impl core::fmt::Write for ConsoleWriter {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.tx.write_all(s.as_bytes()).map_err(|_| core::fmt::Error)
    }
}
