//! Operator console state machine
//!
//! Menu-driven interface on the human-facing serial port. Pure
//! presentation and delegation: every byte the operator types lands in
//! [`Console::on_byte`], every scheduler pass calls [`Console::poll`],
//! and all actual motor work happens in the speller and output sequencer
//! this console drives. Text goes out through any [`core::fmt::Write`].

use core::fmt::Write;

use dactyl_protocol::{unpack_count, Command, Reply};

use crate::config::AckConfig;
use crate::gesture::GestureTable;
use crate::output::{MotorOp, OutputEvent, OutputSequencer};
use crate::speller::{KeyAction, Speller, SpellerEvent};
use crate::traits::ActuatorPort;

const KEY_BACKSPACE: u8 = 0x08;
const KEY_ENTER: u8 = 0x0D;
const KEY_ESCAPE: u8 = 0x1B;

/// Console states. Menus wait for a key; the `*Wait` states are bounded
/// single-reply waits on the slave bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsoleState {
    /// Top-level menu.
    Home,
    /// Calibration menu, awaiting a motor key.
    Calibrate,
    /// Toggling a slave's calibration twice to re-base its count.
    CalibrateRun {
        channel: u8,
        toggles_left: u8,
        issued: bool,
        wait: u16,
    },
    /// Encoder menu, awaiting a motor key.
    Encoder,
    /// Awaiting one count byte from a slave.
    EncoderWait { channel: u8, wait: u16 },
    /// Manual mode, awaiting a motor key.
    ManualSelect,
    /// Raw pass-through to one slave until Escape.
    Manual { channel: u8 },
    /// Sentence entry and spelling, delegated to the speller.
    Sentence,
}

/// The operator-facing half of the master firmware.
#[derive(Debug)]
pub struct Console {
    state: ConsoleState,
    prompted: bool,
    table: GestureTable,
    speller: Speller,
    ack: AckConfig,
}

impl Console {
    pub fn new(table: GestureTable, speller: Speller, ack: AckConfig) -> Self {
        Self {
            state: ConsoleState::Home,
            prompted: false,
            table,
            speller,
            ack,
        }
    }

    pub fn state(&self) -> ConsoleState {
        self.state
    }

    fn enter(&mut self, state: ConsoleState) {
        self.state = state;
        self.prompted = false;
    }

    /// '1'-'9' pick motors 1-9, '0' picks motor 10.
    fn motor_key(key: u8) -> Option<u8> {
        match key {
            b'1'..=b'9' => Some(key - b'0'),
            b'0' => Some(10),
            _ => None,
        }
    }

    /// Handle one operator keystroke.
    pub fn on_byte<P: ActuatorPort, W: Write>(
        &mut self,
        byte: u8,
        out: &mut OutputSequencer,
        port: &mut P,
        w: &mut W,
    ) {
        match self.state {
            ConsoleState::Home => match byte {
                KEY_ESCAPE => {
                    if out.stop_all() {
                        let _ = write!(w, "\r\nStopping all motors\r\n");
                    } else {
                        let _ = write!(w, "\r\nBus busy, try again\r\n");
                    }
                    self.enter(ConsoleState::Home);
                }
                b'c' | b'C' => self.enter(ConsoleState::Calibrate),
                b'e' | b'E' => self.enter(ConsoleState::Encoder),
                b'm' | b'M' => self.enter(ConsoleState::ManualSelect),
                KEY_ENTER => {
                    self.speller.reset();
                    self.enter(ConsoleState::Sentence);
                }
                _ => {}
            },
            ConsoleState::Calibrate => {
                if let Some(channel) = Self::motor_key(byte) {
                    if out.ready_to_output() {
                        self.enter(ConsoleState::CalibrateRun {
                            channel,
                            toggles_left: 2,
                            issued: false,
                            wait: 0,
                        });
                    } else {
                        let _ = write!(w, "\r\nBus busy, try again\r\n");
                    }
                } else if byte == KEY_ESCAPE {
                    self.enter(ConsoleState::Home);
                } else {
                    let _ = write!(w, "\r\nInvalid key\r\n");
                    self.prompted = false;
                }
            }
            ConsoleState::Encoder => {
                if let Some(channel) = Self::motor_key(byte) {
                    if out.ready_to_output() {
                        let _ = port.output_to_motor(channel, Command::ReadCount.to_byte());
                        self.enter(ConsoleState::EncoderWait { channel, wait: 0 });
                    } else {
                        let _ = write!(w, "\r\nBus busy, try again\r\n");
                    }
                } else if byte == KEY_ESCAPE {
                    self.enter(ConsoleState::Home);
                } else {
                    let _ = write!(w, "\r\nInvalid key\r\n");
                    self.prompted = false;
                }
            }
            ConsoleState::ManualSelect => {
                if let Some(channel) = Self::motor_key(byte) {
                    let _ = write!(w, "\r\nRaw bytes go to motor {}. ESC returns.\r\n", channel);
                    self.enter(ConsoleState::Manual { channel });
                } else if byte == KEY_ESCAPE {
                    self.enter(ConsoleState::Home);
                } else {
                    let _ = write!(w, "\r\nInvalid key\r\n");
                    self.prompted = false;
                }
            }
            ConsoleState::Manual { channel } => {
                if byte == KEY_ESCAPE {
                    self.enter(ConsoleState::Home);
                } else {
                    let _ = port.output_to_motor(channel, byte);
                }
            }
            ConsoleState::Sentence => {
                if byte == KEY_ESCAPE {
                    self.speller.reset();
                    self.enter(ConsoleState::Home);
                    return;
                }
                match self.speller.handle_key(byte) {
                    KeyAction::Echo(c) => {
                        let _ = w.write_char(c as char);
                    }
                    KeyAction::Erase => {
                        // Step back, blank, step back again
                        let _ = write!(
                            w,
                            "{} {}",
                            KEY_BACKSPACE as char, KEY_BACKSPACE as char
                        );
                    }
                    KeyAction::Rejected => {
                        let _ = write!(w, "\r\nSentence full, character dropped\r\n> ");
                    }
                    KeyAction::Submitted => {
                        let _ = write!(w, "\r\nSpelling sentence\r\n");
                    }
                    KeyAction::Aborted | KeyAction::Ignored => {}
                }
            }
            // Keys during a bus wait are dropped; the wait is bounded
            ConsoleState::CalibrateRun { .. } | ConsoleState::EncoderWait { .. } => {}
        }
    }

    /// Advance the console by one scheduler pass.
    pub fn poll<P: ActuatorPort, W: Write>(
        &mut self,
        out: &mut OutputSequencer,
        port: &mut P,
        w: &mut W,
    ) {
        if !self.prompted {
            self.prompt(w);
            self.prompted = true;
        }

        match self.state {
            ConsoleState::CalibrateRun {
                channel,
                toggles_left,
                issued,
                wait,
            } => self.poll_calibrate(channel, toggles_left, issued, wait, port, w),
            ConsoleState::EncoderWait { channel, wait } => {
                self.poll_encoder(channel, wait, port, w)
            }
            ConsoleState::Manual { .. } => {
                // Echo whatever the slave sends back
                while let Some(byte) = port.poll_reply() {
                    let _ = w.write_char(byte as char);
                }
            }
            _ => {}
        }

        if let Some(event) = out.poll(port) {
            self.report(event, w);
        }

        if self.state == ConsoleState::Sentence {
            match self.speller.poll(&self.table, out) {
                Some(SpellerEvent::StepEmitted { character, step }) => {
                    let _ = write!(w, "\r\nLetter {} step {}\r\n", character as char, step);
                }
                Some(SpellerEvent::SentenceDone) => {
                    let _ = write!(w, "\r\nSentence done, back to the prompt\r\n");
                    self.prompted = false;
                }
                None => {}
            }
        }
    }

    fn poll_calibrate<P: ActuatorPort, W: Write>(
        &mut self,
        channel: u8,
        toggles_left: u8,
        issued: bool,
        wait: u16,
        port: &mut P,
        w: &mut W,
    ) {
        if !issued {
            let _ = port.output_to_motor(channel, Command::Calibrate.to_byte());
            self.state = ConsoleState::CalibrateRun {
                channel,
                toggles_left,
                issued: true,
                wait: 0,
            };
            return;
        }
        match port.poll_reply() {
            Some(byte) => {
                if Reply::from_byte(byte) != Some(Reply::Calibrated) {
                    let _ = write!(w, "\r\nMotor {} calibrate error\r\n", channel);
                }
                if toggles_left <= 1 {
                    let _ = write!(w, "\r\nMotor {} encoder cleared\r\n", channel);
                    self.enter(ConsoleState::Calibrate);
                } else {
                    self.state = ConsoleState::CalibrateRun {
                        channel,
                        toggles_left: toggles_left - 1,
                        issued: false,
                        wait: 0,
                    };
                }
            }
            None if wait + 1 >= self.ack.timeout_ticks => {
                let _ = write!(w, "\r\nMotor {} not answering\r\n", channel);
                self.enter(ConsoleState::Calibrate);
            }
            None => {
                self.state = ConsoleState::CalibrateRun {
                    channel,
                    toggles_left,
                    issued,
                    wait: wait + 1,
                };
            }
        }
    }

    fn poll_encoder<P: ActuatorPort, W: Write>(
        &mut self,
        channel: u8,
        wait: u16,
        port: &mut P,
        w: &mut W,
    ) {
        match port.poll_reply() {
            Some(byte) => {
                let _ = write!(w, "\r\nMotor {} count {}\r\n", channel, unpack_count(byte));
                self.enter(ConsoleState::Encoder);
            }
            None if wait + 1 >= self.ack.timeout_ticks => {
                let _ = write!(w, "\r\nMotor {} not answering\r\n", channel);
                self.enter(ConsoleState::Encoder);
            }
            None => {
                self.state = ConsoleState::EncoderWait {
                    channel,
                    wait: wait + 1,
                };
            }
        }
    }

    fn report<W: Write>(&mut self, event: OutputEvent, w: &mut W) {
        match event {
            OutputEvent::BadPoseCode { joint, code } => {
                let _ = write!(w, "\r\nBad pose code {} for {:?}\r\n", code, joint);
            }
            OutputEvent::AckMismatch {
                channel, received, ..
            } => {
                let _ = write!(
                    w,
                    "\r\nMotor {} answered {:#04x}, carrying on\r\n",
                    channel, received
                );
            }
            OutputEvent::AckTimeout { channel, .. } => {
                let _ = write!(w, "\r\nMotor {} not answering, skipped\r\n", channel);
            }
            OutputEvent::PassComplete(MotorOp::Stop) => {
                let _ = write!(w, "\r\nAll motors stopped\r\n");
            }
            OutputEvent::PassComplete(_) => {}
        }
    }

    fn prompt<W: Write>(&mut self, w: &mut W) {
        match self.state {
            ConsoleState::Home => {
                let _ = write!(
                    w,
                    "\r\nRobotic Fingerspelling Hand\r\n\r\n\
                     ESC stop motors\r\n\
                     C   calibrate\r\n\
                     E   read encoders\r\n\
                     M   manual pass-through\r\n\
                     ENT enter sentence\r\n"
                );
            }
            ConsoleState::Calibrate => {
                let _ = write!(
                    w,
                    "\r\nCalibrate which motor?\r\n1-9 motor 1-9, 0 motor 10, ESC cancel\r\n"
                );
            }
            ConsoleState::Encoder => {
                let _ = write!(
                    w,
                    "\r\nRead which encoder?\r\n1-9 motor 1-9, 0 motor 10, ESC cancel\r\n"
                );
            }
            ConsoleState::ManualSelect => {
                let _ = write!(
                    w,
                    "\r\nPass through to which motor?\r\n1-9 motor 1-9, 0 motor 10, ESC cancel\r\n"
                );
            }
            ConsoleState::Sentence => {
                let _ = write!(
                    w,
                    "\r\nInput sentence. Letters, numbers, commas, periods and spaces \
                     only, 255 characters max.\r\nEnter when done, Escape to quit.\r\n> "
                );
            }
            _ => {}
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new(
            GestureTable::new(),
            Speller::default(),
            AckConfig::default(),
        )
    }
}
