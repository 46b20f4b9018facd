//! Output sequencing state machine
//!
//! Owns the last-requested configuration for all eight joint axes and
//! realizes it on the actuators: resolves finger interference first, then
//! dispatches the batch over the bus, one channel select and one byte at a
//! time. Also runs the motor lifecycle passes (identify, enable, stop)
//! that walk every bus channel and wait for each slave's acknowledgement.
//!
//! The speller hands poses in through [`OutputSequencer::change_output`]
//! and must hold off while [`OutputSequencer::ready_to_output`] is false;
//! that handshake is what keeps the shared bus from being overrun.

pub mod pose;

use dactyl_protocol::{Command, MOTOR_CHANNELS};

use crate::config::AckConfig;
use crate::gesture::{FingerSet, Joint, JOINT_COUNT};
use crate::traits::ActuatorPort;

use pose::{apply_axis, finger_channels, open_value, OUTPUT_SLOTS};

/// Pose pipeline states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputState {
    /// Nothing to flush.
    Idle,
    /// Driving flagged fingers open before the new pose lands.
    ResolveInterference,
    /// Writing the batched pose to all channels.
    Dispatch,
}

/// One walk over the ten bus motors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorOp {
    /// Send each chip its identity digit.
    Init,
    /// Enable every drive stage.
    Start,
    /// Stop every drive stage.
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    Busy {
        op: MotorOp,
        channel: u8,
        issued: bool,
        wait_ticks: u16,
        attempts: u8,
        then_start: bool,
    },
}

/// Notable happenings, surfaced for operator logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputEvent {
    /// An axis carried a code it cannot realize; its motors keep the
    /// previous pose.
    BadPoseCode { joint: Joint, code: u8 },
    /// A slave answered with the wrong byte. Advisory: the pass continues
    /// as if acknowledged.
    AckMismatch {
        op: MotorOp,
        channel: u8,
        expected: u8,
        received: u8,
    },
    /// A slave never answered within the retry budget; the pass moves on.
    AckTimeout { op: MotorOp, channel: u8 },
    /// A lifecycle pass finished walking all ten channels.
    PassComplete(MotorOp),
}

/// The master's output half: joint state, interference flags, lifecycle.
#[derive(Debug)]
pub struct OutputSequencer {
    /// Last-requested configuration code per axis.
    joints: [u8; JOINT_COUNT],
    /// Last value written per channel; unchanged axes re-send these.
    outputs: [u8; OUTPUT_SLOTS],
    pending: bool,
    /// Fingers the previous step left in a colliding position.
    armed: FingerSet,
    /// Fingers the pending step will leave in a colliding position.
    pending_opens: FingerSet,
    state: OutputState,
    lifecycle: Lifecycle,
    motors_live: bool,
    ack: AckConfig,
}

impl OutputSequencer {
    pub fn new(ack: AckConfig) -> Self {
        Self {
            joints: [0; JOINT_COUNT],
            outputs: [0; OUTPUT_SLOTS],
            pending: false,
            armed: FingerSet::EMPTY,
            pending_opens: FingerSet::EMPTY,
            state: OutputState::Idle,
            lifecycle: Lifecycle::Idle,
            motors_live: false,
            ack,
        }
    }

    /// Record a new configuration code for one axis.
    ///
    /// Callers check [`Self::ready_to_output`] first; a change requested
    /// mid-flush is folded into the batch being dispatched.
    pub fn change_output(&mut self, joint: Joint, code: u8) {
        self.joints[joint.index()] = code;
        self.pending = true;
    }

    /// Mark fingers the pending pose will leave where the follow-up pose
    /// would collide. They are driven open before the next batch.
    pub fn flag_interference(&mut self, fingers: FingerSet) {
        self.pending_opens.insert(fingers);
    }

    /// True when a new pose batch can be accepted: idle, nothing pending,
    /// no lifecycle pass running.
    pub fn ready_to_output(&self) -> bool {
        self.state == OutputState::Idle
            && !self.pending
            && self.lifecycle == Lifecycle::Idle
    }

    /// Whether the bus motors have been identified and enabled.
    pub fn motors_live(&self) -> bool {
        self.motors_live
    }

    pub fn state(&self) -> OutputState {
        self.state
    }

    /// Identify all ten slaves, then enable them. The once-per-session
    /// warm-up the speller runs before its first pose.
    pub fn begin_startup(&mut self) -> bool {
        self.begin(MotorOp::Init, true)
    }

    /// Walk the bus sending identity digits.
    pub fn init_all(&mut self) -> bool {
        self.begin(MotorOp::Init, false)
    }

    /// Walk the bus enabling every motor.
    pub fn start_all(&mut self) -> bool {
        self.begin(MotorOp::Start, false)
    }

    /// Walk the bus stopping every motor.
    pub fn stop_all(&mut self) -> bool {
        if self.begin(MotorOp::Stop, false) {
            self.motors_live = false;
            true
        } else {
            false
        }
    }

    fn begin(&mut self, op: MotorOp, then_start: bool) -> bool {
        if self.lifecycle != Lifecycle::Idle {
            return false;
        }
        self.lifecycle = Lifecycle::Busy {
            op,
            channel: *MOTOR_CHANNELS.start(),
            issued: false,
            wait_ticks: 0,
            attempts: 0,
            then_start,
        };
        true
    }

    /// Advance the sequencer by one scheduler pass.
    pub fn poll<P: ActuatorPort>(&mut self, port: &mut P) -> Option<OutputEvent> {
        if self.lifecycle != Lifecycle::Idle {
            return self.poll_lifecycle(port);
        }

        match self.state {
            OutputState::Idle => {
                if self.pending {
                    self.state = OutputState::ResolveInterference;
                }
                None
            }
            OutputState::ResolveInterference => {
                for finger in self.armed.iter() {
                    for &channel in finger_channels(finger) {
                        let _ = port.output_to_motor(channel, open_value());
                    }
                }
                self.armed.clear();
                self.state = OutputState::Dispatch;
                None
            }
            OutputState::Dispatch => {
                let mut event = None;
                for joint in Joint::ALL {
                    let code = self.joints[joint.index()];
                    if let Err(code) = apply_axis(&mut self.outputs, joint, code) {
                        if event.is_none() {
                            event = Some(OutputEvent::BadPoseCode { joint, code });
                        }
                    }
                }
                for channel in 1..OUTPUT_SLOTS as u8 {
                    let _ = port.output_to_motor(channel, self.outputs[channel as usize]);
                }
                self.armed = self.pending_opens;
                self.pending_opens = FingerSet::EMPTY;
                self.pending = false;
                self.state = OutputState::Idle;
                event
            }
        }
    }

    fn op_command(op: MotorOp, channel: u8) -> Command {
        match op {
            MotorOp::Init => Command::Identify(channel),
            MotorOp::Start => Command::Go,
            MotorOp::Stop => Command::Stop,
        }
    }

    fn poll_lifecycle<P: ActuatorPort>(&mut self, port: &mut P) -> Option<OutputEvent> {
        let Lifecycle::Busy {
            op,
            channel,
            issued,
            wait_ticks,
            attempts,
            then_start,
        } = self.lifecycle
        else {
            return None;
        };

        if !issued {
            let _ = port.output_to_motor(channel, Self::op_command(op, channel).to_byte());
            self.lifecycle = Lifecycle::Busy {
                op,
                channel,
                issued: true,
                wait_ticks: 0,
                attempts: attempts + 1,
                then_start,
            };
            return None;
        }

        match port.poll_reply() {
            Some(received) => {
                let expected = Self::op_command(op, channel)
                    .expected_ack()
                    .unwrap_or(received);
                let mismatch = (received != expected).then_some(OutputEvent::AckMismatch {
                    op,
                    channel,
                    expected,
                    received,
                });
                // Wrong ack is advisory only: proceed as acknowledged
                let advanced = self.advance(op, channel, then_start);
                mismatch.or(advanced)
            }
            None if wait_ticks + 1 < self.ack.timeout_ticks => {
                self.lifecycle = Lifecycle::Busy {
                    op,
                    channel,
                    issued,
                    wait_ticks: wait_ticks + 1,
                    attempts,
                    then_start,
                };
                None
            }
            None if attempts < self.ack.max_attempts => {
                // Re-issue the command and wait again
                self.lifecycle = Lifecycle::Busy {
                    op,
                    channel,
                    issued: false,
                    wait_ticks: 0,
                    attempts,
                    then_start,
                };
                None
            }
            None => {
                // Out of retries: report and give up on this channel
                let timeout = Some(OutputEvent::AckTimeout { op, channel });
                let advanced = self.advance(op, channel, then_start);
                timeout.or(advanced)
            }
        }
    }

    fn advance(&mut self, op: MotorOp, channel: u8, then_start: bool) -> Option<OutputEvent> {
        if channel < *MOTOR_CHANNELS.end() {
            self.lifecycle = Lifecycle::Busy {
                op,
                channel: channel + 1,
                issued: false,
                wait_ticks: 0,
                attempts: 0,
                then_start,
            };
            return None;
        }

        // Pass complete
        match op {
            MotorOp::Init if then_start => {
                self.lifecycle = Lifecycle::Busy {
                    op: MotorOp::Start,
                    channel: *MOTOR_CHANNELS.start(),
                    issued: false,
                    wait_ticks: 0,
                    attempts: 0,
                    then_start: false,
                };
            }
            MotorOp::Start => {
                self.motors_live = true;
                self.lifecycle = Lifecycle::Idle;
            }
            _ => self.lifecycle = Lifecycle::Idle,
        }
        Some(OutputEvent::PassComplete(op))
    }
}

impl Default for OutputSequencer {
    fn default() -> Self {
        Self::new(AckConfig::default())
    }
}
