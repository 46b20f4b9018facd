//! Speller state machine
//!
//! Buffers an operator-typed sentence, then plays it out one character at
//! a time: look the character up, pace its steps with tick-counted
//! pauses, and push each step's eight axis codes into the output
//! sequencer. Pacing is the only "clock" here - a delay is a number of
//! scheduler passes, nothing more.

pub mod buffer;

pub use buffer::{SentenceBuffer, SentenceFull, SENTENCE_CAPACITY};

use crate::config::TimingConfig;
use crate::gesture::{GestureTable, Joint};
use crate::output::OutputSequencer;

/// Keyboard control bytes the speller understands.
const KEY_BACKSPACE: u8 = 0x08;
const KEY_ENTER: u8 = 0x0D;
const KEY_ESCAPE: u8 = 0x1B;

/// Speller states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpellerState {
    /// Accepting keystrokes into the sentence buffer.
    Collect,
    /// Taking the next character off the buffer.
    NextCharacter,
    /// Choosing the pause for the current character.
    ComputeDelay,
    /// Counting scheduler passes until the pause elapses.
    DelayWait,
    /// Pushing one step's axis codes to the output sequencer.
    EmitStep,
    /// Sentence finished; report and return to collecting.
    Done,
}

/// What a keystroke did, so the console can echo appropriately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    /// Stored; echo this byte back to the operator.
    Echo(u8),
    /// Backspace removed a character; echo a visual erase.
    Erase,
    /// The sentence buffer is full; the keystroke was dropped.
    Rejected,
    /// Enter pressed; spelling begins.
    Submitted,
    /// Escape pressed; the buffer was discarded.
    Aborted,
    /// Not a sentence key; nothing stored, nothing echoed.
    Ignored,
}

/// Progress reports for the operator console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpellerEvent {
    /// One step of a character was handed to the output sequencer.
    StepEmitted { character: u8, step: u8 },
    /// The whole sentence has been spelled.
    SentenceDone,
}

/// The master's input half: sentence collection and step pacing.
#[derive(Debug)]
pub struct Speller {
    buffer: SentenceBuffer,
    state: SpellerState,
    timing: TimingConfig,
    character: u8,
    steps: u8,
    step: u8,
    delay_target: u8,
    delay_count: u8,
}

impl Speller {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            buffer: SentenceBuffer::new(),
            state: SpellerState::Collect,
            timing,
            character: 0,
            steps: 0,
            step: 0,
            delay_target: 0,
            delay_count: 0,
        }
    }

    pub fn state(&self) -> SpellerState {
        self.state
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Discard any half-typed sentence and return to collecting.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = SpellerState::Collect;
    }

    /// Feed one operator keystroke. Only meaningful while collecting;
    /// keys arriving mid-spell are dropped.
    pub fn handle_key(&mut self, key: u8) -> KeyAction {
        if self.state != SpellerState::Collect {
            return KeyAction::Ignored;
        }
        match key {
            b'0'..=b'9' | b'A'..=b'Z' | b' ' | b',' | b'.' => match self.buffer.push(key) {
                Ok(()) => KeyAction::Echo(key),
                Err(SentenceFull) => KeyAction::Rejected,
            },
            b'a'..=b'z' => {
                let upper = key - (b'a' - b'A');
                match self.buffer.push(upper) {
                    Ok(()) => KeyAction::Echo(upper),
                    Err(SentenceFull) => KeyAction::Rejected,
                }
            }
            // Question and exclamation marks read as full stops
            b'?' | b'!' => match self.buffer.push(b'.') {
                Ok(()) => KeyAction::Echo(key),
                Err(SentenceFull) => KeyAction::Rejected,
            },
            KEY_BACKSPACE => {
                if self.buffer.backspace() {
                    KeyAction::Erase
                } else {
                    KeyAction::Ignored
                }
            }
            KEY_ENTER => {
                self.state = SpellerState::NextCharacter;
                KeyAction::Submitted
            }
            KEY_ESCAPE => {
                self.buffer.clear();
                KeyAction::Aborted
            }
            _ => KeyAction::Ignored,
        }
    }

    /// Advance the speller by one scheduler pass.
    pub fn poll(&mut self, table: &GestureTable, out: &mut OutputSequencer) -> Option<SpellerEvent> {
        match self.state {
            SpellerState::Collect => None,
            SpellerState::NextCharacter => {
                if let Some(character) = self.buffer.pop() {
                    self.character = character;
                    self.steps = table.step_count(character);
                    self.step = 0;
                    self.state = SpellerState::ComputeDelay;
                } else {
                    self.state = SpellerState::Done;
                }
                None
            }
            SpellerState::ComputeDelay => {
                self.delay_target = match self.character {
                    b',' => self.timing.comma_pause,
                    b' ' => self.timing.space_pause,
                    b'.' => self.timing.period_pause,
                    _ => self.timing.letter_budget / self.steps.max(1),
                };
                self.delay_count = 0;
                self.state = SpellerState::DelayWait;
                None
            }
            SpellerState::DelayWait => {
                if self.delay_count == self.delay_target {
                    self.delay_count = 0;
                    self.state = SpellerState::EmitStep;
                } else {
                    self.delay_count += 1;
                }
                None
            }
            SpellerState::EmitStep => {
                // One-time warm-up: identify and enable the motors before
                // the first pose of the session
                if !out.motors_live() {
                    out.begin_startup();
                    return None;
                }
                // Back-pressure: the previous batch must be fully flushed
                if !out.ready_to_output() {
                    return None;
                }
                let pose = *table.lookup(self.character).step(self.step);
                for joint in Joint::ALL {
                    out.change_output(joint, pose.code(joint));
                }
                out.flag_interference(pose.open_before_next);
                let emitted = self.step;
                self.step += 1;
                self.state = if self.step == self.steps {
                    SpellerState::NextCharacter
                } else {
                    SpellerState::DelayWait
                };
                Some(SpellerEvent::StepEmitted {
                    character: self.character,
                    step: emitted,
                })
            }
            SpellerState::Done => {
                self.state = SpellerState::Collect;
                Some(SpellerEvent::SentenceDone)
            }
        }
    }
}

impl Default for Speller {
    fn default() -> Self {
        Self::new(TimingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPort;

    fn spell(
        speller: &mut Speller,
        out: &mut OutputSequencer,
        port: &mut MockPort,
    ) -> heapless::Vec<SpellerEvent, 32> {
        let table = GestureTable::new();
        let mut events = heapless::Vec::new();
        for _ in 0..5000 {
            if let Some(event) = speller.poll(&table, out) {
                let done = event == SpellerEvent::SentenceDone;
                events.push(event).unwrap();
                if done {
                    break;
                }
            }
            out.poll(port);
        }
        // Let the last batch finish flushing
        for _ in 0..8 {
            out.poll(port);
        }
        events
    }

    fn primed_port() -> MockPort {
        let mut port = MockPort::new();
        for _ in 0..10 {
            port.replies.push_back(b'!').unwrap();
        }
        for _ in 0..10 {
            port.replies.push_back(b'g').unwrap();
        }
        port
    }

    #[test]
    fn test_keystrokes_fold_and_filter() {
        let mut speller = Speller::default();
        assert_eq!(speller.handle_key(b'h'), KeyAction::Echo(b'H'));
        assert_eq!(speller.handle_key(b'I'), KeyAction::Echo(b'I'));
        assert_eq!(speller.handle_key(b'?'), KeyAction::Echo(b'?'));
        // Tab is not spellable: no echo, no storage
        assert_eq!(speller.handle_key(b'\t'), KeyAction::Ignored);
        assert_eq!(speller.buffered(), 3);
        // The '?' was stored as a period
        speller.handle_key(KEY_ENTER);
        assert_eq!(speller.buffer.pop(), Some(b'H'));
        assert_eq!(speller.buffer.pop(), Some(b'I'));
        assert_eq!(speller.buffer.pop(), Some(b'.'));
    }

    #[test]
    fn test_backspace_echoes_only_when_something_was_erased() {
        let mut speller = Speller::default();
        assert_eq!(speller.handle_key(KEY_BACKSPACE), KeyAction::Ignored);
        speller.handle_key(b'A');
        assert_eq!(speller.handle_key(KEY_BACKSPACE), KeyAction::Erase);
        assert_eq!(speller.buffered(), 0);
    }

    #[test]
    fn test_full_buffer_rejects_but_keeps_collecting() {
        let mut speller = Speller::default();
        for _ in 0..SENTENCE_CAPACITY {
            assert_eq!(speller.handle_key(b'A'), KeyAction::Echo(b'A'));
        }
        assert_eq!(speller.handle_key(b'B'), KeyAction::Rejected);
        assert_eq!(speller.buffered(), SENTENCE_CAPACITY);
        speller.handle_key(KEY_BACKSPACE);
        assert_eq!(speller.handle_key(b'C'), KeyAction::Echo(b'C'));
    }

    #[test]
    fn test_escape_discards_the_sentence() {
        let mut speller = Speller::default();
        speller.handle_key(b'A');
        speller.handle_key(b'B');
        assert_eq!(speller.handle_key(KEY_ESCAPE), KeyAction::Aborted);
        assert_eq!(speller.buffered(), 0);
        assert_eq!(speller.state(), SpellerState::Collect);
    }

    #[test]
    fn test_pause_selection_by_character_class() {
        let timing = TimingConfig::default();
        let table = GestureTable::new();
        let mut out = OutputSequencer::default();

        for (ch, expected) in [
            (b',', timing.comma_pause),
            (b' ', timing.space_pause),
            (b'.', timing.period_pause),
            (b'A', timing.letter_budget),
            (b'J', timing.letter_budget / 4),
        ] {
            let mut speller = Speller::new(timing);
            speller.handle_key(ch);
            speller.handle_key(KEY_ENTER);
            speller.poll(&table, &mut out); // NextCharacter
            speller.poll(&table, &mut out); // ComputeDelay
            assert_eq!(speller.delay_target, expected, "character {}", ch as char);
        }
    }

    #[test]
    fn test_single_letter_spells_and_completes() {
        let mut speller = Speller::default();
        let mut out = OutputSequencer::default();
        let mut port = primed_port();

        speller.handle_key(b'a');
        speller.handle_key(KEY_ENTER);
        let events = spell(&mut speller, &mut out, &mut port);
        assert_eq!(
            &events[..],
            &[
                SpellerEvent::StepEmitted {
                    character: b'A',
                    step: 0
                },
                SpellerEvent::SentenceDone
            ]
        );
        assert_eq!(speller.state(), SpellerState::Collect);

        // Warm-up ran exactly once: identify pass, enable pass, then poses
        assert!(out.motors_live());
        assert_eq!(port.writes[0], (1, b'1'));
        assert_eq!(port.writes[10], (1, b'G'));
        assert_eq!(port.writes[20].0, 1);
        assert_eq!(port.writes.len(), 20 + 13);
    }

    #[test]
    fn test_multi_step_letter_emits_steps_in_order() {
        let mut speller = Speller::default();
        let mut out = OutputSequencer::default();
        let mut port = primed_port();

        speller.handle_key(b'b');
        speller.handle_key(KEY_ENTER);
        let events = spell(&mut speller, &mut out, &mut port);
        assert_eq!(
            &events[..],
            &[
                SpellerEvent::StepEmitted {
                    character: b'B',
                    step: 0
                },
                SpellerEvent::StepEmitted {
                    character: b'B',
                    step: 1
                },
                SpellerEvent::SentenceDone
            ]
        );

        // The thumb open commands sit between the two pose batches
        let writes = &port.writes[20..];
        assert_eq!(writes.len(), 13 + 4 + 13);
        assert_eq!(
            &writes[13..17],
            &[(10, b'a'), (9, b'a'), (8, b'a'), (7, b'a')]
        );
    }

    #[test]
    fn test_warm_up_is_once_per_session() {
        let mut speller = Speller::default();
        let mut out = OutputSequencer::default();
        let mut port = primed_port();

        speller.handle_key(b'a');
        speller.handle_key(KEY_ENTER);
        spell(&mut speller, &mut out, &mut port);
        let after_first = port.writes.len();

        speller.handle_key(b'l');
        speller.handle_key(KEY_ENTER);
        spell(&mut speller, &mut out, &mut port);
        // Second sentence: exactly one pose batch, no identify/enable walk
        assert_eq!(port.writes.len(), after_first + 13);
    }

    #[test]
    fn test_emission_respects_the_output_handshake() {
        let table = GestureTable::new();
        let mut speller = Speller::default();
        let mut out = OutputSequencer::default();
        let mut port = primed_port();

        speller.handle_key(b'a');
        speller.handle_key(KEY_ENTER);

        // Tick only the speller: it requests the warm-up, then must sit on
        // its hands until the output side has actually run it
        for _ in 0..200 {
            assert!(speller.poll(&table, &mut out).is_none());
        }
        assert!(port.writes.is_empty());
        assert!(!out.ready_to_output());

        // Once the output side catches up, the pose finally flows
        for _ in 0..100 {
            speller.poll(&table, &mut out);
            out.poll(&mut port);
        }
        assert!(out.motors_live());
        assert_eq!(port.writes.len(), 20 + 13);
    }
}
