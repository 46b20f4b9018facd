//! Quadrature decode
//!
//! The two encoder channels form a 2-bit gray code sampled as
//! `(A << 1) | B` on every edge interrupt. Classification is a strict
//! table on the (previous, current) pair: the four adjacencies of the
//! cycle 00-10-11-01 in one direction count up, the four in the other
//! count down, and every other pair - including a repeat of the same
//! state, which means an edge was missed - bumps the error counter and
//! leaves the count alone.

use portable_atomic::{AtomicU16, Ordering};

/// What one encoder sample meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Motion {
    Clockwise,
    CounterClockwise,
    /// Non-adjacent transition; position unknown for this edge.
    Invalid,
}

/// Edge-by-edge gray code classifier. Lives in the interrupt context.
#[derive(Debug, Default)]
pub struct QuadratureDecoder {
    previous: u8,
}

impl QuadratureDecoder {
    pub const fn new() -> Self {
        Self { previous: 0 }
    }

    /// Classify one 2-bit sample against the previous one.
    pub fn sample(&mut self, reading: u8) -> Motion {
        let current = reading & 0b11;
        let motion = match (self.previous, current) {
            (1, 0) | (3, 1) | (0, 2) | (2, 3) => Motion::Clockwise,
            (0, 1) | (1, 3) | (3, 2) | (2, 0) => Motion::CounterClockwise,
            _ => Motion::Invalid,
        };
        self.previous = current;
        motion
    }
}

/// The encoder count shared between the interrupt writer and the control
/// loop reader, plus the running error tally.
///
/// Single writer (the ISR); everything here is relaxed atomics sized for
/// a 10-bit logical count in a 16-bit cell.
#[derive(Debug)]
pub struct EncoderCell {
    count: AtomicU16,
    errors: AtomicU16,
}

impl EncoderCell {
    /// Power-on state: count re-based to 1, no errors.
    pub const fn new() -> Self {
        Self {
            count: AtomicU16::new(1),
            errors: AtomicU16::new(0),
        }
    }

    pub fn count(&self) -> u16 {
        self.count.load(Ordering::Relaxed)
    }

    /// Re-base the count (calibration).
    pub fn set_count(&self, value: u16) {
        self.count.store(value, Ordering::Relaxed);
    }

    pub fn errors(&self) -> u16 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Fold one decoded edge into the count.
    pub fn apply(&self, motion: Motion) {
        match motion {
            Motion::Clockwise => {
                self.count.fetch_add(1, Ordering::Relaxed);
            }
            Motion::CounterClockwise => {
                self.count.fetch_sub(1, Ordering::Relaxed);
            }
            Motion::Invalid => {
                self.errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

impl Default for EncoderCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The full 4x4 transition table: 4 up, 4 down, 8 errors.
    #[test]
    fn test_every_transition_pair() {
        for previous in 0..4u8 {
            for current in 0..4u8 {
                let mut decoder = QuadratureDecoder::new();
                decoder.previous = previous;
                let cell = EncoderCell::new();
                cell.apply(decoder.sample(current));

                let expected = match (previous, current) {
                    (1, 0) | (3, 1) | (0, 2) | (2, 3) => (2, 0),
                    (0, 1) | (1, 3) | (3, 2) | (2, 0) => (0, 0),
                    _ => (1, 1),
                };
                assert_eq!(
                    (cell.count(), cell.errors()),
                    expected,
                    "transition {:02b} -> {:02b}",
                    previous,
                    current
                );
            }
        }
    }

    #[test]
    fn test_full_revolution_both_ways() {
        let mut decoder = QuadratureDecoder::new();
        let cell = EncoderCell::new();
        // One electrical cycle clockwise: 00 -> 10 -> 11 -> 01 -> 00
        for reading in [2, 3, 1, 0] {
            cell.apply(decoder.sample(reading));
        }
        assert_eq!(cell.count(), 5);
        assert_eq!(cell.errors(), 0);
        // And back again
        for reading in [1, 3, 2, 0] {
            cell.apply(decoder.sample(reading));
        }
        assert_eq!(cell.count(), 1);
        assert_eq!(cell.errors(), 0);
    }

    #[test]
    fn test_missed_edge_counts_as_error_not_motion() {
        let mut decoder = QuadratureDecoder::new();
        let cell = EncoderCell::new();
        cell.apply(decoder.sample(2)); // 00 -> 10, cw
        cell.apply(decoder.sample(1)); // 10 -> 01 skips a state
        assert_eq!(cell.count(), 2);
        assert_eq!(cell.errors(), 1);
        // Decoding resumes from the new state
        cell.apply(decoder.sample(0)); // 01 -> 00, cw
        assert_eq!(cell.count(), 3);
        assert_eq!(cell.errors(), 1);
    }

    #[test]
    fn test_rebase_for_calibration() {
        let cell = EncoderCell::new();
        cell.apply(Motion::Clockwise);
        cell.apply(Motion::Clockwise);
        assert_eq!(cell.count(), 3);
        cell.set_count(1);
        assert_eq!(cell.count(), 1);
    }
}
