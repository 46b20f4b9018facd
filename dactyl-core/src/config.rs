//! Configuration type definitions
//!
//! Policy knobs for the master sequencers. All values are in scheduler
//! ticks (passes of the cooperative loop), not wall-clock time.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pacing between emitted gesture steps.
///
/// Punctuation pauses must keep their relative ordering (space shortest,
/// period longest) for the spelled output to read naturally; the absolute
/// values are tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimingConfig {
    /// Pause ticks for a space.
    pub space_pause: u8,
    /// Pause ticks for a comma.
    pub comma_pause: u8,
    /// Pause ticks for a period (also `?` and `!`).
    pub period_pause: u8,
    /// Tick budget for one ordinary character, split across its steps.
    pub letter_budget: u8,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            space_pause: 40,
            comma_pause: 60,
            period_pause: 80,
            letter_budget: 40,
        }
    }
}

/// Acknowledgement handling for motor lifecycle passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AckConfig {
    /// Ticks to wait for an ack before re-issuing the command.
    pub timeout_ticks: u16,
    /// Command issues per channel before giving up with a timeout report.
    pub max_attempts: u8,
}

impl Default for AckConfig {
    fn default() -> Self {
        Self {
            timeout_ticks: 200,
            max_attempts: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_ordering() {
        // space < comma < period, letters fastest
        let timing = TimingConfig::default();
        assert!(timing.space_pause < timing.comma_pause);
        assert!(timing.comma_pause < timing.period_pause);
        assert!(timing.letter_budget <= timing.space_pause);
    }
}
