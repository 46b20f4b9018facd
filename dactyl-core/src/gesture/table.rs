//! The literal pose table.
//!
//! One row per spellable character. Codes per step, in axis order:
//! pinky, ring, middle, index curl; index spread; thumb pose; wrist flex
//! and twist angles. Finger curl codes and thumb pose codes are decoded in
//! [`crate::output::pose`]; wrist codes are servo degrees used verbatim.

use super::{FingerSet, Gesture, PoseStep, ALPHABET_SIZE, JOINT_COUNT};

const fn step(codes: [u8; JOINT_COUNT]) -> PoseStep {
    PoseStep {
        codes,
        open_before_next: FingerSet::EMPTY,
    }
}

/// A step whose follow-up folds the thumb across the palm; the thumb must
/// swing open again before the next pose lands.
const fn thumb_fold(codes: [u8; JOINT_COUNT]) -> PoseStep {
    PoseStep {
        codes,
        open_before_next: FingerSet::THUMB,
    }
}

const BLANK: PoseStep = step([0; JOINT_COUNT]);

const fn one(character: u8, s0: PoseStep) -> Gesture {
    Gesture {
        character,
        step_count: 1,
        steps: [s0, BLANK, BLANK, BLANK],
    }
}

const fn two(character: u8, s0: PoseStep, s1: PoseStep) -> Gesture {
    Gesture {
        character,
        step_count: 2,
        steps: [s0, s1, BLANK, BLANK],
    }
}

const fn three(character: u8, s0: PoseStep, s1: PoseStep, s2: PoseStep) -> Gesture {
    Gesture {
        character,
        step_count: 3,
        steps: [s0, s1, s2, BLANK],
    }
}

const fn four(
    character: u8,
    s0: PoseStep,
    s1: PoseStep,
    s2: PoseStep,
    s3: PoseStep,
) -> Gesture {
    Gesture {
        character,
        step_count: 4,
        steps: [s0, s1, s2, s3],
    }
}

pub(super) static ENTRIES: [Gesture; ALPHABET_SIZE] = [
    // Digits
    one(b'0', step([1, 1, 1, 1, 0, 5, 0, 0])),
    one(b'1', step([2, 2, 2, 0, 0, 0, 0, 0])),
    one(b'2', step([2, 2, 0, 2, 1, 0, 0, 0])),
    one(b'3', step([2, 2, 0, 0, 1, 0, 0, 0])),
    two(
        b'4',
        thumb_fold([0, 0, 0, 0, 0, 3, 0, 0]),
        step([0, 0, 0, 0, 0, 2, 0, 0]),
    ),
    one(b'5', step([0, 0, 0, 0, 0, 0, 0, 0])),
    two(
        b'6',
        thumb_fold([2, 0, 0, 0, 0, 3, 0, 0]),
        step([2, 0, 0, 0, 0, 2, 0, 0]),
    ),
    two(
        b'7',
        step([0, 2, 0, 0, 1, 3, 0, 0]),
        step([0, 2, 0, 0, 1, 3, 0, 0]),
    ),
    two(
        b'8',
        thumb_fold([0, 0, 2, 0, 0, 3, 0, 0]),
        step([0, 0, 2, 0, 0, 2, 0, 0]),
    ),
    one(b'9', step([0, 0, 0, 2, 0, 0, 0, 0])),
    // Letters
    one(b'A', step([2, 2, 2, 2, 0, 0, 0, 0])),
    two(
        b'B',
        thumb_fold([0, 0, 0, 0, 0, 3, 0, 0]),
        step([0, 0, 0, 0, 0, 2, 0, 0]),
    ),
    one(b'C', step([1, 1, 1, 1, 0, 3, 0, 0])),
    one(b'D', step([1, 1, 1, 1, 0, 3, 0, 0])),
    two(
        b'E',
        thumb_fold([1, 1, 1, 1, 0, 3, 0, 0]),
        step([1, 1, 1, 1, 0, 2, 0, 0]),
    ),
    one(b'F', step([0, 0, 0, 3, 0, 0, 0, 0])),
    one(b'G', step([2, 2, 2, 4, 0, 0, 0, 0])),
    one(b'H', step([2, 2, 4, 4, 0, 0, 0, 0])),
    one(b'I', step([0, 2, 2, 2, 0, 0, 0, 0])),
    // J hooks down and rolls the wrist through its trace
    four(
        b'J',
        step([0, 2, 2, 2, 0, 0, 0, 0]),
        step([0, 2, 2, 2, 0, 0, 90, 0]),
        step([0, 2, 2, 2, 0, 0, 90, 45]),
        step([0, 2, 2, 2, 0, 0, 0, 45]),
    ),
    two(
        b'K',
        step([2, 2, 0, 0, 1, 0, 0, 0]),
        step([2, 2, 0, 0, 1, 4, 0, 0]),
    ),
    one(b'L', step([2, 2, 2, 0, 0, 1, 0, 0])),
    two(
        b'M',
        thumb_fold([2, 1, 3, 3, 0, 3, 90, 0]),
        step([2, 1, 3, 3, 0, 2, 90, 0]),
    ),
    two(
        b'N',
        thumb_fold([2, 2, 3, 3, 0, 3, 90, 0]),
        step([2, 2, 3, 3, 0, 2, 90, 0]),
    ),
    one(b'O', step([1, 1, 1, 1, 0, 3, 0, 0])),
    one(b'P', step([2, 2, 4, 0, 0, 3, 0, 0])),
    one(b'Q', step([2, 2, 2, 4, 0, 3, 0, 0])),
    // R, S, and T hold their shape, then spend the extra steps relaxed
    two(b'R', step([2, 2, 0, 5, 0, 0, 0, 0]), BLANK),
    two(b'S', step([2, 2, 2, 2, 0, 2, 0, 0]), BLANK),
    three(b'T', step([2, 2, 2, 3, 1, 4, 0, 0]), BLANK, BLANK),
    one(b'U', step([2, 2, 0, 3, 0, 0, 0, 0])),
    one(b'V', step([2, 2, 0, 0, 1, 0, 0, 0])),
    one(b'W', step([2, 0, 0, 0, 0, 0, 0, 0])),
    one(b'X', step([2, 2, 2, 0, 0, 0, 0, 0])),
    one(b'Y', step([2, 2, 2, 1, 0, 1, 0, 0])),
    // Z draws its zigzag with the wrist, like J
    four(
        b'Z',
        step([2, 2, 2, 0, 0, 0, 0, 0]),
        step([2, 2, 2, 0, 0, 0, 0, 45]),
        step([2, 2, 2, 0, 0, 0, 90, 0]),
        step([2, 2, 2, 0, 0, 0, 90, 45]),
    ),
    // Punctuation and space relax the whole hand while the pause runs
    one(b',', BLANK),
    one(b'.', BLANK),
    one(b' ', BLANK),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_in_lookup_order() {
        for (i, entry) in ENTRIES.iter().enumerate() {
            assert_eq!(super::super::GestureTable::index_of(entry.character), i);
        }
    }

    #[test]
    fn test_filler_steps_are_blank() {
        for entry in ENTRIES.iter() {
            for i in entry.step_count as usize..4 {
                assert_eq!(entry.steps[i], BLANK, "character {}", entry.character as char);
            }
        }
    }
}
