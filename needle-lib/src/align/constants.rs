use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Alignment scores are real-valued: substitution and gap parameters may be
/// fractional (e.g. a mismatch score of 2.5) and carry no sign restriction.
pub type Score = f64;

/// Value to use for unreachable states in the score planes. Negative
/// infinity is closed under addition with any finite score, so extending an
/// unreachable state stays unreachable.
pub const MIN_SCORE: Score = f64::NEG_INFINITY;

pub const DEFAULT_ALIGNER_CAPACITY: usize = 200;

/// Marker placed opposite a consumed symbol when rendering a gap.
pub const GAP_CHAR: u8 = b'_';

/// Alignment operations, one per alignment column. `Match` covers any
/// aligned pair of symbols, identical or not. `Del` consumes a single x
/// symbol (the gap is printed on the y line); `Ins` consumes a single y
/// symbol (the gap is printed on the x line).
#[derive(Eq, PartialEq, Debug, Copy, Clone, Hash, Serialize, Deserialize)]
pub enum AlignmentOperation {
    Match,
    Del,
    Ins,
}

impl AlignmentOperation {
    /// Single-letter code used in the run-length summary.
    pub fn symbol(&self) -> char {
        match self {
            AlignmentOperation::Match => 'M',
            AlignmentOperation::Del => 'D',
            AlignmentOperation::Ins => 'I',
        }
    }

    pub fn length_on_x(&self) -> usize {
        match self {
            AlignmentOperation::Match | AlignmentOperation::Del => 1,
            AlignmentOperation::Ins => 0,
        }
    }

    pub fn length_on_y(&self) -> usize {
        match self {
            AlignmentOperation::Match | AlignmentOperation::Ins => 1,
            AlignmentOperation::Del => 0,
        }
    }
}

impl Display for AlignmentOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignmentOperation::Match => write!(f, "match"),
            AlignmentOperation::Del => write!(f, "deletion"),
            AlignmentOperation::Ins => write!(f, "insertion"),
        }
    }
}
