use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::align::{
    constants::{AlignmentOperation, Score, GAP_CHAR},
    AlignError,
};

/// An end-to-end alignment of two sequences x and y: the optimal score, the
/// original sequence lengths, and the edit operations in left-to-right
/// sequence order. Together with the original sequences the operations
/// fully determine the rendered alignment; the alignment itself stores no
/// sequence data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    /// Optimal global alignment score.
    pub score: Score,

    /// Length of the original x sequence.
    pub xlen: usize,

    /// Length of the original y sequence.
    pub ylen: usize,

    /// Vector of alignment operations, one per alignment column.
    pub operations: Vec<AlignmentOperation>,
}

impl Alignment {
    /// Validates that the operations consume exactly `xlen` and `ylen`
    /// symbols.
    pub fn validate(&self) {
        let on_x: usize = self.operations.iter().map(AlignmentOperation::length_on_x).sum();
        let on_y: usize = self.operations.iter().map(AlignmentOperation::length_on_y).sum();
        assert_eq!(self.xlen, on_x, "xlen");
        assert_eq!(self.ylen, on_y, "ylen");
    }

    /// Run-length summary of the operations, e.g. `3M1D2M`.
    pub fn cigar(&self) -> String {
        let mut cigar = String::new();
        for (op, run) in &self.operations.iter().group_by(|op| **op) {
            cigar.push_str(&format!("{}{}", run.count(), op.symbol()));
        }
        cigar
    }

    /// Renders the two aligned lines, consuming `x` and `y` from their
    /// fronts in operation order: `Match` places a symbol from each, `Del`
    /// places the x symbol over a gap marker, `Ins` places a gap marker
    /// over the y symbol.
    ///
    /// A trace that consumes past the end of either sequence, or leaves
    /// symbols unconsumed, does not belong to these sequences and is
    /// reported as an inconsistency.
    pub fn padded(&self, x: &[u8], y: &[u8]) -> Result<(String, String), AlignError> {
        let mut top = String::with_capacity(self.operations.len());
        let mut bottom = String::with_capacity(self.operations.len());
        let mut i = 0;
        let mut j = 0;
        for op in &self.operations {
            match op {
                AlignmentOperation::Match => {
                    let (a, b) = match (x.get(i), y.get(j)) {
                        (Some(a), Some(b)) => (*a, *b),
                        _ => return Err(AlignError::InconsistentTraceback { i, j }),
                    };
                    top.push(a as char);
                    bottom.push(b as char);
                    i += 1;
                    j += 1;
                }
                AlignmentOperation::Del => {
                    let Some(a) = x.get(i) else {
                        return Err(AlignError::InconsistentTraceback { i, j });
                    };
                    top.push(*a as char);
                    bottom.push(GAP_CHAR as char);
                    i += 1;
                }
                AlignmentOperation::Ins => {
                    let Some(b) = y.get(j) else {
                        return Err(AlignError::InconsistentTraceback { i, j });
                    };
                    top.push(GAP_CHAR as char);
                    bottom.push(*b as char);
                    j += 1;
                }
            }
        }
        if i != x.len() || j != y.len() {
            return Err(AlignError::InconsistentTraceback { i, j });
        }
        Ok((top, bottom))
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x-len: {} y-len: {} score: {} cigar: {}",
            self.xlen,
            self.ylen,
            self.score,
            self.cigar()
        )
    }
}

#[cfg(test)]
pub mod tests {
    use rstest::rstest;

    use super::Alignment;
    use crate::align::{
        constants::AlignmentOperation::{self, Del, Ins, Match},
        AlignError,
    };

    fn alignment(xlen: usize, ylen: usize, operations: Vec<AlignmentOperation>) -> Alignment {
        Alignment {
            score: 0.0,
            xlen,
            ylen,
            operations,
        }
    }

    #[rstest]
    #[case(vec![], "")]
    #[case(vec![Match, Match, Match, Del, Match, Match], "3M1D2M")]
    #[case(vec![Del, Del], "2D")]
    #[case(vec![Del, Ins], "1D1I")]
    #[case(vec![Ins, Match, Match, Ins, Ins], "1I2M2I")]
    fn test_cigar(#[case] operations: Vec<AlignmentOperation>, #[case] expected: &str) {
        let alignment = alignment(0, 0, operations);
        assert_eq!(alignment.cigar(), expected);
    }

    #[rstest]
    #[case(vec![Match, Match], "AG", "AC", "AG", "AC")]
    #[case(vec![Del, Del], "AG", "", "AG", "__")]
    #[case(vec![Ins, Match], "G", "AG", "_G", "AG")]
    #[case(vec![Match, Del, Ins], "AG", "AC", "AG_", "A_C")]
    fn test_padded(
        #[case] operations: Vec<AlignmentOperation>,
        #[case] x: &str,
        #[case] y: &str,
        #[case] top: &str,
        #[case] bottom: &str,
    ) {
        let alignment = alignment(x.len(), y.len(), operations);
        let (top_line, bottom_line) = alignment.padded(x.as_bytes(), y.as_bytes()).unwrap();
        assert_eq!(top_line, top);
        assert_eq!(bottom_line, bottom);
    }

    #[rstest]
    #[case(vec![Match], "", "A")] // consumes past the end of x
    #[case(vec![Del], "", "")] // consumes past the end of x
    #[case(vec![Ins], "A", "")] // consumes past the end of y
    #[case(vec![], "A", "")] // leaves x unconsumed
    #[case(vec![Match], "AG", "AG")] // leaves both unconsumed
    fn test_padded_detects_inconsistent_traces(
        #[case] operations: Vec<AlignmentOperation>,
        #[case] x: &str,
        #[case] y: &str,
    ) {
        let alignment = alignment(x.len(), y.len(), operations);
        let err = alignment.padded(x.as_bytes(), y.as_bytes()).unwrap_err();
        assert!(matches!(err, AlignError::InconsistentTraceback { .. }), "{err}");
    }

    #[test]
    fn test_display_includes_score_and_cigar() {
        let alignment = Alignment {
            score: 53.0,
            xlen: 6,
            ylen: 5,
            operations: vec![Match, Match, Match, Del, Match, Match],
        };
        assert_eq!(
            alignment.to_string(),
            "x-len: 6 y-len: 5 score: 53 cigar: 3M1D2M"
        );
    }
}
