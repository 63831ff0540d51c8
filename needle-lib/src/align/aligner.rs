// Original Code was copied from:
//     https://github.com/rust-bio/rust-bio/blob/master/src/alignment/pairwise/mod.rs
// Copyright 2014-2015 Johannes Köster, Vadim Nazarov, Patrick Marks
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::iter::repeat;

use crate::align::{
    alignment::Alignment,
    constants::{Score, DEFAULT_ALIGNER_CAPACITY, MIN_SCORE},
    scoring::{GapModel, SubstitutionMatrix},
    traceback::{trace_operations, Cell, Traceback, TB_DEL, TB_INS, TB_MATCH},
    AlignError,
};

/// A global (end-to-end) pairwise aligner over three coupled score planes.
///
/// `M(i,j)` is the best score such that `x[i]` and `y[j]` are aligned with
/// each other (as a match or a mismatch):
/// ```ignore
///              .... A   G  x_i
///              .... C   G  y_j
/// ```
///
/// `D(i,j)` is the best score such that `x[i]` is aligned with a gap:
/// ```ignore
///              .... A   G  x_i
///              .... G  y_j  -
/// ```
///
/// `I(i,j)` is the best score such that `y[j]` is aligned with a gap:
/// ```ignore
///              .... A  x_i  -
///              .... G   G  y_j
/// ```
///
/// A gap state extends itself at the gap model's extend cost and opens from
/// either other state at the open cost, so a run of `k` gap symbols scores
/// `open + extend * (k - 1)` regardless of how the run is reached.
///
/// Whenever two or more moves tie for the optimum, the aligned pair wins
/// over the insertion, and the insertion wins over the deletion. The same
/// fixed order applies at every cell and at the final cell, so traceback
/// is fully deterministic.
///
/// To save space, only two columns of each score plane are stored at any
/// point - the current column and the previous one. The predecessor choice
/// for every `(cell, plane)` is recorded in `traceback`, which is what the
/// optimal operations are read back from.
///
/// An aligner exclusively owns its scratch and may be reused across calls;
/// independent instances can run on independent threads with no
/// coordination.
#[allow(non_snake_case)]
pub struct GlobalAligner {
    M: [Vec<Score>; 2],
    D: [Vec<Score>; 2],
    I: [Vec<Score>; 2],
    traceback: Traceback,
    matrix: SubstitutionMatrix,
    gaps: GapModel,
}

impl GlobalAligner {
    pub fn new(matrix: SubstitutionMatrix, gaps: GapModel) -> Self {
        Self::with_capacity(
            DEFAULT_ALIGNER_CAPACITY,
            DEFAULT_ALIGNER_CAPACITY,
            matrix,
            gaps,
        )
    }

    pub fn with_capacity(m: usize, n: usize, matrix: SubstitutionMatrix, gaps: GapModel) -> Self {
        GlobalAligner {
            M: [Vec::with_capacity(m + 1), Vec::with_capacity(m + 1)],
            D: [Vec::with_capacity(m + 1), Vec::with_capacity(m + 1)],
            I: [Vec::with_capacity(m + 1), Vec::with_capacity(m + 1)],
            traceback: Traceback::with_capacity(m, n),
            matrix,
            gaps,
        }
    }

    pub fn matrix(&self) -> &SubstitutionMatrix {
        &self.matrix
    }

    pub fn gaps(&self) -> &GapModel {
        &self.gaps
    }

    /// Aligns `x` against `y` end-to-end, maximizing the total score.
    ///
    /// Both sequences are checked against the substitution matrix before
    /// any table work; the first uncovered symbol aborts the call.
    pub fn align(&mut self, x: &[u8], y: &[u8]) -> Result<Alignment, AlignError> {
        let xi = self.matrix.indices(x)?;
        let yi = self.matrix.indices(y)?;
        let m = x.len();
        let n = y.len();

        self.init_matrices(m, n);
        for j in 1..=n {
            let prev = (j - 1) % 2;
            let curr = j % 2;
            self.fill_column(&xi, yi[j - 1], m, j, prev, curr);
        }

        let curr = n % 2;
        let mut score = self.M[curr][m];
        let mut state = TB_MATCH;
        if self.I[curr][m] > score {
            score = self.I[curr][m];
            state = TB_INS;
        }
        if self.D[curr][m] > score {
            score = self.D[curr][m];
            state = TB_DEL;
        }

        let operations = trace_operations(&self.traceback, m, n, state)?;
        Ok(Alignment {
            score,
            xlen: m,
            ylen: n,
            operations,
        })
    }

    /// Resets the planes and fills column 0, where only deletion states
    /// (x symbols over gaps) are reachable.
    fn init_matrices(&mut self, m: usize, n: usize) {
        self.traceback.init(m, n);

        for k in 0..2 {
            self.M[k].clear();
            self.D[k].clear();
            self.I[k].clear();

            self.M[k].extend(repeat(MIN_SCORE).take(m + 1));
            self.D[k].extend(repeat(MIN_SCORE).take(m + 1));
            self.I[k].extend(repeat(MIN_SCORE).take(m + 1));
        }

        // The empty/empty alignment scores zero; the gap planes stay
        // unreachable at the origin so a boundary run's first symbol is
        // charged the open cost.
        self.M[0][0] = 0.0;

        let open = self.gaps.marginal(0);
        let extend = self.gaps.marginal(1);
        for i in 1..=m {
            let mut tb = Cell::default();
            if i == 1 {
                self.D[0][i] = open;
                tb.set_d(TB_MATCH);
            } else {
                self.D[0][i] = self.D[0][i - 1] + extend;
                tb.set_d(TB_DEL);
            }
            self.traceback.set(i, 0, tb);
        }
    }

    fn fill_column(
        &mut self,
        xi: &[usize],
        yj: usize,
        m: usize,
        j: usize,
        prev: usize,
        curr: usize,
    ) {
        let open = self.gaps.marginal(0);
        let extend = self.gaps.marginal(1);

        // Row 0: only insertion states (gaps over y symbols) are reachable.
        self.M[curr][0] = MIN_SCORE;
        self.D[curr][0] = MIN_SCORE;
        let mut tb = Cell::default();
        if j == 1 {
            self.I[curr][0] = open;
            tb.set_i(TB_MATCH);
        } else {
            self.I[curr][0] = self.I[prev][0] + extend;
            tb.set_i(TB_INS);
        }
        self.traceback.set(0, j, tb);

        for i in 1..=m {
            let mut tb = Cell::default();

            // Deletion: x[i-1] over a gap. Predecessors sit one row up in
            // the current column. Candidates are evaluated match first,
            // then insertion, then deletion, replacing only on a strictly
            // better score.
            let mut d_score = self.M[curr][i - 1] + open;
            let mut d_tb = TB_MATCH;
            let from_ins = self.I[curr][i - 1] + open;
            if from_ins > d_score {
                d_score = from_ins;
                d_tb = TB_INS;
            }
            let from_del = self.D[curr][i - 1] + extend;
            if from_del > d_score {
                d_score = from_del;
                d_tb = TB_DEL;
            }
            tb.set_d(d_tb);

            // Insertion: a gap over y[j-1]. Predecessors sit in the
            // previous column, same row.
            let mut i_score = self.M[prev][i] + open;
            let mut i_tb = TB_MATCH;
            let from_ins = self.I[prev][i] + extend;
            if from_ins > i_score {
                i_score = from_ins;
                i_tb = TB_INS;
            }
            let from_del = self.D[prev][i] + open;
            if from_del > i_score {
                i_score = from_del;
                i_tb = TB_DEL;
            }
            tb.set_i(i_tb);

            // Aligned pair: x[i-1] with y[j-1] through the diagonal.
            let mut m_score = self.M[prev][i - 1];
            let mut m_tb = TB_MATCH;
            let from_ins = self.I[prev][i - 1];
            if from_ins > m_score {
                m_score = from_ins;
                m_tb = TB_INS;
            }
            let from_del = self.D[prev][i - 1];
            if from_del > m_score {
                m_score = from_del;
                m_tb = TB_DEL;
            }
            tb.set_m(m_tb);

            self.M[curr][i] = m_score + self.matrix.score_by_index(xi[i - 1], yj);
            self.D[curr][i] = d_score;
            self.I[curr][i] = i_score;
            self.traceback.set(i, j, tb);
        }
    }
}

#[cfg(test)]
pub mod tests {
    use rstest::rstest;

    use crate::align::{
        align,
        alignment::Alignment,
        constants::{
            AlignmentOperation,
            AlignmentOperation::{Del, Ins, Match},
            Score,
        },
        scoring::{GapModel, SubstitutionMatrix},
        AlignError, GlobalAligner,
    };

    fn dna(match_score: Score, mismatch_score: Score) -> SubstitutionMatrix {
        SubstitutionMatrix::uniform(b"ACGT", match_score, mismatch_score).unwrap()
    }

    fn align_with(x: &str, y: &str, matrix: &SubstitutionMatrix, gaps: GapModel) -> Alignment {
        align(x.as_bytes(), y.as_bytes(), matrix, &gaps).unwrap()
    }

    fn assert_padded(alignment: &Alignment, x: &str, y: &str, top: &str, bottom: &str) {
        let (top_line, bottom_line) = alignment.padded(x.as_bytes(), y.as_bytes()).unwrap();
        assert_eq!(top_line, top);
        assert_eq!(bottom_line, bottom);
    }

    #[test]
    fn test_empty_sequences() {
        let alignment = align_with("", "", &dna(10.0, 7.0), GapModel::linear(3.0).unwrap());
        assert_eq!(alignment.score, 0.0);
        assert!(alignment.operations.is_empty());
        assert_padded(&alignment, "", "", "", "");
    }

    #[rstest]
    #[case("AA", "", GapModel::affine(0.0, 3.0).unwrap(), 3.0, vec![Del, Del], "AA", "__")]
    #[case("", "AA", GapModel::affine(0.0, 3.0).unwrap(), 3.0, vec![Ins, Ins], "__", "AA")]
    #[case("AAA", "", GapModel::linear(2.0).unwrap(), 6.0, vec![Del, Del, Del], "AAA", "___")]
    #[case("", "ACG", GapModel::affine(-6.0, -1.0).unwrap(), -8.0, vec![Ins, Ins, Ins], "___", "ACG")]
    fn test_gaps_only(
        #[case] x: &str,
        #[case] y: &str,
        #[case] gaps: GapModel,
        #[case] score: Score,
        #[case] operations: Vec<AlignmentOperation>,
        #[case] top: &str,
        #[case] bottom: &str,
    ) {
        let alignment = align_with(x, y, &dna(10.0, 7.0), gaps);
        assert_eq!(alignment.score, score);
        assert_eq!(alignment.operations, operations);
        assert_padded(&alignment, x, y, top, bottom);
    }

    /// The match path (7) ties the delete-then-insert path (3.5 + 3.5); the
    /// aligned pair must win.
    #[test]
    fn test_tie_prefers_match() {
        let alignment = align_with("A", "G", &dna(10.0, 7.0), GapModel::linear(3.5).unwrap());
        assert_eq!(alignment.score, 7.0);
        assert_eq!(alignment.operations, vec![Match]);
        assert_padded(&alignment, "A", "G", "A", "G");
    }

    /// With a worthless aligned pair the two all-gap paths tie at 6; the
    /// alignment must end in the insertion state, not the deletion state.
    #[test]
    fn test_tie_prefers_insertion_over_deletion() {
        let matrix = SubstitutionMatrix::uniform(b"AC", 0.0, 0.0).unwrap();
        let alignment = align_with("A", "C", &matrix, GapModel::linear(3.0).unwrap());
        assert_eq!(alignment.score, 6.0);
        assert_eq!(alignment.operations, vec![Del, Ins]);
        assert_padded(&alignment, "A", "C", "A_", "_C");
    }

    #[test]
    fn test_match_beats_gaps_when_strictly_better() {
        let alignment = align_with("A", "A", &dna(10.0, 7.0), GapModel::linear(3.0).unwrap());
        assert_eq!(alignment.score, 10.0);
        assert_eq!(alignment.operations, vec![Match]);
    }

    /// The reference pair: five identical aligned pairs plus one deletion.
    #[test]
    fn test_reference_pair() {
        let alignment = align_with(
            "CACGCG",
            "CACCG",
            &dna(10.0, 7.0),
            GapModel::linear(3.0).unwrap(),
        );
        assert_eq!(alignment.score, 53.0);
        assert_eq!(
            alignment.operations,
            vec![Match, Match, Match, Del, Match, Match]
        );
        assert_padded(&alignment, "CACGCG", "CACCG", "CACGCG", "CAC_CG");
    }

    /// Under penalty-style (negative) gap scores a single contiguous run
    /// beats two separate runs, and the run is charged open once.
    #[test]
    fn test_affine_keeps_runs_contiguous() {
        let matrix = SubstitutionMatrix::uniform(b"ACGT", 5.0, -4.0).unwrap();
        let alignment = align_with("AAAA", "AA", &matrix, GapModel::affine(-6.0, -1.0).unwrap());
        assert_eq!(alignment.score, 3.0);
        assert_eq!(alignment.operations, vec![Del, Del, Match, Match]);
        assert_padded(&alignment, "AAAA", "AA", "AAAA", "__AA");
    }

    /// With a symmetric matrix, swapping the sequences swaps the gap roles
    /// and keeps the score.
    #[rstest]
    #[case("CACGCG", "CACCG")]
    #[case("ACGT", "AT")]
    #[case("AA", "")]
    fn test_symmetry_swaps_roles(#[case] x: &str, #[case] y: &str) {
        let matrix = dna(10.0, 7.0);
        let gaps = GapModel::linear(3.0).unwrap();
        let forward = align_with(x, y, &matrix, gaps);
        let reverse = align_with(y, x, &matrix, gaps);
        assert_eq!(forward.score, reverse.score);
        let swapped: Vec<AlignmentOperation> = forward
            .operations
            .iter()
            .map(|op| match op {
                Match => Match,
                Del => Ins,
                Ins => Del,
            })
            .collect();
        assert_eq!(reverse.operations, swapped);
    }

    /// Lowering the gap scores (holding everything else fixed) never raises
    /// the optimal score once a gap is forced by the length difference.
    #[test]
    fn test_gap_score_monotonicity() {
        let matrix = dna(10.0, 0.0);
        let mut last = f64::INFINITY;
        for cost in [5.0, 3.0, 1.0, 0.0, -2.0, -6.0] {
            let alignment = align_with("ACGT", "AT", &matrix, GapModel::linear(cost).unwrap());
            assert!(
                alignment.score <= last,
                "score rose from {last} to {} at cost {cost}",
                alignment.score
            );
            last = alignment.score;
        }
    }

    /// `Linear(c)` and `Affine(c, c)` run through the same recurrence and
    /// must agree on the score and on the trace, not just the score.
    #[rstest]
    #[case("CACGCG", "CACCG")]
    #[case("A", "C")]
    #[case("AAAA", "AA")]
    #[case("ACGT", "")]
    #[case("GATTACA", "ACTG")]
    fn test_linear_matches_affine(#[case] x: &str, #[case] y: &str) {
        let matrix = dna(10.0, 7.0);
        for cost in [3.0, 0.5, -2.0] {
            let linear = align_with(x, y, &matrix, GapModel::linear(cost).unwrap());
            let affine = align_with(x, y, &matrix, GapModel::affine(cost, cost).unwrap());
            assert_eq!(linear.score, affine.score);
            assert_eq!(linear.operations, affine.operations);
        }
    }

    /// Every trace consumes each sequence exactly once.
    #[rstest]
    #[case("CACGCG", "CACCG")]
    #[case("GATTACA", "ACTG")]
    #[case("", "ACGT")]
    #[case("T", "T")]
    fn test_length_invariant(#[case] x: &str, #[case] y: &str) {
        let alignment = align_with(x, y, &dna(10.0, 7.0), GapModel::affine(1.0, 0.5).unwrap());
        alignment.validate();
    }

    #[test]
    fn test_unknown_symbol_is_rejected_before_alignment() {
        let mut aligner = GlobalAligner::new(dna(10.0, 7.0), GapModel::linear(3.0).unwrap());
        let err = aligner.align(b"AXA", b"AA").unwrap_err();
        assert_eq!(err, AlignError::UnknownSymbol { symbol: 'X' });
        let err = aligner.align(b"AA", b"AaA").unwrap_err();
        assert_eq!(err, AlignError::UnknownSymbol { symbol: 'a' });
    }

    /// Re-rendering from the same trace and sequences is deterministic.
    #[test]
    fn test_render_round_trip() {
        let alignment = align_with(
            "GATTACA",
            "ACTG",
            &dna(10.0, 7.0),
            GapModel::affine(2.0, 1.0).unwrap(),
        );
        let first = alignment.padded(b"GATTACA", b"ACTG").unwrap();
        let second = alignment.padded(b"GATTACA", b"ACTG").unwrap();
        assert_eq!(first, second);
    }

    /// One aligner instance can be reused across calls of different sizes.
    #[test]
    fn test_aligner_reuse() {
        let mut aligner = GlobalAligner::new(dna(10.0, 7.0), GapModel::linear(3.0).unwrap());
        let first = aligner.align(b"CACGCG", b"CACCG").unwrap();
        assert_eq!(first.score, 53.0);
        let second = aligner.align(b"A", b"A").unwrap();
        assert_eq!(second.score, 10.0);
        assert_eq!(second.operations, vec![Match]);
        let third = aligner.align(b"CACGCG", b"CACCG").unwrap();
        assert_eq!(third, first);
    }
}
