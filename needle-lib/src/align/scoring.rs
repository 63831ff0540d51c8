use serde::{Deserialize, Serialize};

use crate::align::{constants::Score, AlignError};

/// Substitution scores over a small, explicitly configured alphabet.
///
/// The table is square, indexed by an ordered `(x symbol, y symbol)` pair,
/// and is not required to be symmetric. Every symbol appearing in either
/// input sequence must have a row/column here; anything else is an
/// [`AlignError::UnknownSymbol`], never silently scored as zero.
///
/// Lookups go through a 256-entry byte index, so scoring a pair is two
/// array reads.
#[derive(Clone, Debug)]
pub struct SubstitutionMatrix {
    symbols: Vec<u8>,
    lookup: [i16; 256],
    scores: Vec<Score>,
}

impl SubstitutionMatrix {
    /// Builds a matrix from an ordered alphabet and a square score table
    /// with the same symbol order on both axes.
    pub fn new(symbols: &[u8], table: &[Vec<Score>]) -> Result<Self, AlignError> {
        let invalid = |reason: String| AlignError::InvalidMatrix { reason };
        if symbols.is_empty() {
            return Err(invalid("alphabet must not be empty".to_string()));
        }
        if table.len() != symbols.len() {
            return Err(invalid(format!(
                "expected {} rows, found {}",
                symbols.len(),
                table.len()
            )));
        }

        let mut lookup = [-1i16; 256];
        for (index, &symbol) in symbols.iter().enumerate() {
            if lookup[symbol as usize] != -1 {
                return Err(invalid(format!("duplicate symbol '{}'", symbol as char)));
            }
            lookup[symbol as usize] = index as i16;
        }

        let mut scores = Vec::with_capacity(symbols.len() * symbols.len());
        for (row_index, row) in table.iter().enumerate() {
            if row.len() != symbols.len() {
                return Err(invalid(format!(
                    "row for '{}' has {} entries, expected {}",
                    symbols[row_index] as char,
                    row.len(),
                    symbols.len()
                )));
            }
            for &score in row {
                if !score.is_finite() {
                    return Err(invalid(format!(
                        "score for row '{}' must be finite (found {score})",
                        symbols[row_index] as char
                    )));
                }
                scores.push(score);
            }
        }

        Ok(SubstitutionMatrix {
            symbols: symbols.to_vec(),
            lookup,
            scores,
        })
    }

    /// Builds the common "one score on the diagonal, one score off it"
    /// matrix: `match_score` for identical symbols, `mismatch_score` for
    /// every other pair.
    pub fn uniform(
        symbols: &[u8],
        match_score: Score,
        mismatch_score: Score,
    ) -> Result<Self, AlignError> {
        let table: Vec<Vec<Score>> = (0..symbols.len())
            .map(|row| {
                (0..symbols.len())
                    .map(|col| if row == col { match_score } else { mismatch_score })
                    .collect()
            })
            .collect();
        Self::new(symbols, &table)
    }

    /// The alphabet, in table order.
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    /// The score for aligning `a` (from x) against `b` (from y).
    pub fn score(&self, a: u8, b: u8) -> Result<Score, AlignError> {
        Ok(self.score_by_index(self.index_of(a)?, self.index_of(b)?))
    }

    pub(crate) fn index_of(&self, symbol: u8) -> Result<usize, AlignError> {
        match self.lookup[symbol as usize] {
            -1 => Err(AlignError::UnknownSymbol {
                symbol: symbol as char,
            }),
            index => Ok(index as usize),
        }
    }

    /// Maps a whole sequence through the alphabet index, failing on the
    /// first uncovered symbol.
    pub(crate) fn indices(&self, seq: &[u8]) -> Result<Vec<usize>, AlignError> {
        seq.iter().map(|&symbol| self.index_of(symbol)).collect()
    }

    #[inline(always)]
    pub(crate) fn score_by_index(&self, a: usize, b: usize) -> Score {
        self.scores[a * self.symbols.len() + b]
    }
}

/// Gap run scoring.
///
/// A run of `k >= 1` consecutive gap symbols scores `open + extend * (k - 1)`
/// for the affine model; the linear model charges `cost` per symbol and is
/// exactly `Affine { open: cost, extend: cost }`. The engine only ever asks
/// for the marginal cost of growing a run by one symbol.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GapModel {
    Linear { cost: Score },
    Affine { open: Score, extend: Score },
}

impl GapModel {
    pub fn linear(cost: Score) -> Result<Self, AlignError> {
        if !cost.is_finite() {
            return Err(AlignError::InvalidGapModel {
                reason: format!("cost must be finite (found {cost})"),
            });
        }
        Ok(GapModel::Linear { cost })
    }

    pub fn affine(open: Score, extend: Score) -> Result<Self, AlignError> {
        if !open.is_finite() || !extend.is_finite() {
            return Err(AlignError::InvalidGapModel {
                reason: format!("open and extend must be finite (found {open}, {extend})"),
            });
        }
        Ok(GapModel::Affine { open, extend })
    }

    /// The cost of extending an existing run of `prior_len` gap symbols by
    /// one more: the open cost for the first symbol, the extend cost after.
    pub fn marginal(&self, prior_len: usize) -> Score {
        match *self {
            GapModel::Linear { cost } => cost,
            GapModel::Affine { open, extend } => {
                if prior_len == 0 {
                    open
                } else {
                    extend
                }
            }
        }
    }

    /// The total cost of a contiguous run of `len >= 1` gap symbols.
    pub fn run_cost(&self, len: usize) -> Score {
        assert!(len >= 1, "gap runs have at least one symbol");
        self.marginal(0) + self.marginal(1) * (len - 1) as Score
    }
}
