use anyhow::Result;
use clap::Parser;
use itertools::Itertools;
use log::info;
use needle::align::{AlignError, GapModel, GlobalAligner, SubstitutionMatrix};

use super::command::Command;

/// Performs an optimal global (end-to-end) alignment of two sequences.
///
/// Every symbol of both sequences takes part in the alignment: each column
/// is either an aligned pair of symbols or a symbol aligned against a gap.
/// Aligned pairs are scored by a substitution matrix built from the
/// alphabet and the match/mismatch scores; a run of k gap symbols scores
/// `{open} + {extend} * (k - 1)`, or `{gap-cost} * k` in the default
/// linear model. The alignment maximizing the total score is printed along
/// with its score and the list of actions that produce it.
///
/// Sequences and the alphabet are uppercased before alignment. A sequence
/// symbol outside the alphabet is an error.
#[derive(Parser, Debug, Clone)]
pub struct Align {
    /// The first sequence (rendered on the top line).
    #[clap(long, short = '1', default_value = "CACGCG", display_order = 1)]
    seq1: String,

    /// The second sequence (rendered on the bottom line).
    #[clap(long, short = '2', default_value = "CACCG", display_order = 2)]
    seq2: String,

    /// The alphabet the substitution matrix covers.
    #[clap(long, short = 'a', default_value = "ACGT", display_order = 3)]
    alphabet: String,

    /// Score for aligning two identical symbols.
    #[clap(
        long,
        short = 'A',
        default_value = "10",
        allow_hyphen_values = true,
        display_order = 4
    )]
    match_score: f64,

    /// Score for aligning two distinct symbols.
    #[clap(
        long,
        short = 'B',
        default_value = "7",
        allow_hyphen_values = true,
        display_order = 5
    )]
    mismatch_score: f64,

    /// Score for each gap symbol (linear gap model).
    #[clap(
        long,
        short = 'g',
        default_value = "3",
        allow_hyphen_values = true,
        conflicts_with_all = ["gap_open", "gap_extend"],
        display_order = 6
    )]
    gap_cost: f64,

    /// Score for the first symbol of a gap run (affine gap model; requires
    /// --gap-extend).
    #[clap(
        long,
        short = 'O',
        allow_hyphen_values = true,
        requires = "gap_extend",
        display_order = 7
    )]
    gap_open: Option<f64>,

    /// Score for each additional symbol of a gap run (affine gap model;
    /// requires --gap-open).
    #[clap(
        long,
        short = 'E',
        allow_hyphen_values = true,
        requires = "gap_open",
        display_order = 8
    )]
    gap_extend: Option<f64>,
}

impl Align {
    fn gap_model(&self) -> Result<GapModel, AlignError> {
        match (self.gap_open, self.gap_extend) {
            (Some(open), Some(extend)) => GapModel::affine(open, extend),
            (None, None) => GapModel::linear(self.gap_cost),
            _ => Err(AlignError::InvalidGapModel {
                reason: "gap-open and gap-extend must be given together".to_string(),
            }),
        }
    }

    /// Executes the align command
    pub fn execute(&self) -> Result<()> {
        let seq1 = self.seq1.to_ascii_uppercase();
        let seq2 = self.seq2.to_ascii_uppercase();
        let alphabet = self.alphabet.to_ascii_uppercase();

        let matrix =
            SubstitutionMatrix::uniform(alphabet.as_bytes(), self.match_score, self.mismatch_score)?;
        let gaps = self.gap_model()?;

        info!("Aligning {seq1} against {seq2}");
        let mut aligner = GlobalAligner::with_capacity(seq1.len(), seq2.len(), matrix, gaps);
        let alignment = aligner.align(seq1.as_bytes(), seq2.as_bytes())?;
        let (top, bottom) = alignment.padded(seq1.as_bytes(), seq2.as_bytes())?;
        info!("Alignment complete: {alignment}");

        println!("Inputs");
        println!("Sequence 1: {seq1}");
        println!("Sequence 2: {seq2}");
        match gaps {
            GapModel::Linear { cost } => println!("Gap cost: {cost}"),
            GapModel::Affine { open, extend } => {
                println!("Gap open: {open}");
                println!("Gap extend: {extend}");
            }
        }
        println!("Sigma:");
        print!("{}", sigma_table(aligner.matrix())?);
        println!();
        println!("Pairwise Alignment\n{top}\n{bottom}");
        println!();
        println!("Pairwise Alignment Score\n{}", alignment.score);
        println!();
        println!(
            "Actions for Pairwise Alignment\n{}",
            alignment.operations.iter().join(", ")
        );
        Ok(())
    }
}

impl Command for Align {
    fn execute(&self) -> Result<()> {
        Align::execute(self)
    }
}

/// Formats the substitution matrix with row and column labels.
fn sigma_table(matrix: &SubstitutionMatrix) -> Result<String> {
    let mut out = String::new();
    out.push(' ');
    for &symbol in matrix.symbols() {
        out.push_str(&format!("{:>6}", symbol as char));
    }
    out.push('\n');
    for &a in matrix.symbols() {
        out.push(a as char);
        for &b in matrix.symbols() {
            out.push_str(&format!("{:>6}", matrix.score(a, b)?));
        }
        out.push('\n');
    }
    Ok(out)
}
