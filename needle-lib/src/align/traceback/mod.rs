use serde::{Deserialize, Serialize};

use crate::align::{constants::AlignmentOperation, AlignError};

// Predecessor codes, one per plane a cell can be entered from.
pub const TB_START: u8 = 0b00;
pub const TB_MATCH: u8 = 0b01;
pub const TB_INS: u8 = 0b10;
pub const TB_DEL: u8 = 0b11;
pub const TB_MAX: u8 = 0b11;

// Bit offsets of each plane's predecessor code within a cell.
const TB_M_POS: u8 = 0;
const TB_D_POS: u8 = 2;
const TB_I_POS: u8 = 4;
const TB_MASK: u8 = 0b11;

/// Packed representation of one cell of the traceback matrix: a two-bit
/// predecessor code for each of the three planes (aligned pair, deletion,
/// insertion). A default cell carries `TB_START` in every plane.
#[derive(
    Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize,
)]
pub struct Cell {
    bits: u8,
}

impl Cell {
    /// Sets 2 bits [pos, pos+2) to the 2 LSBs of value.
    #[inline(always)]
    fn set(&mut self, pos: u8, value: u8) {
        assert!(
            value <= TB_MAX,
            "Expected a value <= TB_MAX while setting traceback bits"
        );
        let bits = TB_MASK << pos;
        self.bits = (self.bits & !bits) | (value << pos);
    }

    // Gets 2 bits [pos, pos+2) of the cell
    #[inline(always)]
    fn get(self, pos: u8) -> u8 {
        (self.bits >> pos) & TB_MASK
    }

    #[inline(always)]
    pub fn set_m(&mut self, tb: u8) {
        self.set(TB_M_POS, tb);
    }

    #[inline(always)]
    pub fn set_d(&mut self, tb: u8) {
        self.set(TB_D_POS, tb);
    }

    #[inline(always)]
    pub fn set_i(&mut self, tb: u8) {
        self.set(TB_I_POS, tb);
    }

    #[inline(always)]
    pub fn get_m(self) -> u8 {
        self.get(TB_M_POS)
    }

    #[inline(always)]
    pub fn get_d(self) -> u8 {
        self.get(TB_D_POS)
    }

    #[inline(always)]
    pub fn get_i(self) -> u8 {
        self.get(TB_I_POS)
    }
}

/// Internal traceback matrix: one packed [`Cell`] per `(i, j)` with
/// `0 <= i <= xlen` and `0 <= j <= ylen`.
#[derive(Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct Traceback {
    rows: usize,
    cols: usize,
    matrix: Vec<Cell>,
}

impl Traceback {
    pub fn with_capacity(m: usize, n: usize) -> Self {
        let rows = m + 1;
        let cols = n + 1;
        Traceback {
            rows,
            cols,
            matrix: Vec::with_capacity(rows * cols),
        }
    }

    /// Resets every cell to `TB_START` for an `(m + 1) x (n + 1)` table.
    pub fn init(&mut self, m: usize, n: usize) {
        self.matrix.clear();
        self.resize(m, n, Cell::default());
    }

    #[inline(always)]
    pub fn set(&mut self, i: usize, j: usize, v: Cell) {
        debug_assert!(i < self.rows);
        debug_assert!(j < self.cols);
        self.matrix[i * self.cols + j] = v;
    }

    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> Cell {
        debug_assert!(i < self.rows);
        debug_assert!(j < self.cols);
        self.matrix[i * self.cols + j]
    }

    pub fn resize(&mut self, m: usize, n: usize, v: Cell) {
        self.rows = m + 1;
        self.cols = n + 1;
        self.matrix.resize(self.rows * self.cols, v);
    }
}

/// Walks the recorded predecessor codes from `(m, n)` back to `(0, 0)`,
/// starting in `state` (the plane that won the final cell), and returns the
/// operations in left-to-right sequence order.
///
/// Any step that cannot be taken given the recorded codes means the tables
/// were built inconsistently and is reported as such rather than rendered.
pub(crate) fn trace_operations(
    traceback: &Traceback,
    m: usize,
    n: usize,
    state: u8,
) -> Result<Vec<AlignmentOperation>, AlignError> {
    let mut operations = Vec::with_capacity(m + n);
    let mut i = m;
    let mut j = n;
    let mut state = state;
    while i > 0 || j > 0 {
        let cell = traceback.get(i, j);
        let next = match state {
            TB_MATCH if i > 0 && j > 0 => {
                operations.push(AlignmentOperation::Match);
                i -= 1;
                j -= 1;
                cell.get_m()
            }
            TB_DEL if i > 0 => {
                operations.push(AlignmentOperation::Del);
                i -= 1;
                cell.get_d()
            }
            TB_INS if j > 0 => {
                operations.push(AlignmentOperation::Ins);
                j -= 1;
                cell.get_i()
            }
            _ => return Err(AlignError::InconsistentTraceback { i, j }),
        };
        if next == TB_START && (i, j) != (0, 0) {
            return Err(AlignError::InconsistentTraceback { i, j });
        }
        state = next;
    }
    operations.reverse();
    Ok(operations)
}
