//! Processing element and PE grid.

use serde::{Deserialize, Serialize};

use crate::common::Matrix;

/// One multiply-accumulate cell of the systolic array.
///
/// A PE at `(i, j)` receives `a_in` from its left neighbour and `b_in` from the
/// neighbour above, adds their product to `acc`, and forwards both values
/// unchanged (`a_out` to the right, `b_out` downwards) for the next cycle.
///
/// `active` is sticky: it records whether the PE has *ever* received a nonzero
/// operand during the run, not whether it is computing in the current cycle.
/// A PE that has drained keeps `active == true` until the run is rebuilt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessingElement {
    /// Running sum of `a_in * b_in`; never reset within a run.
    pub acc: i64,
    /// Value received from the left this cycle.
    pub a_in: i64,
    /// Value received from above this cycle.
    pub b_in: i64,
    /// Value forwarded to the right neighbour.
    pub a_out: i64,
    /// Value forwarded to the neighbour below.
    pub b_out: i64,
    /// Has this PE ever seen a nonzero input.
    pub active: bool,
}

impl ProcessingElement {
    /// Computes this PE's next state from its previous state and this cycle's inputs.
    #[must_use]
    pub const fn step(self, a_in: i64, b_in: i64) -> Self {
        Self {
            acc: self.acc + a_in * b_in,
            a_in,
            b_in,
            a_out: a_in,
            b_out: b_in,
            active: self.active || a_in != 0 || b_in != 0,
        }
    }
}

/// Row-major N×N grid of processing elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeGrid {
    n: usize,
    cells: Vec<ProcessingElement>,
}

impl PeGrid {
    /// All-idle grid: zero accumulators, zero registers, inactive.
    pub fn idle(n: usize) -> Self {
        Self {
            n,
            cells: vec![ProcessingElement::default(); n * n],
        }
    }

    /// Builds a grid whose PE `(i, j)` is `f(i, j)`, visiting cells row-major.
    pub(crate) fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> ProcessingElement) -> Self {
        let mut cells = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                cells.push(f(i, j));
            }
        }
        Self { n, cells }
    }

    /// Grid dimension N.
    pub const fn size(&self) -> usize {
        self.n
    }

    /// PE at row `i`, column `j`.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is not below [`size`](Self::size).
    pub fn get(&self, i: usize, j: usize) -> &ProcessingElement {
        assert!(i < self.n && j < self.n, "PE ({i}, {j}) out of bounds for {0}x{0}", self.n);
        &self.cells[i * self.n + j]
    }

    /// Iterates over `((i, j), pe)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &ProcessingElement)> + '_ {
        let n = self.n;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, pe)| ((idx / n, idx % n), pe))
    }

    /// Accumulator values read off the grid.
    pub fn accumulators(&self) -> Matrix {
        Matrix::from_fn(self.n, |i, j| self.get(i, j).acc)
    }

    /// Number of PEs whose sticky `active` flag is set.
    pub fn active_count(&self) -> usize {
        self.cells.iter().filter(|pe| pe.active).count()
    }
}
