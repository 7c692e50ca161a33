//! Systolic-array (TPU) model.
//!
//! An N×N grid of processing elements computes `A · B` by pumping operands
//! through the array:
//! 1. **Left feed:** Row `i` of A enters PE(i, 0) one element per cycle, starting at cycle `i + 1`.
//! 2. **Top feed:** Column `j` of B enters PE(0, j) one element per cycle, starting at cycle `j + 1`.
//! 3. **Propagation:** Each PE forwards `a` right and `b` down with a one-cycle delay per hop.
//! 4. **Accumulation:** Each PE adds `a_in * b_in` into its own accumulator.
//!
//! The row/column skew lines up `A[i][k]` and `B[k][j]` at PE(i, j) on cycle
//! `i + j + k + 1`, so the last product lands on cycle `3N − 2` and the wave has
//! fully drained after `3N − 1` cycles. The result is read directly off the
//! accumulators of the final grid.

/// Processing element and grid types.
pub mod pe;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Model, StepGenerator};
use crate::common::{Matrix, Result, ensure_same_size};

pub use pe::{PeGrid, ProcessingElement};

/// Grid state at the end of one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystolicStep {
    /// Cycle number; 0 is the idle state before any data enters.
    pub cycle: usize,
    /// State of every PE after this cycle.
    pub pe_state: PeGrid,
    /// Human-readable label.
    pub description: String,
}

impl SystolicStep {
    /// Accumulators of every PE, i.e. the partial result matrix at this cycle.
    pub fn result(&self) -> Matrix {
        self.pe_state.accumulators()
    }
}

/// Generator for the systolic model.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystolicStepGenerator;

impl StepGenerator for SystolicStepGenerator {
    type Trace = Vec<SystolicStep>;

    const MODEL: Model = Model::Systolic;

    fn generate(&self, a: &Matrix, b: &Matrix) -> Result<Vec<SystolicStep>> {
        let n = ensure_same_size(a, b)?;
        let cycles = Self::MODEL.active_cycles(n);
        let mut steps = Vec::with_capacity(cycles + 1);

        let mut grid = PeGrid::idle(n);
        steps.push(SystolicStep {
            cycle: 0,
            pe_state: grid.clone(),
            description: "Initial state: Processing Elements are idle".to_string(),
        });

        for cycle in 1..=cycles {
            grid = next_state(&grid, cycle, a, b);
            steps.push(SystolicStep {
                cycle,
                pe_state: grid.clone(),
                description: format!("Cycle {cycle}: Data flows through the systolic array"),
            });
        }

        debug!(model = %Self::MODEL, n, steps = steps.len(), "generated run");
        Ok(steps)
    }
}

/// Value entering PE(`i`, 0) from the left edge on `cycle`.
///
/// Row `i` of A arrives over cycles `i + 1 ..= i + N`; outside that window the edge carries 0.
pub fn left_feed(a: &Matrix, i: usize, cycle: usize) -> i64 {
    cycle
        .checked_sub(i + 1)
        .filter(|&k| k < a.size())
        .map_or(0, |k| a.get(i, k))
}

/// Value entering PE(0, `j`) from the top edge on `cycle`.
///
/// Column `j` of B arrives over cycles `j + 1 ..= j + N`; outside that window the edge carries 0.
pub fn top_feed(b: &Matrix, j: usize, cycle: usize) -> i64 {
    cycle
        .checked_sub(j + 1)
        .filter(|&k| k < b.size())
        .map_or(0, |k| b.get(k, j))
}

/// Advances every PE by one cycle.
///
/// Inputs are read exclusively from `prev`, so all PEs update in lock-step from one
/// consistent snapshot and no PE sees a value produced in the same cycle.
pub fn next_state(prev: &PeGrid, cycle: usize, a: &Matrix, b: &Matrix) -> PeGrid {
    PeGrid::from_fn(prev.size(), |i, j| {
        let a_in = if j == 0 {
            left_feed(a, i, cycle)
        } else {
            prev.get(i, j - 1).a_out
        };
        let b_in = if i == 0 {
            top_feed(b, j, cycle)
        } else {
            prev.get(i - 1, j).b_out
        };
        prev.get(i, j).step(a_in, b_in)
    })
}
