//! Sequential (CPU) model.
//!
//! A scalar core walks the textbook triple loop: output row `i` outermost,
//! output column `j` in the middle, reduction index `k` innermost. Each
//! multiply-accumulate into `C[i][j]` is one cycle, so an N×N product takes
//! N³ cycles. The loop order is part of the model: it determines which
//! partial sums are visible at each cycle.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Model, StepGenerator};
use crate::common::{Matrix, Result, ensure_same_size};

/// One multiply-accumulate `C[i][j] += A[i][k] * B[k][j]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequentialStep {
    /// Cycle number, counted from 1.
    pub cycle: usize,
    /// Output row.
    pub i: usize,
    /// Output column.
    pub j: usize,
    /// Reduction index.
    pub k: usize,
    /// Accumulator before this operation.
    pub before_matrix: Matrix,
    /// Accumulator after this operation.
    pub after_matrix: Matrix,
    /// Value added to `C[i][j]`: `A[i][k] * B[k][j]`.
    pub delta: i64,
    /// Operation label, e.g. `C[0,1] += A[0,2] * B[2,1]`.
    pub description: String,
}

/// Generator for the sequential model.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialStepGenerator;

impl StepGenerator for SequentialStepGenerator {
    type Trace = Vec<SequentialStep>;

    const MODEL: Model = Model::Sequential;

    fn generate(&self, a: &Matrix, b: &Matrix) -> Result<Vec<SequentialStep>> {
        let n = ensure_same_size(a, b)?;
        let mut steps = Vec::with_capacity(Self::MODEL.step_count(n));
        let mut acc = Matrix::zeros(n);

        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    let delta = a.get(i, k) * b.get(k, j);
                    let after = acc.accumulate(i, j, delta);
                    steps.push(SequentialStep {
                        cycle: steps.len() + 1,
                        i,
                        j,
                        k,
                        before_matrix: acc,
                        after_matrix: after.clone(),
                        delta,
                        description: format!("C[{i},{j}] += A[{i},{k}] * B[{k},{j}]"),
                    });
                    acc = after;
                }
            }
        }

        debug!(model = %Self::MODEL, n, steps = steps.len(), "generated run");
        Ok(steps)
    }
}
