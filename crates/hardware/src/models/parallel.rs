//! Parallel (GPU) model.
//!
//! With unlimited parallel compute, every product `A[i][k] * B[k][j]` for every
//! output cell is formed at once. What remains is the reduction: N cycles, each
//! adding slice `k` of the partial-product tensor into all N² output cells in
//! lock-step. Total latency is N cycles against N³ for the sequential model.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Model, StepGenerator};
use crate::common::{Matrix, Result, ensure_same_size};

/// The tensor `P[i][j][k] = A[i][k] * B[k][j]`, computed once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialProducts {
    n: usize,
    data: Vec<i64>,
}

impl PartialProducts {
    /// Forms every partial product of `a · b`. Both operands must be `n`×`n`.
    fn compute(a: &Matrix, b: &Matrix, n: usize) -> Self {
        let mut data = Vec::with_capacity(n * n * n);
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    data.push(a.get(i, k) * b.get(k, j));
                }
            }
        }
        Self { n, data }
    }

    /// Dimension N.
    pub const fn size(&self) -> usize {
        self.n
    }

    /// `P[i][j][k]`.
    ///
    /// # Panics
    ///
    /// Panics if any index is not below [`size`](Self::size).
    pub fn get(&self, i: usize, j: usize, k: usize) -> i64 {
        let n = self.n;
        assert!(i < n && j < n && k < n, "index ({i}, {j}, {k}) out of bounds for N = {n}");
        self.data[(i * self.n + j) * self.n + k]
    }

    /// The N terms summed into output cell `(i, j)`, ordered by `k`.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is not below [`size`](Self::size).
    pub fn terms(&self, i: usize, j: usize) -> &[i64] {
        assert!(i < self.n && j < self.n, "cell ({i}, {j}) out of bounds for N = {0}", self.n);
        let start = (i * self.n + j) * self.n;
        &self.data[start..start + self.n]
    }
}

/// One reduction cycle (or the initial all-zero state).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelStep {
    /// Cycle number; 0 for the initial state, `k + 1` for reduction index `k`.
    pub cycle: usize,
    /// Reduction index folded in this cycle; `None` for the initial state.
    pub active_k: Option<usize>,
    /// Output matrix before this cycle's additions.
    pub matrix_before: Matrix,
    /// Output matrix after this cycle's additions.
    pub matrix: Matrix,
    /// Operation label.
    pub description: String,
}

/// Complete parallel trace: the shared partial-product tensor and N+1 steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelTrace {
    /// Partial products shared read-only by every step.
    pub partial_products: Arc<PartialProducts>,
    /// Initial state followed by one step per reduction index.
    pub steps: Vec<ParallelStep>,
}

/// Generator for the parallel model.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelStepGenerator;

impl StepGenerator for ParallelStepGenerator {
    type Trace = ParallelTrace;

    const MODEL: Model = Model::Parallel;

    fn generate(&self, a: &Matrix, b: &Matrix) -> Result<ParallelTrace> {
        let n = ensure_same_size(a, b)?;
        let products = Arc::new(PartialProducts::compute(a, b, n));

        let mut steps = Vec::with_capacity(Self::MODEL.step_count(n));
        let zeros = Matrix::zeros(n);
        steps.push(ParallelStep {
            cycle: 0,
            active_k: None,
            matrix_before: zeros.clone(),
            matrix: zeros.clone(),
            description: "Initial state (all zeros)".to_string(),
        });

        let mut acc = zeros;
        for k in 0..n {
            let next = acc.accumulate_all(|i, j| products.get(i, j, k));
            steps.push(ParallelStep {
                cycle: k + 1,
                active_k: Some(k),
                matrix_before: acc,
                matrix: next.clone(),
                description: format!("All elements accumulate A[i,{k}] * B[{k},j] in parallel"),
            });
            acc = next;
        }

        debug!(model = %Self::MODEL, n, steps = steps.len(), "generated run");
        Ok(ParallelTrace {
            partial_products: products,
            steps,
        })
    }
}
