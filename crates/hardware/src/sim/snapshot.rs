//! Borrowed views of a single step.
//!
//! A [`Snapshot`] is what the rendering side receives for the current cycle. It
//! erases the model-specific step type behind a handful of uniform accessors and
//! reports which operand cells a renderer should highlight.

use std::borrow::Cow;

use serde::Serialize;

use crate::common::Matrix;
use crate::models::{Model, ParallelStep, PartialProducts, PeGrid, SequentialStep, SystolicStep};

/// One step of any model, borrowed from its run.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "model", rename_all = "PascalCase")]
pub enum Snapshot<'a> {
    /// A sequential multiply-accumulate.
    Sequential {
        /// The step.
        step: &'a SequentialStep,
    },
    /// A parallel reduction cycle, with the run's shared partial products.
    Parallel {
        /// The step.
        step: &'a ParallelStep,
        /// Partial-product tensor shared by every step of the run.
        #[serde(skip)]
        partial_products: &'a PartialProducts,
    },
    /// A systolic grid state.
    Systolic {
        /// The step.
        step: &'a SystolicStep,
    },
}

impl<'a> Snapshot<'a> {
    /// Model that produced this step.
    pub const fn model(&self) -> Model {
        match *self {
            Self::Sequential { .. } => Model::Sequential,
            Self::Parallel { .. } => Model::Parallel,
            Self::Systolic { .. } => Model::Systolic,
        }
    }

    /// Cycle number recorded on the step.
    pub const fn cycle(&self) -> usize {
        match *self {
            Self::Sequential { step } => step.cycle,
            Self::Parallel { step, .. } => step.cycle,
            Self::Systolic { step } => step.cycle,
        }
    }

    /// Operation label.
    pub fn description(&self) -> &'a str {
        match *self {
            Self::Sequential { step } => &step.description,
            Self::Parallel { step, .. } => &step.description,
            Self::Systolic { step } => &step.description,
        }
    }

    /// Output matrix as of the end of this step.
    ///
    /// Borrowed for the sequential and parallel models; read off the PE
    /// accumulators (and therefore owned) for the systolic model.
    pub fn output(&self) -> Cow<'a, Matrix> {
        match *self {
            Self::Sequential { step } => Cow::Borrowed(&step.after_matrix),
            Self::Parallel { step, .. } => Cow::Borrowed(&step.matrix),
            Self::Systolic { step } => Cow::Owned(step.result()),
        }
    }

    /// The parallel run's partial-product tensor, if this is a parallel step.
    pub const fn partial_products(&self) -> Option<&'a PartialProducts> {
        match *self {
            Self::Parallel {
                partial_products, ..
            } => Some(partial_products),
            Self::Sequential { .. } | Self::Systolic { .. } => None,
        }
    }

    /// Cells the step touches, for highlighting.
    pub const fn highlights(&self) -> Highlights<'a> {
        match *self {
            Self::Sequential { step } => Highlights::Mac {
                i: step.i,
                j: step.j,
                k: step.k,
            },
            Self::Parallel { step, .. } => match step.active_k {
                Some(k) => Highlights::Reduction { k },
                None => Highlights::None,
            },
            Self::Systolic { step } => Highlights::Pes(&step.pe_state),
        }
    }
}

/// Which grid a highlight refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    /// Left operand.
    A,
    /// Right operand.
    B,
    /// Output (for the systolic model, the PE grid).
    C,
}

/// Cells a step operates on.
#[derive(Debug, Clone, Copy)]
pub enum Highlights<'a> {
    /// Nothing is highlighted (initial parallel state).
    None,
    /// Sequential MAC: `A[i][k]`, `B[k][j]`, and `C[i][j]`.
    Mac {
        /// Output row.
        i: usize,
        /// Output column.
        j: usize,
        /// Reduction index.
        k: usize,
    },
    /// Parallel reduction: column `k` of A, row `k` of B, and all of C.
    Reduction {
        /// Reduction index.
        k: usize,
    },
    /// Systolic grid: PEs that have seen data (sticky `active` flag).
    Pes(&'a PeGrid),
}

impl Highlights<'_> {
    /// Whether cell `(i, j)` of `operand` is highlighted.
    pub fn is_highlighted(&self, operand: Operand, i: usize, j: usize) -> bool {
        match *self {
            Self::None => false,
            Self::Mac {
                i: ci,
                j: cj,
                k: ck,
            } => match operand {
                Operand::A => i == ci && j == ck,
                Operand::B => i == ck && j == cj,
                Operand::C => i == ci && j == cj,
            },
            Self::Reduction { k } => match operand {
                Operand::A => j == k,
                Operand::B => i == k,
                Operand::C => true,
            },
            Self::Pes(grid) => {
                operand == Operand::C && i < grid.size() && j < grid.size() && grid.get(i, j).active
            }
        }
    }
}
