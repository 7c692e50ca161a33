//! Simulation runs.
//!
//! A run is the complete, immutable step sequence for one `(A, B, model)` triple.
//! Steps live behind `Arc`, so a run can be cloned cheaply and read by the
//! playback controller and any number of observers at once. Changing either
//! operand means building a new run; runs are never patched in place.

use std::sync::Arc;

use serde::Serialize;

use super::snapshot::Snapshot;
use crate::common::{Matrix, Result};
use crate::models::{
    Model, ParallelStep, ParallelStepGenerator, PartialProducts, SequentialStep,
    SequentialStepGenerator, StepGenerator, SystolicStep, SystolicStepGenerator,
};

/// Indexable, finite sequence of snapshots.
///
/// This is the only capability the playback controller needs from a run.
pub trait Trace {
    /// Number of steps.
    fn len(&self) -> usize;

    /// Whether the trace has no steps.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Step at `index`, or `None` past the end.
    fn snapshot_at(&self, index: usize) -> Option<Snapshot<'_>>;
}

/// Steps of the sequential model.
#[derive(Debug, Clone, Serialize)]
pub struct SequentialRun {
    n: usize,
    steps: Arc<[SequentialStep]>,
}

impl SequentialRun {
    /// Generates the sequential trace for `a · b`.
    ///
    /// # Errors
    ///
    /// Fails when `a` and `b` differ in size.
    pub fn generate(a: &Matrix, b: &Matrix) -> Result<Self> {
        let steps = SequentialStepGenerator.generate(a, b)?;
        Ok(Self {
            n: a.size(),
            steps: steps.into(),
        })
    }

    /// All steps in order.
    pub fn steps(&self) -> &[SequentialStep] {
        &self.steps
    }
}

/// Steps of the parallel model plus their shared partial products.
#[derive(Debug, Clone, Serialize)]
pub struct ParallelRun {
    n: usize,
    partial_products: Arc<PartialProducts>,
    steps: Arc<[ParallelStep]>,
}

impl ParallelRun {
    /// Generates the parallel trace for `a · b`.
    ///
    /// # Errors
    ///
    /// Fails when `a` and `b` differ in size.
    pub fn generate(a: &Matrix, b: &Matrix) -> Result<Self> {
        let trace = ParallelStepGenerator.generate(a, b)?;
        Ok(Self {
            n: a.size(),
            partial_products: trace.partial_products,
            steps: trace.steps.into(),
        })
    }

    /// All steps in order, starting with the all-zero state.
    pub fn steps(&self) -> &[ParallelStep] {
        &self.steps
    }

    /// Partial-product tensor shared by every step.
    pub fn partial_products(&self) -> &PartialProducts {
        &self.partial_products
    }
}

/// Steps of the systolic model.
#[derive(Debug, Clone, Serialize)]
pub struct SystolicRun {
    n: usize,
    steps: Arc<[SystolicStep]>,
}

impl SystolicRun {
    /// Generates the systolic trace for `a · b`.
    ///
    /// # Errors
    ///
    /// Fails when `a` and `b` differ in size.
    pub fn generate(a: &Matrix, b: &Matrix) -> Result<Self> {
        let steps = SystolicStepGenerator.generate(a, b)?;
        Ok(Self {
            n: a.size(),
            steps: steps.into(),
        })
    }

    /// All steps in order, starting with the idle grid.
    pub fn steps(&self) -> &[SystolicStep] {
        &self.steps
    }
}

/// A generated run of any model.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "model", rename_all = "PascalCase")]
pub enum Run {
    /// CPU triple loop.
    Sequential(SequentialRun),
    /// GPU parallel reduction.
    Parallel(ParallelRun),
    /// TPU systolic array.
    Systolic(SystolicRun),
}

impl Run {
    /// Generates a fresh run of `model` for `a · b`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DimensionMismatch`](crate::common::SimError::DimensionMismatch)
    /// when `a` and `b` differ in size.
    pub fn generate(model: Model, a: &Matrix, b: &Matrix) -> Result<Self> {
        Ok(match model {
            Model::Sequential => Self::Sequential(SequentialRun::generate(a, b)?),
            Model::Parallel => Self::Parallel(ParallelRun::generate(a, b)?),
            Model::Systolic => Self::Systolic(SystolicRun::generate(a, b)?),
        })
    }

    /// Model that produced this run.
    pub const fn model(&self) -> Model {
        match self {
            Self::Sequential(_) => Model::Sequential,
            Self::Parallel(_) => Model::Parallel,
            Self::Systolic(_) => Model::Systolic,
        }
    }

    /// Operand dimension N.
    pub const fn size(&self) -> usize {
        match self {
            Self::Sequential(r) => r.n,
            Self::Parallel(r) => r.n,
            Self::Systolic(r) => r.n,
        }
    }

    /// Number of modeled execution cycles (excluding any idle/initial step).
    pub const fn total_cycles(&self) -> usize {
        self.model().active_cycles(self.size())
    }

    /// Cursor position playback starts from: `None` (before step 0) or `Some(0)`.
    pub fn start_index(&self) -> Option<usize> {
        if self.model().starts_unstarted() || self.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    /// Index of the final step, or `None` for an empty run.
    pub fn last_index(&self) -> Option<usize> {
        self.len().checked_sub(1)
    }

    /// The product `A · B` as left by the final step.
    ///
    /// For an empty (0×0) run this is the empty matrix.
    pub fn result(&self) -> Matrix {
        self.last_index()
            .and_then(|i| self.snapshot_at(i))
            .map_or_else(|| Matrix::zeros(self.size()), |s| s.output().into_owned())
    }
}

impl Trace for Run {
    fn len(&self) -> usize {
        match self {
            Self::Sequential(r) => r.steps.len(),
            Self::Parallel(r) => r.steps.len(),
            Self::Systolic(r) => r.steps.len(),
        }
    }

    fn snapshot_at(&self, index: usize) -> Option<Snapshot<'_>> {
        match self {
            Self::Sequential(r) => r.steps.get(index).map(|step| Snapshot::Sequential { step }),
            Self::Parallel(r) => r.steps.get(index).map(|step| Snapshot::Parallel {
                step,
                partial_products: &r.partial_products,
            }),
            Self::Systolic(r) => r.steps.get(index).map(|step| Snapshot::Systolic { step }),
        }
    }
}
