//! Execution models.
//!
//! Each model turns an operand pair `(A, B)` into the complete, ordered list of
//! cycle snapshots for one multiplication. It provides:
//! 1. **Sequential (CPU):** One multiply-accumulate per cycle, N³ cycles.
//! 2. **Parallel (GPU):** All partial products up front, then N lock-step reduction cycles.
//! 3. **Systolic (TPU):** An N×N grid of processing elements fed with skewed operands, 3N−1 cycles.
//!
//! Generation is eager and synchronous: a generator runs to completion and returns
//! every step before playback can begin.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::{Matrix, Result};

/// Parallel (GPU) reduction model.
pub mod parallel;

/// Sequential (CPU) triple-loop model.
pub mod sequential;

/// Systolic-array (TPU) model.
pub mod systolic;

pub use parallel::{ParallelStep, ParallelStepGenerator, ParallelTrace, PartialProducts};
pub use sequential::{SequentialStep, SequentialStepGenerator};
pub use systolic::{PeGrid, ProcessingElement, SystolicStep, SystolicStepGenerator};

/// Hardware execution model selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Model {
    /// Scalar CPU executing the textbook triple loop.
    Sequential,
    /// Massively parallel GPU reducing every output cell at once.
    Parallel,
    /// TPU-style systolic array of multiply-accumulate cells.
    #[default]
    Systolic,
}

impl Model {
    /// All models, in presentation order.
    pub const ALL: [Self; 3] = [Self::Sequential, Self::Parallel, Self::Systolic];

    /// Number of modeled execution cycles for an `n`×`n` product.
    ///
    /// Excludes the idle/initial snapshot that the parallel and systolic traces begin with.
    pub const fn active_cycles(self, n: usize) -> usize {
        match self {
            Self::Sequential => n * n * n,
            Self::Parallel => n,
            Self::Systolic => (3 * n).saturating_sub(1),
        }
    }

    /// Number of steps a generator emits for an `n`×`n` product.
    pub const fn step_count(self, n: usize) -> usize {
        match self {
            Self::Sequential => self.active_cycles(n),
            Self::Parallel | Self::Systolic => self.active_cycles(n) + 1,
        }
    }

    /// Whether playback begins before the first step rather than on it.
    ///
    /// The sequential and parallel traces start "unstarted" (nothing shown yet);
    /// the systolic trace starts on its idle snapshot.
    pub const fn starts_unstarted(self) -> bool {
        !matches!(self, Self::Systolic)
    }

    /// Short hardware label (`CPU`, `GPU`, `TPU`).
    pub const fn hardware(self) -> &'static str {
        match self {
            Self::Sequential => "CPU",
            Self::Parallel => "GPU",
            Self::Systolic => "TPU",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
            Self::Systolic => "systolic",
        };
        f.pad(name)
    }
}

impl FromStr for Model {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" | "cpu" => Ok(Self::Sequential),
            "parallel" | "gpu" => Ok(Self::Parallel),
            "systolic" | "tpu" => Ok(Self::Systolic),
            other => Err(format!(
                "unknown model '{other}' (expected sequential/cpu, parallel/gpu, systolic/tpu)"
            )),
        }
    }
}

/// Enumerates every cycle of one execution model.
///
/// Implementations treat both operands as read-only and return independent
/// snapshots; the same inputs always produce the same trace.
pub trait StepGenerator {
    /// Complete trace produced for one operand pair.
    type Trace;

    /// The model this generator implements.
    const MODEL: Model;

    /// Generates the full trace for `a · b`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DimensionMismatch`](crate::common::SimError::DimensionMismatch)
    /// when `a` and `b` differ in size.
    fn generate(&self, a: &Matrix, b: &Matrix) -> Result<Self::Trace>;
}
