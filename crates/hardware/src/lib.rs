//! Cycle-accurate matrix multiplication trace engine.
//!
//! This crate records, cycle by cycle, how `C = A · B` is computed on three hardware
//! models and plays the recording back:
//! 1. **Models:** Sequential CPU triple loop (N³ cycles), parallel GPU reduction
//!    (N cycles), and a TPU-style systolic array (3N − 1 cycles).
//! 2. **Runs:** Immutable step sequences with a uniform snapshot view and highlight queries.
//! 3. **Playback:** A transport/timer state machine with stale-tick cancellation.
//! 4. **Simulation:** Configuration and cross-model statistics.
//!
//! # Examples
//!
//! ```
//! use matviz_core::{Matrix, Model, Run, Trace};
//!
//! let a = Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
//! let b = Matrix::from_rows(vec![vec![5, 6], vec![7, 8]]).unwrap();
//!
//! let run = Run::generate(Model::Systolic, &a, &b).unwrap();
//! assert_eq!(run.len(), 6);
//! assert_eq!(run.result(), a.multiply(&b).unwrap());
//! ```

/// Common types (matrix, presets, errors).
pub mod common;
/// Configuration (defaults, matrix and playback sections).
pub mod config;
/// Execution models and their step generators.
pub mod models;
/// Runs, snapshots, playback controller, and host-loop driver.
pub mod sim;
/// Run statistics and model comparison reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Square integer matrix and crate error types.
pub use crate::common::{Matrix, Preset, Result, SimError};
/// Execution model selector and generator seam.
pub use crate::models::{Model, StepGenerator};
/// Playback over a generated run.
pub use crate::sim::{Frame, FrameObserver, PlaybackController, PlaybackState, Run, Snapshot, Trace};
