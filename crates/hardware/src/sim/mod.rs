//! Runs and their playback.
//!
//! This module turns generated steps into something a front end can play. It provides:
//! 1. **Runs:** `Run`, the tagged container of one model's steps, behind the `Trace` capability.
//! 2. **Snapshots:** Borrowed, model-erased views of a single step with highlight queries.
//! 3. **Playback:** `PlaybackController`, the transport and timer state machine.
//! 4. **Driver:** A clock seam and host-loop driver feeding wall time to the controller.

/// Host-loop driver and clock seam.
pub mod driver;
/// Playback controller, frames, and observers.
pub mod playback;
/// Run container and the `Trace` capability.
pub mod run;
/// Borrowed step views and highlights.
pub mod snapshot;

pub use driver::{Clock, Driver, SystemClock};
pub use playback::{Frame, FrameObserver, PlaybackController, PlaybackState, TimerToken};
pub use run::{ParallelRun, Run, SequentialRun, SystolicRun, Trace};
pub use snapshot::{Highlights, Operand, Snapshot};
