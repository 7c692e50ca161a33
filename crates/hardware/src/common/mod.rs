//! Common types shared by every execution model.
//!
//! This module provides the building blocks used across the trace engine:
//! 1. **Matrix:** The square integer grid used for inputs, outputs, and snapshots.
//! 2. **Presets:** Named input patterns (identity, ones, random, checkerboard).
//! 3. **Error Handling:** The crate-wide error type and result alias.

/// Error type and result alias.
pub mod error;

/// Square matrix value type and input presets.
pub mod matrix;

pub use error::{Result, SimError};
pub use matrix::{Matrix, Preset, ensure_same_size};
