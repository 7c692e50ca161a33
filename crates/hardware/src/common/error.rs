//! Error definitions for the trace engine.
//!
//! This module defines the single error type returned by fallible operations. It covers:
//! 1. **Input validation:** Empty, ragged, or mismatched input matrices.
//! 2. **Transport validation:** Playback speeds outside the configured bounds.
//! 3. **Configuration:** JSON parse failures and unreadable configuration files.
//!
//! Step generation itself is total for well-formed inputs; the only failures are
//! precondition violations reported before any step is produced.

use thiserror::Error;

/// Errors raised by matrix construction, run generation, playback, and configuration.
#[derive(Debug, Error)]
pub enum SimError {
    /// A matrix was constructed from zero rows.
    #[error("matrix must have at least one row")]
    EmptyMatrix,

    /// A row did not have as many columns as the matrix has rows.
    #[error("matrix is not square: row {row} has {found} columns, expected {expected}")]
    NotSquare {
        /// Index of the offending row.
        row: usize,
        /// Required column count (the number of rows).
        expected: usize,
        /// Column count actually supplied.
        found: usize,
    },

    /// The two operands of a multiplication have different dimensions.
    ///
    /// Every model's reduction index runs over both operands, so A and B must
    /// share the same N.
    #[error("dimension mismatch: A is {left}x{left}, B is {right}x{right}")]
    DimensionMismatch {
        /// Dimension of the left operand (A).
        left: usize,
        /// Dimension of the right operand (B).
        right: usize,
    },

    /// A playback speed multiplier outside the accepted range.
    #[error("speed multiplier {value} outside [{min}, {max}]")]
    SpeedOutOfRange {
        /// Requested multiplier.
        value: f64,
        /// Lower bound (inclusive).
        min: f64,
        /// Upper bound (inclusive).
        max: f64,
    },

    /// The configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SimError>;
