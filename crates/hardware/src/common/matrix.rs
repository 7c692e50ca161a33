//! Square integer matrix.
//!
//! `Matrix` is the value type shared by inputs, outputs, and every intermediate
//! snapshot. It is never mutated once handed out: operations that "update" a
//! matrix return a fresh copy, so any number of retained snapshots can coexist
//! without aliasing.

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{Result, SimError};

/// Seed substituted for zero, which is a fixed point of xorshift.
const FALLBACK_SEED: u64 = 123_456_789;

/// Exclusive upper bound of values produced by [`Matrix::random`].
const RANDOM_VALUE_RANGE: u64 = 10;

/// An N×N grid of `i64` values stored row-major.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<i64>>", try_from = "Vec<Vec<i64>>")]
pub struct Matrix {
    n: usize,
    data: Vec<i64>,
}

/// Named input patterns offered by the matrix editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Preset {
    /// 1 on the diagonal, 0 elsewhere.
    Identity,
    /// Every element is 1.
    #[default]
    Ones,
    /// Pseudo-random digits 0..=9 from a seeded generator.
    Random,
    /// 1 where `(i + j)` is even, 0 elsewhere.
    Checkerboard,
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "identity" => Ok(Self::Identity),
            "ones" => Ok(Self::Ones),
            "random" => Ok(Self::Random),
            "checkerboard" => Ok(Self::Checkerboard),
            other => Err(format!(
                "unknown preset '{other}' (expected identity, ones, random, checkerboard)"
            )),
        }
    }
}

impl Matrix {
    /// Creates an `n`×`n` matrix of zeros.
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0; n * n],
        }
    }

    /// Creates an `n`×`n` matrix whose element `(i, j)` is `f(i, j)`.
    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> i64) -> Self {
        let mut data = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                data.push(f(i, j));
            }
        }
        Self { n, data }
    }

    /// Builds a matrix from nested rows.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::EmptyMatrix`] for zero rows and [`SimError::NotSquare`]
    /// when any row length differs from the number of rows.
    pub fn from_rows(rows: Vec<Vec<i64>>) -> Result<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(SimError::EmptyMatrix);
        }
        let mut data = Vec::with_capacity(n * n);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != n {
                return Err(SimError::NotSquare {
                    row,
                    expected: n,
                    found: values.len(),
                });
            }
            data.extend(values);
        }
        Ok(Self { n, data })
    }

    /// Identity matrix.
    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, |i, j| i64::from(i == j))
    }

    /// Matrix of ones.
    pub fn ones(n: usize) -> Self {
        Self::from_fn(n, |_, _| 1)
    }

    /// Checkerboard of ones and zeros, starting with 1 at `(0, 0)`.
    pub fn checkerboard(n: usize) -> Self {
        Self::from_fn(n, |i, j| i64::from((i + j) % 2 == 0))
    }

    /// Matrix of pseudo-random digits in `0..=9`.
    ///
    /// Uses a xorshift generator, so the same `seed` always yields the same matrix.
    pub fn random(n: usize, seed: u64) -> Self {
        let mut state = if seed == 0 { FALLBACK_SEED } else { seed };
        Self::from_fn(n, |_, _| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % RANDOM_VALUE_RANGE) as i64
        })
    }

    /// Builds the matrix described by `preset`; `seed` only affects [`Preset::Random`].
    pub fn preset(preset: Preset, n: usize, seed: u64) -> Self {
        match preset {
            Preset::Identity => Self::identity(n),
            Preset::Ones => Self::ones(n),
            Preset::Random => Self::random(n, seed),
            Preset::Checkerboard => Self::checkerboard(n),
        }
    }

    /// Dimension N.
    #[inline]
    pub const fn size(&self) -> usize {
        self.n
    }

    /// Element at row `i`, column `j`.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is not below [`size`](Self::size).
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> i64 {
        assert!(i < self.n && j < self.n, "index ({i}, {j}) out of bounds for {0}x{0}", self.n);
        self.data[i * self.n + j]
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[i64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// Iterates over rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[i64]> + '_ {
        self.data.chunks_exact(self.n.max(1))
    }

    /// Copies the matrix into nested rows.
    pub fn to_rows(&self) -> Vec<Vec<i64>> {
        self.rows().map(<[i64]>::to_vec).collect()
    }

    /// Returns a copy with `delta` added to element `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is not below [`size`](Self::size).
    pub fn accumulate(&self, i: usize, j: usize, delta: i64) -> Self {
        assert!(i < self.n && j < self.n, "index ({i}, {j}) out of bounds for {0}x{0}", self.n);
        let mut next = self.clone();
        next.data[i * self.n + j] += delta;
        next
    }

    /// Returns a copy with `f(i, j)` added to every element.
    pub fn accumulate_all(&self, mut f: impl FnMut(usize, usize) -> i64) -> Self {
        Self::from_fn(self.n, |i, j| self.get(i, j) + f(i, j))
    }

    /// Exact product `self · rhs`, computed directly.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DimensionMismatch`] if the operands differ in size.
    pub fn multiply(&self, rhs: &Self) -> Result<Self> {
        let n = ensure_same_size(self, rhs)?;
        Ok(Self::from_fn(n, |i, j| {
            (0..n).map(|k| self.get(i, k) * rhs.get(k, j)).sum()
        }))
    }
}

/// Checks that `a` and `b` share a dimension and returns it.
///
/// # Errors
///
/// Returns [`SimError::DimensionMismatch`] when the sizes differ.
pub fn ensure_same_size(a: &Matrix, b: &Matrix) -> Result<usize> {
    if a.size() == b.size() {
        Ok(a.size())
    } else {
        Err(SimError::DimensionMismatch {
            left: a.size(),
            right: b.size(),
        })
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = i64;

    fn index(&self, (i, j): (usize, usize)) -> &i64 {
        assert!(i < self.n && j < self.n, "index ({i}, {j}) out of bounds for {0}x{0}", self.n);
        &self.data[i * self.n + j]
    }
}

impl From<Matrix> for Vec<Vec<i64>> {
    fn from(m: Matrix) -> Self {
        m.to_rows()
    }
}

/// Serde's entry point. Unlike [`Matrix::from_rows`], `[]` is accepted as the
/// 0×0 matrix so that every serialized matrix reads back.
impl TryFrom<Vec<Vec<i64>>> for Matrix {
    type Error = SimError;

    fn try_from(rows: Vec<Vec<i64>>) -> Result<Self> {
        if rows.is_empty() {
            return Ok(Self::zeros(0));
        }
        Self::from_rows(rows)
    }
}

impl fmt::Display for Matrix {
    /// Right-aligned grid, one row per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .data
            .iter()
            .map(|v| v.to_string().len())
            .max()
            .unwrap_or(1);
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, v) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{v:>width$}")?;
            }
        }
        Ok(())
    }
}
