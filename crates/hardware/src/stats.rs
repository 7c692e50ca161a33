//! Run statistics and model comparison.
//!
//! This module summarises generated runs for reporting. It provides:
//! 1. **Per-run stats:** Step count, modeled cycles, MAC count, and throughput of one run.
//! 2. **Comparison:** All three models over the same operands, checked against the reference product.
//! 3. **Reporting:** Sectioned plain-text output (`summary`, `cycles`, `result`).

use serde::Serialize;

use crate::common::{Matrix, Result};
use crate::models::Model;
use crate::sim::{Run, Trace};

/// Summary of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Model that produced the run.
    pub model: Model,
    /// Operand dimension N.
    pub size: usize,
    /// Number of recorded steps, including any initial state.
    pub steps: usize,
    /// Modeled execution cycles.
    pub total_cycles: usize,
    /// Multiply-accumulate operations performed (N³ for every model).
    pub macs: usize,
    /// Final output matrix.
    pub result: Matrix,
}

impl RunStats {
    /// Collects statistics from a run.
    pub fn from_run(run: &Run) -> Self {
        let n = run.size();
        Self {
            model: run.model(),
            size: n,
            steps: run.len(),
            total_cycles: run.total_cycles(),
            macs: n.pow(3),
            result: run.result(),
        }
    }

    /// Average MACs per modeled cycle.
    pub fn macs_per_cycle(&self) -> f64 {
        if self.total_cycles == 0 {
            0.0
        } else {
            self.macs as f64 / self.total_cycles as f64
        }
    }
}

/// Section names for selective report output.
///
/// Valid section identifiers: `"summary"`, `"cycles"`, `"result"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "cycles", "result"];

/// All three models run over the same operands.
#[derive(Debug, Clone, Serialize)]
pub struct ModelComparison {
    /// Reference product `A · B`.
    pub expected: Matrix,
    /// One entry per model, in [`Model::ALL`] order.
    pub runs: Vec<RunStats>,
}

impl ModelComparison {
    /// Generates a run of every model for `a · b`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DimensionMismatch`](crate::common::SimError::DimensionMismatch)
    /// when `a` and `b` differ in size.
    pub fn new(a: &Matrix, b: &Matrix) -> Result<Self> {
        let expected = a.multiply(b)?;
        let runs = Model::ALL
            .iter()
            .map(|&model| Run::generate(model, a, b).map(|run| RunStats::from_run(&run)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { expected, runs })
    }

    /// Whether every model produced the reference product.
    pub fn agree(&self) -> bool {
        self.runs.iter().all(|r| r.result == self.expected)
    }

    /// Stats for `model`.
    pub fn get(&self, model: Model) -> Option<&RunStats> {
        self.runs.iter().find(|r| r.model == model)
    }

    /// Cycle ratio of the sequential model over `model`.
    pub fn speedup(&self, model: Model) -> Option<f64> {
        let base = self.get(Model::Sequential)?.total_cycles;
        let cycles = self.get(model)?.total_cycles;
        if cycles == 0 {
            None
        } else {
            Some(base as f64 / cycles as f64)
        }
    }

    /// Prints only the requested sections to stdout.
    ///
    /// Each element of `sections` should be one of `"summary"`, `"cycles"`, or
    /// `"result"`. Pass an empty slice to print all sections (same as `print()`).
    ///
    /// # Arguments
    ///
    /// * `sections` - Slice of section names to print, or empty for all.
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let n = self.expected.size();

        if want("summary") {
            println!("\n==========================================================");
            println!("MATRIX MULTIPLICATION MODEL COMPARISON");
            println!("==========================================================");
            println!("matrix_size              {n}x{n}");
            println!("mac_ops                  {}", n.pow(3));
            println!(
                "results_agree            {}",
                if self.agree() { "yes" } else { "NO" }
            );
            println!("----------------------------------------------------------");
        }
        if want("cycles") {
            println!("CYCLES");
            for r in &self.runs {
                println!(
                    "  {:<10} ({})  cycles: {:<8} | steps: {:<8} | macs/cycle: {:.2} | speedup: {:.2}x",
                    r.model,
                    r.model.hardware(),
                    r.total_cycles,
                    r.steps,
                    r.macs_per_cycle(),
                    self.speedup(r.model).unwrap_or(0.0)
                );
            }
            println!("----------------------------------------------------------");
        }
        if want("result") {
            println!("RESULT");
            println!("{}", self.expected);
        }
        println!("==========================================================");
    }

    /// Prints all sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
