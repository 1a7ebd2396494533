//! The pairwise latency table and the driver that fills it.

use crate::engine::MeasurePair;
use crate::error::Result;
use crate::topology::ExecutionUnit;
use crate::Discipline;
use std::time::{Duration, Instant};

/// Symmetric `n×n` table of one-way latencies, indexed like `units`.
///
/// The diagonal is always zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatencyMatrix {
    units: Vec<ExecutionUnit>,
    cells: Vec<Duration>,
}

impl LatencyMatrix {
    /// A zero-filled matrix over `units`.
    #[must_use]
    pub fn new(units: Vec<ExecutionUnit>) -> Self {
        let n = units.len();
        Self {
            units,
            cells: vec![Duration::ZERO; n * n],
        }
    }

    #[must_use]
    pub fn units(&self) -> &[ExecutionUnit] {
        &self.units
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Latency between row `i` and column `j`.
    ///
    /// # Panics
    /// If `i` or `j` is out of range.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Duration {
        self.cells[self.index(i, j)]
    }

    /// Stores `latency` for both `(i, j)` and `(j, i)`. Writes to the diagonal
    /// are ignored.
    ///
    /// # Panics
    /// If `i` or `j` is out of range.
    pub fn set_pair(&mut self, i: usize, j: usize, latency: Duration) {
        if i == j {
            return;
        }
        let (ij, ji) = (self.index(i, j), self.index(j, i));
        self.cells[ij] = latency;
        self.cells[ji] = latency;
    }

    /// All ordered pairs `(row unit, column unit, latency)`, diagonal
    /// included, row by row.
    pub fn pairs(&self) -> impl Iterator<Item = (ExecutionUnit, ExecutionUnit, Duration)> + '_ {
        let n = self.len();
        (0..n * n).map(move |k| (self.units[k / n], self.units[k % n], self.cells[k]))
    }

    fn index(&self, i: usize, j: usize) -> usize {
        let n = self.len();
        assert!(i < n && j < n, "cell ({i}, {j}) outside a {n}x{n} matrix");
        i * n + j
    }
}

/// Every `(i, j)` with `i < j < n`, row by row.
pub fn unordered_pairs(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |i| (i + 1..n).map(move |j| (i, j)))
}

/// Fills a [`LatencyMatrix`] one pair at a time.
///
/// Pairs are measured strictly one after another, never overlapping.
#[derive(Debug)]
pub struct MatrixDriver<'a, E> {
    engine: &'a E,
}

impl<'a, E: MeasurePair> MatrixDriver<'a, E> {
    pub const fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    /// Measures every unordered pair of `units` once. The lower-indexed unit of
    /// a pair hosts the responder. The first failing pair aborts the run.
    pub fn run(&self, units: Vec<ExecutionUnit>, discipline: Discipline) -> Result<LatencyMatrix> {
        let mut matrix = LatencyMatrix::new(units);
        let n = matrix.len();
        let total = n * n.saturating_sub(1) / 2;
        tracing::info!(units = n, pairs = total, %discipline, "measuring");

        let begin = Instant::now();
        for (done, (i, j)) in unordered_pairs(n).enumerate() {
            let (responder, initiator) = (matrix.units[i], matrix.units[j]);
            let latency = self.engine.measure(responder, initiator, discipline)?;
            matrix.set_pair(i, j, latency);
            tracing::debug!(
                done = done + 1,
                total,
                "pair {responder}-{initiator}: {} ns",
                latency.as_nanos()
            );
        }

        tracing::info!(elapsed = ?begin.elapsed(), "matrix complete");
        Ok(matrix)
    }
}
