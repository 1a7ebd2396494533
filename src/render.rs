//! Turns a [`LatencyMatrix`] into text.

use crate::matrix::LatencyMatrix;
use std::io::{self, Write};

/// Header row of the CSV export.
pub const CSV_HEADER: &str = "Core 1,Core 2,Latency (Nanoseconds)";

/// Renders a finished matrix.
pub trait MatrixWriter {
    fn write(&self, matrix: &LatencyMatrix, out: &mut dyn Write) -> io::Result<()>;
}

/// Fixed-width table for the terminal, latencies in nanoseconds.
///
/// ```text
///  CPU    0    1
///    0    0   41
///    1   41    0
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleGrid;

impl ConsoleGrid {
    const MIN_WIDTH: usize = 4;

    fn width(matrix: &LatencyMatrix) -> usize {
        let units = matrix.units().iter().map(|unit| unit.to_string().len());
        let cells = matrix.pairs().map(|(.., latency)| latency.as_nanos().to_string().len());
        units.chain(cells).fold(Self::MIN_WIDTH, usize::max)
    }
}

impl MatrixWriter for ConsoleGrid {
    fn write(&self, matrix: &LatencyMatrix, out: &mut dyn Write) -> io::Result<()> {
        let width = Self::width(matrix);

        write!(out, "{:>width$}", "CPU")?;
        for unit in matrix.units() {
            write!(out, " {unit:>width$}")?;
        }
        writeln!(out)?;

        for (i, unit) in matrix.units().iter().enumerate() {
            write!(out, "{unit:>width$}")?;
            for j in 0..matrix.len() {
                write!(out, " {:>width$}", matrix.get(i, j).as_nanos())?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

/// One `core,core,latency` row per ordered pair, diagonal included.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExport;

impl MatrixWriter for CsvExport {
    fn write(&self, matrix: &LatencyMatrix, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{CSV_HEADER}")?;
        for (row, column, latency) in matrix.pairs() {
            writeln!(out, "{row},{column},{}", latency.as_nanos())?;
        }
        Ok(())
    }
}

/// Selects a [`MatrixWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Fixed-width table.
    #[default]
    Grid,
    /// Comma separated, one row per pair.
    Csv,
}

impl OutputFormat {
    #[must_use]
    pub fn writer(self) -> &'static dyn MatrixWriter {
        match self {
            Self::Grid => &ConsoleGrid,
            Self::Csv => &CsvExport,
        }
    }
}
