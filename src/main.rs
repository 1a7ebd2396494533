#![deny(
    clippy::all,
    clippy::cargo,
    clippy::nursery,
    clippy::must_use_candidate,
    clippy::perf
    // clippy::restriction,
    // clippy::pedantic
)]
// now allow a few rules which are denied by the above statement
// --> they are ridiculous and not necessary
#![allow(
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate,
    clippy::fallible_impl_from,
    clippy::multiple_crate_versions
)]
#![deny(missing_debug_implementations)]

use cco_latency::render::OutputFormat;
use cco_latency::topology::{self, Affinity, CoreAffinity, Unpinned};
use cco_latency::{Discipline, HandshakeEngine, LatencyMatrix, MatrixDriver, Result, SamplingParams};
use clap::Parser;
use core::num::NonZeroU32;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Measures the one-way latency between every pair of CPUs this process may
/// run on and prints it as a matrix.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Handshake discipline: `relay` (request/acknowledge on two cache lines)
    /// or `contested` (compare-and-swap on one cache line).
    #[arg(short, long, value_enum)]
    discipline: Discipline,

    /// Timed samples per pair; the fastest one is reported.
    #[arg(short, long, default_value_t = SamplingParams::DEFAULT_SAMPLES)]
    samples: NonZeroU32,

    /// Handshakes per timed sample.
    #[arg(short = 'k', long, default_value_t = SamplingParams::DEFAULT_OPS)]
    ops: NonZeroU32,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,

    /// Write the matrix to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not pin threads. The result says nothing about the topology.
    #[arg(long)]
    no_pin: bool,
}

fn measure(affinity: impl Affinity, args: &Args) -> Result<LatencyMatrix> {
    let units = topology::available_units()?;
    let params = SamplingParams::new(args.samples, args.ops);
    let engine = HandshakeEngine::new(affinity, quanta::Clock::new(), params);
    MatrixDriver::new(&engine).run(units, args.discipline)
}

fn open_output(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}

fn emit(matrix: &LatencyMatrix, args: &Args) -> Result<()> {
    let writer = args.format.writer();
    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(open_output(path)?);
            writer.write(matrix, &mut out)?;
            out.flush()?;
            tracing::info!(path = %path.display(), "matrix written");
        }
        None => {
            let mut out = io::stdout().lock();
            writer.write(matrix, &mut out)?;
            out.flush()?;
        }
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let matrix = if args.no_pin {
        tracing::warn!("threads are not pinned, latencies are not per core pair");
        measure(Unpinned, args)?
    } else {
        measure(CoreAffinity, args)?
    };
    emit(&matrix, args)
}

fn main() -> ExitCode {
    let args = Args::parse();
    cco_latency::logging::init_tracing();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use clap::CommandFactory;

    #[test]
    fn cli_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["cco-latency", "-d", "relay"]).unwrap();
        check!(args.discipline == Discipline::Relay);
        check!(args.samples.get() == 1000);
        check!(args.ops.get() == 100);
        check!(args.format == OutputFormat::Grid);
        check!(args.output.is_none());
        check!(!args.no_pin);
    }

    #[test]
    fn full_command_line() {
        let args = Args::try_parse_from([
            "cco-latency",
            "--discipline",
            "write",
            "-s",
            "2000",
            "-k",
            "50",
            "--format",
            "csv",
            "-o",
            "data/cco_write_results.csv",
            "--no-pin",
        ])
        .unwrap();
        check!(args.discipline == Discipline::Contested);
        check!(args.samples.get() == 2000);
        check!(args.ops.get() == 50);
        check!(args.format == OutputFormat::Csv);
        check!(args.output == Some(PathBuf::from("data/cco_write_results.csv")));
        check!(args.no_pin);
    }

    #[test]
    fn usage_errors() {
        // missing discipline
        check!(Args::try_parse_from(["cco-latency"]).is_err());
        // unknown discipline
        check!(Args::try_parse_from(["cco-latency", "-d", "atomic"]).is_err());
        // zero samples or ops
        check!(Args::try_parse_from(["cco-latency", "-d", "relay", "-s", "0"]).is_err());
        check!(Args::try_parse_from(["cco-latency", "-d", "relay", "-k", "0"]).is_err());
    }

    #[test]
    fn output_parent_directories_are_created() {
        let dir = std::env::temp_dir().join(format!("cco-latency-{}", fastrand::u64(..)));
        let path = dir.join("data").join("cco_read_results.csv");
        let matrix = LatencyMatrix::new(vec![cco_latency::ExecutionUnit(0)]);
        let args = Args::try_parse_from([
            "cco-latency",
            "-d",
            "read",
            "-f",
            "csv",
            "-o",
            path.to_str().unwrap(),
        ])
        .unwrap();

        emit(&matrix, &args).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        check!(written == "Core 1,Core 2,Latency (Nanoseconds)\n0,0,0\n");
        fs::remove_dir_all(dir).unwrap();
    }
}
