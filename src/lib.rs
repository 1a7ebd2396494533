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

//! Core-to-core latency: how long does it take one logical CPU to signal
//! another and get an answer back?
//!
//! For every pair of CPUs, two pinned threads play a strictly ordered
//! ping-pong over shared atomics ([`protocol`]). The minimum over many timed
//! samples, divided by the number of one-way trips, is the latency of that
//! pair ([`engine`]). All pairs together form a symmetric [`LatencyMatrix`]
//! ([`matrix`]) that [`render`] prints as a grid or CSV.

pub mod channel;
pub mod engine;
pub mod error;
pub mod logging;
pub mod matrix;
pub mod protocol;
pub mod render;
pub mod synchronization;
pub mod timer;
pub mod topology;

pub use engine::{HandshakeEngine, MeasurePair};
pub use error::{Error, Result};
pub use matrix::{LatencyMatrix, MatrixDriver};
pub use topology::ExecutionUnit;

use core::fmt;
use core::num::NonZeroU32;

/// How the two threads of a pair hand the cache line(s) back and forth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Discipline {
    /// One writer per slot: request and acknowledge on separate cache lines.
    #[value(alias = "read")]
    Relay,
    /// Both threads compare-and-swap the same slot.
    #[value(alias = "write")]
    Contested,
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Relay => "relay",
            Self::Contested => "contested",
        })
    }
}

/// How many timed samples to take per pair and how many handshakes each
/// sample covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingParams {
    /// Number of timed samples; only the fastest one counts.
    pub samples: NonZeroU32,
    /// Handshakes per timed sample, amortizing timer and loop overhead.
    pub ops: NonZeroU32,
}

impl SamplingParams {
    pub const DEFAULT_SAMPLES: NonZeroU32 = NonZeroU32::new(1000).unwrap();
    pub const DEFAULT_OPS: NonZeroU32 = NonZeroU32::new(100).unwrap();

    #[must_use]
    pub const fn new(samples: NonZeroU32, ops: NonZeroU32) -> Self {
        Self { samples, ops }
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SAMPLES, Self::DEFAULT_OPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use clap::ValueEnum;

    #[test]
    fn default_params() {
        let params = SamplingParams::default();
        check!(params.samples.get() == 1000);
        check!(params.ops.get() == 100);
    }

    #[test]
    fn discipline_names_and_aliases() {
        check!(Discipline::from_str("relay", false) == Ok(Discipline::Relay));
        check!(Discipline::from_str("read", false) == Ok(Discipline::Relay));
        check!(Discipline::from_str("contested", false) == Ok(Discipline::Contested));
        check!(Discipline::from_str("write", false) == Ok(Discipline::Contested));
        check!(Discipline::from_str("bogus", false).is_err());
        check!(Discipline::Contested.to_string() == "contested");
    }
}
