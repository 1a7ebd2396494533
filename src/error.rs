//! Error type of the measurement run.

use crate::topology::ExecutionUnit;
use std::io;
use thiserror::Error;

/// Everything that can abort a run.
///
/// Apart from [`Error::Output`], all variants are environment errors: the
/// measurement is not trustworthy anymore and must not be retried blindly.
#[derive(Debug, Error)]
pub enum Error {
    /// The OS refused to report the CPUs this process may run on.
    #[error("cannot enumerate the CPUs available to this process")]
    Enumerate,
    /// The OS rejected binding a thread to `unit`.
    #[error("cannot pin thread to CPU {unit}")]
    Pin { unit: ExecutionUnit },
    /// The responder thread could not be started.
    #[error("cannot spawn responder thread: {0}")]
    Spawn(#[source] io::Error),
    /// Writing the latency matrix failed.
    #[error("cannot write latency matrix: {0}")]
    Output(#[from] io::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
