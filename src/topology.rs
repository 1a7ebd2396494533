//! Execution units and thread pinning.
//!
//! Uses `core_affinity` both for the list of CPUs this process may run on and
//! for binding the calling thread to one of them.

use crate::error::{Error, Result};
use core::fmt;
use core_affinity::CoreId;

/// A logical CPU the scheduler can place a thread on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExecutionUnit(pub usize);

impl ExecutionUnit {
    #[must_use]
    pub const fn id(self) -> usize {
        self.0
    }
}

impl fmt::Display for ExecutionUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<CoreId> for ExecutionUnit {
    fn from(core: CoreId) -> Self {
        Self(core.id)
    }
}

/// Returns the CPUs this process is currently permitted to run on, ascending.
pub fn available_units() -> Result<Vec<ExecutionUnit>> {
    let mut units = core_affinity::get_core_ids()
        .ok_or(Error::Enumerate)?
        .into_iter()
        .map(ExecutionUnit::from)
        .collect::<Vec<_>>();
    if units.is_empty() {
        return Err(Error::Enumerate);
    }
    units.sort_unstable();
    units.dedup();
    Ok(units)
}

/// Binds the calling thread to an execution unit.
///
/// Implementations are shared between the initiator and the responder thread.
pub trait Affinity: Sync {
    /// Pins the calling thread to `unit`.
    ///
    /// A rejected request is fatal for the run: a thread that is not where we
    /// think it is measures something else entirely.
    fn pin_current(&self, unit: ExecutionUnit) -> Result<()>;
}

/// Real pinning through the OS scheduler.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreAffinity;

impl Affinity for CoreAffinity {
    fn pin_current(&self, unit: ExecutionUnit) -> Result<()> {
        if core_affinity::set_for_current(CoreId { id: unit.id() }) {
            Ok(())
        } else {
            Err(Error::Pin { unit })
        }
    }
}

/// Leaves threads wherever the scheduler puts them.
///
/// Only meaningful for in-process loopback runs; the numbers it produces say
/// nothing about the topology.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unpinned;

impl Affinity for Unpinned {
    fn pin_current(&self, _unit: ExecutionUnit) -> Result<()> {
        Ok(())
    }
}
