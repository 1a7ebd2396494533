use core::hint;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A single-use busy-wait rendezvous for exactly **two threads** that also
/// tells both sides whether the other one is ready.
///
/// The initiator and the responder of a pair meet here after pinning
/// themselves. If either side failed to pin, both learn it and neither
/// enters the handshake, so no thread is left spinning on a peer that never
/// shows up.
#[derive(Debug)]
pub struct StartGate {
    // number of threads that reached the gate (0, 1, 2)
    arrived: AtomicUsize,
    // set by any thread that arrives not ready
    aborted: AtomicBool,
}

impl StartGate {
    /// Create a new gate for 2 threads.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            arrived: AtomicUsize::new(0),
            aborted: AtomicBool::new(false),
        }
    }

    /// Wait until both threads have reached this point.
    ///
    /// Returns `true` if both threads arrived `ready`.
    /// - The *first* thread spins until the second arrives.
    /// - The *second* thread passes straight through.
    pub fn wait(&self, ready: bool) -> bool {
        if !ready {
            // published before the arrival below
            self.aborted.store(true, Ordering::Release);
        }

        let arrival_count = self.arrived.fetch_add(1, Ordering::AcqRel) + 1;
        if arrival_count < 2 {
            while self.arrived.load(Ordering::Acquire) < 2 {
                hint::spin_loop();
            }
        }

        !self.aborted.load(Ordering::Acquire)
    }
}

impl Default for StartGate {
    fn default() -> Self {
        Self::new()
    }
}
