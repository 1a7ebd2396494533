//! The two handshake disciplines, written against a single atomic word.
//!
//! # Relay
//!
//! Two slots, one per direction. For step `n` the initiator publishes `n` on
//! `request` and waits for `n` on `acknowledge`; the responder waits for `n` on
//! `request` and answers with `n` on `acknowledge`. Neither side can get more
//! than one step ahead of the other.
//!
//! Step numbers keep counting across samples (sample `s` covers
//! `s·K..(s+1)·K`). A value left over from the previous sample therefore never
//! matches the first step of the next one, even for `K = 1`.
//!
//! # Contested
//!
//! One slot, fought over with compare-and-swap. Ownership alternates through
//! the parity of the value:
//!
//! ```text
//! initiator step n:  2n-1 -> 2n     (odd value left by the responder)
//! responder step n:  2n   -> 2n+1   (even value left by the initiator)
//! ```
//!
//! Step 0 of the initiator consumes the [`SENTINEL`] (`-1`), and after `K`
//! steps the slot rests at [`terminal`]`(K) = 2K-1`, the value the
//! initiator spins on before it stops the clock.
//!
//! Spin loops carry no backoff and no `spin_loop` hint; both would land in
//! the measured latency.

use core::ops::Range;
use core::sync::atomic::{AtomicI64, Ordering};

/// Value of every slot before the first step of a sample.
pub const SENTINEL: i64 = -1;

/// A machine-word atomic cell.
///
/// Implemented for [`AtomicI64`]; tests substitute scripted cells to drive one
/// side of the protocol without a second thread.
pub trait Slot {
    fn load(&self, order: Ordering) -> i64;

    fn store(&self, value: i64, order: Ordering);

    fn compare_exchange(
        &self,
        current: i64,
        new: i64,
        success: Ordering,
        failure: Ordering,
    ) -> Result<i64, i64>;
}

impl Slot for AtomicI64 {
    #[inline(always)]
    fn load(&self, order: Ordering) -> i64 {
        Self::load(self, order)
    }

    #[inline(always)]
    fn store(&self, value: i64, order: Ordering) {
        Self::store(self, value, order);
    }

    #[inline(always)]
    fn compare_exchange(
        &self,
        current: i64,
        new: i64,
        success: Ordering,
        failure: Ordering,
    ) -> Result<i64, i64> {
        Self::compare_exchange(self, current, new, success, failure)
    }
}

/// Step numbers of relay sample `sample` with `ops` handshakes each.
#[must_use]
pub fn relay_steps(sample: u32, ops: u32) -> Range<i64> {
    let first = i64::from(sample) * i64::from(ops);
    first..first + i64::from(ops)
}

/// Responder side of the relay discipline.
#[inline]
pub fn relay_respond<S: Slot + ?Sized>(request: &S, acknowledge: &S, steps: Range<i64>) {
    for n in steps {
        while request.load(Ordering::Acquire) != n {}
        acknowledge.store(n, Ordering::Release);
    }
}

/// Initiator side of the relay discipline.
#[inline]
pub fn relay_initiate<S: Slot + ?Sized>(request: &S, acknowledge: &S, steps: Range<i64>) {
    for n in steps {
        request.store(n, Ordering::Release);
        while acknowledge.load(Ordering::Acquire) != n {}
    }
}

/// `(expected, new)` of the responder's CAS in step `n`.
#[must_use]
pub const fn responder_step(n: i64) -> (i64, i64) {
    (2 * n, 2 * n + 1)
}

/// `(expected, new)` of the initiator's CAS in step `n`.
#[must_use]
pub const fn initiator_step(n: i64) -> (i64, i64) {
    (2 * n - 1, 2 * n)
}

/// Value the slot holds once both sides completed `ops` contested steps.
#[must_use]
pub const fn terminal(ops: u32) -> i64 {
    2 * ops as i64 - 1
}

/// A single responder CAS attempt for step `n`. On failure the slot is untouched.
#[inline(always)]
pub fn try_respond<S: Slot + ?Sized>(slot: &S, n: i64) -> bool {
    let (expected, new) = responder_step(n);
    slot.compare_exchange(expected, new, Ordering::AcqRel, Ordering::Relaxed)
        .is_ok()
}

/// A single initiator CAS attempt for step `n`. On failure the slot is untouched.
#[inline(always)]
pub fn try_initiate<S: Slot + ?Sized>(slot: &S, n: i64) -> bool {
    let (expected, new) = initiator_step(n);
    slot.compare_exchange(expected, new, Ordering::AcqRel, Ordering::Relaxed)
        .is_ok()
}

/// Responder side of the contested discipline, `ops` steps.
///
/// The expected operand stays fixed across failed attempts. It is never
/// reloaded from the slot.
#[inline]
pub fn contested_respond<S: Slot + ?Sized>(slot: &S, ops: u32) {
    for n in 0..i64::from(ops) {
        while !try_respond(slot, n) {}
    }
}

/// Initiator side of the contested discipline, `ops` steps.
///
/// Returns once the responder has completed its last step.
#[inline]
pub fn contested_initiate<S: Slot + ?Sized>(slot: &S, ops: u32) {
    for n in 0..i64::from(ops) {
        while !try_initiate(slot, n) {}
    }
    let done = terminal(ops);
    while slot.load(Ordering::Acquire) != done {}
}
