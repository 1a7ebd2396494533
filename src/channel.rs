//! The shared state of one pair measurement. See [`HandshakeChannel`].

use crate::protocol::{self, SENTINEL};
use crate::{Discipline, SamplingParams};
use core::sync::atomic::{AtomicI64, Ordering};
use crossbeam_utils::CachePadded;

/// Two atomic slots, each on its own cache line.
///
/// The contested discipline only uses `request`. A channel lives for exactly
/// one pair of execution units and is reset before every sample.
#[derive(Debug)]
pub struct HandshakeChannel {
    request: CachePadded<AtomicI64>,
    acknowledge: CachePadded<AtomicI64>,
}

impl HandshakeChannel {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            request: CachePadded::new(AtomicI64::new(SENTINEL)),
            acknowledge: CachePadded::new(AtomicI64::new(SENTINEL)),
        }
    }

    /// Puts both slots back to [`SENTINEL`].
    ///
    /// Only the initiator calls this, between two samples, while the
    /// responder is waiting for step 0 of the next one.
    pub fn reset(&self) {
        self.request.store(SENTINEL, Ordering::Release);
        self.acknowledge.store(SENTINEL, Ordering::Release);
    }

    /// Runs the responder side for every sample of a measurement.
    pub fn respond(&self, discipline: Discipline, params: SamplingParams) {
        let ops = params.ops.get();
        for sample in 0..params.samples.get() {
            match discipline {
                Discipline::Relay => {
                    let steps = protocol::relay_steps(sample, ops);
                    protocol::relay_respond(&*self.request, &*self.acknowledge, steps);
                }
                Discipline::Contested => protocol::contested_respond(&*self.request, ops),
            }
        }
    }

    /// Runs the initiator side of sample number `sample`.
    #[inline]
    pub fn initiate(&self, discipline: Discipline, sample: u32, ops: u32) {
        match discipline {
            Discipline::Relay => {
                let steps = protocol::relay_steps(sample, ops);
                protocol::relay_initiate(&*self.request, &*self.acknowledge, steps);
            }
            Discipline::Contested => protocol::contested_initiate(&*self.request, ops),
        }
    }

    #[cfg(test)]
    fn snapshot(&self) -> (i64, i64) {
        (
            self.request.load(Ordering::Acquire),
            self.acknowledge.load(Ordering::Acquire),
        )
    }
}

impl Default for HandshakeChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use core::mem::{align_of, offset_of};
    use core::num::NonZeroU32;

    fn params(samples: u32, ops: u32) -> SamplingParams {
        SamplingParams::new(
            NonZeroU32::new(samples).unwrap(),
            NonZeroU32::new(ops).unwrap(),
        )
    }

    #[test]
    fn slots_live_on_separate_cache_lines() {
        let line = align_of::<CachePadded<AtomicI64>>();
        check!(line >= 64);
        let distance = offset_of!(HandshakeChannel, acknowledge)
            .abs_diff(offset_of!(HandshakeChannel, request));
        check!(distance >= line);
    }

    #[test]
    fn fresh_and_reset_channels_hold_sentinel() {
        let channel = HandshakeChannel::new();
        check!(channel.snapshot() == (SENTINEL, SENTINEL));

        channel.request.store(41, Ordering::Relaxed);
        channel.acknowledge.store(42, Ordering::Relaxed);
        channel.reset();
        check!(channel.snapshot() == (SENTINEL, SENTINEL));
    }

    fn run_samples(discipline: Discipline, samples: u32, ops: u32) -> HandshakeChannel {
        let channel = HandshakeChannel::new();
        let params = params(samples, ops);
        crossbeam_utils::thread::scope(|s| {
            s.spawn(|_| channel.respond(discipline, params));
            for sample in 0..samples {
                channel.reset();
                channel.initiate(discipline, sample, ops);
            }
        })
        .unwrap();
        channel
    }

    #[test]
    fn relay_samples_end_on_last_step() {
        let channel = run_samples(Discipline::Relay, 20, 7);
        check!(channel.snapshot() == (139, 139));
    }

    #[test]
    fn single_op_samples_do_not_run_ahead() {
        let channel = run_samples(Discipline::Relay, 500, 1);
        check!(channel.snapshot() == (499, 499));
        let channel = run_samples(Discipline::Contested, 500, 1);
        check!(channel.snapshot() == (1, SENTINEL));
    }

    #[test]
    fn contested_samples_end_on_terminal_value() {
        let channel = run_samples(Discipline::Contested, 20, 7);
        check!(channel.snapshot() == (protocol::terminal(7), SENTINEL));
    }
}
