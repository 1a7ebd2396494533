//! Measures the one-way latency between two execution units.
//!
//! The calling thread becomes the *initiator* and a freshly spawned thread the
//! *responder*. Both are pinned, meet at a [`StartGate`] and then run the
//! chosen [`Discipline`] on a [`HandshakeChannel`] that lives exactly as long
//! as the measurement. Only the initiator times anything.

use crate::channel::HandshakeChannel;
use crate::error::{Error, Result};
use crate::synchronization::StartGate;
use crate::timer::Timer;
use crate::topology::{Affinity, ExecutionUnit};
use crate::{Discipline, SamplingParams};
use std::panic;
use std::time::Duration;

/// Something that can produce the latency of one pair of execution units.
pub trait MeasurePair {
    /// One-way latency between `responder` and `initiator`.
    fn measure(
        &self,
        responder: ExecutionUnit,
        initiator: ExecutionUnit,
        discipline: Discipline,
    ) -> Result<Duration>;
}

/// Runs `trial` for sample numbers `0..samples` and keeps the fastest result.
///
/// Preemption and interrupts only ever make a sample slower, so the minimum is
/// the sample closest to what the hardware does.
pub fn sample_min(samples: u32, trial: impl FnMut(u32) -> Duration) -> Duration {
    (0..samples).map(trial).min().unwrap_or(Duration::ZERO)
}

/// Converts the round trip time of `ops` handshakes into a one-way latency.
#[must_use]
pub fn one_way(round_trip: Duration, ops: u32) -> Duration {
    round_trip / ops.saturating_mul(2).max(1)
}

/// The real thing: two pinned threads busy-waiting on each other.
#[derive(Debug)]
pub struct HandshakeEngine<A, T> {
    affinity: A,
    timer: T,
    params: SamplingParams,
}

impl<A: Affinity, T: Timer> HandshakeEngine<A, T> {
    #[must_use]
    pub const fn new(affinity: A, timer: T, params: SamplingParams) -> Self {
        Self {
            affinity,
            timer,
            params,
        }
    }

    #[must_use]
    pub const fn params(&self) -> SamplingParams {
        self.params
    }

    /// Initiator side: every sample resets the channel, then times `ops`
    /// handshakes.
    fn initiate(&self, channel: &HandshakeChannel, discipline: Discipline) -> Duration {
        let ops = self.params.ops.get();
        sample_min(self.params.samples.get(), |sample| {
            channel.reset();
            let start = self.timer.start();
            channel.initiate(discipline, sample, ops);
            self.timer.stop(start)
        })
    }
}

impl<A: Affinity, T: Timer> MeasurePair for HandshakeEngine<A, T> {
    fn measure(
        &self,
        responder: ExecutionUnit,
        initiator: ExecutionUnit,
        discipline: Discipline,
    ) -> Result<Duration> {
        self.affinity.pin_current(initiator)?;

        // Allocated after pinning so the page is first touched on the
        // initiator's node.
        let channel = Box::new(HandshakeChannel::new());
        let channel = &*channel;
        let gate = StartGate::new();
        let gate = &gate;
        let params = self.params;
        let affinity = &self.affinity;

        let scoped = crossbeam_utils::thread::scope(|s| -> Result<Duration> {
            let handle = s
                .builder()
                .name(format!("responder-{responder}"))
                .spawn(move |_| {
                    let pinned = affinity.pin_current(responder);
                    if gate.wait(pinned.is_ok()) {
                        channel.respond(discipline, params);
                    }
                    pinned
                })
                .map_err(Error::Spawn)?;

            let round_trip = gate.wait(true).then(|| self.initiate(channel, discipline));

            let pinned = handle
                .join()
                .unwrap_or_else(|payload| panic::resume_unwind(payload));
            pinned?;
            Ok(round_trip.unwrap_or(Duration::ZERO))
        });
        let round_trip = scoped.unwrap_or_else(|payload| panic::resume_unwind(payload))?;

        let latency = one_way(round_trip, params.ops.get());
        tracing::debug!(
            %responder,
            %initiator,
            %discipline,
            round_trip_ns = round_trip.as_nanos(),
            latency_ns = latency.as_nanos(),
            "measured pair"
        );
        Ok(latency)
    }
}
