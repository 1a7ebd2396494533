//! Monotonic timer used around each timed sample.

use std::time::Duration;

/// A monotonic time source.
///
/// Reads must be cheap; the initiator takes one right before and one right
/// after every sample.
pub trait Timer {
    /// Opaque reading taken at the start of a timed region.
    type Stamp: Copy;

    fn start(&self) -> Self::Stamp;

    /// Time elapsed since `start`. Never negative.
    fn stop(&self, start: Self::Stamp) -> Duration;
}

/// Raw counter reads, scaled to wall time only when the region is closed.
impl Timer for quanta::Clock {
    type Stamp = u64;

    #[inline(always)]
    fn start(&self) -> u64 {
        self.raw()
    }

    #[inline(always)]
    fn stop(&self, start: u64) -> Duration {
        let end = self.raw();
        self.delta(start, end)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use assert2::check;
    use core::cell::Cell;

    /// Every read advances the clock by a fixed step.
    #[derive(Debug)]
    pub(crate) struct SteppedTimer {
        now: Cell<Duration>,
        step: Duration,
    }

    impl SteppedTimer {
        pub(crate) const fn new(step: Duration) -> Self {
            Self {
                now: Cell::new(Duration::ZERO),
                step,
            }
        }

        fn read(&self) -> Duration {
            let now = self.now.get() + self.step;
            self.now.set(now);
            now
        }
    }

    impl Timer for SteppedTimer {
        type Stamp = Duration;

        fn start(&self) -> Duration {
            self.read()
        }

        fn stop(&self, start: Duration) -> Duration {
            self.read() - start
        }
    }

    #[test]
    fn stepped_timer_measures_one_step() {
        let timer = SteppedTimer::new(Duration::from_nanos(40));
        let stamp = timer.start();
        check!(timer.stop(stamp) == Duration::from_nanos(40));
        let stamp = timer.start();
        check!(timer.stop(stamp) == Duration::from_nanos(40));
    }

    #[test]
    fn quanta_clock_does_not_go_backwards() {
        let clock = quanta::Clock::new();
        let mut previous = Duration::ZERO;
        let stamp = clock.start();
        for _ in 0..1000 {
            let elapsed = clock.stop(stamp);
            check!(elapsed >= previous);
            previous = elapsed;
        }
    }
}
