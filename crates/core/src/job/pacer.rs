//! Throttling backoff

use std::time::Duration;

use thiserror::Error;

/// The next retry interval would exceed the configured ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("retry interval of {next}s exceeds the ceiling of {ceiling}s")]
pub struct BackoffExhausted {
    pub next: u64,
    pub ceiling: u64,
}

/// Controls how long a job waits before re-dispatching after throttling.
///
/// The interval grows 0s, 1s, 2s and is squared from there on (4s, 16s,
/// 256s...). A ceiling of 0 leaves the growth unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryPacer {
    interval_secs: u64,
    ceiling_secs: u64,
}

impl RetryPacer {
    pub fn new(ceiling_secs: u64) -> Self {
        Self { interval_secs: 0, ceiling_secs }
    }

    /// Delay to apply before the next dispatch.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    pub fn ceiling_secs(&self) -> u64 {
        self.ceiling_secs
    }

    pub fn set_ceiling(&mut self, ceiling_secs: u64) {
        self.ceiling_secs = ceiling_secs;
    }

    pub fn reset(&mut self) {
        self.interval_secs = 0;
    }

    /// Grow the interval after a throttled reply.
    ///
    /// Leaves the interval untouched and returns an error when the grown
    /// value would pass the ceiling.
    pub fn back_off(&mut self) -> Result<Duration, BackoffExhausted> {
        let next = match self.interval_secs {
            0 => 1,
            1 => 2,
            current => current.saturating_mul(current),
        };

        if self.ceiling_secs > 0 && next > self.ceiling_secs {
            return Err(BackoffExhausted { next, ceiling: self.ceiling_secs });
        }

        self.interval_secs = next;
        Ok(self.interval())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_sequence_squares_after_two() {
        let mut pacer = RetryPacer::new(0);
        assert_eq!(pacer.interval(), Duration::ZERO);

        let steps: Vec<u64> = (0..5).map(|_| pacer.back_off().unwrap().as_secs()).collect();
        assert_eq!(steps, [1, 2, 4, 16, 256]);
    }

    #[test]
    fn ceiling_stops_growth() {
        let mut pacer = RetryPacer::new(10);
        assert_eq!(pacer.back_off(), Ok(Duration::from_secs(1)));
        assert_eq!(pacer.back_off(), Ok(Duration::from_secs(2)));
        assert_eq!(pacer.back_off(), Ok(Duration::from_secs(4)));
        assert_eq!(pacer.back_off(), Err(BackoffExhausted { next: 16, ceiling: 10 }));
        // Interval stays at the last accepted value
        assert_eq!(pacer.interval_secs(), 4);
    }

    #[test]
    fn ceiling_is_inclusive() {
        let mut pacer = RetryPacer::new(2);
        pacer.back_off().unwrap();
        assert_eq!(pacer.back_off(), Ok(Duration::from_secs(2)));
        assert!(pacer.back_off().is_err());
    }

    #[test]
    fn reset_returns_to_zero() {
        let mut pacer = RetryPacer::new(0);
        pacer.back_off().unwrap();
        pacer.back_off().unwrap();
        pacer.reset();
        assert_eq!(pacer.interval(), Duration::ZERO);
        assert_eq!(pacer.back_off(), Ok(Duration::from_secs(1)));
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        let mut pacer = RetryPacer { interval_secs: u64::MAX, ceiling_secs: 0 };
        assert_eq!(pacer.back_off().unwrap().as_secs(), u64::MAX);
    }
}
