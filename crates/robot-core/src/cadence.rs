//! Drift-free periodic scheduling.
//!
//! Each deadline is the previous deadline plus the period. Time spent doing
//! work between waits never accumulates: a late wake is followed by a
//! shorter sleep, and a deadline already in the past returns immediately
//! without moving the schedule.

use embassy_time::{Duration, Instant, Timer};

/// Fixed-period schedule anchored at a start instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    next: Instant,
    period: Duration,
}

impl Cadence {
    /// Schedule whose first deadline is one `period` from now.
    pub fn starting_now(period: Duration) -> Self {
        Self::starting_at(Instant::now(), period)
    }

    /// Schedule whose first deadline is `anchor + period`.
    pub fn starting_at(anchor: Instant, period: Duration) -> Self {
        Self {
            next: anchor.checked_add(period).unwrap_or(Instant::MAX),
            period,
        }
    }

    /// Deadline the next [`wait`](Self::wait) sleeps until.
    pub fn deadline(&self) -> Instant {
        self.next
    }

    /// Configured period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Consume the current deadline and return it, scheduling the one after.
    pub fn advance(&mut self) -> Instant {
        let due = self.next;
        self.next = due.checked_add(self.period).unwrap_or(Instant::MAX);
        due
    }

    /// Sleep until the current deadline, then advance.
    pub async fn wait(&mut self) {
        let due = self.advance();
        Timer::at(due).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_deadline_is_one_period_after_anchor() {
        let anchor = Instant::from_millis(1_000);
        let cadence = Cadence::starting_at(anchor, Duration::from_millis(100));
        assert_eq!(cadence.deadline(), Instant::from_millis(1_100));
    }

    #[test]
    fn test_advance_ignores_elapsed_time() {
        let mut cadence = Cadence::starting_at(Instant::from_ticks(0), Duration::from_millis(50));
        assert_eq!(cadence.advance(), Instant::from_millis(50));
        // However long the work took, the next deadline is fixed.
        assert_eq!(cadence.advance(), Instant::from_millis(100));
        assert_eq!(cadence.advance(), Instant::from_millis(150));
    }

    #[test]
    fn test_saturates_at_instant_max() {
        let mut cadence = Cadence::starting_at(Instant::MAX, Duration::from_millis(1));
        assert_eq!(cadence.advance(), Instant::MAX);
        assert_eq!(cadence.advance(), Instant::MAX);
    }

    #[tokio::test]
    async fn test_wait_in_past_returns_without_slipping() {
        let anchor = Instant::now();
        let mut cadence = Cadence::starting_at(anchor, Duration::from_millis(5));
        Timer::after_millis(30).await;
        let before = Instant::now();
        cadence.wait().await;
        assert!(before.elapsed() < Duration::from_millis(20));
        assert_eq!(cadence.deadline(), anchor + Duration::from_millis(10));
    }

    proptest! {
        /// Over 1000 periods the k-th deadline is exactly anchor + k * period.
        #[test]
        fn prop_no_drift_over_1000_periods(period_ms in 1u64..=1_000, anchor_ms in 0u64..1_000_000) {
            let anchor = Instant::from_millis(anchor_ms);
            let period = Duration::from_millis(period_ms);
            let mut cadence = Cadence::starting_at(anchor, period);
            let mut last = anchor;
            for k in 1..=1_000u64 {
                let due = cadence.advance();
                prop_assert_eq!(due, anchor + period * (k as u32));
                prop_assert_eq!(due - last, period);
                last = due;
            }
        }
    }
}
