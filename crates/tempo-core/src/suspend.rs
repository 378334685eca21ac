//! Suspend/resume detection.
//!
//! While the tick loop runs it marks activity roughly once per tick, so the
//! distance between the last mark and "now" stays small. When the machine
//! sleeps no ticks execute, and the first tick after wake sees a wall-clock
//! gap far larger than any tick interval. Idle users do not produce this gap;
//! only a process that did not get to run does.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::clock::Clock;

/// A detected period during which the process did not run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspendEvent {
    /// Last instant the process was known to be running
    pub sleep_start: DateTime<Utc>,
    /// First instant observed after the gap
    pub wake_time: DateTime<Utc>,
}

impl SuspendEvent {
    #[must_use]
    pub fn slept_for(&self) -> Duration {
        self.wake_time.signed_duration_since(self.sleep_start)
    }
}

pub struct SuspendDetector {
    clock: Arc<dyn Clock>,
    /// Internally advanced clock, moved forward by marks and checks
    last_mark: DateTime<Utc>,
    max_gap: Duration,
}

impl SuspendDetector {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, max_gap: Duration) -> Self {
        let last_mark = clock.now();
        Self {
            clock,
            last_mark,
            max_gap,
        }
    }

    /// Record genuine foreground activity at the current wall-clock time.
    pub fn mark_activity(&mut self) {
        self.last_mark = self.clock.now();
    }

    /// Report a suspend if more than `max_gap` passed since the last mark.
    ///
    /// A gap exactly equal to `max_gap` is not a suspend. The internal clock
    /// is moved to now whether or not a suspend is reported, so each gap is
    /// reported once.
    pub fn check_for_suspend(&mut self) -> Option<SuspendEvent> {
        let now = self.clock.now();
        let gap = now.signed_duration_since(self.last_mark);
        let event = (gap > self.max_gap).then_some(SuspendEvent {
            sleep_start: self.last_mark,
            wake_time: now,
        });
        self.last_mark = now;
        event
    }

    /// Re-synchronise with wall-clock time, discarding any pending gap.
    pub fn reset(&mut self) {
        self.last_mark = self.clock.now();
    }

    #[must_use]
    pub const fn last_mark(&self) -> DateTime<Utc> {
        self.last_mark
    }

    #[must_use]
    pub const fn max_gap(&self) -> Duration {
        self.max_gap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    const MAX_GAP: i64 = 30;

    fn setup() -> (ManualClock, SuspendDetector, DateTime<Utc>) {
        let t0 = Utc.with_ymd_and_hms(2026, 5, 4, 22, 0, 0).unwrap();
        let clock = ManualClock::new(t0);
        let detector = SuspendDetector::new(Arc::new(clock.clone()), Duration::seconds(MAX_GAP));
        (clock, detector, t0)
    }

    #[test]
    fn test_gap_over_threshold_reports_sleep_start() {
        let (clock, mut detector, t0) = setup();
        clock.advance(Duration::seconds(MAX_GAP + 1));

        let event = detector.check_for_suspend().unwrap();
        assert_eq!(event.sleep_start, t0);
        assert_eq!(event.wake_time, t0 + Duration::seconds(MAX_GAP + 1));
        assert_eq!(event.slept_for(), Duration::seconds(MAX_GAP + 1));
    }

    #[test]
    fn test_gap_under_threshold_reports_nothing() {
        let (clock, mut detector, _) = setup();
        clock.advance(Duration::seconds(MAX_GAP - 1));
        assert_eq!(detector.check_for_suspend(), None);
    }

    #[test]
    fn test_gap_equal_to_threshold_is_not_a_suspend() {
        let (clock, mut detector, _) = setup();
        clock.advance(Duration::seconds(MAX_GAP));
        assert_eq!(detector.check_for_suspend(), None);
    }

    #[test]
    fn test_gap_is_reported_once() {
        let (clock, mut detector, _) = setup();
        clock.advance(Duration::hours(8));

        assert!(detector.check_for_suspend().is_some());
        assert_eq!(detector.check_for_suspend(), None);
    }

    #[test]
    fn test_check_resets_clock_without_suspend() {
        let (clock, mut detector, _) = setup();
        // Two sub-threshold gaps that together exceed it
        clock.advance(Duration::seconds(20));
        assert_eq!(detector.check_for_suspend(), None);
        clock.advance(Duration::seconds(20));
        assert_eq!(detector.check_for_suspend(), None);
    }

    #[test]
    fn test_mark_activity_moves_sleep_start() {
        let (clock, mut detector, t0) = setup();
        clock.advance(Duration::seconds(10));
        detector.mark_activity();
        assert_eq!(detector.last_mark(), t0 + Duration::seconds(10));

        clock.advance(Duration::minutes(10));
        let event = detector.check_for_suspend().unwrap();
        assert_eq!(event.sleep_start, t0 + Duration::seconds(10));
    }

    #[test]
    fn test_reset_discards_pending_gap() {
        let (clock, mut detector, _) = setup();
        clock.advance(Duration::hours(1));
        detector.reset();
        assert_eq!(detector.check_for_suspend(), None);
    }
}
