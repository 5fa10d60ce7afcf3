//! Timer scheduling for the single-threaded UI loop.
//!
//! Every delayed or periodic behaviour in the core (reconnect back-off, subscription refresh,
//! the 60 Hz inertial tick and the fixed-duration page slide) is expressed as an armed
//! [`TimerKey`]. Components arm and cancel timers through the [`Scheduler`] trait; the owner of
//! the loop advances a [`TimerQueue`] and dispatches the keys that fired back to the components.
//!
//! Time is a monotonic [`Duration`] since the loop started, so tests drive the queue with a fake
//! clock simply by calling [`TimerQueue::advance_to`] with synthetic instants.

use fnv::FnvHashMap;
use std::time::Duration;

/// Identity of every timer the core may arm. At most one timer per key is ever active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKey {
    /// Deferred first connection attempt after the UI is up.
    Startup,
    /// Fixed-interval retry while the feed session is reconnecting.
    Reconnect,
    /// Periodic unsubscribe/resubscribe while connected.
    Refresh,
    /// Inertial scroll frame tick.
    InertialTick,
    /// Completion of the active page slide.
    PageTransition,
}

/// Arm/cancel interface used by components to request timer callbacks.
pub trait Scheduler {
    /// Arm a one-shot timer firing `after` from now, replacing any timer with the same key.
    fn arm(&mut self, key: TimerKey, after: Duration);

    /// Arm a repeating timer firing every `every`, replacing any timer with the same key.
    fn arm_repeating(&mut self, key: TimerKey, every: Duration);

    /// Cancel the timer, returning `true` if it was armed.
    fn cancel(&mut self, key: TimerKey) -> bool;

    fn is_armed(&self, key: TimerKey) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Timer {
    deadline: Duration,
    period: Option<Duration>,
}

/// Deterministic [`Scheduler`] over a monotonic clock that only moves when advanced.
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    now: Duration,
    timers: FnvHashMap<TimerKey, Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Earliest pending deadline, if any timer is armed.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.values().map(|timer| timer.deadline).min()
    }

    /// Move the clock forward and return the keys whose deadline has passed, earliest first.
    ///
    /// One-shot timers are removed before being returned so a dispatched callback may re-arm the
    /// same key. Repeating timers fire at most once per call and are rescheduled on their period.
    /// The clock never runs backwards.
    pub fn advance_to(&mut self, now: Duration) -> Vec<TimerKey> {
        self.now = self.now.max(now);

        let mut fired = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.deadline <= self.now)
            .map(|(key, timer)| (timer.deadline, *key))
            .collect::<Vec<_>>();
        fired.sort();

        for (_, key) in &fired {
            let reschedule = match self.timers.get_mut(key) {
                Some(Timer {
                    deadline,
                    period: Some(period),
                }) => {
                    *deadline += *period;
                    if *deadline <= self.now {
                        *deadline = self.now + *period;
                    }
                    true
                }
                _ => false,
            };

            if !reschedule {
                self.timers.remove(key);
            }
        }

        fired.into_iter().map(|(_, key)| key).collect()
    }

    /// Convenience for tests: advance the clock by `step`.
    pub fn advance_by(&mut self, step: Duration) -> Vec<TimerKey> {
        self.advance_to(self.now + step)
    }
}

impl Scheduler for TimerQueue {
    fn arm(&mut self, key: TimerKey, after: Duration) {
        self.timers.insert(
            key,
            Timer {
                deadline: self.now + after,
                period: None,
            },
        );
    }

    fn arm_repeating(&mut self, key: TimerKey, every: Duration) {
        self.timers.insert(
            key,
            Timer {
                deadline: self.now + every,
                period: Some(every),
            },
        );
    }

    fn cancel(&mut self, key: TimerKey) -> bool {
        self.timers.remove(&key).is_some()
    }

    fn is_armed(&self, key: TimerKey) -> bool {
        self.timers.contains_key(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_fires_once_and_disarms() {
        let mut timers = TimerQueue::new();
        timers.arm(TimerKey::Reconnect, Duration::from_secs(5));

        assert!(timers.advance_to(Duration::from_millis(4_999)).is_empty());
        assert_eq!(
            timers.advance_to(Duration::from_secs(5)),
            vec![TimerKey::Reconnect]
        );
        assert!(!timers.is_armed(TimerKey::Reconnect));
        assert!(timers.advance_to(Duration::from_secs(20)).is_empty());
    }

    #[test]
    fn test_repeating_reschedules_on_period() {
        let mut timers = TimerQueue::new();
        timers.arm_repeating(TimerKey::Refresh, Duration::from_secs(2));

        let fired = (1..=3)
            .map(|second| timers.advance_to(Duration::from_secs(second * 2)).len())
            .collect::<Vec<_>>();

        assert_eq!(fired, vec![1, 1, 1]);
        assert!(timers.is_armed(TimerKey::Refresh));
    }

    #[test]
    fn test_repeating_skips_missed_periods() {
        let mut timers = TimerQueue::new();
        timers.arm_repeating(TimerKey::InertialTick, Duration::from_millis(16));

        assert_eq!(timers.advance_to(Duration::from_millis(100)).len(), 1);
        assert_eq!(timers.next_deadline(), Some(Duration::from_millis(116)));
    }

    #[test]
    fn test_arm_replaces_existing_key() {
        let mut timers = TimerQueue::new();
        timers.arm(TimerKey::PageTransition, Duration::from_millis(300));
        timers.advance_by(Duration::from_millis(200));
        timers.arm(TimerKey::PageTransition, Duration::from_millis(300));

        assert!(timers.advance_to(Duration::from_millis(300)).is_empty());
        assert_eq!(
            timers.advance_to(Duration::from_millis(500)),
            vec![TimerKey::PageTransition]
        );
    }

    #[test]
    fn test_fired_keys_ordered_by_deadline() {
        let mut timers = TimerQueue::new();
        timers.arm(TimerKey::PageTransition, Duration::from_millis(300));
        timers.arm(TimerKey::Startup, Duration::from_millis(100));
        timers.arm(TimerKey::Reconnect, Duration::from_millis(200));

        assert_eq!(
            timers.advance_to(Duration::from_secs(1)),
            vec![
                TimerKey::Startup,
                TimerKey::Reconnect,
                TimerKey::PageTransition
            ]
        );
    }

    #[test]
    fn test_cancel_reports_whether_armed() {
        let mut timers = TimerQueue::new();
        assert!(!timers.cancel(TimerKey::Refresh));

        timers.arm_repeating(TimerKey::Refresh, Duration::from_secs(2));
        assert!(timers.cancel(TimerKey::Refresh));
        assert!(timers.advance_to(Duration::from_secs(10)).is_empty());
    }
}
