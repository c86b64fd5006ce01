//! Debounced markup regeneration.
//!
//! A burst of tree changes (typing into a property field, a flurry of drops)
//! collapses into one regeneration. [`RegenScheduler::poll`] reports due once
//! the tree has been quiet for `debounce`, or once `max_wait` has passed since
//! the first change of the burst so a steady stream of edits cannot starve
//! the preview.
//!
//! Time is always passed in, which keeps the scheduler deterministic under
//! test.

use std::time::{Duration, Instant};

use crate::config::{DEFAULT_DEBOUNCE, DEFAULT_MAX_WAIT};

#[inline]
fn duration_since_or_zero(now: Instant, earlier: Instant) -> Duration {
    now.checked_duration_since(earlier)
        .unwrap_or(Duration::ZERO)
}

#[derive(Debug, Clone)]
pub struct RegenScheduler {
    debounce: Duration,
    max_wait: Duration,
    /// First change of the pending burst.
    first_change: Option<Instant>,
    last_change: Option<Instant>,
    /// Changes folded into the pending burst.
    pending_changes: u32,
}

impl Default for RegenScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE, DEFAULT_MAX_WAIT)
    }
}

impl RegenScheduler {
    #[must_use]
    pub const fn new(debounce: Duration, max_wait: Duration) -> Self {
        Self {
            debounce,
            max_wait,
            first_change: None,
            last_change: None,
            pending_changes: 0,
        }
    }

    #[must_use]
    pub const fn debounce(&self) -> Duration {
        self.debounce
    }

    #[must_use]
    pub const fn max_wait(&self) -> Duration {
        self.max_wait
    }

    /// Record a change at `now`.
    pub fn mark_dirty(&mut self, now: Instant) {
        if self.first_change.is_none() {
            self.first_change = Some(now);
        }
        self.last_change = Some(now);
        self.pending_changes = self.pending_changes.saturating_add(1);
    }

    /// `true` when a pending regeneration is due at `now`. Reporting due
    /// clears the pending state; the caller is expected to render.
    pub fn poll(&mut self, now: Instant) -> bool {
        let (Some(first), Some(last)) = (self.first_change, self.last_change) else {
            return false;
        };
        let quiet = duration_since_or_zero(now, last) >= self.debounce;
        let overdue = duration_since_or_zero(now, first) >= self.max_wait;
        if !(quiet || overdue) {
            return false;
        }
        tracing::debug!(
            changes = self.pending_changes,
            forced = !quiet,
            "markup regeneration due"
        );
        self.reset();
        true
    }

    /// Time until the pending regeneration becomes due, `None` when nothing
    /// is pending.
    #[must_use]
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        let first = self.first_change?;
        let last = self.last_change?;
        let by_quiet = self
            .debounce
            .saturating_sub(duration_since_or_zero(now, last));
        let by_deadline = self
            .max_wait
            .saturating_sub(duration_since_or_zero(now, first));
        Some(by_quiet.min(by_deadline))
    }

    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.first_change.is_some()
    }

    #[must_use]
    pub const fn pending_changes(&self) -> u32 {
        self.pending_changes
    }

    /// Drop any pending regeneration, e.g. after an explicit render.
    pub fn reset(&mut self) {
        self.first_change = None;
        self.last_change = None;
        self.pending_changes = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn idle_scheduler_is_never_due() {
        let mut sched = RegenScheduler::default();
        let now = Instant::now();
        assert!(!sched.is_pending());
        assert!(!sched.poll(now + ms(10_000)));
        assert_eq!(sched.time_until_due(now), None);
    }

    #[test]
    fn quiet_period_triggers() {
        let mut sched = RegenScheduler::new(ms(300), ms(1000));
        let t0 = Instant::now();
        sched.mark_dirty(t0);
        assert!(!sched.poll(t0 + ms(299)));
        assert_eq!(sched.time_until_due(t0 + ms(100)), Some(ms(200)));
        assert!(sched.poll(t0 + ms(300)));
        assert!(!sched.is_pending());
        assert!(!sched.poll(t0 + ms(301)));
    }

    #[test]
    fn changes_extend_the_quiet_period() {
        let mut sched = RegenScheduler::new(ms(300), ms(1000));
        let t0 = Instant::now();
        sched.mark_dirty(t0);
        sched.mark_dirty(t0 + ms(200));
        assert!(!sched.poll(t0 + ms(400)));
        assert!(sched.poll(t0 + ms(500)));
    }

    #[test]
    fn max_wait_forces_regeneration() {
        let mut sched = RegenScheduler::new(ms(300), ms(1000));
        let t0 = Instant::now();
        for step in 0..=10 {
            sched.mark_dirty(t0 + ms(step * 100));
        }
        assert_eq!(sched.pending_changes(), 11);
        assert!(sched.poll(t0 + ms(1000)));
    }

    #[test]
    fn reset_discards_pending() {
        let mut sched = RegenScheduler::default();
        let t0 = Instant::now();
        sched.mark_dirty(t0);
        sched.reset();
        assert!(!sched.poll(t0 + ms(5_000)));
    }
}
