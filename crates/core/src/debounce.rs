//! Quiet-period debouncing of rapidly changing input.
//!
//! [`Debounced`] keeps a *live* value, updated on every keystroke, and a
//! *settled* value that only catches up once the live value has been left
//! alone for the quiet period. Time is passed in explicitly so the owner
//! decides how to drive it (UI tick, timer task, or a test).

use std::time::{Duration, Instant};

/// Quiet period applied to the parameter search boxes.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone)]
pub struct Debounced<T> {
    live: T,
    settled: T,
    quiet: Duration,
    deadline: Option<Instant>,
}

impl<T: Clone + Default> Default for Debounced<T> {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl<T: Clone + Default> Debounced<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            live: T::default(),
            settled: T::default(),
            quiet,
            deadline: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Value as typed, updated synchronously.
    pub fn live(&self) -> &T {
        &self.live
    }

    /// Value as of the last emission.
    pub fn settled(&self) -> &T {
        &self.settled
    }

    /// When the pending emission fires, if one is scheduled.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Record new input and restart the quiet period.
    pub fn set(&mut self, value: T, now: Instant) {
        self.live = value;
        self.deadline = Some(now + self.quiet);
    }

    /// Emit the live value if the quiet period has elapsed.
    ///
    /// Returns `true` exactly once per quiet period that ends, regardless of
    /// how many inputs preceded it.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.settled = self.live.clone();
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Settle the live value now if an emission is pending.
    pub fn flush(&mut self) -> bool {
        if self.deadline.take().is_some() {
            self.settled = self.live.clone();
            true
        } else {
            false
        }
    }

    /// Drop the pending emission, keeping both values as they are.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Clear both values and any pending emission.
    pub fn reset(&mut self) {
        self.live = T::default();
        self.settled = T::default();
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn live_updates_immediately_settled_waits() {
        let t0 = Instant::now();
        let mut search: Debounced<String> = Debounced::default();
        search.set("dis".into(), t0);

        assert_eq!(search.live(), "dis");
        assert_eq!(search.settled(), "");
        assert!(!search.poll(t0 + ms(1499)));
        assert_eq!(search.settled(), "");
    }

    #[test]
    fn quiet_period_emits_exactly_once() {
        let t0 = Instant::now();
        let mut search: Debounced<String> = Debounced::default();
        search.set("disjoncteur".into(), t0);

        assert!(search.poll(t0 + SEARCH_DEBOUNCE));
        assert_eq!(search.settled(), "disjoncteur");
        assert!(!search.poll(t0 + ms(5000)));
    }

    #[test]
    fn rapid_keystrokes_restart_the_timer() {
        let t0 = Instant::now();
        let mut search: Debounced<String> = Debounced::default();
        let mut emissions = 0;

        for (i, text) in ["d", "di", "dis", "disj"].iter().enumerate() {
            let at = t0 + ms(400 * i as u64);
            search.set((*text).to_string(), at);
            if search.poll(at + ms(399)) {
                emissions += 1;
            }
        }
        assert_eq!(emissions, 0);

        // Last keystroke at t0 + 1200ms.
        assert!(!search.poll(t0 + ms(2699)));
        assert!(search.poll(t0 + ms(2700)));
        assert_eq!(search.settled(), "disj");
    }

    #[test]
    fn reset_clears_everything() {
        let t0 = Instant::now();
        let mut search: Debounced<String> = Debounced::default();
        search.set("abc".into(), t0);
        search.poll(t0 + SEARCH_DEBOUNCE);
        search.set("abcd".into(), t0 + ms(2000));

        search.reset();
        assert_eq!(search.live(), "");
        assert_eq!(search.settled(), "");
        assert!(!search.is_pending());
    }

    #[test]
    fn flush_settles_immediately() {
        let t0 = Instant::now();
        let mut search: Debounced<String> = Debounced::default();
        assert!(!search.flush());
        search.set("vmc".into(), t0);
        assert!(search.flush());
        assert_eq!(search.settled(), "vmc");
        assert!(!search.poll(t0 + SEARCH_DEBOUNCE));
    }

    #[test]
    fn cancel_keeps_values_but_never_emits() {
        let t0 = Instant::now();
        let mut search: Debounced<String> = Debounced::new(ms(10));
        search.set("x".into(), t0);
        search.cancel();
        assert!(!search.poll(t0 + ms(100)));
        assert_eq!(search.live(), "x");
        assert_eq!(search.settled(), "");
    }
}
