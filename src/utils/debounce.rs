//! A cancelable, re-armable timer carrying the latest argument.
//!
//! Every call to [`Debounced::schedule`] pushes the deadline out to
//! `now + delay` and replaces the stored value, so a burst of calls collapses
//! into one firing with the last value. Use `Debounced<()>` for actions that
//! take no argument.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debounced<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debounced<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arms (or re-arms) the timer with `value`.
    pub fn schedule(&mut self, now: Instant, value: T) {
        let deadline = now + self.delay;
        log::trace!("debounce armed, fires in {:?}", self.delay);
        self.pending = Some((deadline, value));
    }

    /// Disarms the timer. Returns the value that would have fired, if any.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Fires the timer if its deadline has been reached.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.cancel(),
            _ => None,
        }
    }
}
