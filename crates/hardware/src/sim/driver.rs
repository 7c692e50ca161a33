//! Host-loop driver.
//!
//! This module connects a [`PlaybackController`] to wall time. It provides:
//! 1. **Clock Interface:** A source of monotonic instants, replaceable in tests.
//! 2. **System Clock:** The real clock, backed by [`Instant::now`].
//! 3. **Driver:** Measures the time between polls and feeds it to
//!    [`PlaybackController::advance`].

use std::time::{Duration, Instant};

use super::playback::PlaybackController;

/// Source of monotonic time.
pub trait Clock {
    /// Returns the current instant.
    ///
    /// # Returns
    ///
    /// An instant no earlier than any previously returned one.
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Polls a controller from a host loop.
#[derive(Debug)]
pub struct Driver<C: Clock> {
    clock: C,
    last: Instant,
}

impl<C: Clock> Driver<C> {
    /// Creates a driver whose first poll measures time from now.
    pub fn new(clock: C) -> Self {
        let last = clock.now();
        Self { clock, last }
    }

    /// Forwards the time since the previous poll to `controller`.
    ///
    /// # Returns
    ///
    /// `true` if a tick fired.
    pub fn poll(&mut self, controller: &mut PlaybackController) -> bool {
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        controller.advance(elapsed)
    }

    /// Restarts the measurement window, discarding time spent since the last poll.
    pub fn resync(&mut self) {
        self.last = self.clock.now();
    }

    /// Time until the controller's next tick is due, assuming no further input.
    pub fn until_next_tick(&self, controller: &PlaybackController) -> Duration {
        let since = self.clock.now().saturating_duration_since(self.last);
        controller.interval().saturating_sub(since)
    }
}
