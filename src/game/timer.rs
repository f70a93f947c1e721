//! Round Countdown Timer
//!
//! Wall-clock countdown for timed mode. The remaining time is computed
//! from elapsed time rather than a decrementing counter, so it stays
//! correct when poll ticks drift or stall. Expiry latches: the loss
//! transition can only be observed once per timer.
//!
//! Built on `tokio::time::Instant` so tests can drive it with the
//! paused runtime clock.

use std::time::Duration;

use tokio::time::Instant;

/// Suggested poll interval for drivers.
pub const TIMER_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Elapsed-time countdown for one round.
#[derive(Debug, Clone)]
pub struct RoundTimer {
    started_at: Instant,
    limit: Duration,
    fired: bool,
}

impl RoundTimer {
    /// Start a countdown of `limit`.
    pub fn start(limit: Duration) -> Self {
        Self {
            started_at: Instant::now(),
            limit,
            fired: false,
        }
    }

    /// Seconds since the timer started.
    pub fn elapsed_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Time left, saturating at zero.
    pub fn remaining(&self) -> Duration {
        self.limit.saturating_sub(self.started_at.elapsed())
    }

    /// Whole seconds left, saturating at zero.
    pub fn remaining_secs(&self) -> u64 {
        self.remaining().as_secs()
    }

    /// Whether the countdown has reached zero.
    pub fn is_expired(&self) -> bool {
        self.started_at.elapsed() >= self.limit
    }

    /// Observe expiry. Returns true exactly once, on the first poll at
    /// or after the deadline; repeated polls return false.
    pub fn fire_expiry(&mut self) -> bool {
        if self.fired || !self.is_expired() {
            return false;
        }
        self.fired = true;
        true
    }
}
