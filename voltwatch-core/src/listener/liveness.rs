//! Liveness window
//!
//! Tracks how long the sender may stay silent. Deadlines are measured on
//! a monotonic clock; the window expires once `now >= deadline`.

use core::time::Duration;

/// Deadline tracker for sender silence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessWindow {
    /// Allowed silence
    timeout: Duration,
    /// Monotonic instant the window expires at
    deadline: Duration,
}

impl LivenessWindow {
    /// Create a window armed at `now`
    pub fn armed(timeout: Duration, now: Duration) -> Self {
        let mut window = Self {
            timeout,
            deadline: Duration::ZERO,
        };
        window.refresh(now);
        window
    }

    /// Push the deadline to `now + timeout`
    pub fn refresh(&mut self, now: Duration) {
        self.deadline = now.checked_add(self.timeout).unwrap_or(Duration::MAX);
    }

    /// Check if the window has expired
    pub fn is_expired(&self, now: Duration) -> bool {
        now >= self.deadline
    }

    /// Time left before expiry (zero once expired)
    pub fn remaining(&self, now: Duration) -> Duration {
        self.deadline.saturating_sub(now)
    }

    /// Monotonic expiry instant
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Allowed silence
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
