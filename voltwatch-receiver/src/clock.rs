//! Host clocks

use std::time::{Duration, Instant};

use chrono::{Local, Timelike};
use voltwatch_core::{Clock, WallClock, WallTime};

/// Monotonic clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Start counting from now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Local time of day from the system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalWallClock;

impl WallClock for LocalWallClock {
    fn wall_time(&self) -> WallTime {
        let now = Local::now();
        // chrono keeps leap seconds in the nanosecond field
        WallTime::new(now.hour() as u8, now.minute() as u8, now.second() as u8)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_never_goes_back() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_wall_time_in_range() {
        let time = LocalWallClock.wall_time();
        assert!(time.hour < 24);
        assert!(time.minute < 60);
        assert!(time.second < 60);
    }
}
