//! Time sources

use core::time::Duration;

use crate::record::WallTime;

/// Monotonic clock used for liveness deadlines
///
/// Must never go backwards; wall-clock adjustments must not affect it.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin
    fn now(&self) -> Duration;
}

/// Local wall clock used to stamp records
pub trait WallClock {
    /// Current local time of day
    fn wall_time(&self) -> WallTime;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

impl<W: WallClock + ?Sized> WallClock for &W {
    fn wall_time(&self) -> WallTime {
        (**self).wall_time()
    }
}
