//! Time source abstraction for the fusion engine.

use std::time::Duration;

/// The injected "current time" for RoomScan.
///
/// The fusion engine never reads a framework-global clock. Every cycle is
/// stamped with the value returned here, which makes expiry logic
/// reproducible under a virtual clock.
///
/// # Implementations
///
/// - **Production**: `SystemClock` - monotonic time since construction
/// - **Simulation**: `SimClock` (in `roomscan_sim`) - manually advanced
///
/// # Monotonicity
///
/// Implementations must never return a value smaller than a previously
/// returned one. Per-record `last_seen_time` relies on it.
pub trait ScanClock: Send + Sync {
    /// Returns the monotonic time elapsed since the clock's origin.
    fn now(&self) -> Duration;

    /// Returns `now()` as floating point seconds, the unit the engine uses.
    fn now_secs(&self) -> f64 {
        self.now().as_secs_f64()
    }
}

impl<C: ScanClock + ?Sized> ScanClock for std::sync::Arc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}
