//! Virtual clock implementing `ScanClock` for deterministic runs.

use roomscan_env::ScanClock;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Manually advanced clock.
///
/// Time only moves when `advance` or `set_time` is called, so expiry in a
/// simulated run depends on the frame count and never on the host.
/// Clones share the same underlying time.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    /// Current virtual time (nanoseconds since simulation start)
    virtual_time_ns: Arc<Mutex<u64>>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an Arc-wrapped clock for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Advances virtual time by the given duration.
    pub fn advance(&self, duration: Duration) {
        let mut time = self.virtual_time_ns.lock().unwrap_or_else(PoisonError::into_inner);
        *time = time.saturating_add(duration.as_nanos() as u64);
    }

    /// Moves virtual time forward to `time_ns`. Earlier values are ignored
    /// so the clock stays monotonic.
    pub fn set_time(&self, time_ns: u64) {
        let mut time = self.virtual_time_ns.lock().unwrap_or_else(PoisonError::into_inner);
        *time = (*time).max(time_ns);
    }

    /// Returns the current virtual time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        *self.virtual_time_ns.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ScanClock for SimClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.time_ns())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_clock_time() {
        let clock = SimClock::new();
        assert_eq!(clock.now(), Duration::ZERO);

        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.now(), Duration::from_secs(1));

        clock.advance(Duration::from_millis(500));
        assert_eq!(clock.now(), Duration::from_millis(1500));
        assert_eq!(clock.now_secs(), 1.5);
    }

    #[test]
    fn test_set_time_never_goes_back() {
        let clock = SimClock::new();
        clock.set_time(2_000_000_000);
        clock.set_time(1_000_000_000);
        assert_eq!(clock.now(), Duration::from_secs(2));
    }

    #[test]
    fn test_sim_clock_clone_shares_time() {
        let clock1 = SimClock::new();
        let clock2 = clock1.clone();

        clock1.advance(Duration::from_secs(5));

        assert_eq!(clock1.now(), clock2.now());
    }
}
