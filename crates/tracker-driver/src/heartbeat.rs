//! Sample stream monitor - detects whether the sensor is still transmitting
//!
//! UDP has no connection concept, so "connected" here only means that a valid
//! sample arrived within the timeout window.
//!
//! **Monotonic time pattern**:
//! - Timestamps are microseconds relative to a process-wide anchor
//! - Unaffected by system clock changes
//! - Stored in `AtomicU64` for lock-free access from any thread

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Global anchor point for monotonic time
static APP_START: OnceLock<Instant> = OnceLock::new();

/// Marker stored until the first sample arrives
const NEVER: u64 = u64::MAX;

fn get_monotonic_micros() -> u64 {
    let start = APP_START.get_or_init(Instant::now);
    start.elapsed().as_micros() as u64
}

/// Sample stream health monitor
///
/// Tracks the time since the last applied sample.
#[derive(Debug)]
pub struct ConnectionMonitor {
    last_sample: AtomicU64,
    timeout: Duration,
}

impl ConnectionMonitor {
    /// Default window without samples before the stream counts as lost
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

    /// Create a new monitor
    ///
    /// # Example
    /// ```
    /// # use tracker_driver::ConnectionMonitor;
    /// # use std::time::Duration;
    /// let monitor = ConnectionMonitor::new(Duration::from_millis(500));
    /// assert!(!monitor.is_streaming());
    /// ```
    pub fn new(timeout: Duration) -> Self {
        // Make sure the anchor exists before the first sample
        let _ = get_monotonic_micros();
        Self {
            last_sample: AtomicU64::new(NEVER),
            timeout,
        }
    }

    /// Returns true if a sample was applied within the timeout window
    pub fn is_streaming(&self) -> bool {
        self.time_since_last_sample().is_some_and(|elapsed| elapsed < self.timeout)
    }

    /// Register that a sample was applied
    pub fn register_sample(&self) {
        self.last_sample.store(get_monotonic_micros(), Ordering::Relaxed);
    }

    /// Time since the last applied sample, `None` if no sample has arrived yet
    pub fn time_since_last_sample(&self) -> Option<Duration> {
        let last_us = self.last_sample.load(Ordering::Relaxed);
        if last_us == NEVER {
            return None;
        }
        let now_us = get_monotonic_micros();
        Some(Duration::from_micros(now_us.saturating_sub(last_us)))
    }

    /// Forget the last sample (used when a session restarts)
    pub fn reset(&self) {
        self.last_sample.store(NEVER, Ordering::Relaxed);
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ConnectionMonitor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_not_streaming_before_first_sample() {
        let monitor = ConnectionMonitor::default();
        assert!(!monitor.is_streaming());
        assert!(monitor.time_since_last_sample().is_none());
    }

    #[test]
    fn test_streaming_after_sample() {
        let monitor = ConnectionMonitor::new(Duration::from_secs(5));
        monitor.register_sample();
        assert!(monitor.is_streaming());
        assert!(monitor.time_since_last_sample().unwrap() < Duration::from_secs(5));
    }

    #[test]
    fn test_stream_timeout() {
        let monitor = ConnectionMonitor::new(Duration::from_millis(20));
        monitor.register_sample();
        thread::sleep(Duration::from_millis(40));
        assert!(!monitor.is_streaming());
    }

    #[test]
    fn test_reset() {
        let monitor = ConnectionMonitor::default();
        monitor.register_sample();
        monitor.reset();
        assert!(!monitor.is_streaming());
    }
}
