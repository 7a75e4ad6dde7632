//! Record timestamps
//!
//! Timestamps are nanoseconds since the Unix epoch, computed as a monotonic
//! reading plus a wall-clock offset captured once when the clock is created.
//! Adjusting the system clock afterwards never makes timestamps go backwards.

use chrono::{DateTime, Utc};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Placeholder rendered when a timestamp cannot be represented
pub const ZERO_TIMESTAMP: &str = "0000-00-00 00:00:00.000";

/// Width of a rendered timestamp, `YYYY-MM-DD HH:MM:SS.mmm`
pub const TIMESTAMP_WIDTH: usize = 23;

#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
    origin_ns: i64,
}

impl MonotonicClock {
    /// Capture the monotonic to wall-clock offset
    pub fn new() -> Self {
        let origin = Instant::now();
        let origin_ns = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since_epoch) => i64::try_from(since_epoch.as_nanos()).unwrap_or(i64::MAX),
            Err(before_epoch) => {
                -i64::try_from(before_epoch.duration().as_nanos()).unwrap_or(i64::MAX)
            }
        };
        Self { origin, origin_ns }
    }

    /// Nanoseconds since the epoch
    #[inline]
    pub fn now_nanos(&self) -> i64 {
        let elapsed = i64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(i64::MAX);
        self.origin_ns.saturating_add(elapsed)
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Render as `YYYY-MM-DD HH:MM:SS.mmm` (UTC)
pub fn format_timestamp(timestamp_ns: i64) -> String {
    match to_datetime(timestamp_ns) {
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        None => ZERO_TIMESTAMP.to_string(),
    }
}

/// Convert to a chrono `DateTime<Utc>`, `None` when out of range
pub fn to_datetime(timestamp_ns: i64) -> Option<DateTime<Utc>> {
    let secs = timestamp_ns.div_euclid(1_000_000_000);
    let nanos = timestamp_ns.rem_euclid(1_000_000_000) as u32;
    DateTime::from_timestamp(secs, nanos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_monotonic() {
        let clock = MonotonicClock::new();
        let mut previous = clock.now_nanos();
        for _ in 0..1000 {
            let now = clock.now_nanos();
            assert!(now >= previous);
            previous = now;
        }
    }

    #[test]
    fn test_clock_close_to_wall_time() {
        let clock = MonotonicClock::new();
        let wall = Utc::now().timestamp_nanos_opt().unwrap();
        let diff = (clock.now_nanos() - wall).abs();
        assert!(diff < 1_000_000_000, "offset drifted by {}ns", diff);
    }

    #[test]
    fn test_format_timestamp() {
        // 2024-01-02 03:04:05.678 UTC
        let ns = 1_704_164_645_678_000_000;
        assert_eq!(format_timestamp(ns), "2024-01-02 03:04:05.678");
        assert_eq!(format_timestamp(0).len(), TIMESTAMP_WIDTH);
    }

    #[test]
    fn test_format_negative_timestamp() {
        // 1969-12-31 23:59:59.500 UTC
        assert_eq!(format_timestamp(-500_000_000), "1969-12-31 23:59:59.500");
    }
}
