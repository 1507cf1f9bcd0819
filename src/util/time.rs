//! Timing utilities
//!
//! Wall-clock measurement for solver runs and human-readable duration
//! formatting for the suite's progress output.

use std::time::{Duration, Instant};

/// Wall-clock stopwatch for a solver's iteration phase
///
/// A thin wrapper around `std::time::Instant` that reads as measurement
/// intent at the call site.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    /// Start measuring now
    #[inline]
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Time elapsed since the stopwatch started
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::start()
    }
}

/// Format a duration in human-readable form
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use heatbench::util::time::format_duration;
///
/// assert_eq!(format_duration(Duration::from_nanos(640)), "640ns");
/// assert_eq!(format_duration(Duration::from_micros(85)), "85.00us");
/// assert_eq!(format_duration(Duration::from_millis(12)), "12.00ms");
/// assert_eq!(format_duration(Duration::from_secs(3)), "3.00s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();

    if nanos < 1_000 {
        format!("{}ns", nanos)
    } else if nanos < 1_000_000 {
        format!("{:.2}us", nanos as f64 / 1_000.0)
    } else if nanos < 1_000_000_000 {
        format!("{:.2}ms", nanos as f64 / 1_000_000.0)
    } else {
        format!("{:.2}s", nanos as f64 / 1_000_000_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_stopwatch_elapsed() {
        let timer = Stopwatch::start();
        thread::sleep(Duration::from_millis(25));
        let elapsed = timer.elapsed();

        assert!(elapsed >= Duration::from_millis(25));
        assert!(elapsed < Duration::from_secs(2)); // Allow scheduler slack
    }

    #[test]
    fn test_format_duration_picks_the_right_unit() {
        assert_eq!(format_duration(Duration::from_nanos(999)), "999ns");
        assert_eq!(format_duration(Duration::from_nanos(2750)), "2.75us");
        assert_eq!(format_duration(Duration::from_micros(1500)), "1.50ms");
        assert_eq!(format_duration(Duration::from_millis(2250)), "2.25s");
    }
}
