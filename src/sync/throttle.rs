//! Leading-edge sample throttle.

use std::time::{Duration, Instant};

/// Default sampling interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(50);

/// Admits the first sample of each window and drops the rest.
///
/// There is no trailing call: a sample dropped inside the window is lost.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl Throttle {
    /// Create a throttle with a window length.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Window length.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Check whether a sample at `now` passes, opening a new window if so.
    pub fn ready(&mut self, now: Instant) -> bool {
        let open = match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if open {
            self.last = Some(now);
        }
        open
    }

    /// Forget the current window.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_edge() {
        let start = Instant::now();
        let mut throttle = Throttle::default();
        assert!(throttle.ready(start));
        assert!(!throttle.ready(start + Duration::from_millis(10)));
        assert!(!throttle.ready(start + Duration::from_millis(49)));
        assert!(throttle.ready(start + Duration::from_millis(50)));
        assert!(!throttle.ready(start + Duration::from_millis(60)));
    }

    #[test]
    fn test_reset() {
        let start = Instant::now();
        let mut throttle = Throttle::new(Duration::from_secs(1));
        assert!(throttle.ready(start));
        throttle.reset();
        assert!(throttle.ready(start));
    }
}
