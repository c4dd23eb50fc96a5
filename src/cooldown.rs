//! Client-side posting cooldown
//!
//! Purely a display concern: the backend enforces the real limit. Times are
//! milliseconds since the Unix epoch.

use serde::{Deserialize, Serialize};

use crate::consts::POST_COOLDOWN_SECONDS;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    /// When posting becomes possible again (0 = never started)
    pub ends_at_ms: f64,
}

impl Cooldown {
    /// Start (or restart) a full cooldown from `now_ms`
    pub fn start(&mut self, now_ms: f64) {
        self.ends_at_ms = now_ms + POST_COOLDOWN_SECONDS as f64 * 1000.0;
    }

    /// Whole seconds remaining, rounded up
    pub fn seconds_left(&self, now_ms: f64) -> u32 {
        let left = ((self.ends_at_ms - now_ms) / 1000.0).ceil();
        if left > 0.0 { left as u32 } else { 0 }
    }

    pub fn is_active(&self, now_ms: f64) -> bool {
        self.seconds_left(now_ms) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_cooldown_inactive() {
        let cd = Cooldown::default();
        assert!(!cd.is_active(1_000.0));
    }

    #[test]
    fn test_countdown_rounds_up() {
        let mut cd = Cooldown::default();
        cd.start(10_000.0);
        assert_eq!(cd.seconds_left(10_000.0), 60);
        assert_eq!(cd.seconds_left(10_001.0), 60);
        assert_eq!(cd.seconds_left(69_000.5), 1);
        assert_eq!(cd.seconds_left(70_000.0), 0);
        assert!(!cd.is_active(70_000.0));
    }
}
