//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time
//! - Locating on-screen elements (for the launch point of a released thought)

#[cfg(target_arch = "wasm32")]
pub mod web;

use std::cell::Cell;
use std::collections::HashMap;

use glam::Vec2;

/// Milliseconds since the Unix epoch
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Real time (Date.now on the web)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> f64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

/// Hand-driven clock for headless runs and tests
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// Axis-aligned on-screen box in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

/// Source of element bounding boxes ("where is element X right now?")
pub trait AnchorSource {
    fn element_rect(&self, element_id: &str) -> Option<ScreenRect>;
}

/// Fixed boxes, for headless runs and tests
#[derive(Debug, Default)]
pub struct FixedAnchors {
    rects: HashMap<String, ScreenRect>,
}

impl FixedAnchors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, element_id: &str, rect: ScreenRect) -> Self {
        self.rects.insert(element_id.to_string(), rect);
        self
    }
}

impl AnchorSource for FixedAnchors {
    fn element_rect(&self, element_id: &str) -> Option<ScreenRect> {
        self.rects.get(element_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(1_000.0);
        clock.advance(16.0);
        assert_eq!(clock.now_ms(), 1_016.0);
        clock.set(5.0);
        assert_eq!(clock.now_ms(), 5.0);
    }

    #[test]
    fn test_rect_center_and_lookup() {
        let anchors = FixedAnchors::new().with("main-action", ScreenRect::new(100.0, 500.0, 200.0, 60.0));
        let rect = anchors.element_rect("main-action").unwrap();
        assert_eq!(rect.center(), Vec2::new(200.0, 530.0));
        assert!(anchors.element_rect("missing").is_none());
    }
}
