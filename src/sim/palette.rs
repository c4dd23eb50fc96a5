//! Particle colors
//!
//! Dust and thoughts are drawn as radial glows. A launched thought fades from
//! the thought palette toward the dust palette as it joins the disk.

use serde::{Deserialize, Serialize};

use crate::lerp;

/// An RGB color with channels in 0-255
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Per-channel interpolation (`t = 0` gives `self`, `t = 1` gives `other`)
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb {
            r: lerp(self.r, other.r, t),
            g: lerp(self.g, other.g, t),
            b: lerp(self.b, other.b, t),
        }
    }

    /// CSS `rgba()` string
    pub fn css(&self, alpha: f32) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.r.round() as u8,
            self.g.round() as u8,
            self.b.round() as u8,
            alpha
        )
    }
}

pub const WHITE: Rgb = Rgb::new(255.0, 255.0, 255.0);
pub const LAVENDER: Rgb = Rgb::new(224.0, 195.0, 255.0);
pub const VOID_PURPLE: Rgb = Rgb::new(157.0, 78.0, 221.0);
pub const BACKGROUND: Rgb = Rgb::new(4.0, 2.0, 10.0);
pub const HORIZON: Rgb = Rgb::new(0.0, 0.0, 0.0);

/// Alpha of the per-frame background overlay (lower = longer trails)
pub const TRAIL_ALPHA: f32 = 0.25;

/// One color stop of a radial gradient (offset in 0-1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowStop {
    pub offset: f32,
    pub color: Rgb,
    pub alpha: f32,
}

const fn stop(offset: f32, color: Rgb, alpha: f32) -> GlowStop {
    GlowStop {
        offset,
        color,
        alpha,
    }
}

/// Fixed gradient for ambient dust
pub const DUST_GLOW: [GlowStop; 4] = [
    stop(0.0, WHITE, 1.0),
    stop(0.2, LAVENDER, 0.9),
    stop(0.8, VOID_PURPLE, 0.3),
    stop(1.0, VOID_PURPLE, 0.0),
];

/// Fixed gradient for settled thoughts
pub const THOUGHT_GLOW: [GlowStop; 3] = [
    stop(0.0, LAVENDER, 1.0),
    stop(0.5, VOID_PURPLE, 0.9),
    stop(1.0, VOID_PURPLE, 0.0),
];

/// Inner/outer pair used for the transition fade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowPalette {
    pub inner: Rgb,
    pub outer: Rgb,
}

/// A thought as it leaves the page
pub const THOUGHT_PALETTE: GlowPalette = GlowPalette {
    inner: LAVENDER,
    outer: VOID_PURPLE,
};

/// What a thought becomes once it has fully joined the dust
pub const DUST_PALETTE: GlowPalette = GlowPalette {
    inner: WHITE,
    outer: LAVENDER,
};

/// Palette for a transition particle at `fade_progress` (1 = thought, 0 = dust)
pub fn fade_palette(fade_progress: f32) -> GlowPalette {
    let t = fade_progress.clamp(0.0, 1.0);
    GlowPalette {
        inner: DUST_PALETTE.inner.lerp(THOUGHT_PALETTE.inner, t),
        outer: DUST_PALETTE.outer.lerp(THOUGHT_PALETTE.outer, t),
    }
}

impl GlowPalette {
    /// Expand the pair into gradient stops (solid core, soft edge)
    pub fn stops(&self) -> [GlowStop; 3] {
        [
            stop(0.0, self.inner, 1.0),
            stop(0.5, self.outer, 0.9),
            stop(1.0, self.outer, 0.0),
        ]
    }
}
