//! Thought Void - an anonymous thought board orbiting a black hole
//!
//! Core modules:
//! - `sim`: Orbital particle engine and the launch-to-orbit transition pipeline
//! - `renderer`: Draw-list construction and the Canvas 2D backend
//! - `sampler`: Pseudo-random retrieval of other people's thoughts
//! - `store`: Storage/auth seam (in-memory and browser bridge)
//! - `app`: Top-level controller owning simulation and session state
//! - `persistence`: Client-side key-value state (LocalStorage on web)

pub mod app;
pub mod content;
pub mod cooldown;
pub mod error;
pub mod history;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod sampler;
pub mod session;
pub mod settings;
pub mod sim;
pub mod store;

pub use app::{UiState, VoidApp};
pub use error::{ValidationError, VoidError};
pub use history::SeenPostHistory;
pub use sampler::{ListenOutcome, VoidSampler};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Application configuration constants
pub mod consts {
    /// Seconds a user waits between posts (mirrors the backend rule)
    pub const POST_COOLDOWN_SECONDS: u32 = 60;
    /// Maximum thought length in characters, after trimming
    pub const POST_MAX_LENGTH: usize = 1000;
    /// Substrings that make a thought unpostable (matched case-insensitively)
    pub const BLOCKLIST: &[&str] = &["spamword", "badword", "someotherword"];
    /// How long a feedback message stays visible
    pub const FEEDBACK_DURATION_MS: f64 = 4000.0;

    /// Focal point height as a fraction of the canvas height
    pub const CANVAS_VERTICAL_CENTER_RATIO: f32 = 0.4;
    /// Elliptical projection factor applied to the y axis
    pub const VERTICAL_SQUASH: f32 = 0.4;
    /// Ambient dust particles (Medium preset)
    pub const PARTICLE_COUNT: usize = 600;
    /// Background stars (Medium preset)
    pub const STAR_COUNT: usize = 300;
    /// Orbits below this radius are consumed
    pub const EVENT_HORIZON_RADIUS: f32 = 45.0;
    /// Radial decay per frame
    pub const DECAY_RATE: f32 = 0.4;
    /// angular_speed = ORBIT_SPEED_FACTOR / radius
    pub const ORBIT_SPEED_FACTOR: f32 = 2.0;
    /// Spawn annulus as fractions of the canvas width
    pub const SPAWN_MIN_WIDTH_RATIO: f32 = 0.2;
    pub const SPAWN_MAX_WIDTH_RATIO: f32 = 0.7;

    /// Thought particles are drawn at a fixed size
    pub const THOUGHT_SIZE: f32 = 8.0;
    /// Dust size range [min, min + span)
    pub const DUST_MIN_SIZE: f32 = 2.0;
    pub const DUST_SIZE_SPAN: f32 = 4.0;

    /// Transition progress per frame (~100 frames each)
    pub const TRAVEL_SPEED: f32 = 0.01;
    pub const FADE_SPEED: f32 = 0.01;
    /// Destination orbit of a launched thought, relative to the focal x
    pub const TRANSITION_END_RADIUS_RATIO: f32 = 0.75;
    pub const TRANSITION_END_ANGLE: f32 = std::f32::consts::PI;

    /// Delay before the release animator starts shrinking
    pub const RELEASE_DELAY_MS: f64 = 100.0;
    /// Shrink animation length before the thought becomes a particle
    pub const RELEASE_ANIMATION_DURATION_MS: f64 = 600.0;
    /// Release animator geometry (px)
    pub const RELEASE_ANIMATOR_HEIGHT: f32 = 150.0;
    pub const RELEASE_ANIMATOR_GAP: f32 = 20.0;
    pub const RELEASE_ANIMATOR_FINAL_SIZE: f32 = 10.0;

    /// Posts fetched per probe
    pub const LISTEN_QUERY_LIMIT: usize = 15;
    /// Independent anchors tried before the void is declared silent
    pub const LISTEN_MAX_ATTEMPTS: u32 = 5;
    /// Post ids remembered to avoid immediate repeats
    pub const SEEN_POSTS_HISTORY_LENGTH: usize = 50;
}

/// Project an orbit onto the screen around `focal` (elliptical, y squashed)
#[inline]
pub fn orbit_to_screen(focal: Vec2, radius: f32, angle: f32, squash: f32) -> Vec2 {
    Vec2::new(
        focal.x + angle.cos() * radius,
        focal.y + angle.sin() * radius * squash,
    )
}

/// Linear interpolation, exact at both ends
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}
