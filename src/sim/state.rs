//! Simulation context
//!
//! All animation state lives in one explicit `Simulation` owned by the app
//! controller: canvas size, focal point, stars, and the three particle
//! populations. Nothing here touches the DOM.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::particle::{AmbientParticle, OrbitalEntity, OrbitalField, ThoughtParticle};
use super::transition::TransitionParticle;
use crate::consts::*;

/// Tunables for one simulation (defaults from `consts`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub particle_count: usize,
    pub star_count: usize,
    pub horizon_radius: f32,
    pub decay_rate: f32,
    pub vertical_squash: f32,
    pub vertical_center_ratio: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            particle_count: PARTICLE_COUNT,
            star_count: STAR_COUNT,
            horizon_radius: EVENT_HORIZON_RADIUS,
            decay_rate: DECAY_RATE,
            vertical_squash: VERTICAL_SQUASH,
            vertical_center_ratio: CANVAS_VERTICAL_CENTER_RATIO,
        }
    }
}

/// A fixed background star
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    pub size: f32,
    pub opacity: f32,
}

/// Borrowed view of any body in the disk, for a single dispatching render pass
#[derive(Debug, Clone, Copy)]
pub enum Body<'a> {
    Ambient(&'a AmbientParticle),
    Thought(&'a ThoughtParticle),
    Transition(&'a TransitionParticle),
}

impl Body<'_> {
    pub fn entity(&self) -> &dyn OrbitalEntity {
        match self {
            Body::Ambient(p) => *p,
            Body::Thought(p) => *p,
            Body::Transition(p) => *p,
        }
    }
}

/// Complete animation state
#[derive(Debug, Clone)]
pub struct Simulation {
    pub config: SimConfig,
    pub width: f32,
    pub height: f32,
    pub field: OrbitalField,
    pub stars: Vec<Star>,
    pub ambient: Vec<AmbientParticle>,
    pub thoughts: Vec<ThoughtParticle>,
    pub transitions: Vec<TransitionParticle>,
    /// Frames advanced since creation
    pub frame: u64,
    pub(crate) rng: Pcg32,
}

impl Simulation {
    /// Create and populate a simulation for a `width` x `height` canvas
    pub fn new(config: SimConfig, width: f32, height: f32, seed: u64) -> Self {
        let mut sim = Self {
            field: field_for(&config, width, height),
            config,
            width,
            height,
            stars: Vec::new(),
            ambient: Vec::new(),
            thoughts: Vec::new(),
            transitions: Vec::new(),
            frame: 0,
            rng: Pcg32::seed_from_u64(seed),
        };
        sim.populate();
        sim
    }

    /// Recompute the focal point and rebuild stars and dust for a new size
    ///
    /// Thoughts and transitions keep their polar state and follow the new
    /// focal point.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.field = field_for(&self.config, width, height);
        self.populate();
        log::debug!(
            "Simulation resized to {}x{} (focal {:?})",
            width,
            height,
            self.field.focal
        );
    }

    /// Change the dust/star density and rebuild
    pub fn reconfigure(&mut self, particle_count: usize, star_count: usize) {
        self.config.particle_count = particle_count;
        self.config.star_count = star_count;
        self.populate();
    }

    fn populate(&mut self) {
        let (w, h) = (self.width, self.height);
        let rng = &mut self.rng;
        self.stars = (0..self.config.star_count)
            .map(|_| Star {
                pos: Vec2::new(rng.random::<f32>() * w, rng.random::<f32>() * h),
                size: rng.random::<f32>() * 1.5,
                opacity: rng.random::<f32>() * 0.5 + 0.1,
            })
            .collect();

        let field = self.field;
        self.ambient = (0..self.config.particle_count)
            .map(|_| AmbientParticle::spawn(&field, &mut *rng))
            .collect();
    }

    /// Start a launched thought on its way from `start` (canvas coordinates)
    pub fn launch_thought(&mut self, start: Vec2) {
        self.transitions
            .push(TransitionParticle::launch(start, &self.field));
        log::debug!("Thought launched from ({:.1}, {:.1})", start.x, start.y);
    }

    /// Every body in draw order: dust, thoughts, then transitions
    pub fn bodies(&self) -> impl Iterator<Item = Body<'_>> {
        self.ambient
            .iter()
            .map(Body::Ambient)
            .chain(self.thoughts.iter().map(Body::Thought))
            .chain(self.transitions.iter().map(Body::Transition))
    }

    pub fn focal(&self) -> Vec2 {
        self.field.focal
    }
}

/// Derive per-frame geometry from the canvas size
pub fn field_for(config: &SimConfig, width: f32, height: f32) -> OrbitalField {
    let horizon = config.horizon_radius;
    let spawn_min = (width * SPAWN_MIN_WIDTH_RATIO).max(horizon);
    let spawn_max = (width * SPAWN_MAX_WIDTH_RATIO).max(spawn_min);
    OrbitalField {
        focal: Vec2::new(width / 2.0, height * config.vertical_center_ratio),
        horizon_radius: horizon,
        vertical_squash: config.vertical_squash,
        decay_rate: config.decay_rate,
        spawn_min,
        spawn_max,
    }
}
