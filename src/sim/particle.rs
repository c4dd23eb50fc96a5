//! Orbiting particles
//!
//! Every orbiting body is parameterized in polar space around the focal point
//! and projected onto an ellipse for display. Radius only ever decreases.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::orbit_to_screen;

/// Geometry shared by every orbiting body for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalField {
    /// Screen position of the black hole
    pub focal: Vec2,
    /// Minimum orbit radius
    pub horizon_radius: f32,
    /// Y projection factor
    pub vertical_squash: f32,
    /// Radius lost per frame
    pub decay_rate: f32,
    /// Spawn annulus (already clamped to the horizon)
    pub spawn_min: f32,
    pub spawn_max: f32,
}

impl OrbitalField {
    /// Sample a fresh orbit uniformly from the spawn annulus
    pub fn random_orbit<R: Rng>(&self, rng: &mut R) -> Orbit {
        let span = (self.spawn_max - self.spawn_min).max(0.0);
        let radius = self.spawn_min + rng.random::<f32>() * span;
        let angle = rng.random::<f32>() * std::f32::consts::TAU;
        Orbit::new(radius, angle)
    }

    pub fn project(&self, orbit: &Orbit) -> Vec2 {
        orbit_to_screen(self.focal, orbit.radius, orbit.angle, self.vertical_squash)
    }
}

/// Polar orbit state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orbit {
    pub radius: f32,
    pub angle: f32,
    /// Fixed when the orbit is created
    pub angular_speed: f32,
}

impl Orbit {
    pub fn new(radius: f32, angle: f32) -> Self {
        Self {
            radius,
            angle,
            angular_speed: ORBIT_SPEED_FACTOR / radius.max(f32::EPSILON),
        }
    }

    /// Decay inward and advance around the focal point
    #[inline]
    pub fn step(&mut self, decay_rate: f32) {
        self.radius -= decay_rate;
        self.angle += self.angular_speed;
    }

    #[inline]
    pub fn inside_horizon(&self, horizon_radius: f32) -> bool {
        self.radius < horizon_radius
    }
}

/// Result of advancing a body by one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    /// Still live
    Orbiting,
    /// Dropped below the event horizon this frame
    CrossedHorizon,
    /// A transition finished fading and should become a thought at this orbit
    Landed(Orbit),
}

/// Common capability of everything in the disk
pub trait OrbitalEntity {
    /// Advance one frame
    fn advance(&mut self, field: &OrbitalField) -> Advance;
    /// Where to draw this frame
    fn render_position(&self, field: &OrbitalField) -> Vec2;
    /// Base radius of the glow before depth scaling
    fn size(&self) -> f32;
}

/// Background dust; recycled forever
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmbientParticle {
    pub orbit: Orbit,
    pub size: f32,
}

impl AmbientParticle {
    pub fn spawn<R: Rng>(field: &OrbitalField, rng: &mut R) -> Self {
        Self {
            orbit: field.random_orbit(rng),
            size: DUST_MIN_SIZE + rng.random::<f32>() * DUST_SIZE_SPAN,
        }
    }

    /// Reinitialize in place with a fresh orbit (size is kept)
    pub fn reset<R: Rng>(&mut self, field: &OrbitalField, rng: &mut R) {
        self.orbit = field.random_orbit(rng);
    }
}

impl OrbitalEntity for AmbientParticle {
    fn advance(&mut self, field: &OrbitalField) -> Advance {
        self.orbit.step(field.decay_rate);
        if self.orbit.inside_horizon(field.horizon_radius) {
            Advance::CrossedHorizon
        } else {
            Advance::Orbiting
        }
    }

    fn render_position(&self, field: &OrbitalField) -> Vec2 {
        field.project(&self.orbit)
    }

    fn size(&self) -> f32 {
        self.size
    }
}

/// A stored thought in orbit; consumed at the horizon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThoughtParticle {
    pub orbit: Orbit,
}

impl ThoughtParticle {
    /// Place a thought exactly where its transition finished
    pub fn at(orbit: Orbit) -> Self {
        Self { orbit }
    }
}

impl OrbitalEntity for ThoughtParticle {
    fn advance(&mut self, field: &OrbitalField) -> Advance {
        self.orbit.step(field.decay_rate);
        if self.orbit.inside_horizon(field.horizon_radius) {
            Advance::CrossedHorizon
        } else {
            Advance::Orbiting
        }
    }

    fn render_position(&self, field: &OrbitalField) -> Vec2 {
        field.project(&self.orbit)
    }

    fn size(&self) -> f32 {
        THOUGHT_SIZE
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    pub(crate) fn test_field() -> OrbitalField {
        OrbitalField {
            focal: Vec2::new(640.0, 288.0),
            horizon_radius: EVENT_HORIZON_RADIUS,
            vertical_squash: VERTICAL_SQUASH,
            decay_rate: DECAY_RATE,
            spawn_min: 256.0,
            spawn_max: 896.0,
        }
    }

    #[test]
    fn test_orbit_angular_speed_fixed_at_creation() {
        let mut orbit = Orbit::new(100.0, 0.0);
        assert!((orbit.angular_speed - 0.02).abs() < 1e-6);
        orbit.step(0.4);
        assert!((orbit.radius - 99.6).abs() < 1e-4);
        assert!((orbit.angle - 0.02).abs() < 1e-6);
        assert!((orbit.angular_speed - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_random_orbit_within_annulus() {
        let field = test_field();
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..500 {
            let orbit = field.random_orbit(&mut rng);
            assert!(orbit.radius >= field.spawn_min && orbit.radius <= field.spawn_max);
            assert!(orbit.angle >= 0.0 && orbit.angle < std::f32::consts::TAU);
        }
    }

    #[test]
    fn test_ambient_reports_horizon_crossing() {
        let field = test_field();
        let mut dust = AmbientParticle {
            orbit: Orbit::new(field.horizon_radius + 0.3, 0.0),
            size: 3.0,
        };
        assert_eq!(dust.advance(&field), Advance::CrossedHorizon);
    }

    #[test]
    fn test_thought_projects_onto_ellipse() {
        let field = test_field();
        let thought = ThoughtParticle::at(Orbit::new(100.0, std::f32::consts::FRAC_PI_2));
        let pos = thought.render_position(&field);
        assert!((pos.x - 640.0).abs() < 0.001);
        assert!((pos.y - (288.0 + 40.0)).abs() < 0.001);
        assert_eq!(thought.size(), THOUGHT_SIZE);
    }
}
