//! Launch-to-orbit transition
//!
//! A freshly released thought starts at a screen-space point (where the page
//! shows it leaving), curves along a quadratic Bézier onto a fixed orbit, and
//! then fades from the thought palette to the dust palette while already
//! orbiting. Phases only move forward: Traveling -> Fading -> landed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::palette::{GlowPalette, fade_palette};
use super::particle::{Advance, Orbit, OrbitalEntity, OrbitalField};
use crate::consts::*;
use crate::orbit_to_screen;

/// Per-particle state machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransitionPhase {
    /// Following the curve; progress in [0, 1]
    Traveling { progress: f32 },
    /// Orbiting while the color fades; `fade` goes 1 -> 0
    Fading { orbit: Orbit, fade: f32 },
}

/// Ephemeral particle bridging page coordinates to the orbital disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionParticle {
    pub phase: TransitionPhase,
    pub start: Vec2,
    pub control: Vec2,
    pub end: Vec2,
    /// Orbit the curve ends on
    pub end_orbit: Orbit,
    pub travel_speed: f32,
    pub fade_speed: f32,
}

/// Quadratic Bézier point at `t`
#[inline]
pub fn quadratic_bezier(start: Vec2, control: Vec2, end: Vec2, t: f32) -> Vec2 {
    let inv = 1.0 - t;
    start * (inv * inv) + control * (2.0 * inv * t) + end * (t * t)
}

impl TransitionParticle {
    /// Launch from `start` (canvas coordinates) toward the left edge of the disk
    pub fn launch(start: Vec2, field: &OrbitalField) -> Self {
        let end_orbit = Orbit::new(
            field.focal.x * TRANSITION_END_RADIUS_RATIO,
            TRANSITION_END_ANGLE,
        );
        let end = orbit_to_screen(
            field.focal,
            end_orbit.radius,
            end_orbit.angle,
            field.vertical_squash,
        );
        // Horizontal first, then drop onto the orbit
        let control = Vec2::new(end.x, start.y);

        Self {
            phase: TransitionPhase::Traveling { progress: 0.0 },
            start,
            control,
            end,
            end_orbit,
            travel_speed: TRAVEL_SPEED,
            fade_speed: FADE_SPEED,
        }
    }

    pub fn travel_progress(&self) -> f32 {
        match self.phase {
            TransitionPhase::Traveling { progress } => progress,
            TransitionPhase::Fading { .. } => 1.0,
        }
    }

    pub fn fade_progress(&self) -> f32 {
        match self.phase {
            TransitionPhase::Traveling { .. } => 1.0,
            TransitionPhase::Fading { fade, .. } => fade,
        }
    }

    pub fn is_traveling(&self) -> bool {
        matches!(self.phase, TransitionPhase::Traveling { .. })
    }

    /// Current glow colors
    pub fn palette(&self) -> GlowPalette {
        fade_palette(self.fade_progress())
    }
}

impl OrbitalEntity for TransitionParticle {
    fn advance(&mut self, field: &OrbitalField) -> Advance {
        match &mut self.phase {
            TransitionPhase::Traveling { progress } => {
                *progress = (*progress + self.travel_speed).min(1.0);
                if *progress >= 1.0 {
                    self.phase = TransitionPhase::Fading {
                        orbit: self.end_orbit,
                        fade: 1.0,
                    };
                }
                Advance::Orbiting
            }
            TransitionPhase::Fading { orbit, fade } => {
                orbit.step(field.decay_rate);
                if orbit.inside_horizon(field.horizon_radius) {
                    return Advance::CrossedHorizon;
                }
                *fade = (*fade - self.fade_speed).max(0.0);
                if *fade <= 0.0 {
                    Advance::Landed(*orbit)
                } else {
                    Advance::Orbiting
                }
            }
        }
    }

    fn render_position(&self, field: &OrbitalField) -> Vec2 {
        match &self.phase {
            TransitionPhase::Traveling { progress } => {
                quadratic_bezier(self.start, self.control, self.end, *progress)
            }
            TransitionPhase::Fading { orbit, .. } => field.project(orbit),
        }
    }

    fn size(&self) -> f32 {
        THOUGHT_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::palette::{DUST_PALETTE, THOUGHT_PALETTE};
    use crate::sim::particle::tests::test_field;

    fn run_until_landed(tp: &mut TransitionParticle, field: &OrbitalField) -> (u32, Orbit) {
        for frame in 1..10_000 {
            if let Advance::Landed(orbit) = tp.advance(field) {
                return (frame, orbit);
            }
        }
        panic!("transition never landed");
    }

    #[test]
    fn test_bezier_endpoints() {
        let a = Vec2::new(0.0, 0.0);
        let c = Vec2::new(10.0, 0.0);
        let b = Vec2::new(10.0, 10.0);
        assert_eq!(quadratic_bezier(a, c, b, 0.0), a);
        assert_eq!(quadratic_bezier(a, c, b, 1.0), b);
        let mid = quadratic_bezier(a, c, b, 0.5);
        assert!((mid.x - 7.5).abs() < 1e-5 && (mid.y - 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_launch_targets_left_of_disk() {
        let field = test_field();
        let tp = TransitionParticle::launch(Vec2::new(640.0, 600.0), &field);
        assert!((tp.end_orbit.radius - 480.0).abs() < 1e-3);
        assert!((tp.end.x - 160.0).abs() < 1e-2);
        assert!((tp.end.y - 288.0).abs() < 1e-2);
        assert_eq!(tp.control, Vec2::new(tp.end.x, 600.0));
        assert_eq!(tp.render_position(&field), Vec2::new(640.0, 600.0));
    }

    #[test]
    fn test_phase_is_monotonic_and_clamped() {
        let field = test_field();
        let mut tp = TransitionParticle::launch(Vec2::new(640.0, 600.0), &field);
        let mut seen_fading = false;
        loop {
            let outcome = tp.advance(&field);
            let travel = tp.travel_progress();
            let fade = tp.fade_progress();
            assert!((0.0..=1.0).contains(&travel));
            assert!((0.0..=1.0).contains(&fade));
            if seen_fading {
                assert!(!tp.is_traveling(), "phase went backwards");
            }
            seen_fading |= !tp.is_traveling();
            if matches!(outcome, Advance::Landed(_)) {
                break;
            }
        }
        assert!(seen_fading);
    }

    #[test]
    fn test_lands_on_decayed_end_orbit() {
        let field = test_field();
        let mut tp = TransitionParticle::launch(Vec2::new(640.0, 600.0), &field);
        let (frames, orbit) = run_until_landed(&mut tp, &field);
        // ~100 frames of travel plus ~100 of fading
        assert!((195..=205).contains(&frames), "landed after {frames} frames");
        assert!(orbit.radius < 480.0 && orbit.radius > 430.0);
        assert!(orbit.angle > std::f32::consts::PI);
    }

    #[test]
    fn test_palette_follows_fade() {
        let field = test_field();
        let mut tp = TransitionParticle::launch(Vec2::new(0.0, 0.0), &field);
        assert_eq!(tp.palette(), THOUGHT_PALETTE);
        run_until_landed(&mut tp, &field);
        assert_eq!(tp.palette(), DUST_PALETTE);
    }

    #[test]
    fn test_consumed_when_small_disk_decays_past_horizon() {
        let mut field = test_field();
        field.focal = Vec2::new(70.0, 40.0);
        let mut tp = TransitionParticle::launch(Vec2::new(70.0, 100.0), &field);
        let mut crossed = false;
        for _ in 0..400 {
            match tp.advance(&field) {
                Advance::CrossedHorizon => {
                    crossed = true;
                    break;
                }
                Advance::Landed(_) => panic!("should not land inside the horizon"),
                Advance::Orbiting => {}
            }
        }
        assert!(crossed);
    }
}
