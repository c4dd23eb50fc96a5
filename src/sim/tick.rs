//! Per-frame simulation step
//!
//! Advances every body once. Dust that crosses the horizon is reset in place,
//! thoughts and transitions that cross it are removed, and transitions that
//! finish fading are replaced by a thought at the same orbit. Removal uses
//! `retain_mut` so nothing is skipped or processed twice.

use super::particle::{Advance, OrbitalEntity, ThoughtParticle};
use super::state::Simulation;

/// What changed during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Dust recycled at the horizon
    pub recycled: usize,
    /// Thoughts swallowed by the horizon
    pub consumed: usize,
    /// Transitions that became thoughts
    pub landed: usize,
    /// Transitions swallowed before they finished fading
    pub lost_in_transit: usize,
}

/// Advance the simulation by one animation frame
pub fn advance_frame(sim: &mut Simulation) -> FrameReport {
    let mut report = FrameReport::default();
    let field = sim.field;

    for dust in sim.ambient.iter_mut() {
        if dust.advance(&field) == Advance::CrossedHorizon {
            dust.reset(&field, &mut sim.rng);
            report.recycled += 1;
        }
    }

    sim.thoughts.retain_mut(|thought| match thought.advance(&field) {
        Advance::CrossedHorizon => {
            report.consumed += 1;
            false
        }
        _ => true,
    });

    let mut landed = Vec::new();
    sim.transitions.retain_mut(|tp| match tp.advance(&field) {
        Advance::Orbiting => true,
        Advance::Landed(orbit) => {
            landed.push(ThoughtParticle::at(orbit));
            false
        }
        Advance::CrossedHorizon => {
            report.lost_in_transit += 1;
            false
        }
    });
    report.landed = landed.len();
    sim.thoughts.extend(landed);

    sim.frame += 1;

    if report.landed > 0 || report.consumed > 0 {
        log::debug!(
            "Frame {}: {} thought(s) landed, {} consumed, {} in orbit",
            sim.frame,
            report.landed,
            report.consumed,
            sim.thoughts.len()
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::particle::Orbit;
    use crate::sim::state::SimConfig;
    use glam::Vec2;
    use proptest::prelude::*;

    fn small_sim(seed: u64) -> Simulation {
        let config = SimConfig {
            particle_count: 120,
            star_count: 10,
            ..SimConfig::default()
        };
        Simulation::new(config, 640.0, 480.0, seed)
    }

    #[test]
    fn test_dust_count_invariant() {
        let mut sim = small_sim(11);
        let mut recycled = 0;
        for _ in 0..2_000 {
            recycled += advance_frame(&mut sim).recycled;
            assert_eq!(sim.ambient.len(), 120);
        }
        assert!(recycled > 0, "some dust should have reached the horizon");
    }

    #[test]
    fn test_thought_consumed_not_reset() {
        let mut sim = small_sim(12);
        sim.thoughts
            .push(ThoughtParticle::at(Orbit::new(EVENT_HORIZON_RADIUS + 1.0, 0.0)));
        let r1 = advance_frame(&mut sim);
        assert_eq!(r1.consumed, 0);
        assert_eq!(sim.thoughts.len(), 1);
        let r2 = advance_frame(&mut sim);
        let r3 = advance_frame(&mut sim);
        assert_eq!(r2.consumed + r3.consumed, 1);
        assert!(sim.thoughts.is_empty());
    }

    #[test]
    fn test_transition_lands_as_thought() {
        let mut sim = small_sim(13);
        sim.launch_thought(Vec2::new(320.0, 460.0));
        let mut landed_at = None;
        for frame in 0..400 {
            if advance_frame(&mut sim).landed == 1 {
                landed_at = Some(frame);
                break;
            }
        }
        assert!(landed_at.is_some());
        assert!(sim.transitions.is_empty());
        assert_eq!(sim.thoughts.len(), 1);
    }

    #[test]
    fn test_thought_count_non_increasing_without_landings() {
        let mut sim = small_sim(14);
        for i in 0..20 {
            sim.thoughts.push(ThoughtParticle::at(Orbit::new(
                EVENT_HORIZON_RADIUS + 2.0 + i as f32 * 3.0,
                i as f32,
            )));
        }
        let mut previous = sim.thoughts.len();
        for _ in 0..300 {
            advance_frame(&mut sim);
            assert!(sim.thoughts.len() <= previous);
            previous = sim.thoughts.len();
        }
        assert!(sim.thoughts.is_empty());
    }

    proptest! {
        #[test]
        fn prop_no_body_survives_below_horizon(
            seed in any::<u64>(),
            frames in 1usize..400,
            width in 120.0f32..1600.0,
            decay in 0.4f32..0.7,
        ) {
            let config = SimConfig {
                particle_count: 60,
                star_count: 0,
                decay_rate: decay,
                ..SimConfig::default()
            };
            let mut sim = Simulation::new(config, width, width * 0.6, seed);
            sim.launch_thought(Vec2::new(width / 2.0, width * 0.5));
            sim.thoughts.push(ThoughtParticle::at(Orbit::new(width * 0.3 + 50.0, 1.0)));

            for _ in 0..frames {
                advance_frame(&mut sim);
                let horizon = sim.field.horizon_radius;
                for dust in &sim.ambient {
                    prop_assert!(dust.orbit.radius >= horizon);
                }
                for thought in &sim.thoughts {
                    prop_assert!(thought.orbit.radius >= horizon);
                }
                for tp in &sim.transitions {
                    prop_assert!((0.0..=1.0).contains(&tp.travel_progress()));
                    prop_assert!((0.0..=1.0).contains(&tp.fade_progress()));
                }
            }
            prop_assert_eq!(sim.ambient.len(), 60);
        }
    }
}
