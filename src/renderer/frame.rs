//! Draw-list construction
//!
//! Turns simulation state into an ordered list of 2D drawing commands. The
//! list is backend-agnostic; `canvas2d` replays it on a browser canvas.

use glam::Vec2;

use crate::sim::palette::{self, GlowPalette, Rgb, TRAIL_ALPHA};
use crate::sim::{Body, Simulation};

/// Compositing mode for subsequent commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blend {
    /// Normal painting
    SourceOver,
    /// Additive ("lighter") so overlapping glows brighten
    Additive,
}

impl Blend {
    pub fn as_css(&self) -> &'static str {
        match self {
            Blend::SourceOver => "source-over",
            Blend::Additive => "lighter",
        }
    }
}

/// Which gradient a glow uses
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Glow {
    Dust,
    Thought,
    /// Per-frame gradient for a fading transition
    Fading(GlowPalette),
}

/// One drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    SetBlend(Blend),
    /// Cover the whole canvas
    FillCanvas { color: Rgb, alpha: f32 },
    /// White square star
    Star { pos: Vec2, size: f32, opacity: f32 },
    /// Radial gradient circle
    Glow { pos: Vec2, radius: f32, glow: Glow },
    /// Solid disk
    Disk { center: Vec2, radius: f32, color: Rgb },
}

/// A full frame worth of commands
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub width: f32,
    pub height: f32,
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn glow_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Glow { .. }))
            .count()
    }
}

/// Pseudo-perspective: bodies lower on screen are drawn larger
#[inline]
pub fn depth_scale(y: f32, height: f32) -> f32 {
    if height <= 0.0 {
        return 1.0;
    }
    0.2 + 0.8 * (y / height)
}

/// Build the draw list for the current frame
///
/// With animation on, a translucent overlay leaves trails behind moving
/// glows. With it off, the background is painted opaque and only the static
/// starfield and horizon are drawn.
pub fn build_frame(sim: &Simulation, animated: bool) -> DrawList {
    let mut commands = Vec::with_capacity(sim.stars.len() + sim.ambient.len() + 8);

    commands.push(DrawCommand::SetBlend(Blend::SourceOver));
    commands.push(DrawCommand::FillCanvas {
        color: palette::BACKGROUND,
        alpha: if animated { TRAIL_ALPHA } else { 1.0 },
    });
    commands.extend(sim.stars.iter().map(|star| DrawCommand::Star {
        pos: star.pos,
        size: star.size,
        opacity: star.opacity,
    }));

    if animated {
        commands.push(DrawCommand::SetBlend(Blend::Additive));
        let field = &sim.field;
        for body in sim.bodies() {
            let entity = body.entity();
            let pos = entity.render_position(field);
            let command = match body {
                Body::Ambient(_) => DrawCommand::Glow {
                    pos,
                    radius: entity.size() * depth_scale(pos.y, sim.height),
                    glow: Glow::Dust,
                },
                Body::Thought(_) => DrawCommand::Glow {
                    pos,
                    radius: entity.size() * depth_scale(pos.y, sim.height),
                    glow: Glow::Thought,
                },
                Body::Transition(tp) => DrawCommand::Glow {
                    pos,
                    radius: entity.size(),
                    glow: Glow::Fading(tp.palette()),
                },
            };
            commands.push(command);
        }
    }

    // The horizon hides anything drawn over the focal point this frame
    commands.push(DrawCommand::SetBlend(Blend::SourceOver));
    commands.push(DrawCommand::Disk {
        center: sim.focal(),
        radius: sim.field.horizon_radius,
        color: palette::HORIZON,
    });

    DrawList {
        width: sim.width,
        height: sim.height,
        commands,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::palette::THOUGHT_PALETTE;
    use crate::sim::{Orbit, SimConfig, ThoughtParticle};

    fn sim() -> Simulation {
        let config = SimConfig {
            particle_count: 5,
            star_count: 3,
            ..SimConfig::default()
        };
        Simulation::new(config, 1000.0, 500.0, 9)
    }

    #[test]
    fn test_depth_scale_linear_in_y() {
        assert!((depth_scale(0.0, 500.0) - 0.2).abs() < 1e-6);
        assert!((depth_scale(500.0, 500.0) - 1.0).abs() < 1e-6);
        assert!((depth_scale(250.0, 500.0) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_animated_frame_order() {
        let mut sim = sim();
        sim.thoughts.push(ThoughtParticle::at(Orbit::new(100.0, 0.0)));
        sim.launch_thought(Vec2::new(500.0, 450.0));
        let list = build_frame(&sim, true);

        assert_eq!(list.commands[0], DrawCommand::SetBlend(Blend::SourceOver));
        assert!(matches!(
            list.commands[1],
            DrawCommand::FillCanvas { alpha, .. } if alpha == TRAIL_ALPHA
        ));
        assert_eq!(list.glow_count(), 5 + 1 + 1);
        assert!(list.commands.contains(&DrawCommand::SetBlend(Blend::Additive)));
        assert!(matches!(list.commands.last(), Some(DrawCommand::Disk { .. })));

        let fading = list.commands.iter().find_map(|c| match c {
            DrawCommand::Glow {
                glow: Glow::Fading(p),
                pos,
                ..
            } => Some((*p, *pos)),
            _ => None,
        });
        assert_eq!(fading, Some((THOUGHT_PALETTE, Vec2::new(500.0, 450.0))));
    }

    #[test]
    fn test_thought_glow_uses_depth_cue() {
        let mut sim = sim();
        sim.thoughts
            .push(ThoughtParticle::at(Orbit::new(100.0, std::f32::consts::FRAC_PI_2)));
        let list = build_frame(&sim, true);
        let radius = list.commands.iter().find_map(|c| match c {
            DrawCommand::Glow {
                glow: Glow::Thought,
                radius,
                ..
            } => Some(*radius),
            _ => None,
        });
        // focal y = 200, squashed offset 40 -> y = 240
        let expected = 8.0 * (0.2 + 0.8 * 240.0 / 500.0);
        assert!((radius.unwrap() - expected).abs() < 1e-4);
    }

    #[test]
    fn test_static_frame_has_no_glows() {
        let list = build_frame(&sim(), false);
        assert_eq!(list.glow_count(), 0);
        let stars = list
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Star { .. }))
            .count();
        assert_eq!(stars, 3);
        assert!(matches!(
            list.commands[1],
            DrawCommand::FillCanvas { alpha, .. } if alpha == 1.0
        ));
    }
}
