//! Orbital particle simulation
//!
//! Pure animation state with no rendering or platform dependencies:
//! - Seeded RNG only
//! - One step per display frame (no wall-clock timestep)
//! - Mutated only by the frame loop and by transition completions

pub mod palette;
pub mod particle;
pub mod state;
pub mod tick;
pub mod transition;

pub use palette::{GlowPalette, Rgb};
pub use particle::{Advance, AmbientParticle, Orbit, OrbitalEntity, OrbitalField, ThoughtParticle};
pub use state::{Body, SimConfig, Simulation, Star};
pub use tick::{FrameReport, advance_frame};
pub use transition::{TransitionParticle, TransitionPhase};
