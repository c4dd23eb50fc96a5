//! Rendering module
//!
//! Frames are described as a list of 2D draw commands and replayed on a
//! browser canvas with additive blending for the glows.

pub mod frame;

#[cfg(target_arch = "wasm32")]
pub mod canvas2d;

pub use frame::{Blend, DrawCommand, DrawList, Glow, build_frame, depth_scale};

#[cfg(target_arch = "wasm32")]
pub use canvas2d::CanvasRenderer;
