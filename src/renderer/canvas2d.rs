//! Canvas 2D backend
//!
//! Replays a `DrawList` on a `CanvasRenderingContext2d`. The dust and thought
//! gradients are built once at unit radius and reused by scaling the context.

use wasm_bindgen::JsValue;
use web_sys::{CanvasGradient, CanvasRenderingContext2d};

use super::frame::{DrawCommand, DrawList, Glow};
use crate::sim::palette::{DUST_GLOW, GlowStop, THOUGHT_GLOW};

/// Canvas-backed renderer holding the pre-computed gradients
pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    dust_gradient: CanvasGradient,
    thought_gradient: CanvasGradient,
}

fn unit_gradient(
    ctx: &CanvasRenderingContext2d,
    stops: &[GlowStop],
) -> Result<CanvasGradient, JsValue> {
    let gradient = ctx.create_radial_gradient(0.0, 0.0, 0.0, 0.0, 0.0, 1.0)?;
    for stop in stops {
        gradient.add_color_stop(stop.offset, &stop.color.css(stop.alpha))?;
    }
    Ok(gradient)
}

impl CanvasRenderer {
    pub fn new(ctx: CanvasRenderingContext2d) -> Result<Self, JsValue> {
        let dust_gradient = unit_gradient(&ctx, &DUST_GLOW)?;
        let thought_gradient = unit_gradient(&ctx, &THOUGHT_GLOW)?;
        Ok(Self {
            ctx,
            dust_gradient,
            thought_gradient,
        })
    }

    /// Execute every command in order
    pub fn render(&self, list: &DrawList) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        for command in &list.commands {
            match command {
                DrawCommand::SetBlend(blend) => {
                    ctx.set_global_composite_operation(blend.as_css())?;
                }
                DrawCommand::FillCanvas { color, alpha } => {
                    ctx.set_fill_style_str(&color.css(*alpha));
                    ctx.fill_rect(0.0, 0.0, list.width as f64, list.height as f64);
                }
                DrawCommand::Star { pos, size, opacity } => {
                    ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", opacity));
                    ctx.fill_rect(pos.x as f64, pos.y as f64, *size as f64, *size as f64);
                }
                DrawCommand::Glow { pos, radius, glow } => {
                    let dynamic;
                    let gradient = match glow {
                        Glow::Dust => &self.dust_gradient,
                        Glow::Thought => &self.thought_gradient,
                        Glow::Fading(palette) => {
                            dynamic = unit_gradient(ctx, &palette.stops())?;
                            &dynamic
                        }
                    };
                    ctx.save();
                    ctx.translate(pos.x as f64, pos.y as f64)?;
                    ctx.scale(*radius as f64, *radius as f64)?;
                    ctx.set_fill_style_canvas_gradient(gradient);
                    ctx.begin_path();
                    ctx.arc(0.0, 0.0, 1.0, 0.0, std::f64::consts::TAU)?;
                    ctx.fill();
                    ctx.restore();
                }
                DrawCommand::Disk {
                    center,
                    radius,
                    color,
                } => {
                    ctx.set_fill_style_str(&color.css(1.0));
                    ctx.begin_path();
                    ctx.arc(
                        center.x as f64,
                        center.y as f64,
                        *radius as f64,
                        0.0,
                        std::f64::consts::TAU,
                    )?;
                    ctx.fill();
                }
            }
        }
        Ok(())
    }
}
