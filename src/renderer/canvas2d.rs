//! Canvas 2D backend
//!
//! Replays [`DrawCommand`]s on a `CanvasRenderingContext2d`. Every command is
//! wrapped in save/restore so alpha and shadow never leak between shapes.

use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::commands::{Color, DrawCommand, Glow};

fn css(color: Color) -> String {
    format!(
        "rgba({}, {}, {}, {})",
        (color[0] * 255.0).round() as u8,
        (color[1] * 255.0).round() as u8,
        (color[2] * 255.0).round() as u8,
        color[3]
    )
}

pub struct Canvas2dRenderer {
    ctx: CanvasRenderingContext2d,
    size: (f64, f64),
}

impl Canvas2dRenderer {
    /// Returns `None` if the browser refuses a 2D context
    pub fn new(canvas: &HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self {
            ctx,
            size: (canvas.width() as f64, canvas.height() as f64),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width as f64, height as f64);
    }

    pub fn draw(&self, commands: &[DrawCommand]) {
        for command in commands {
            self.ctx.save();
            self.draw_one(command);
            self.ctx.restore();
        }
    }

    fn apply_glow(&self, glow: Option<Glow>) {
        if let Some(glow) = glow {
            self.ctx.set_shadow_color(&css(glow.color));
            self.ctx.set_shadow_blur(glow.blur as f64);
        }
    }

    fn draw_one(&self, command: &DrawCommand) {
        let ctx = &self.ctx;
        match *command {
            DrawCommand::FillScreen { color } => {
                ctx.set_fill_style_str(&css(color));
                ctx.fill_rect(0.0, 0.0, self.size.0, self.size.1);
            }
            DrawCommand::FillRect { min, size, color, glow } => {
                self.apply_glow(glow);
                ctx.set_fill_style_str(&css(color));
                ctx.fill_rect(min.x as f64, min.y as f64, size.x as f64, size.y as f64);
            }
            DrawCommand::StrokeRect {
                min,
                size,
                color,
                line_width,
            } => {
                ctx.set_stroke_style_str(&css(color));
                ctx.set_line_width(line_width as f64);
                ctx.stroke_rect(min.x as f64, min.y as f64, size.x as f64, size.y as f64);
            }
            DrawCommand::Line { from, to, color, width } => {
                ctx.set_stroke_style_str(&css(color));
                ctx.set_line_width(width as f64);
                ctx.begin_path();
                ctx.move_to(from.x as f64, from.y as f64);
                ctx.line_to(to.x as f64, to.y as f64);
                ctx.stroke();
            }
            DrawCommand::Circle {
                center,
                radius,
                color,
                glow,
            } => {
                self.apply_glow(glow);
                ctx.set_fill_style_str(&css(color));
                ctx.begin_path();
                if ctx
                    .arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU)
                    .is_ok()
                {
                    ctx.fill();
                }
            }
        }
    }
}
