//! Frame description as a flat list of draw commands
//!
//! `build_frame` is pure: same state, particles and clock in, same commands
//! out. Backends only replay the list.

use glam::Vec2;

use crate::Canvas;
use crate::settings::Settings;
use crate::sim::particles::ParticleSystem;
use crate::sim::state::{Ball, Block, GameState, colors as sim_colors};

/// RGBA color, components in [0, 1]
pub type Color = [f32; 4];

/// Convert a 0xRRGGBB color to RGBA with the given alpha
pub fn rgba(hex: u32, alpha: f32) -> Color {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
        alpha.clamp(0.0, 1.0),
    ]
}

/// Colors that are not tied to a simulation entity
pub mod colors {
    use super::Color;

    /// Translucent black laid over the previous frame for motion smear
    pub const BACKGROUND_FADE: Color = [0.0, 0.0, 0.0, 0.1];
    pub const DAMAGE: Color = [1.0, 0.0, 0.0, 0.3];
    pub const SPECIAL_GOLD_CORE: u32 = 0xFFF700;
}

/// Soft shadow around a filled shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub color: Color,
    pub blur: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Cover the whole canvas
    FillScreen { color: Color },
    FillRect {
        min: Vec2,
        size: Vec2,
        color: Color,
        glow: Option<Glow>,
    },
    StrokeRect {
        min: Vec2,
        size: Vec2,
        color: Color,
        line_width: f32,
    },
    Line {
        from: Vec2,
        to: Vec2,
        color: Color,
        width: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
        glow: Option<Glow>,
    },
}

/// Ball radius as drawn
pub fn ball_radius(canvas: Canvas) -> f32 {
    if canvas.is_desktop() { 8.0 } else { 6.0 }
}

/// Build every draw command for one frame
///
/// `time_ms` only drives the poison and gold pulses.
pub fn build_frame(
    state: &GameState,
    particles: &ParticleSystem,
    canvas: Canvas,
    time_ms: f64,
    settings: &Settings,
) -> Vec<DrawCommand> {
    let mut commands = Vec::with_capacity(1 + state.blocks.len() * 5 + state.balls.len() * 12 + particles.len());
    commands.push(DrawCommand::FillScreen {
        color: colors::BACKGROUND_FADE,
    });

    for particle in particles.particles() {
        let alpha = particle.life as f32 / particle.max_life.max(1) as f32;
        commands.push(DrawCommand::Circle {
            center: particle.pos,
            radius: particle.size,
            color: rgba(particle.color, alpha),
            glow: None,
        });
    }

    let glow = settings.quality.glow_enabled();
    for block in &state.blocks {
        push_block(&mut commands, block, time_ms, glow);
    }
    for ball in &state.balls {
        push_ball(&mut commands, ball, canvas, settings, glow);
    }
    commands
}

fn push_block(commands: &mut Vec<DrawCommand>, block: &Block, time_ms: f64, glow: bool) {
    let min = block.pos - block.half_extents();
    let size = block.size;
    let gold = block.is_gold();

    let (fill_alpha, shadow) = match block.poison {
        Some(_) => {
            let pulse = (time_ms * 0.02).sin() as f32 * 0.3 + 0.7;
            (pulse, Glow { color: rgba(sim_colors::POISON, 1.0), blur: 12.0 })
        }
        None => (
            0.8,
            Glow {
                color: rgba(block.color(), 1.0),
                blur: if gold { 15.0 } else { 8.0 },
            },
        ),
    };
    commands.push(DrawCommand::FillRect {
        min,
        size,
        color: rgba(block.color(), fill_alpha),
        glow: glow.then_some(shadow),
    });

    if gold {
        let pulse = (time_ms * 0.01).sin() as f32 * 0.2 + 0.8;
        commands.push(DrawCommand::FillRect {
            min: min + Vec2::splat(3.0),
            size: (size - Vec2::splat(6.0)).max(Vec2::ZERO),
            color: rgba(sim_colors::WHITE, pulse),
            glow: None,
        });
        if block.special_gold {
            commands.push(DrawCommand::FillRect {
                min: min + Vec2::splat(6.0),
                size: (size - Vec2::splat(12.0)).max(Vec2::ZERO),
                color: rgba(colors::SPECIAL_GOLD_CORE, pulse),
                glow: None,
            });
        }
    }

    let lost = 1.0 - block.health_fraction();
    if lost > 0.0 {
        commands.push(DrawCommand::FillRect {
            min,
            size: Vec2::new(size.x * lost, size.y),
            color: colors::DAMAGE,
            glow: None,
        });
    }

    commands.push(DrawCommand::StrokeRect {
        min,
        size,
        color: rgba(block.color(), 0.5),
        line_width: if gold { 2.0 } else { 1.0 },
    });
}

fn push_ball(commands: &mut Vec<DrawCommand>, ball: &Ball, canvas: Canvas, settings: &Settings, glow: bool) {
    let color = ball.kind.ball_type().color();
    let desktop = canvas.is_desktop();

    // Drawn tail is the newest part of the trail
    let shown = settings.trail_points(ball.trail.len());
    let trail = &ball.trail[ball.trail.len() - shown..];
    for pair in trail.windows(2) {
        commands.push(DrawCommand::Line {
            from: pair[0].pos,
            to: pair[1].pos,
            color: rgba(color, pair[1].opacity * 0.5),
            width: if desktop { 3.0 } else { 2.0 },
        });
    }

    let radius = ball_radius(canvas);
    commands.push(DrawCommand::Circle {
        center: ball.pos,
        radius,
        color: rgba(color, 1.0),
        glow: glow.then_some(Glow {
            color: rgba(color, 1.0),
            blur: if desktop { 15.0 } else { 10.0 },
        }),
    });
    commands.push(DrawCommand::Circle {
        center: ball.pos,
        radius: radius / 2.0,
        color: rgba(sim_colors::WHITE, 0.6),
        glow: None,
    });
}
