//! Per-ball movement
//!
//! One call to [`advance_ball`] moves a ball by a single tick: steering (or
//! plain speed normalization), integration, wall containment, stuck-loop
//! correction and the render trail, in that order.

use glam::Vec2;
use rand::Rng;
use std::f32::consts::{PI, TAU};

use super::collision::contain_in_canvas;
use super::particles::ParticleSystem;
use super::state::{Ball, BallKind, Block, SniperPhase, Target, colors};
use crate::tuning::Tuning;
use crate::{Canvas, from_heading, heading};

/// Read-only inputs shared by every ball in a tick
#[derive(Debug, Clone, Copy)]
pub struct MotionContext<'a> {
    pub canvas: Canvas,
    /// Speed non-homing balls are normalized to
    pub base_speed: f32,
    /// Blocks as they were at the start of the tick
    pub blocks: &'a [Block],
    pub tuning: &'a Tuning,
    /// Simulation time in seconds
    pub now: f64,
}

/// What happened to a ball during its move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionOutcome {
    pub hit_wall: bool,
    pub loop_corrected: bool,
}

/// Move one ball by a tick
pub fn advance_ball<R: Rng>(
    ball: &mut Ball,
    ctx: &MotionContext,
    rng: &mut R,
    particles: &mut ParticleSystem,
) -> MotionOutcome {
    let mut outcome = MotionOutcome::default();

    steer(ball, ctx, particles);

    ball.pos += ball.vel;

    let radius = ctx.tuning.motion.ball_radius;
    if contain_in_canvas(&mut ball.pos, &mut ball.vel, radius, ctx.canvas) {
        particles.burst(&ctx.tuning.particles, ball.pos, colors::WALL_SPARK, 3);
        outcome.hit_wall = true;
    }

    let loops = &ctx.tuning.loops;
    let chance = match ball.kind {
        BallKind::Sniper(_) => loops.sniper_check_chance,
        _ => loops.check_chance,
    };
    if rng.random::<f32>() < chance && ball.loop_guard.observe(ball.pos, ctx.now, ctx.canvas, loops) {
        break_loop(ball, loops.min_turn, rng);
        particles.burst(&ctx.tuning.particles, ball.pos, colors::LOOP_BREAK, 8);
        log::debug!("Ball {} looked stuck at {:?}, new heading", ball.id, ball.pos);
        outcome.loop_corrected = true;
    }

    ball.record_trail(ctx.tuning.motion.trail_length);

    outcome
}

/// Send a stuck ball off at least `min_turn` away from its heading, same speed
pub fn break_loop<R: Rng>(ball: &mut Ball, min_turn: f32, rng: &mut R) {
    let min_turn = min_turn.clamp(0.0, PI);
    let speed = ball.speed();
    let turn = rng.random_range(min_turn..=TAU - min_turn);
    ball.vel = from_heading(heading(ball.vel) + turn, speed);
}

/// Set this tick's velocity: homing for snipers, base speed for the rest
fn steer(ball: &mut Ball, ctx: &MotionContext, particles: &mut ParticleSystem) {
    let BallKind::Sniper(phase) = ball.kind else {
        ball.vel = ball.vel.normalize_or_zero() * ctx.base_speed;
        return;
    };

    let sniper = &ctx.tuning.sniper;
    let fx = &ctx.tuning.particles;

    let phase = match phase {
        SniperPhase::Tracking { target } => {
            let live = target.and_then(|t| ctx.blocks.iter().find(|b| b.id == t.block_id));
            let block = live.or_else(|| nearest_block(ball.pos, ctx.blocks));
            match block {
                Some(block) => {
                    let to_block = block.pos - ball.pos;
                    if to_block != Vec2::ZERO {
                        ball.vel = to_block.normalize() * ctx.base_speed * sniper.tracking_speed;
                        particles.burst(fx, ball.pos, colors::SNIPER, 2);
                    }
                    SniperPhase::Tracking {
                        target: Some(Target::of(block)),
                    }
                }
                None => {
                    ball.vel = ball.vel.normalize_or_zero() * ctx.base_speed;
                    SniperPhase::Tracking { target: None }
                }
            }
        }
        SniperPhase::ToWall { target, wall } => {
            let to_wall = wall - ball.pos;
            if to_wall.length() < sniper.wall_arrive_radius {
                particles.burst(fx, ball.pos, colors::SNIPER, 15);
                return_to_target(ball, target, ctx, particles)
            } else {
                ball.vel = to_wall.normalize() * ctx.base_speed * sniper.to_wall_speed;
                SniperPhase::ToWall { target, wall }
            }
        }
        SniperPhase::ToTarget { target } => return_to_target(ball, target, ctx, particles),
    };

    ball.kind = BallKind::Sniper(phase);
}

/// Dive at the remembered target position, resuming tracking once close
fn return_to_target(ball: &mut Ball, target: Target, ctx: &MotionContext, particles: &mut ParticleSystem) -> SniperPhase {
    let sniper = &ctx.tuning.sniper;
    let to_target = target.pos - ball.pos;
    let distance = to_target.length();

    if distance > 0.0 {
        ball.vel = to_target / distance * ctx.base_speed * sniper.to_target_speed;
        particles.burst(&ctx.tuning.particles, ball.pos, colors::GOLD, 3);
    }

    if distance < sniper.target_arrive_radius || ctx.blocks.is_empty() {
        SniperPhase::Tracking { target: None }
    } else {
        SniperPhase::ToTarget { target }
    }
}

fn nearest_block(pos: Vec2, blocks: &[Block]) -> Option<&Block> {
    blocks.iter().min_by(|a, b| {
        a.pos
            .distance_squared(pos)
            .partial_cmp(&b.pos.distance_squared(pos))
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}
