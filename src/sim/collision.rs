//! Collision detection and response for axis-aligned blocks
//!
//! Balls are treated as squares of side `2 * radius` for block tests, which is
//! cheap and plenty for a grid of rectangles.

use glam::Vec2;

use super::state::Block;
use crate::Canvas;

/// Check whether a ball overlaps a block
#[inline]
pub fn ball_block_overlap(ball_pos: Vec2, ball_radius: f32, block: &Block) -> bool {
    let reach = block.half_extents() + Vec2::splat(ball_radius);
    let delta = (ball_pos - block.pos).abs();
    delta.x < reach.x && delta.y < reach.y
}

/// Check whether a click lands on a block, with extra slack on every side
#[inline]
pub fn click_hits_block(point: Vec2, block: &Block, margin: f32) -> bool {
    let reach = block.half_extents() + Vec2::splat(margin);
    let delta = (point - block.pos).abs();
    delta.x <= reach.x && delta.y <= reach.y
}

/// Velocity that sends a ball straight away from the block center
///
/// A ball sitting exactly on the center is sent upward.
#[inline]
pub fn deflect_from_block(ball_pos: Vec2, block_center: Vec2, speed: f32) -> Vec2 {
    (ball_pos - block_center).normalize_or(Vec2::NEG_Y) * speed
}

/// Keep a ball inside the canvas
///
/// Clamps the position to `radius` from each wall and points the velocity
/// component for that wall back inward, preserving speed. Returns true when
/// any wall was touched.
pub fn contain_in_canvas(pos: &mut Vec2, vel: &mut Vec2, radius: f32, canvas: Canvas) -> bool {
    let mut hit = false;

    if pos.x <= radius {
        pos.x = radius;
        vel.x = vel.x.abs();
        hit = true;
    }
    if pos.x >= canvas.width - radius {
        pos.x = canvas.width - radius;
        vel.x = -vel.x.abs();
        hit = true;
    }
    if pos.y <= radius {
        pos.y = radius;
        vel.y = vel.y.abs();
        hit = true;
    }
    if pos.y >= canvas.height - radius {
        pos.y = canvas.height - radius;
        vel.y = -vel.y.abs();
        hit = true;
    }

    hit
}

/// Point `inset` away from whichever wall is closest to `pos`
///
/// Ties resolve top, bottom, left, right.
pub fn nearest_wall_point(pos: Vec2, canvas: Canvas, inset: f32) -> Vec2 {
    let candidates = [
        (pos.y, Vec2::new(pos.x, inset)),
        (canvas.height - pos.y, Vec2::new(pos.x, canvas.height - inset)),
        (pos.x, Vec2::new(inset, pos.y)),
        (canvas.width - pos.x, Vec2::new(canvas.width - inset, pos.y)),
    ];

    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.0 < best.0 {
            best = *candidate;
        }
    }
    best.1
}
