//! Block Idle - an idle/clicker block breaker
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ball motion, collisions, damage, levels)
//! - `renderer`: Draw-command generation and the Canvas 2D backend
//! - `game`: Frame driver that owns the state store and the simulation
//! - `persistence`: Progress snapshots and autosave
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod economy;
pub mod game;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::Game;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Fixed simulation timestep (one tick per 60 Hz display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Where purchased balls enter the playfield
    pub const BALL_SPAWN: Vec2 = Vec2::new(400.0, 500.0);
    /// Upward launch speed of a freshly spawned ball (pixels/tick)
    pub const BALL_SPAWN_VY: f32 = -3.0;
    /// Horizontal launch spread, vx is drawn from (-spread/2, spread/2)
    pub const BALL_SPAWN_SPREAD: f32 = 4.0;

    /// Canvas width at which the roomier desktop layout kicks in
    pub const DESKTOP_MIN_WIDTH: f32 = 400.0;

    /// Wall-clock interval between progress snapshots
    pub const AUTOSAVE_INTERVAL_MS: f64 = 10_000.0;
}

/// Canvas dimensions in pixels, as measured by the layout.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Canvas {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns `None` until the layout has produced a usable size
    pub fn measured(width: f32, height: f32) -> Option<Self> {
        (width > 0.0 && height > 0.0).then_some(Self { width, height })
    }

    #[inline]
    pub fn is_desktop(&self) -> bool {
        self.width >= consts::DESKTOP_MIN_WIDTH
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Smallest absolute angle between two headings, in [0, π]
#[inline]
pub fn angle_between(a: f32, b: f32) -> f32 {
    normalize_angle(a - b).abs()
}

/// Heading of a vector in radians
#[inline]
pub fn heading(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Unit vector for a heading, scaled to `speed`
#[inline]
pub fn from_heading(theta: f32, speed: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin()) * speed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_angle_between_wraps() {
        assert!((angle_between(PI - 0.1, -PI + 0.1) - 0.2).abs() < 1e-4);
        assert!((angle_between(0.0, PI / 2.0) - PI / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_canvas_measured() {
        assert!(Canvas::measured(0.0, 500.0).is_none());
        let canvas = Canvas::measured(400.0, 500.0).unwrap();
        assert!(canvas.is_desktop());
        assert!(!Canvas::new(399.0, 500.0).is_desktop());
    }
}
