//! Stuck-ball detection
//!
//! Balls bouncing between near-symmetric obstacles can settle into long
//! near-periodic cycles. Each ball keeps a short rolling history of sampled
//! positions; when too many recent samples sit close to the current position
//! the ball is reported as looping and the caller kicks it in a new direction.

use glam::Vec2;
use std::collections::VecDeque;

use crate::Canvas;
use crate::tuning::LoopTuning;

/// A sampled ball position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub pos: Vec2,
    /// Simulation time in seconds
    pub time: f64,
}

/// Where on the canvas a ball currently is, for picking the stricter rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    Corner,
    Edge,
    Open,
}

impl Zone {
    fn classify(pos: Vec2, canvas: Canvas, tuning: &LoopTuning) -> Self {
        let cm = tuning.corner_margin;
        let em = tuning.edge_margin;
        let near_x = pos.x < cm || pos.x > canvas.width - cm;
        let near_y = pos.y < cm || pos.y > canvas.height - cm;
        if near_x && near_y {
            Zone::Corner
        } else if pos.x < em
            || pos.x > canvas.width - em
            || pos.y < em
            || pos.y > canvas.height - em
        {
            Zone::Edge
        } else {
            Zone::Open
        }
    }
}

/// Per-ball position history and correction cooldown
#[derive(Debug, Clone, Default)]
pub struct LoopGuard {
    history: VecDeque<PositionSample>,
    /// Detection is suppressed until this simulation time
    cooldown_until: Option<f64>,
}

impl LoopGuard {
    /// Start from an existing history (oldest first)
    pub fn with_history(samples: impl IntoIterator<Item = PositionSample>) -> Self {
        Self {
            history: samples.into_iter().collect(),
            cooldown_until: None,
        }
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// True while a recent correction is still cooling down
    pub fn is_suppressed(&self, now: f64) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    /// Record a sample and report whether the ball looks stuck.
    ///
    /// A positive result clears the history and starts the cooldown, so the
    /// caller only has to change the ball's heading.
    pub fn observe(&mut self, pos: Vec2, now: f64, canvas: Canvas, tuning: &LoopTuning) -> bool {
        if self.is_suppressed(now) {
            return false;
        }

        self.history.push_back(PositionSample { pos, time: now });
        self.history.retain(|s| now - s.time < tuning.window_secs);

        let stuck = self.stuck_near_boundary(pos, canvas, tuning) || self.stuck_anywhere(pos, tuning);

        if stuck {
            self.history.clear();
            self.cooldown_until = Some(now + tuning.cooldown_secs);
            return true;
        }

        while self.history.len() > tuning.history_len {
            self.history.pop_front();
        }
        false
    }

    fn stuck_near_boundary(&self, pos: Vec2, canvas: Canvas, tuning: &LoopTuning) -> bool {
        let tolerance = match Zone::classify(pos, canvas, tuning) {
            Zone::Corner => tuning.corner_tolerance,
            Zone::Edge => tuning.edge_tolerance,
            Zone::Open => return false,
        };
        self.history.len() >= tuning.edge_min_history
            && self.similar_recent(pos, tuning.edge_window, tolerance) >= tuning.edge_min_similar
    }

    fn stuck_anywhere(&self, pos: Vec2, tuning: &LoopTuning) -> bool {
        self.history.len() >= tuning.general_min_history
            && self.similar_recent(pos, tuning.general_window, tuning.general_tolerance)
                >= tuning.general_min_similar
    }

    /// How many of the newest `window` samples lie within `tolerance` of `pos`
    fn similar_recent(&self, pos: Vec2, window: usize, tolerance: f32) -> usize {
        self.history
            .iter()
            .rev()
            .take(window)
            .filter(|s| s.pos.distance(pos) < tolerance)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANVAS: Canvas = Canvas::new(400.0, 500.0);

    fn samples(points: &[(f32, f32)], start: f64) -> Vec<PositionSample> {
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| PositionSample {
                pos: Vec2::new(x, y),
                time: start + i as f64 * 0.05,
            })
            .collect()
    }

    #[test]
    fn test_general_loop_detected() {
        let tuning = LoopTuning::default();
        let points: Vec<_> = (0..10).map(|i| (200.0 + i as f32 * 0.5, 250.0)).collect();
        let mut guard = LoopGuard::with_history(samples(&points, 0.0));

        assert!(guard.observe(Vec2::new(202.0, 251.0), 0.6, CANVAS, &tuning));
        assert_eq!(guard.history_len(), 0);
        assert!(guard.is_suppressed(0.6 + 1.4));
        assert!(!guard.is_suppressed(0.6 + 1.5));
    }

    #[test]
    fn test_spread_out_motion_is_not_a_loop() {
        let tuning = LoopTuning::default();
        let mut guard = LoopGuard::default();
        for i in 0..30 {
            let pos = Vec2::new(60.0 + i as f32 * 9.0, 100.0 + i as f32 * 9.0);
            assert!(!guard.observe(pos, i as f64 * 0.05, CANVAS, &tuning));
        }
        assert_eq!(guard.history_len(), tuning.history_len);
    }

    #[test]
    fn test_edge_rule_uses_wider_tolerance() {
        let tuning = LoopTuning::default();
        // Samples 13 units from the checked position: too far for the open-field rule (12),
        // close enough for the edge rule (15).
        let xs = [93.0, 119.0, 93.0, 119.0, 93.0, 119.0];
        let edge: Vec<_> = xs.iter().map(|&x| (x, 10.0)).collect();
        let mut guard = LoopGuard::with_history(samples(&edge, 0.0));
        assert!(guard.observe(Vec2::new(106.0, 10.0), 0.35, CANVAS, &tuning));

        let open: Vec<_> = xs.iter().map(|&x| (x, 200.0)).collect();
        let mut guard = LoopGuard::with_history(samples(&open, 0.0));
        assert!(!guard.observe(Vec2::new(106.0, 200.0), 0.35, CANVAS, &tuning));
    }

    #[test]
    fn test_corner_rule() {
        let tuning = LoopTuning::default();
        let points = [(20.0, 20.0), (40.0, 30.0), (25.0, 40.0), (35.0, 20.0)];
        let mut guard = LoopGuard::with_history(samples(&points, 0.0));
        assert!(guard.observe(Vec2::new(30.0, 30.0), 0.25, CANVAS, &tuning));
    }

    #[test]
    fn test_cooldown_suppresses_detection() {
        let tuning = LoopTuning::default();
        let points: Vec<_> = (0..10).map(|_| (200.0, 250.0)).collect();
        let mut guard = LoopGuard::with_history(samples(&points, 0.0));
        assert!(guard.observe(Vec2::new(200.0, 250.0), 0.5, CANVAS, &tuning));

        // Same spot again during the cooldown: nothing recorded, nothing reported
        for i in 0..10 {
            assert!(!guard.observe(Vec2::new(200.0, 250.0), 0.6 + i as f64 * 0.1, CANVAS, &tuning));
        }
        assert_eq!(guard.history_len(), 0);
    }

    #[test]
    fn test_old_samples_expire() {
        let tuning = LoopTuning::default();
        let points: Vec<_> = (0..10).map(|_| (200.0, 250.0)).collect();
        let mut guard = LoopGuard::with_history(samples(&points, 0.0));
        // Five seconds later the old samples fall out of the 3 s window
        assert!(!guard.observe(Vec2::new(200.0, 250.0), 5.0, CANVAS, &tuning));
        assert_eq!(guard.history_len(), 1);
    }
}
