//! Fixed timestep simulation tick
//!
//! The simulation reads the published [`GameState`] and works on private
//! copies of its balls and blocks. The result is a [`TickReport`] that the
//! owner publishes through [`super::action::reduce`] in one step, so the store
//! never observes a half-finished tick.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::level::generate_level;
use super::motion::{MotionContext, advance_ball};
use super::particles::ParticleSystem;
use super::resolve::{ResolveContext, Resolution, apply_poison, compact, resolve_click, resolve_collisions};
use super::state::{Ball, Block, GameState};
use crate::consts::SIM_DT;
use crate::tuning::Tuning;
use crate::Canvas;

/// Per-tick inputs from the host (deterministic)
#[derive(Debug, Clone, Copy)]
pub struct TickInput {
    /// Current canvas size; zero until the layout is measured
    pub canvas: Canvas,
}

/// Everything one tick (or click) changed, ready to publish
#[derive(Debug, Clone)]
pub struct TickReport {
    /// Updated balls; `None` when the balls were not touched (clicks)
    pub balls: Option<Vec<Ball>>,
    /// Surviving blocks after compaction
    pub blocks: Vec<Block>,
    /// Rewards before coin multipliers
    pub resolution: Resolution,
    pub loop_corrections: u32,
    /// Set on the one report that emptied the level
    pub level_completed: bool,
}

/// Owner of everything the simulation needs between ticks that is not game
/// state: balance, RNG, particles and the level-completion latch.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub tuning: Tuning,
    particles: ParticleSystem,
    rng: Pcg32,
    time_ticks: u64,
    /// Level whose completion has already been signalled
    completed_level: Option<u32>,
}

impl Simulation {
    pub fn new(seed: u64, tuning: Tuning, max_particles: usize) -> Self {
        Self {
            tuning,
            particles: ParticleSystem::seeded(seed, max_particles),
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            completed_level: None,
        }
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut ParticleSystem {
        &mut self.particles
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Simulation time in seconds
    pub fn time_secs(&self) -> f64 {
        self.time_ticks as f64 * SIM_DT as f64
    }

    /// Build the block set when the level has none
    ///
    /// Returns `None` while blocks remain or while the canvas is unmeasured.
    /// Generating a level re-arms the completion latch.
    pub fn prepare_level(&mut self, state: &GameState, canvas: Canvas) -> Option<Vec<Block>> {
        if !state.blocks.is_empty() {
            return None;
        }
        let blocks = generate_level(state.level, canvas, &mut self.rng, state.peek_next_id())?;
        self.completed_level = None;
        Some(blocks)
    }

    /// Advance the simulation by one fixed timestep
    pub fn tick(&mut self, state: &GameState, input: &TickInput) -> Option<TickReport> {
        if !state.running {
            return None;
        }
        let canvas = Canvas::measured(input.canvas.width, input.canvas.height)?;

        self.time_ticks += 1;
        let now = self.time_secs();
        self.particles.advance(&self.tuning.particles);

        let base_speed = state.base_speed(self.tuning.motion.speed_per_level);
        let mut balls = state.balls.clone();
        let mut blocks = state.blocks.clone();

        let motion = MotionContext {
            canvas,
            base_speed,
            blocks: &state.blocks,
            tuning: &self.tuning,
            now,
        };
        let mut loop_corrections = 0;
        for ball in balls.iter_mut() {
            let outcome = advance_ball(ball, &motion, &mut self.rng, &mut self.particles);
            if outcome.loop_corrected {
                loop_corrections += 1;
            }
        }

        let mut resolution = apply_poison(&mut blocks, &self.tuning, &mut self.particles);
        let resolve = ResolveContext {
            canvas,
            base_speed,
            tuning: &self.tuning,
        };
        resolution.merge(resolve_collisions(
            &mut balls,
            &mut blocks,
            &resolve,
            &mut self.particles,
        ));
        compact(&mut blocks);

        let level_completed = self.check_completion(state, &blocks);

        Some(TickReport {
            balls: Some(balls),
            blocks,
            resolution,
            loop_corrections,
            level_completed,
        })
    }

    /// Apply a manual click at `point` (canvas coordinates)
    ///
    /// Returns `None` when the click missed every block.
    pub fn click(&mut self, state: &GameState, point: Vec2) -> Option<TickReport> {
        let mut blocks = state.blocks.clone();
        let resolution = resolve_click(
            point,
            state.click_damage(),
            &mut blocks,
            &self.tuning,
            &mut self.particles,
        )?;
        compact(&mut blocks);

        let level_completed = self.check_completion(state, &blocks);

        Some(TickReport {
            balls: None,
            blocks,
            resolution,
            loop_corrections: 0,
            level_completed,
        })
    }

    /// True exactly once per level, when its last block goes
    fn check_completion(&mut self, state: &GameState, blocks: &[Block]) -> bool {
        if state.blocks.is_empty() || !blocks.is_empty() {
            return false;
        }
        if self.completed_level == Some(state.level) {
            return false;
        }
        self.completed_level = Some(state.level);
        log::info!("Level {} complete", state.level);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::ArchetypeId;
    use crate::sim::state::BallType;

    const CANVAS: Canvas = Canvas::new(400.0, 500.0);

    fn quiet_tuning() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.loops.check_chance = 0.0;
        tuning.loops.sniper_check_chance = 0.0;
        tuning
    }

    fn block(state: &mut GameState, x: f32, y: f32, health: f32) -> Block {
        let id = state.next_entity_id();
        Block::new(id, Vec2::new(x, y), Vec2::new(40.0, 15.0), ArchetypeId::COMMON, health)
    }

    #[test]
    fn test_paused_or_unmeasured_is_noop() {
        let mut sim = Simulation::new(1, quiet_tuning(), 100);
        let mut state = GameState::new(1);
        state.spawn_ball(BallType::Normal);

        let unmeasured = TickInput {
            canvas: Canvas::new(0.0, 0.0),
        };
        assert!(sim.tick(&state, &unmeasured).is_none());
        assert_eq!(sim.time_ticks(), 0);

        state.running = false;
        assert!(sim.tick(&state, &TickInput { canvas: CANVAS }).is_none());
    }

    #[test]
    fn test_tick_does_not_touch_input_state() {
        let mut sim = Simulation::new(1, quiet_tuning(), 100);
        let mut state = GameState::new(1);
        state.spawn_ball(BallType::Normal);
        let before = state.balls[0].pos;

        let report = sim.tick(&state, &TickInput { canvas: CANVAS }).unwrap();

        assert_eq!(state.balls[0].pos, before);
        let moved = report.balls.unwrap();
        assert_ne!(moved[0].pos, before);
    }

    #[test]
    fn test_completion_signalled_once() {
        let mut sim = Simulation::new(1, quiet_tuning(), 100);
        let mut state = GameState::new(1);
        state.level = 19;
        let a = block(&mut state, 100.0, 100.0, 1.0);
        let b = block(&mut state, 300.0, 100.0, 1.0);
        state.blocks = vec![a, b];

        let report = sim.click(&state, Vec2::new(100.0, 100.0)).unwrap();
        assert!(!report.level_completed);
        state.blocks = report.blocks;

        let report = sim.click(&state, Vec2::new(300.0, 100.0)).unwrap();
        assert!(report.level_completed);

        // A stale snapshot replayed against the same level does not fire twice
        let mut stale = state.clone();
        stale.blocks = vec![block(&mut state, 300.0, 100.0, 1.0)];
        let report = sim.click(&stale, Vec2::new(300.0, 100.0)).unwrap();
        assert!(!report.level_completed);
    }

    #[test]
    fn test_prepare_level_rearms_latch() {
        let mut sim = Simulation::new(1, quiet_tuning(), 100);
        let mut state = GameState::new(1);
        let only = block(&mut state, 100.0, 100.0, 1.0);
        state.blocks = vec![only];
        assert!(sim.prepare_level(&state, CANVAS).is_none());

        assert!(sim.click(&state, Vec2::new(100.0, 100.0)).unwrap().level_completed);

        state.blocks.clear();
        assert!(sim.prepare_level(&state, Canvas::new(0.0, 0.0)).is_none());
        let blocks = sim.prepare_level(&state, CANVAS).unwrap();
        assert!(blocks.iter().all(|b| b.id >= state.peek_next_id()));
        state.blocks = blocks;

        // Same level number again (e.g. after prestige) can complete again
        state.blocks.truncate(1);
        let point = state.blocks[0].pos;
        state.blocks[0].health = 1.0;
        assert!(sim.click(&state, point).unwrap().level_completed);
    }

    #[test]
    fn test_click_miss() {
        let mut sim = Simulation::new(1, quiet_tuning(), 100);
        let mut state = GameState::new(1);
        let only = block(&mut state, 100.0, 100.0, 1.0);
        state.blocks = vec![only];
        assert!(sim.click(&state, Vec2::new(300.0, 400.0)).is_none());
    }
}
