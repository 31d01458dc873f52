//! Frame driver
//!
//! `Game` owns the published [`GameState`] and the [`Simulation`] and runs the
//! fixed-timestep loop for each display frame. All state changes go through
//! [`reduce`]; the simulation only ever sees the last published state.

use glam::Vec2;

use crate::audio::{AudioManager, SoundEffect};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::persistence::{Autosave, ProgressSnapshot, ProgressStore};
use crate::renderer::{DrawCommand, build_frame};
use crate::settings::Settings;
use crate::sim::action::{Action, reduce};
use crate::sim::state::GameState;
use crate::sim::tick::{Simulation, TickInput, TickReport};
use crate::tuning::Tuning;
use crate::Canvas;

/// What one display frame did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameSummary {
    /// Simulation ticks that ran
    pub ticks: u32,
    /// Ball-vs-block contacts
    pub hits: u32,
    pub blocks_destroyed: u32,
    /// Levels finished during the frame
    pub levels_completed: u32,
    pub loop_corrections: u32,
}

pub struct Game {
    state: GameState,
    sim: Simulation,
    settings: Settings,
    audio: AudioManager,
    autosave: Autosave,
    accumulator: f32,
    canvas: Canvas,
}

impl Game {
    pub fn new(seed: u64, tuning: Tuning, settings: Settings) -> Self {
        let mut audio = AudioManager::new();
        audio.set_muted(settings.muted);
        let state = GameState::new(seed);
        audio.set_volume(state.volume);
        Self {
            sim: Simulation::new(seed, tuning, settings.max_particles()),
            state,
            settings,
            audio,
            autosave: Autosave::default(),
            accumulator: 0.0,
            canvas: Canvas::new(0.0, 0.0),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn audio(&self) -> &AudioManager {
        &self.audio
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.sim
            .particles_mut()
            .set_max_particles(settings.max_particles());
        self.audio.set_muted(settings.muted);
        self.settings = settings;
    }

    /// Record the measured canvas size
    pub fn resize(&mut self, canvas: Canvas) {
        self.canvas = canvas;
    }

    /// Publish an action to the store
    pub fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
        self.audio.set_volume(self.state.volume);
    }

    /// Replace progress with a saved snapshot
    pub fn restore(&mut self, snapshot: &ProgressSnapshot) {
        snapshot.restore(&mut self.state);
        self.audio.set_volume(self.state.volume);
        self.accumulator = 0.0;
    }

    /// Generate blocks when the current level has none
    fn ensure_level(&mut self) {
        if let Some(blocks) = self.sim.prepare_level(&self.state, self.canvas) {
            self.dispatch(Action::UpdateBlocks(blocks));
        }
    }

    fn publish(&mut self, report: TickReport, summary: &mut FrameSummary) {
        let completed = report.level_completed;
        summary.hits += report.resolution.hits;
        summary.blocks_destroyed += report.resolution.blocks_destroyed;
        summary.loop_corrections += report.loop_corrections;
        self.dispatch(Action::ApplyTick(report));
        if completed {
            summary.levels_completed += 1;
            self.dispatch(Action::NextLevel);
            self.ensure_level();
        }
    }

    /// Advance by `dt_secs` of wall-clock time
    pub fn frame(&mut self, dt_secs: f32) -> FrameSummary {
        let mut summary = FrameSummary::default();
        self.ensure_level();

        self.accumulator += dt_secs.clamp(0.0, 0.1);
        let input = TickInput { canvas: self.canvas };
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
            if let Some(report) = self.sim.tick(&self.state, &input) {
                summary.ticks += 1;
                self.publish(report, &mut summary);
            }
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog instead of spiraling
            self.accumulator = self.accumulator.min(SIM_DT);
        }

        if summary.hits > 0 {
            self.audio.play(SoundEffect::BlockHit);
        }
        summary
    }

    /// Manual click at `point` in canvas coordinates; true if a block was hit
    pub fn click(&mut self, point: Vec2) -> bool {
        self.audio.resume();
        let Some(report) = self.sim.click(&self.state, point) else {
            return false;
        };
        let mut summary = FrameSummary::default();
        self.publish(report, &mut summary);
        self.audio.play(SoundEffect::BlockHit);
        true
    }

    /// Draw commands for the current state
    pub fn draw(&self, time_ms: f64) -> Vec<DrawCommand> {
        build_frame(
            &self.state,
            self.sim.particles(),
            self.canvas,
            time_ms,
            &self.settings,
        )
    }

    /// Save progress if the autosave interval has elapsed
    pub fn autosave<S: ProgressStore>(&mut self, store: &mut S, now_ms: f64) -> bool {
        if !self.autosave.due(now_ms) {
            return false;
        }
        match store.save(&ProgressSnapshot::from_state(&self.state)) {
            Ok(()) => {
                log::debug!("Autosaved at level {}", self.state.level);
                true
            }
            Err(e) => {
                log::warn!("Autosave failed: {}", e);
                false
            }
        }
    }
}
