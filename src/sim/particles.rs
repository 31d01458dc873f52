//! Particle effects
//!
//! Purely visual: nothing in the simulation reads particles back, so the
//! buffer can be capped aggressively on low quality settings. Particles draw
//! from their own RNG so turning them off never shifts gameplay rolls.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::Particle;
use crate::tuning::ParticleTuning;

/// Default soft cap, matching the medium quality preset
pub const DEFAULT_MAX_PARTICLES: usize = 200;

/// Mixed into the simulation seed for the particle stream
const SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Live particles plus the soft cap that bounds them
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: VecDeque<Particle>,
    max_particles: usize,
    rng: Pcg32,
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_PARTICLES)
    }
}

impl ParticleSystem {
    pub fn with_capacity(max_particles: usize) -> Self {
        Self::seeded(0, max_particles)
    }

    /// Buffer whose spread and sizes derive from the simulation seed
    pub fn seeded(seed: u64, max_particles: usize) -> Self {
        Self {
            particles: VecDeque::with_capacity(max_particles),
            max_particles,
            rng: Pcg32::seed_from_u64(seed ^ SEED_SALT),
        }
    }

    /// Live particles, oldest first
    pub fn particles(&self) -> impl ExactSizeIterator<Item = &Particle> + DoubleEndedIterator {
        self.particles.iter()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn max_particles(&self) -> usize {
        self.max_particles
    }

    /// Change the soft cap, dropping the oldest particles if now over it
    pub fn set_max_particles(&mut self, max_particles: usize) {
        self.max_particles = max_particles;
        if self.particles.len() > max_particles {
            let excess = self.particles.len() - max_particles;
            self.particles.drain(..excess);
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Emit `count` particles at `pos` with random velocity and size
    pub fn burst(&mut self, tuning: &ParticleTuning, pos: Vec2, color: u32, count: usize) {
        if self.max_particles == 0 {
            return;
        }
        let rng = &mut self.rng;
        for _ in 0..count {
            // Remove oldest particles to make room
            if self.particles.len() >= self.max_particles {
                self.particles.pop_front();
            }
            let vel = Vec2::new(
                (rng.random::<f32>() - 0.5) * tuning.spread,
                (rng.random::<f32>() - 0.5) * tuning.spread,
            );
            let size = tuning.min_size + rng.random::<f32>() * (tuning.max_size - tuning.min_size);
            self.particles.push_back(Particle {
                pos,
                vel,
                life: tuning.life_ticks,
                max_life: tuning.life_ticks,
                color,
                size,
            });
        }
    }

    /// Move, damp and age every particle by one tick
    pub fn advance(&mut self, tuning: &ParticleTuning) {
        for particle in self.particles.iter_mut() {
            particle.pos += particle.vel;
            particle.vel *= tuning.damping;
            particle.life = particle.life.saturating_sub(1);
        }
        self.particles.retain(|p| p.life > 0);
    }
}
