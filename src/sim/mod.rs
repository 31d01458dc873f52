//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order of balls and blocks)
//! - No rendering or platform dependencies

pub mod action;
pub mod catalog;
pub mod collision;
pub mod level;
pub mod loop_guard;
pub mod motion;
pub mod particles;
pub mod resolve;
pub mod state;
pub mod tick;

pub use action::{Action, reduce};
pub use catalog::{ArchetypeId, Archetype};
pub use level::{Layout, generate_level};
pub use particles::ParticleSystem;
pub use resolve::Resolution;
pub use state::{
    Ball, BallKind, BallType, Block, GameState, Particle, PrestigeUpgradeId, SniperPhase, SpecialKind,
    UpgradeKind,
};
pub use tick::{Simulation, TickInput, TickReport};
