//! Data-driven game balance
//!
//! Every heuristic constant the simulation relies on lives here so it can be
//! tuned (or pinned in tests) without touching the algorithms. All groups use
//! `#[serde(default)]`, so a JSON override only needs the keys it changes.

use serde::{Deserialize, Serialize};

/// Ball movement and wall handling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionTuning {
    /// Collision radius of every ball (pixels)
    pub ball_radius: f32,
    /// Base speed per speed-upgrade level (pixels/tick)
    pub speed_per_level: f32,
    /// Recent positions kept for the trail renderer
    pub trail_length: usize,
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            ball_radius: 6.0,
            speed_per_level: 2.0,
            trail_length: 10,
        }
    }
}

/// Sniper homing state machine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SniperTuning {
    pub tracking_speed: f32,
    pub to_wall_speed: f32,
    pub to_target_speed: f32,
    /// Distance of the rebound point from the chosen wall
    pub wall_inset: f32,
    /// Switch to the return leg once this close to the wall point
    pub wall_arrive_radius: f32,
    /// Drop back to tracking once this close to the target point
    pub target_arrive_radius: f32,
}

impl Default for SniperTuning {
    fn default() -> Self {
        Self {
            tracking_speed: 1.3,
            to_wall_speed: 1.5,
            to_target_speed: 1.8,
            wall_inset: 20.0,
            wall_arrive_radius: 30.0,
            target_arrive_radius: 50.0,
        }
    }
}

/// Damage applied by special balls and clicks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageTuning {
    pub plasma_radius: f32,
    /// Fraction of ball power dealt to blocks caught in a plasma blast
    pub plasma_splash: f32,
    /// Fraction of ball power converted to poison damage per application
    pub poison_fraction: f32,
    pub poison_min_damage: f32,
    pub poison_max_damage: f32,
    pub poison_duration_ticks: u32,
    /// Poison only bites on ticks where `remaining % interval == 0`
    pub poison_interval: u32,
    /// Extra slack around a block when testing clicks
    pub click_margin: f32,
}

impl Default for DamageTuning {
    fn default() -> Self {
        Self {
            plasma_radius: 80.0,
            plasma_splash: 0.7,
            poison_fraction: 0.05,
            poison_min_damage: 1.0,
            poison_max_damage: 2.0,
            poison_duration_ticks: 20,
            poison_interval: 3,
            click_margin: 8.0,
        }
    }
}

/// Stuck-ball detection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopTuning {
    /// Per-tick chance that a regular ball is checked
    pub check_chance: f32,
    /// Per-tick chance that a sniper ball is checked
    pub sniper_check_chance: f32,
    /// Samples older than this are forgotten
    pub window_secs: f64,
    /// Cap on remembered samples
    pub history_len: usize,
    /// Suppression window after a correction
    pub cooldown_secs: f64,

    pub corner_margin: f32,
    pub edge_margin: f32,
    pub corner_tolerance: f32,
    pub edge_tolerance: f32,
    /// Samples needed before the corner/edge rule is considered
    pub edge_min_history: usize,
    pub edge_window: usize,
    pub edge_min_similar: usize,

    pub general_tolerance: f32,
    pub general_min_history: usize,
    pub general_window: usize,
    pub general_min_similar: usize,

    /// Minimum heading change applied by a correction (radians)
    pub min_turn: f32,
}

impl Default for LoopTuning {
    fn default() -> Self {
        Self {
            check_chance: 0.3,
            sniper_check_chance: 0.1,
            window_secs: 3.0,
            history_len: 15,
            cooldown_secs: 1.5,

            corner_margin: 50.0,
            edge_margin: 30.0,
            corner_tolerance: 25.0,
            edge_tolerance: 15.0,
            edge_min_history: 5,
            edge_window: 8,
            edge_min_similar: 4,

            general_tolerance: 12.0,
            general_min_history: 6,
            general_window: 10,
            general_min_similar: 5,

            min_turn: std::f32::consts::FRAC_PI_3,
        }
    }
}

/// Particle feedback
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleTuning {
    /// Velocity components are drawn from (-spread/2, spread/2)
    pub spread: f32,
    pub life_ticks: u32,
    pub min_size: f32,
    pub max_size: f32,
    pub damping: f32,
}

impl Default for ParticleTuning {
    fn default() -> Self {
        Self {
            spread: 8.0,
            life_ticks: 30,
            min_size: 1.0,
            max_size: 4.0,
            damping: 0.98,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub motion: MotionTuning,
    pub sniper: SniperTuning,
    pub damage: DamageTuning,
    pub loops: LoopTuning,
    pub particles: ParticleTuning,
}

impl Tuning {
    /// Parse a (possibly partial) JSON override on top of the defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load overrides from a file, falling back to defaults on any problem
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::warn!("Invalid tuning file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read tuning file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
