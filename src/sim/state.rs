//! Game state and core simulation types
//!
//! `GameState` is the single store the presentation reads from. It is only
//! changed through [`super::action::reduce`]; the simulation reads a snapshot
//! and hands back a report that the reducer publishes in one step.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::catalog::ArchetypeId;
use super::loop_guard::LoopGuard;
use crate::consts::*;

/// Where a sniper ball is aiming
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub block_id: u32,
    /// Block center when the target was acquired
    pub pos: Vec2,
}

impl Target {
    pub fn of(block: &Block) -> Self {
        Self {
            block_id: block.id,
            pos: block.pos,
        }
    }
}

/// Sniper homing phases
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SniperPhase {
    /// Seeking the nearest block
    Tracking { target: Option<Target> },
    /// Hit the target, heading for the nearest wall to rebound
    ToWall { target: Target, wall: Vec2 },
    /// Rebounded, diving back at the remembered target position
    ToTarget { target: Target },
}

impl Default for SniperPhase {
    fn default() -> Self {
        SniperPhase::Tracking { target: None }
    }
}

/// Ball behavior, carrying only the state each kind needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BallKind {
    Normal,
    /// Splash damage around every block it strikes
    Plasma,
    /// Homes in on blocks and rebounds off walls back at them
    Sniper(SniperPhase),
    /// Passes through blocks and leaves damage-over-time behind
    Poison,
}

impl BallKind {
    pub fn new(ball_type: BallType) -> Self {
        match ball_type {
            BallType::Normal => BallKind::Normal,
            BallType::Plasma => BallKind::Plasma,
            BallType::Sniper => BallKind::Sniper(SniperPhase::default()),
            BallType::Poison => BallKind::Poison,
        }
    }

    pub fn ball_type(&self) -> BallType {
        match self {
            BallKind::Normal => BallType::Normal,
            BallKind::Plasma => BallType::Plasma,
            BallKind::Sniper(_) => BallType::Sniper,
            BallKind::Poison => BallType::Poison,
        }
    }

    /// Poison balls keep their heading through blocks
    #[inline]
    pub fn passes_through(&self) -> bool {
        matches!(self, BallKind::Poison)
    }
}

/// Ball flavour without per-instance state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallType {
    Normal,
    Plasma,
    Sniper,
    Poison,
}

impl BallType {
    /// 0xRRGGBB used for the ball body and its trail
    pub fn color(self) -> u32 {
        match self {
            BallType::Normal => 0xFFFFFF,
            BallType::Plasma => colors::PLASMA,
            BallType::Sniper => colors::SNIPER,
            BallType::Poison => colors::POISON,
        }
    }
}

/// Ball types sold in the special shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialKind {
    Plasma,
    Sniper,
    Poison,
}

impl SpecialKind {
    pub const ALL: [SpecialKind; 3] = [SpecialKind::Plasma, SpecialKind::Sniper, SpecialKind::Poison];

    pub fn ball_type(self) -> BallType {
        match self {
            SpecialKind::Plasma => BallType::Plasma,
            SpecialKind::Sniper => BallType::Sniper,
            SpecialKind::Poison => BallType::Poison,
        }
    }
}

/// Particle and ball colors (0xRRGGBB)
pub mod colors {
    pub const WALL_SPARK: u32 = 0x00FFFF;
    pub const GOLD: u32 = 0xFFD700;
    pub const WHITE: u32 = 0xFFFFFF;
    pub const PLASMA: u32 = 0xFF6B35;
    pub const SNIPER: u32 = 0x4A90E2;
    pub const POISON: u32 = 0x7ED321;
    pub const LOOP_BREAK: u32 = 0xFF00FF;
    pub const DAMAGE: u32 = 0xFF0000;
}

/// Trail point for ball rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub opacity: f32,
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Damage per collision, fixed when the ball is created
    pub power: f32,
    pub kind: BallKind,
    /// Trail history for rendering (oldest first)
    #[serde(skip)]
    pub trail: Vec<TrailPoint>,
    #[serde(skip)]
    pub loop_guard: LoopGuard,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, power: f32, ball_type: BallType) -> Self {
        Self {
            id,
            pos,
            vel,
            power,
            kind: BallKind::new(ball_type),
            trail: Vec::new(),
            loop_guard: LoopGuard::default(),
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Append the current position to the trail and refade it
    pub fn record_trail(&mut self, capacity: usize) {
        self.trail.push(TrailPoint {
            pos: self.pos,
            opacity: 1.0,
        });
        if self.trail.len() > capacity {
            let excess = self.trail.len() - capacity;
            self.trail.drain(..excess);
        }
        let len = self.trail.len() as f32;
        for (i, point) in self.trail.iter_mut().enumerate() {
            point.opacity = i as f32 / len;
        }
    }
}

/// Damage-over-time left by a poison ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Poison {
    pub ticks_remaining: u32,
    pub damage: f32,
}

/// A destructible block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: u32,
    /// Center
    pub pos: Vec2,
    /// Full width and height
    pub size: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub archetype: ArchetypeId,
    pub value: u64,
    /// The oversized boss block of every 20th level
    pub special_gold: bool,
    #[serde(default)]
    pub poison: Option<Poison>,
}

impl Block {
    /// Block with the archetype's value and color at the given health
    pub fn new(id: u32, pos: Vec2, size: Vec2, archetype: ArchetypeId, health: f32) -> Self {
        Self {
            id,
            pos,
            size,
            health,
            max_health: health,
            archetype,
            value: archetype.get().value,
            special_gold: archetype == ArchetypeId::SPECIAL_GOLD,
            poison: None,
        }
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.health <= 0.0
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        self.size * 0.5
    }

    #[inline]
    pub fn color(&self) -> u32 {
        self.archetype.get().color
    }

    #[inline]
    pub fn is_gold(&self) -> bool {
        self.special_gold || self.archetype.is_gold()
    }

    /// Remaining health in [0, 1]
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: u32,
    pub max_life: u32,
    pub color: u32,
    pub size: f32,
}

/// Purchasable upgrade tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    BallSpeed,
    BallPower,
    ClickPower,
    CoinMultiplier,
    AutoClicker,
    OfflineEarnings,
}

/// Upgrade levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upgrades {
    /// Normal balls bought so far (drives the next ball's price)
    pub ball_count: u32,
    pub ball_speed: u32,
    pub ball_power: u32,
    pub click_power: u32,
    pub coin_multiplier: u32,
    pub auto_clicker: u32,
    pub offline_earnings: u32,
}

impl Default for Upgrades {
    fn default() -> Self {
        Self {
            ball_count: 0,
            ball_speed: 1,
            ball_power: 1,
            click_power: 1,
            coin_multiplier: 1,
            auto_clicker: 0,
            offline_earnings: 0,
        }
    }
}

impl Upgrades {
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::BallSpeed => self.ball_speed,
            UpgradeKind::BallPower => self.ball_power,
            UpgradeKind::ClickPower => self.click_power,
            UpgradeKind::CoinMultiplier => self.coin_multiplier,
            UpgradeKind::AutoClicker => self.auto_clicker,
            UpgradeKind::OfflineEarnings => self.offline_earnings,
        }
    }

    pub fn level_mut(&mut self, kind: UpgradeKind) -> &mut u32 {
        match kind {
            UpgradeKind::BallSpeed => &mut self.ball_speed,
            UpgradeKind::BallPower => &mut self.ball_power,
            UpgradeKind::ClickPower => &mut self.click_power,
            UpgradeKind::CoinMultiplier => &mut self.coin_multiplier,
            UpgradeKind::AutoClicker => &mut self.auto_clicker,
            UpgradeKind::OfflineEarnings => &mut self.offline_earnings,
        }
    }
}

/// Permanent multipliers earned by prestiging
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrestigeMultipliers {
    pub damage: f32,
    pub coins: f32,
    pub speed: f32,
    pub click_power: f32,
}

impl Default for PrestigeMultipliers {
    fn default() -> Self {
        Self {
            damage: 1.0,
            coins: 1.0,
            speed: 1.0,
            click_power: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prestige {
    pub level: u32,
    pub points: u32,
    pub multipliers: PrestigeMultipliers,
}

/// Upgrades bought with golds in the prestige shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrestigeUpgradeId {
    MoneyPerLevel,
    LaserPower,
    GoldMultiplier,
    BallDamage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrestigeUpgrade {
    pub id: PrestigeUpgradeId,
    /// Price in golds of the next level
    pub cost: u32,
    pub level: u32,
    pub max_level: u32,
}

impl PrestigeUpgrade {
    /// Shop figure at the current level
    pub fn effect(&self) -> f32 {
        self.effect_at(self.level)
    }

    /// What buying the next level adds; `None` once maxed
    pub fn next_gain(&self) -> Option<f32> {
        (self.level < self.max_level).then(|| self.effect_at(self.level + 1) - self.effect())
    }

    fn effect_at(&self, level: u32) -> f32 {
        let level = level as f32;
        match self.id {
            PrestigeUpgradeId::MoneyPerLevel => 100.0 + level * 50.0,
            PrestigeUpgradeId::LaserPower => level * 2.0,
            PrestigeUpgradeId::GoldMultiplier => 1.0 + level * 0.5,
            PrestigeUpgradeId::BallDamage => 1.0 + level * 0.3,
        }
    }

    fn catalog() -> Vec<PrestigeUpgrade> {
        let entry = |id, cost, max_level| PrestigeUpgrade {
            id,
            cost,
            level: 0,
            max_level,
        };
        vec![
            entry(PrestigeUpgradeId::MoneyPerLevel, 5, 10),
            entry(PrestigeUpgradeId::LaserPower, 10, 5),
            entry(PrestigeUpgradeId::GoldMultiplier, 15, 8),
            entry(PrestigeUpgradeId::BallDamage, 8, 15),
        ]
    }
}

/// Shop stock for one special ball type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialBallStock {
    pub base_cost: u64,
    pub stock: u32,
    pub max_stock: u32,
    pub purchased: u32,
}

impl SpecialBallStock {
    fn new(base_cost: u64, max_stock: u32) -> Self {
        Self {
            base_cost,
            stock: 0,
            max_stock,
            purchased: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialBalls {
    pub plasma: SpecialBallStock,
    pub sniper: SpecialBallStock,
    pub poison: SpecialBallStock,
}

impl Default for SpecialBalls {
    fn default() -> Self {
        Self {
            plasma: SpecialBallStock::new(500, 10),
            sniper: SpecialBallStock::new(750, 8),
            poison: SpecialBallStock::new(1000, 6),
        }
    }
}

impl SpecialBalls {
    pub fn get(&self, kind: SpecialKind) -> &SpecialBallStock {
        match kind {
            SpecialKind::Plasma => &self.plasma,
            SpecialKind::Sniper => &self.sniper,
            SpecialKind::Poison => &self.poison,
        }
    }

    pub fn get_mut(&mut self, kind: SpecialKind) -> &mut SpecialBallStock {
        match kind {
            SpecialKind::Plasma => &mut self.plasma,
            SpecialKind::Sniper => &mut self.sniper,
            SpecialKind::Poison => &mut self.poison,
        }
    }
}

/// Coins a new game starts with (and prestige resets to)
pub const STARTING_COINS: f64 = 100.0;

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducible ball launches
    pub seed: u64,
    pub coins: f64,
    /// Current level (1-based)
    pub level: u32,
    pub golds: u32,
    pub balls: Vec<Ball>,
    pub blocks: Vec<Block>,
    pub upgrades: Upgrades,
    pub prestige: Prestige,
    pub prestige_upgrades: Vec<PrestigeUpgrade>,
    pub special_balls: SpecialBalls,
    /// Simulation active flag
    pub running: bool,
    /// 0-100
    pub volume: u8,
    /// Reward of the last completed level, until dismissed
    pub level_reward: Option<u64>,
    /// Next entity ID
    next_id: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            coins: STARTING_COINS,
            level: 1,
            golds: 0,
            balls: Vec::new(),
            blocks: Vec::new(),
            upgrades: Upgrades::default(),
            prestige: Prestige::default(),
            prestige_upgrades: PrestigeUpgrade::catalog(),
            special_balls: SpecialBalls::default(),
            running: true,
            volume: 50,
            level_reward: None,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// First ID that has not been handed out yet
    pub fn peek_next_id(&self) -> u32 {
        self.next_id
    }

    /// Make sure externally allocated IDs are never handed out again
    pub(crate) fn reserve_ids_through(&mut self, id: u32) {
        self.next_id = self.next_id.max(id.saturating_add(1));
    }

    /// Speed every non-homing ball is normalized to (pixels/tick)
    pub fn base_speed(&self, speed_per_level: f32) -> f32 {
        speed_per_level * self.upgrades.ball_speed as f32 * self.prestige.multipliers.speed
    }

    /// Damage a newly created ball will carry
    pub fn ball_power(&self) -> f32 {
        self.upgrades.ball_power as f32 * self.prestige.multipliers.damage
    }

    /// Damage of a manual click, never below 1
    pub fn click_damage(&self) -> f32 {
        (self.upgrades.click_power as f32 * self.prestige.multipliers.click_power)
            .floor()
            .max(1.0)
    }

    /// Add a ball at the spawn point with a small upward launch
    pub fn spawn_ball(&mut self, ball_type: BallType) -> u32 {
        let id = self.next_entity_id();
        let mut rng = Pcg32::seed_from_u64(self.seed ^ u64::from(id).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        let half = BALL_SPAWN_SPREAD / 2.0;
        let vel = Vec2::new(rng.random_range(-half..half), BALL_SPAWN_VY);
        self.balls
            .push(Ball::new(id, BALL_SPAWN, vel, self.ball_power(), ball_type));
        log::debug!("Spawned {:?} ball {}", ball_type, id);
        id
    }
}
