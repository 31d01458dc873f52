//! Progress persistence
//!
//! A [`ProgressSnapshot`] is the small subset of [`GameState`] that survives a
//! page reload: level, coins, ball count, the main upgrades, prestige and
//! volume. Stores are plain key/value backends behind [`ProgressStore`].
//! Saving is driven by [`Autosave`] on a wall-clock interval, never by the
//! simulation tick.

use serde::{Deserialize, Serialize};

use crate::consts::AUTOSAVE_INTERVAL_MS;
use crate::sim::state::{BallType, GameState};

/// LocalStorage key holding the last snapshot
pub const SAVE_KEY: &str = "idle-breakout-save";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotUpgrades {
    pub ball_speed: u32,
    pub ball_power: u32,
    pub coin_multiplier: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMultipliers {
    pub speed: f32,
    pub power: f32,
    pub coins: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPrestige {
    pub level: u32,
    pub multipliers: SnapshotMultipliers,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSettings {
    pub volume: u8,
}

/// Saved progress, in the JSON shape the web build has always written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub level: u32,
    pub coins: f64,
    /// Number of balls in play
    pub balls: u32,
    pub upgrades: SnapshotUpgrades,
    pub prestige: SnapshotPrestige,
    pub settings: SnapshotSettings,
}

impl ProgressSnapshot {
    pub fn from_state(state: &GameState) -> Self {
        let m = &state.prestige.multipliers;
        Self {
            level: state.level,
            coins: state.coins,
            balls: state.balls.len() as u32,
            upgrades: SnapshotUpgrades {
                ball_speed: state.upgrades.ball_speed,
                ball_power: state.upgrades.ball_power,
                coin_multiplier: state.upgrades.coin_multiplier,
            },
            prestige: SnapshotPrestige {
                level: state.prestige.level,
                multipliers: SnapshotMultipliers {
                    speed: m.speed,
                    power: m.damage,
                    coins: m.coins,
                },
            },
            settings: SnapshotSettings {
                volume: state.volume,
            },
        }
    }

    /// Overwrite the saved fields of `state`
    ///
    /// Blocks are dropped so the level regenerates for the restored level
    /// number. Balls are re-spawned as normal balls at the spawn point.
    pub fn restore(&self, state: &mut GameState) {
        state.level = self.level.max(1);
        state.coins = self.coins.max(0.0);
        state.upgrades.ball_speed = self.upgrades.ball_speed.max(1);
        state.upgrades.ball_power = self.upgrades.ball_power.max(1);
        state.upgrades.coin_multiplier = self.upgrades.coin_multiplier.max(1);
        state.prestige.level = self.prestige.level;
        state.prestige.multipliers.speed = self.prestige.multipliers.speed;
        state.prestige.multipliers.damage = self.prestige.multipliers.power;
        state.prestige.multipliers.coins = self.prestige.multipliers.coins;
        state.volume = self.settings.volume.min(100);

        state.blocks.clear();
        state.balls.clear();
        for _ in 0..self.balls {
            state.spawn_ball(BallType::Normal);
        }
        state.upgrades.ball_count = self.balls;
        state.level_reward = None;
        log::info!("Restored progress at level {} with {} balls", state.level, self.balls);
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Key/value backend for progress snapshots
pub trait ProgressStore {
    /// Last saved snapshot; unreadable data counts as no save
    fn load(&self) -> Option<ProgressSnapshot>;
    fn save(&mut self, snapshot: &ProgressSnapshot) -> Result<(), serde_json::Error>;
    fn clear(&mut self);
}

/// In-process store for native runs and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    json: Option<String>,
    saves: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves
    pub fn saves(&self) -> u32 {
        self.saves
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self) -> Option<ProgressSnapshot> {
        let json = self.json.as_deref()?;
        match ProgressSnapshot::from_json(json) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::warn!("Discarding unreadable save: {}", e);
                None
            }
        }
    }

    fn save(&mut self, snapshot: &ProgressSnapshot) -> Result<(), serde_json::Error> {
        self.json = Some(snapshot.to_json()?);
        self.saves += 1;
        Ok(())
    }

    fn clear(&mut self) {
        self.json = None;
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{ProgressSnapshot, ProgressStore, SAVE_KEY};

    /// Browser LocalStorage backend
    #[derive(Debug, Default)]
    pub struct LocalStorageStore;

    impl LocalStorageStore {
        fn storage() -> Option<web_sys::Storage> {
            web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten()
        }
    }

    impl ProgressStore for LocalStorageStore {
        fn load(&self) -> Option<ProgressSnapshot> {
            let json = Self::storage()?.get_item(SAVE_KEY).ok()??;
            match ProgressSnapshot::from_json(&json) {
                Ok(snapshot) => {
                    log::info!("Found saved game at level {}", snapshot.level);
                    Some(snapshot)
                }
                Err(e) => {
                    log::warn!("Discarding unreadable save: {}", e);
                    None
                }
            }
        }

        fn save(&mut self, snapshot: &ProgressSnapshot) -> Result<(), serde_json::Error> {
            let json = snapshot.to_json()?;
            if let Some(storage) = Self::storage() {
                let _ = storage.set_item(SAVE_KEY, &json);
                log::debug!("Game saved (level {})", snapshot.level);
            }
            Ok(())
        }

        fn clear(&mut self) {
            if let Some(storage) = Self::storage() {
                let _ = storage.remove_item(SAVE_KEY);
                log::info!("Saved game cleared");
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorageStore;

/// Wall-clock autosave timer
#[derive(Debug, Clone, Copy)]
pub struct Autosave {
    interval_ms: f64,
    last_ms: Option<f64>,
}

impl Default for Autosave {
    fn default() -> Self {
        Self::every(AUTOSAVE_INTERVAL_MS)
    }
}

impl Autosave {
    pub fn every(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    /// True when a save is due at `now_ms`; the first call only starts the clock
    pub fn due(&mut self, now_ms: f64) -> bool {
        let Some(last) = self.last_ms else {
            self.last_ms = Some(now_ms);
            return false;
        };
        if now_ms - last >= self.interval_ms {
            self.last_ms = Some(now_ms);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progressed_state() -> GameState {
        let mut state = GameState::new(7);
        state.level = 12;
        state.coins = 4321.5;
        state.upgrades.ball_speed = 3;
        state.upgrades.ball_power = 4;
        state.upgrades.coin_multiplier = 2;
        state.prestige.level = 1;
        state.prestige.multipliers.damage = 1.5;
        state.volume = 35;
        state.spawn_ball(BallType::Normal);
        state.spawn_ball(BallType::Normal);
        state
    }

    #[test]
    fn test_snapshot_json_shape() {
        let snapshot = ProgressSnapshot::from_state(&progressed_state());
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"ballSpeed\":3"));
        assert!(json.contains("\"coinMultiplier\":2"));
        assert!(json.contains("\"balls\":2"));
        assert!(json.contains("\"volume\":35"));
    }

    #[test]
    fn test_restore_into_fresh_state() {
        let snapshot = ProgressSnapshot::from_state(&progressed_state());
        let mut state = GameState::new(99);
        snapshot.restore(&mut state);

        assert_eq!(state.level, 12);
        assert_eq!(state.coins, 4321.5);
        assert_eq!(state.balls.len(), 2);
        assert_eq!(state.upgrades.ball_power, 4);
        assert_eq!(state.prestige.multipliers.damage, 1.5);
        assert!(state.blocks.is_empty());
        assert_eq!(state.volume, 35);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert!(store.load().is_none());

        let snapshot = ProgressSnapshot::from_state(&progressed_state());
        store.save(&snapshot).unwrap();
        assert_eq!(store.load(), Some(snapshot));
        assert_eq!(store.saves(), 1);

        store.clear();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_corrupt_save_is_ignored() {
        let store = MemoryStore {
            json: Some("{\"level\":".to_string()),
            saves: 0,
        };
        assert!(store.load().is_none());
    }

    #[test]
    fn test_autosave_interval() {
        let mut autosave = Autosave::default();
        assert!(!autosave.due(1_000.0));
        assert!(!autosave.due(10_999.0));
        assert!(autosave.due(11_000.0));
        assert!(!autosave.due(12_000.0));
        assert!(autosave.due(21_000.0));
    }
}
