//! Prices and payouts
//!
//! Pure formulas shared by the reducer and anything that wants to display a
//! price before the player commits.

use crate::sim::state::{SpecialBallStock, UpgradeKind};

/// Base price and growth factor of an upgrade track
pub fn upgrade_pricing(kind: UpgradeKind) -> (f64, f64) {
    match kind {
        UpgradeKind::BallSpeed => (25.0, 1.5),
        UpgradeKind::BallPower => (75.0, 1.8),
        UpgradeKind::ClickPower => (40.0, 1.6),
        UpgradeKind::CoinMultiplier => (100.0, 2.5),
        UpgradeKind::AutoClicker => (200.0, 3.0),
        UpgradeKind::OfflineEarnings => (500.0, 4.0),
    }
}

/// Price of the next level of an upgrade currently at `level`
pub fn upgrade_cost(kind: UpgradeKind, level: u32) -> f64 {
    let (base, mult) = upgrade_pricing(kind);
    (base * mult.powi(level as i32)).floor()
}

/// Price of the next normal ball after `ball_count` purchases
pub fn ball_cost(ball_count: u32) -> f64 {
    (50.0 * 2f64.powi(ball_count as i32)).floor()
}

/// Price of the next special ball of a type
pub fn special_ball_cost(stock: &SpecialBallStock) -> f64 {
    (stock.base_cost as f64 * 1.5f64.powi(stock.purchased as i32)).floor()
}

/// Bonus paid out for finishing `level`
pub fn level_reward(level: u32) -> u64 {
    (100.0 * 1.05f64.powi(level.saturating_sub(1) as i32)).floor() as u64
}

/// Prestige points granted for prestiging at `level`
pub fn prestige_points(level: u32) -> u32 {
    level / 10
}

/// Golds needed before prestige is allowed
pub const PRESTIGE_GOLD_REQUIREMENT: u32 = 5;

/// Gold price of the next prestige upgrade level after paying `cost`
pub fn next_prestige_upgrade_cost(cost: u32) -> u32 {
    (cost as f64 * 1.5).floor() as u32
}
