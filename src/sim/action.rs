//! State transitions
//!
//! Every change to [`GameState`] goes through [`reduce`]. Purchases check
//! affordability here, so a UI can dispatch freely.

use super::state::{Ball, Block, GameState, PrestigeUpgradeId, STARTING_COINS, SpecialKind, UpgradeKind, Upgrades};
use super::tick::TickReport;
use crate::economy;

/// Something that happened to the game
#[derive(Debug, Clone)]
pub enum Action {
    /// Raw coins, scaled by the coin multipliers on the way in
    AddCoins(u64),
    AddGold,
    Upgrade(UpgradeKind),
    BuyBall,
    /// Buy one special ball and put it straight into play
    BuySpecialBall(SpecialKind),
    /// Deploy a special ball from stock
    UseSpecialBall(SpecialKind),
    RemoveBall(u32),
    UpdateBalls(Vec<Ball>),
    UpdateBlocks(Vec<Block>),
    /// Publish a simulation step in one go
    ApplyTick(TickReport),
    NextLevel,
    Prestige,
    BuyPrestigeUpgrade(PrestigeUpgradeId),
    ToggleRunning,
    SetVolume(i32),
    Reset,
    DismissLevelReward,
}

/// Apply an action, returning the next state
pub fn reduce(mut state: GameState, action: Action) -> GameState {
    match action {
        Action::AddCoins(amount) => add_coins(&mut state, amount),
        Action::AddGold => state.golds += 1,
        Action::Upgrade(kind) => {
            let cost = economy::upgrade_cost(kind, state.upgrades.level(kind));
            if state.coins >= cost {
                state.coins -= cost;
                *state.upgrades.level_mut(kind) += 1;
                log::debug!("Upgraded {:?} to {}", kind, state.upgrades.level(kind));
            }
        }
        Action::BuyBall => {
            let cost = economy::ball_cost(state.upgrades.ball_count);
            if state.coins >= cost {
                state.coins -= cost;
                state.upgrades.ball_count += 1;
                state.spawn_ball(super::state::BallType::Normal);
            }
        }
        Action::BuySpecialBall(kind) => {
            let shop = state.special_balls.get(kind);
            let cost = economy::special_ball_cost(shop);
            if state.coins >= cost && shop.stock < shop.max_stock {
                state.coins -= cost;
                let shop = state.special_balls.get_mut(kind);
                shop.stock += 1;
                shop.purchased += 1;
                deploy_special(&mut state, kind);
            }
        }
        Action::UseSpecialBall(kind) => deploy_special(&mut state, kind),
        Action::RemoveBall(id) => state.balls.retain(|b| b.id != id),
        Action::UpdateBalls(balls) => state.balls = balls,
        Action::UpdateBlocks(blocks) => set_blocks(&mut state, blocks),
        Action::ApplyTick(report) => {
            if let Some(balls) = report.balls {
                state.balls = balls;
            }
            set_blocks(&mut state, report.blocks);
            add_coins(&mut state, report.resolution.coins_earned);
            if report.resolution.gold_collected {
                state.golds += 1;
            }
        }
        Action::NextLevel => {
            let reward = economy::level_reward(state.level);
            log::info!("Level {} cleared, reward {} coins", state.level, reward);
            state.level += 1;
            state.coins += reward as f64;
            state.level_reward = Some(reward);
            state.blocks.clear();
        }
        Action::Prestige => {
            if state.golds < economy::PRESTIGE_GOLD_REQUIREMENT {
                return state;
            }
            let prestige = &mut state.prestige;
            prestige.level += 1;
            prestige.points += economy::prestige_points(state.level);
            let m = &mut prestige.multipliers;
            m.damage *= 1.5;
            m.coins *= 1.3;
            m.speed *= 1.2;
            m.click_power *= 1.4;
            log::info!(
                "Prestige {} at level {} ({} points)",
                prestige.level,
                state.level,
                prestige.points
            );

            state.coins = STARTING_COINS;
            state.level = 1;
            state.balls.clear();
            state.blocks.clear();
            state.upgrades = Upgrades::default();
            state.level_reward = None;
        }
        Action::BuyPrestigeUpgrade(id) => {
            let golds = state.golds;
            let Some(upgrade) = state.prestige_upgrades.iter_mut().find(|u| u.id == id) else {
                return state;
            };
            if upgrade.level >= upgrade.max_level || golds < upgrade.cost {
                return state;
            }
            state.golds -= upgrade.cost;
            upgrade.level += 1;
            upgrade.cost = economy::next_prestige_upgrade_cost(upgrade.cost);
            log::info!("Prestige upgrade {:?} now level {}", id, upgrade.level);
        }
        Action::ToggleRunning => state.running = !state.running,
        Action::SetVolume(volume) => state.volume = volume.clamp(0, 100) as u8,
        Action::Reset => {
            log::info!("Resetting game");
            let mut fresh = GameState::new(state.seed);
            fresh.volume = state.volume;
            fresh.reserve_ids_through(state.peek_next_id());
            return fresh;
        }
        Action::DismissLevelReward => state.level_reward = None,
    }
    state
}

fn add_coins(state: &mut GameState, amount: u64) {
    if amount == 0 {
        return;
    }
    state.coins +=
        amount as f64 * state.upgrades.coin_multiplier as f64 * state.prestige.multipliers.coins as f64;
}

fn set_blocks(state: &mut GameState, blocks: Vec<Block>) {
    if let Some(max_id) = blocks.iter().map(|b| b.id).max() {
        state.reserve_ids_through(max_id);
    }
    state.blocks = blocks;
}

fn deploy_special(state: &mut GameState, kind: SpecialKind) {
    let shop = state.special_balls.get_mut(kind);
    if shop.stock == 0 {
        return;
    }
    shop.stock -= 1;
    state.spawn_ball(kind.ball_type());
}
