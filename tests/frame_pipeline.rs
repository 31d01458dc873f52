//! End-to-end checks of the frame pipeline: level generation, ticks, rewards
//! and publication through the store, driven headlessly.

use block_idle::consts::SIM_DT;
use block_idle::economy;
use block_idle::sim::catalog::ArchetypeId;
use block_idle::sim::{
    Action, Ball, BallType, Block, GameState, Simulation, SpecialKind, TickInput, generate_level, reduce,
};
use block_idle::{Canvas, Game, Settings, Tuning};
use glam::Vec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

fn quiet_tuning() -> Tuning {
    let mut tuning = Tuning::default();
    tuning.loops.check_chance = 0.0;
    tuning.loops.sniper_check_chance = 0.0;
    tuning
}

fn block(state: &mut GameState, pos: Vec2, health: f32) -> Block {
    let id = state.next_entity_id();
    Block::new(id, pos, Vec2::new(40.0, 15.0), ArchetypeId::COMMON, health)
}

fn ball(state: &mut GameState, pos: Vec2) -> Ball {
    let id = state.next_entity_id();
    Ball::new(id, pos, Vec2::new(0.0, -1.0), 1.0, BallType::Normal)
}

#[test]
fn level_twenty_has_one_boss_block() {
    let mut rng = Pcg32::seed_from_u64(20);
    let blocks = generate_level(20, Canvas::new(400.0, 500.0), &mut rng, 1).unwrap();

    assert_eq!(blocks.len(), 1);
    assert!(blocks[0].special_gold);
    assert_eq!(blocks[0].archetype, ArchetypeId::SPECIAL_GOLD);
    assert_eq!(blocks[0].health, 150.0);
}

#[test]
fn destroyed_block_pays_once_and_disappears() {
    let canvas = Canvas::new(400.0, 500.0);
    let mut sim = Simulation::new(3, quiet_tuning(), 200);
    let mut state = GameState::new(3);

    let mut target = block(&mut state, Vec2::new(200.0, 200.0), 1.0);
    target.value = 50;
    let target_id = target.id;
    let keeper = block(&mut state, Vec2::new(60.0, 60.0), 1000.0);
    state.blocks = vec![target, keeper];
    let hitter = ball(&mut state, Vec2::new(200.0, 201.0));
    state.balls = vec![hitter];

    let input = TickInput { canvas };
    let report = sim.tick(&state, &input).unwrap();
    assert_eq!(report.resolution.coins_earned, 50);
    assert_eq!(report.resolution.blocks_destroyed, 1);
    assert!(!report.level_completed);

    let coins = state.coins;
    let state = reduce(state, Action::ApplyTick(report));
    assert_eq!(state.coins, coins + 50.0);
    assert!(state.blocks.iter().all(|b| b.id != target_id));

    let report = sim.tick(&state, &input).unwrap();
    assert_eq!(report.resolution.coins_earned, 0);
    assert!(report.blocks.iter().all(|b| b.id != target_id));
}

#[test]
fn simultaneous_last_blocks_complete_the_level_once() {
    let canvas = Canvas::new(400.0, 500.0);
    let mut sim = Simulation::new(19, quiet_tuning(), 200);
    let mut state = GameState::new(19);
    state.level = 19;

    let a = block(&mut state, Vec2::new(100.0, 100.0), 1.0);
    let b = block(&mut state, Vec2::new(300.0, 100.0), 1.0);
    let expected = a.value + b.value;
    state.blocks = vec![a, b];
    let first = ball(&mut state, Vec2::new(100.0, 101.0));
    let second = ball(&mut state, Vec2::new(300.0, 101.0));
    state.balls = vec![first, second];

    let input = TickInput { canvas };
    let report = sim.tick(&state, &input).unwrap();
    assert_eq!(report.resolution.blocks_destroyed, 2);
    assert_eq!(report.resolution.coins_earned, expected);
    assert!(report.level_completed);

    let mut state = reduce(state, Action::ApplyTick(report));
    state = reduce(state, Action::NextLevel);
    assert_eq!(state.level, 20);
    assert_eq!(state.level_reward, Some(economy::level_reward(19)));

    // Until the next level is laid out, further ticks report nothing new
    for _ in 0..5 {
        let report = sim.tick(&state, &input).unwrap();
        assert!(!report.level_completed);
        state = reduce(state, Action::ApplyTick(report));
    }
    assert_eq!(state.level, 20);

    let blocks = sim.prepare_level(&state, canvas).unwrap();
    assert_eq!(blocks.iter().filter(|b| b.special_gold).count(), 1);
}

#[test]
fn same_seed_same_game() {
    let run = || {
        let mut game = Game::new(77, Tuning::default(), Settings::default());
        game.resize(Canvas::new(640.0, 480.0));
        game.dispatch(Action::AddCoins(5_000));
        game.dispatch(Action::BuyBall);
        game.dispatch(Action::BuyBall);
        game.dispatch(Action::BuySpecialBall(SpecialKind::Sniper));
        for _ in 0..300 {
            game.frame(SIM_DT);
        }
        game.click(Vec2::new(320.0, 100.0));
        let state = game.state();
        (
            state.coins,
            state.level,
            state.blocks.iter().map(|b| (b.id, b.health)).collect::<Vec<_>>(),
            state.balls.iter().map(|b| b.pos).collect::<Vec<_>>(),
        )
    };
    assert_eq!(run(), run());
}

#[test]
fn particle_setting_leaves_the_game_unchanged() {
    let run = |particles: bool| {
        let settings = Settings {
            particles,
            ..Settings::default()
        };
        let mut game = Game::new(77, Tuning::default(), settings);
        game.resize(Canvas::new(640.0, 480.0));
        game.dispatch(Action::AddCoins(5_000));
        game.dispatch(Action::BuyBall);
        game.dispatch(Action::BuySpecialBall(SpecialKind::Plasma));
        for _ in 0..600 {
            game.frame(SIM_DT);
        }
        if !particles {
            assert!(game.simulation().particles().is_empty());
        }
        let state = game.state();
        (
            state.balls.iter().map(|b| (b.pos, b.vel)).collect::<Vec<_>>(),
            state.blocks.iter().map(|b| (b.id, b.health)).collect::<Vec<_>>(),
            state.level,
            state.coins,
        )
    };
    assert_eq!(run(true), run(false));
}

#[test]
fn prestige_after_enough_golds() {
    let mut game = Game::new(9, quiet_tuning(), Settings::default());
    game.resize(Canvas::new(800.0, 600.0));
    game.frame(SIM_DT);
    for _ in 0..economy::PRESTIGE_GOLD_REQUIREMENT {
        game.dispatch(Action::AddGold);
    }
    game.dispatch(Action::AddCoins(1_000));
    game.dispatch(Action::Prestige);

    let state = game.state();
    assert_eq!(state.prestige.level, 1);
    assert_eq!(state.level, 1);
    assert!(state.blocks.is_empty());

    game.frame(SIM_DT);
    assert!(!game.state().blocks.is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn balls_stay_inside_at_base_speed(
        seed in any::<u64>(),
        width in 400.0f32..1000.0,
        height in 500.0f32..900.0,
        frames in 1usize..120,
    ) {
        let mut game = Game::new(seed, Tuning::default(), Settings::default());
        game.resize(Canvas::new(width, height));
        game.dispatch(Action::AddCoins(100_000));
        for _ in 0..3 {
            game.dispatch(Action::BuyBall);
        }
        game.dispatch(Action::BuySpecialBall(SpecialKind::Plasma));
        game.dispatch(Action::BuySpecialBall(SpecialKind::Poison));
        game.dispatch(Action::BuySpecialBall(SpecialKind::Sniper));

        for _ in 0..frames {
            game.frame(SIM_DT);
            let state = game.state();
            let base = state.base_speed(game.simulation().tuning.motion.speed_per_level);
            for ball in &state.balls {
                prop_assert!(ball.pos.x >= 0.0 && ball.pos.x <= width);
                prop_assert!(ball.pos.y >= 0.0 && ball.pos.y <= height);
                if ball.kind.ball_type() != BallType::Sniper {
                    prop_assert!((ball.speed() - base).abs() < 1e-3 * base.max(1.0));
                }
            }
            for block in &state.blocks {
                prop_assert!(!block.is_destroyed());
            }
        }
    }
}
