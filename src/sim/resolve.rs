//! Damage resolution
//!
//! Applies poison, ball impacts and clicks to the working block list. A block
//! whose health drops to zero is credited exactly once, ignored for the rest
//! of the pass and dropped by [`compact`].

use glam::Vec2;

use super::collision::{ball_block_overlap, click_hits_block, deflect_from_block, nearest_wall_point};
use super::particles::ParticleSystem;
use super::state::{Ball, BallKind, Block, Poison, SniperPhase, colors};
use crate::Canvas;
use crate::tuning::Tuning;

/// Rewards and counters accumulated over one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Sum of destroyed block values, before multipliers
    pub coins_earned: u64,
    pub gold_collected: bool,
    pub blocks_destroyed: u32,
    /// Ball-vs-block contacts (drives the hit sound)
    pub hits: u32,
}

impl Resolution {
    pub fn merge(&mut self, other: Resolution) {
        self.coins_earned += other.coins_earned;
        self.gold_collected |= other.gold_collected;
        self.blocks_destroyed += other.blocks_destroyed;
        self.hits += other.hits;
    }

    pub fn changed_blocks(&self) -> bool {
        self.coins_earned > 0 || self.gold_collected || self.blocks_destroyed > 0
    }
}

/// How a block met its end, which picks the celebration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cause {
    Impact,
    Splash,
    Poison,
}

/// Shared inputs for the collision pass
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub canvas: Canvas,
    pub base_speed: f32,
    pub tuning: &'a Tuning,
}

/// Tick every poisoned block once
pub fn apply_poison(
    blocks: &mut [Block],
    tuning: &Tuning,
    particles: &mut ParticleSystem,
) -> Resolution {
    let mut res = Resolution::default();
    let interval = tuning.damage.poison_interval.max(1);

    for block in blocks.iter_mut() {
        if block.is_destroyed() {
            continue;
        }
        let Some(mut poison) = block.poison else {
            continue;
        };
        if poison.ticks_remaining == 0 {
            block.poison = None;
            continue;
        }

        if poison.ticks_remaining % interval == 0 {
            block.health -= poison.damage;
        }
        poison.ticks_remaining -= 1;

        if poison.ticks_remaining % 5 == 0 {
            particles.burst(&tuning.particles, block.pos, colors::POISON, 1);
        }

        if block.is_destroyed() {
            credit(block, Cause::Poison, &mut res, tuning, particles);
        } else if poison.ticks_remaining == 0 {
            block.poison = None;
        } else {
            block.poison = Some(poison);
        }
    }

    res
}

/// Test every ball against every live block and apply the consequences
pub fn resolve_collisions(
    balls: &mut [Ball],
    blocks: &mut [Block],
    ctx: &ResolveContext,
    particles: &mut ParticleSystem,
) -> Resolution {
    let mut res = Resolution::default();
    let tuning = ctx.tuning;
    let radius = tuning.motion.ball_radius;

    for ball in balls.iter_mut() {
        for i in 0..blocks.len() {
            if blocks[i].is_destroyed() || !ball_block_overlap(ball.pos, radius, &blocks[i]) {
                continue;
            }
            res.hits += 1;

            let kind = ball.kind;
            match kind {
                BallKind::Plasma => plasma_blast(ball.power, i, blocks, tuning, particles, &mut res),
                BallKind::Sniper(SniperPhase::Tracking { target: Some(target) })
                    if target.block_id == blocks[i].id =>
                {
                    let wall = nearest_wall_point(ball.pos, ctx.canvas, tuning.sniper.wall_inset);
                    ball.kind = BallKind::Sniper(SniperPhase::ToWall { target, wall });
                    particles.burst(&tuning.particles, ball.pos, colors::SNIPER, 20);
                }
                BallKind::Poison if blocks[i].poison.is_none() => {
                    blocks[i].poison = Some(poison_for(ball.power, tuning));
                    particles.burst(&tuning.particles, blocks[i].pos, colors::POISON, 15);
                }
                _ => {}
            }

            let block = &mut blocks[i];
            block.health -= ball.power;
            particles.burst(&tuning.particles, block.pos, block.color(), 8);

            if !ball.kind.passes_through() {
                ball.vel = deflect_from_block(ball.pos, block.pos, ctx.base_speed);
            }

            if block.is_destroyed() {
                credit(block, Cause::Impact, &mut res, tuning, particles);
            }
        }
    }

    res
}

/// Apply a manual click at `point` to every block it lands on
pub fn resolve_click(
    point: Vec2,
    damage: f32,
    blocks: &mut [Block],
    tuning: &Tuning,
    particles: &mut ParticleSystem,
) -> Option<Resolution> {
    let mut res = Resolution::default();
    let mut hit = false;

    for block in blocks.iter_mut() {
        if block.is_destroyed() || !click_hits_block(point, block, tuning.damage.click_margin) {
            continue;
        }
        hit = true;
        block.health -= damage;
        particles.burst(&tuning.particles, point, colors::GOLD, 12);
        particles.burst(&tuning.particles, point, colors::WHITE, 8);

        if block.is_destroyed() {
            credit(block, Cause::Impact, &mut res, tuning, particles);
        }
    }

    hit.then_some(res)
}

/// Drop destroyed blocks, keeping the order of the rest
pub fn compact(blocks: &mut Vec<Block>) {
    blocks.retain(|b| !b.is_destroyed());
}

/// Damage-over-time attached by a poison ball of the given power
pub fn poison_for(power: f32, tuning: &Tuning) -> Poison {
    let damage = &tuning.damage;
    Poison {
        ticks_remaining: damage.poison_duration_ticks,
        damage: (power * damage.poison_fraction)
            .floor()
            .clamp(damage.poison_min_damage, damage.poison_max_damage),
    }
}

fn plasma_blast(
    power: f32,
    struck: usize,
    blocks: &mut [Block],
    tuning: &Tuning,
    particles: &mut ParticleSystem,
    res: &mut Resolution,
) {
    let center = blocks[struck].pos;
    let fx = &tuning.particles;
    particles.burst(fx, center, colors::PLASMA, 25);

    let splash = power * tuning.damage.plasma_splash;
    for (j, near) in blocks.iter_mut().enumerate() {
        if j == struck || near.is_destroyed() || near.pos.distance(center) > tuning.damage.plasma_radius {
            continue;
        }
        near.health -= splash;
        particles.burst(fx, near.pos, colors::PLASMA, 8);
        if near.is_destroyed() {
            credit(near, Cause::Splash, res, tuning, particles);
        }
    }
}

/// Book a freshly destroyed block and throw its particles
fn credit(
    block: &Block,
    cause: Cause,
    res: &mut Resolution,
    tuning: &Tuning,
    particles: &mut ParticleSystem,
) {
    res.coins_earned += block.value;
    res.blocks_destroyed += 1;

    let fx = &tuning.particles;
    let gold = block.is_gold();
    if gold {
        res.gold_collected = true;
    }

    let gold_burst = match (cause, gold) {
        (Cause::Splash, true) => 20,
        (Cause::Splash, false) => 0,
        (Cause::Poison, false) => 0,
        (_, true) if block.special_gold => 50,
        (_, true) => 30,
        (Cause::Impact, false) => 15,
    };
    if gold_burst > 0 {
        particles.burst(fx, block.pos, colors::GOLD, gold_burst);
    }

    let color_burst = match cause {
        Cause::Impact if block.special_gold => 25,
        Cause::Impact => 15,
        Cause::Splash | Cause::Poison => 12,
    };
    particles.burst(fx, block.pos, block.color(), color_burst);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::{ArchetypeId, lookup};
    use crate::sim::state::{BallType, Target};

    const CANVAS: Canvas = Canvas::new(400.0, 500.0);

    fn block(id: u32, x: f32, y: f32, health: f32) -> Block {
        Block::new(id, Vec2::new(x, y), Vec2::new(40.0, 15.0), ArchetypeId::COMMON, health)
    }

    fn setup() -> (Tuning, ParticleSystem) {
        (Tuning::default(), ParticleSystem::with_capacity(10_000))
    }

    #[test]
    fn test_destroyed_block_credited_once() {
        let (tuning, mut particles) = setup();
        let ctx = ResolveContext {
            canvas: CANVAS,
            base_speed: 4.0,
            tuning: &tuning,
        };
        let mut target = Block::new(1, Vec2::new(200.0, 200.0), Vec2::new(40.0, 15.0), lookup("armored"), 2.0);
        target.value = 50;
        let mut blocks = vec![target];
        // Two balls overlapping the same block in the same tick
        let mut balls = vec![
            Ball::new(1, Vec2::new(200.0, 210.0), Vec2::new(0.0, -4.0), 5.0, BallType::Normal),
            Ball::new(2, Vec2::new(205.0, 210.0), Vec2::new(0.0, -4.0), 5.0, BallType::Normal),
        ];

        let res = resolve_collisions(&mut balls, &mut blocks, &ctx, &mut particles);

        assert_eq!(res.coins_earned, 50);
        assert_eq!(res.blocks_destroyed, 1);
        assert_eq!(res.hits, 1);
        // Second ball never touched the dead block
        assert_eq!(balls[1].vel, Vec2::new(0.0, -4.0));
        compact(&mut blocks);
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_bounce_away_from_center_at_base_speed() {
        let (tuning, mut particles) = setup();
        let ctx = ResolveContext {
            canvas: CANVAS,
            base_speed: 4.0,
            tuning: &tuning,
        };
        let mut blocks = vec![block(1, 200.0, 200.0, 100.0)];
        let mut balls = vec![Ball::new(1, Vec2::new(200.0, 212.0), Vec2::new(0.0, -4.0), 1.0, BallType::Normal)];

        resolve_collisions(&mut balls, &mut blocks, &ctx, &mut particles);

        assert!((balls[0].vel - Vec2::new(0.0, 4.0)).length() < 1e-5);
        assert_eq!(blocks[0].health, 99.0);
    }

    #[test]
    fn test_plasma_splash() {
        let (tuning, mut particles) = setup();
        let ctx = ResolveContext {
            canvas: CANVAS,
            base_speed: 4.0,
            tuning: &tuning,
        };
        let mut blocks = vec![
            block(1, 200.0, 200.0, 100.0),
            block(2, 260.0, 200.0, 100.0),
            block(3, 200.0, 280.0, 100.0),
            block(4, 290.0, 200.0, 100.0),
        ];
        let mut balls = vec![Ball::new(1, Vec2::new(200.0, 212.0), Vec2::new(0.0, -4.0), 10.0, BallType::Plasma)];

        let res = resolve_collisions(&mut balls, &mut blocks, &ctx, &mut particles);

        assert_eq!(res.hits, 1);
        assert_eq!(blocks[0].health, 90.0);
        // Within 80 of the struck block: 0.7 x power, once
        assert_eq!(blocks[1].health, 93.0);
        // Exactly on the radius still counts
        assert_eq!(blocks[2].health, 93.0);
        assert_eq!(blocks[3].health, 100.0);
    }

    #[test]
    fn test_plasma_splash_kills_are_credited() {
        let (tuning, mut particles) = setup();
        let ctx = ResolveContext {
            canvas: CANVAS,
            base_speed: 4.0,
            tuning: &tuning,
        };
        let mut gold = Block::new(2, Vec2::new(250.0, 200.0), Vec2::new(40.0, 15.0), ArchetypeId::GOLD, 5.0);
        gold.value = 50;
        let mut blocks = vec![block(1, 200.0, 200.0, 100.0), gold];
        let mut balls = vec![Ball::new(1, Vec2::new(200.0, 212.0), Vec2::new(0.0, -4.0), 10.0, BallType::Plasma)];

        let res = resolve_collisions(&mut balls, &mut blocks, &ctx, &mut particles);

        assert_eq!(res.coins_earned, 50);
        assert!(res.gold_collected);
        compact(&mut blocks);
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_poison_passes_through_and_attaches_once() {
        let (tuning, mut particles) = setup();
        let ctx = ResolveContext {
            canvas: CANVAS,
            base_speed: 4.0,
            tuning: &tuning,
        };
        let mut blocks = vec![block(1, 200.0, 200.0, 100.0)];
        let mut balls = vec![Ball::new(1, Vec2::new(200.0, 212.0), Vec2::new(0.0, -4.0), 30.0, BallType::Poison)];

        resolve_collisions(&mut balls, &mut blocks, &ctx, &mut particles);
        assert_eq!(balls[0].vel, Vec2::new(0.0, -4.0));
        let poison = blocks[0].poison.unwrap();
        assert_eq!(poison.ticks_remaining, 20);
        assert_eq!(poison.damage, 1.0);

        // Still overlapping next tick: direct damage again, poison not reset
        blocks[0].poison = Some(Poison {
            ticks_remaining: 7,
            damage: 1.0,
        });
        resolve_collisions(&mut balls, &mut blocks, &ctx, &mut particles);
        assert_eq!(blocks[0].poison.unwrap().ticks_remaining, 7);
        assert_eq!(blocks[0].health, 40.0);
    }

    #[test]
    fn test_poison_damage_clamped() {
        let tuning = Tuning::default();
        assert_eq!(poison_for(1.0, &tuning).damage, 1.0);
        assert_eq!(poison_for(39.0, &tuning).damage, 1.0);
        assert_eq!(poison_for(40.0, &tuning).damage, 2.0);
        assert_eq!(poison_for(1000.0, &tuning).damage, 2.0);
    }

    #[test]
    fn test_poison_cadence_and_clearing() {
        let (tuning, mut particles) = setup();
        let mut blocks = vec![block(1, 200.0, 200.0, 100.0)];
        blocks[0].poison = Some(poison_for(10.0, &tuning));

        let mut healths = Vec::new();
        for _ in 0..20 {
            assert!(blocks[0].poison.is_some());
            apply_poison(&mut blocks, &tuning, &mut particles);
            healths.push(blocks[0].health);
        }

        // Bites when the counter reads 18, 15, 12, 9, 6 and 3
        assert_eq!(blocks[0].health, 94.0);
        assert_eq!(healths[1], 100.0);
        assert_eq!(healths[2], 99.0);
        assert!(blocks[0].poison.is_none());

        apply_poison(&mut blocks, &tuning, &mut particles);
        assert_eq!(blocks[0].health, 94.0);
    }

    #[test]
    fn test_poison_kill_is_credited() {
        let (tuning, mut particles) = setup();
        let mut blocks = vec![block(1, 200.0, 200.0, 1.0)];
        blocks[0].poison = Some(Poison {
            ticks_remaining: 3,
            damage: 2.0,
        });

        let res = apply_poison(&mut blocks, &tuning, &mut particles);
        assert_eq!(res.coins_earned, 1);
        assert_eq!(res.blocks_destroyed, 1);
    }

    #[test]
    fn test_sniper_hit_on_target_heads_for_wall() {
        let (tuning, mut particles) = setup();
        let ctx = ResolveContext {
            canvas: CANVAS,
            base_speed: 4.0,
            tuning: &tuning,
        };
        let mut blocks = vec![block(1, 200.0, 60.0, 100.0)];
        let target = Target::of(&blocks[0]);
        let mut ball = Ball::new(1, Vec2::new(200.0, 72.0), Vec2::new(0.0, -5.2), 1.0, BallType::Sniper);
        ball.kind = BallKind::Sniper(SniperPhase::Tracking { target: Some(target) });
        let mut balls = vec![ball];

        resolve_collisions(&mut balls, &mut blocks, &ctx, &mut particles);

        assert_eq!(
            balls[0].kind,
            BallKind::Sniper(SniperPhase::ToWall {
                target,
                wall: Vec2::new(200.0, 20.0),
            })
        );
    }

    #[test]
    fn test_click_hits_with_margin() {
        let (tuning, mut particles) = setup();
        let mut blocks = vec![block(1, 200.0, 200.0, 3.0)];

        assert!(resolve_click(Vec2::new(300.0, 300.0), 1.0, &mut blocks, &tuning, &mut particles).is_none());

        let res = resolve_click(Vec2::new(226.0, 200.0), 1.0, &mut blocks, &tuning, &mut particles).unwrap();
        assert_eq!(res.coins_earned, 0);
        assert_eq!(blocks[0].health, 2.0);

        let res = resolve_click(Vec2::new(200.0, 200.0), 2.0, &mut blocks, &tuning, &mut particles).unwrap();
        assert_eq!(res.coins_earned, 1);
        assert_eq!(res.blocks_destroyed, 1);
    }
}
