//! Level generation
//!
//! Lays out a grid of blocks sized to the canvas, or a single oversized gold
//! block on every 20th level.

use glam::Vec2;
use rand::Rng;

use super::catalog::{self, ArchetypeId};
use super::state::Block;
use crate::Canvas;

/// Chance that any given grid cell holds a block
const CELL_FILL_CHANCE: f64 = 0.9;

/// Grid metrics for one canvas size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub desktop: bool,
    pub block_size: Vec2,
    /// Offset of the first cell from the top-left corner
    pub margin: Vec2,
    pub usable: Vec2,
    pub cols: u32,
}

impl Layout {
    /// Metrics for `canvas`, or `None` before the canvas has been measured
    pub fn for_canvas(canvas: Canvas) -> Option<Self> {
        if canvas.width <= 0.0 || canvas.height <= 0.0 {
            return None;
        }
        let desktop = canvas.is_desktop();
        let block_size = if desktop {
            Vec2::new(
                (canvas.width / 12.0).clamp(40.0, 60.0),
                (canvas.height / 30.0).clamp(15.0, 20.0),
            )
        } else {
            Vec2::new(
                (canvas.width / 10.0).clamp(30.0, 45.0),
                (canvas.height / 35.0).clamp(10.0, 15.0),
            )
        };

        let (pad_x, pad_y, footer) = if desktop { (12.0, 20.0, 60.0) } else { (8.0, 15.0, 40.0) };
        let margin = Vec2::new(block_size.x / 2.0 + pad_x, block_size.y / 2.0 + pad_y);
        let usable = Vec2::new(
            canvas.width - margin.x * 2.0,
            canvas.height - margin.y - footer,
        );

        let (min_cols, col_gap) = if desktop { (8.0, 8.0) } else { (6.0, 6.0) };
        let cols = (usable.x / (block_size.x + col_gap)).floor().max(min_cols) as u32;

        Some(Self {
            desktop,
            block_size,
            margin,
            usable,
            cols,
        })
    }

    /// Row count for a level: more rows every three levels, up to what fits
    pub fn rows(&self, level: u32) -> u32 {
        let (min_rows, base_gap, tight_gap) = if self.desktop { (8.0, 8.0, 6.0) } else { (6.0, 6.0, 4.0) };
        let base = (self.usable.y / (self.block_size.y + base_gap)).floor().max(min_rows) as u32;
        let extra = level.saturating_sub(1) / 3;
        let fit = (self.usable.y / (self.block_size.y + tight_gap)).floor().max(0.0) as u32;
        (base + extra).min(fit)
    }

    /// Center of grid cell (`row`, `col`) when the grid has `rows` rows
    pub fn cell_center(&self, row: u32, col: u32, rows: u32) -> Vec2 {
        let spacing_x = self.usable.x / self.cols as f32;
        let spacing_y = if rows == 0 {
            self.block_size.y + 6.0
        } else {
            (self.block_size.y + 6.0).min(self.usable.y / rows as f32)
        };
        Vec2::new(
            self.margin.x + col as f32 * spacing_x + spacing_x / 2.0,
            self.margin.y + row as f32 * spacing_y + spacing_y / 2.0,
        )
    }
}

/// Every 20th level is a single boss block
#[inline]
pub fn is_special_gold_level(level: u32) -> bool {
    level >= 20 && level.is_multiple_of(20)
}

/// Health of the special gold block on `level`
pub fn special_gold_health(level: u32) -> f32 {
    100.0 + (level / 20) as f32 * 50.0
}

/// Archetype and starting health for an ordinary grid cell
///
/// Level 20 turns the whole grid gold at double health. Level 20 is also a
/// special-gold level, which wins, so the gold grid never shows up in play.
pub fn cell_archetype<R: Rng>(level: u32, rng: &mut R) -> (ArchetypeId, f32) {
    if level == 20 {
        let gold = ArchetypeId::GOLD;
        return (gold, gold.get().health as f32 * 2.0);
    }
    let pool = catalog::unlocked(level);
    let id = pool
        .get(rng.random_range(0..pool.len()))
        .copied()
        .unwrap_or(ArchetypeId::COMMON);
    (id, id.get().health as f32)
}

/// Generate the block set for `level`
///
/// Block IDs are allocated sequentially from `first_id`. Returns `None` when
/// the canvas has no size yet; the caller retries on a later frame.
pub fn generate_level<R: Rng>(level: u32, canvas: Canvas, rng: &mut R, first_id: u32) -> Option<Vec<Block>> {
    let layout = Layout::for_canvas(canvas)?;
    let mut next_id = first_id;
    let mut blocks = Vec::new();

    if is_special_gold_level(level) {
        let health = special_gold_health(level);
        blocks.push(Block::new(
            next_id,
            canvas.center(),
            Vec2::new(layout.block_size.x * 3.0, layout.block_size.y * 2.0),
            ArchetypeId::SPECIAL_GOLD,
            health,
        ));
        log::info!("Level {}: special gold block with {} health", level, health);
        return Some(blocks);
    }

    let rows = layout.rows(level);
    for row in 0..rows {
        for col in 0..layout.cols {
            if !rng.random_bool(CELL_FILL_CHANCE) {
                continue;
            }
            let (archetype, health) = cell_archetype(level, rng);
            let pos = layout.cell_center(row, col, rows);
            blocks.push(Block::new(next_id, pos, layout.block_size, archetype, health));
            next_id += 1;
        }
    }

    log::info!(
        "Level {}: {} blocks in {}x{} grid ({}x{} {})",
        level,
        blocks.len(),
        rows,
        layout.cols,
        layout.block_size.x,
        layout.block_size.y,
        if layout.desktop { "desktop" } else { "compact" },
    );
    Some(blocks)
}
