//! Falling items and the weighted drop table
//!
//! Every broken brick rolls on a weighted table. Most rolls land on the
//! plain coin; the interesting drops sit in the long tail. The spawner owns
//! its own seeded PCG stream so drop sequences replay exactly for a given
//! seed.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{ITEM_FALL_SPEED, ITEM_SIZE, ITEM_TEXTURE_SIZE};

use super::hitbox::Hitbox;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Coin,
    Heart,
    Diamond,
    FirstAid,
    DeathBall,
    ExtraBall,
    SteelWall,
    LaserGun,
    InvisibleBall,
    SoftBall,
    PaddleEnlarge,
    PaddleShrink,
}

impl ItemKind {
    pub const ALL: [ItemKind; 12] = [
        ItemKind::Coin,
        ItemKind::Heart,
        ItemKind::Diamond,
        ItemKind::FirstAid,
        ItemKind::DeathBall,
        ItemKind::ExtraBall,
        ItemKind::SteelWall,
        ItemKind::LaserGun,
        ItemKind::InvisibleBall,
        ItemKind::SoftBall,
        ItemKind::PaddleEnlarge,
        ItemKind::PaddleShrink,
    ];

    /// Relative drop weight. The coin dwarfs everything else on purpose.
    pub fn spawn_weight(self) -> f64 {
        match self {
            ItemKind::Coin => 400.0,
            ItemKind::Heart => 2.0,
            ItemKind::Diamond => 0.05,
            ItemKind::FirstAid => 0.09,
            ItemKind::DeathBall => 7.0,
            ItemKind::ExtraBall => 8.0,
            ItemKind::SteelWall => 6.0,
            ItemKind::LaserGun => 10.0,
            ItemKind::InvisibleBall => 0.9,
            ItemKind::SoftBall => 11.0,
            ItemKind::PaddleEnlarge => 12.0,
            ItemKind::PaddleShrink => 11.5,
        }
    }
}

/// An item falling toward the paddle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    pub hitbox: Hitbox,
    pub velocity: Vec2,
}

impl Item {
    pub fn new(kind: ItemKind, x: f32, y: f32) -> Self {
        let inset = (ITEM_TEXTURE_SIZE - ITEM_SIZE) / 2.0;
        Self {
            kind,
            hitbox: Hitbox::with_offset(x, y, Vec2::splat(inset), ITEM_SIZE, ITEM_SIZE),
            velocity: Vec2::new(0.0, ITEM_FALL_SPEED),
        }
    }
}

/// Weighted item drops backed by a dedicated RNG stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSpawner {
    rng: Pcg32,
    table: Vec<(ItemKind, f64)>,
    total_weight: f64,
}

impl ItemSpawner {
    pub fn new(seed: u64) -> Self {
        // Rarest first, so the cumulative walk reaches them before the
        // coin's weight swallows the roll.
        let mut table: Vec<(ItemKind, f64)> = ItemKind::ALL
            .iter()
            .map(|&kind| (kind, kind.spawn_weight()))
            .collect();
        table.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        let total_weight = table.iter().map(|(_, w)| w).sum();

        Self {
            rng: Pcg32::seed_from_u64(seed),
            table,
            total_weight,
        }
    }

    /// Roll the table and drop the resulting item at the given position.
    pub fn spawn(&mut self, x: f32, y: f32) -> Item {
        let roll = self.rng.random_range(0.0..self.total_weight - 1.0);

        let mut cumulative = 0.0;
        for &(kind, weight) in &self.table {
            cumulative += weight;
            if cumulative > roll {
                return Item::new(kind, x, y);
            }
        }
        // Unreachable while the table is non-empty; the coin closes it out.
        Item::new(ItemKind::Coin, x, y)
    }
}
