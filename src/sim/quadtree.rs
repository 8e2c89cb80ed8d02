//! Quadtree spatial partition for the brick field
//!
//! The field holds up to 600 bricks; testing every ball against every brick
//! each tick would be wasteful. Bricks live in a quadtree whose nodes
//! subdivide once they exceed [`QUADTREE_CAPACITY`] fully-contained bricks.
//! A brick straddling a child boundary is promoted back to the parent node
//! instead of being duplicated across children.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::QUADTREE_CAPACITY;

use super::epa::Penetration;
use super::gjk::{contact, intersects};
use super::hitbox::Hitbox;
use super::state::{Brick, GameEvent};

/// Result of pushing a brick into a node. The non-stored variants hand the
/// brick back to the caller.
#[derive(Debug)]
pub enum InsertOutcome {
    /// The brick is stored in this node or one of its descendants.
    Succeeded,
    /// The brick overlaps this node's region but is not fully contained;
    /// the caller decides where it lives.
    Overflow(Brick),
    /// The brick does not touch this node's region at all.
    Failed(Brick),
}

/// Accumulated result of sweeping one ball through the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BallSweep {
    /// Sum of `depth * normal` over every brick contact this sweep.
    pub correction: Vec2,
    /// The contact with the greatest penetration depth; its normal drives
    /// the single velocity reflection.
    pub deepest: Option<Penetration>,
    pub hits: u32,
}

/// A capacity-bounded quadtree node owning the bricks inside its region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuadTree {
    region: Hitbox,
    children: Option<Box<[QuadTree; 4]>>,
    bricks: Vec<Brick>,
}

impl QuadTree {
    pub fn new(region: Hitbox) -> Self {
        Self {
            region,
            children: None,
            bricks: Vec::new(),
        }
    }

    pub fn region(&self) -> &Hitbox {
        &self.region
    }

    /// Insert a brick into the subtree rooted here.
    ///
    /// Containment is judged by penetration depth: a brick penetrating the
    /// region by less than its own smallest dimension sticks out across the
    /// boundary and is returned as [`InsertOutcome::Overflow`].
    pub fn insert(&mut self, brick: Brick) -> InsertOutcome {
        let Some(pen) = contact(&self.region, &brick.hitbox) else {
            return InsertOutcome::Failed(brick);
        };
        if pen.depth < brick.hitbox.size.min_element() {
            return InsertOutcome::Overflow(brick);
        }

        if self.children.is_none() {
            if self.bricks.len() < QUADTREE_CAPACITY {
                self.bricks.push(brick);
                return InsertOutcome::Succeeded;
            }
            self.subdivide();
        }

        self.place_in_children(brick)
    }

    /// Store a brick at this node unconditionally. Used at the root for
    /// bricks that straddle the root region's boundary.
    pub fn hold(&mut self, brick: Brick) {
        self.bricks.push(brick);
    }

    /// Offer the brick to each child in turn. A child reporting overflow
    /// means the brick straddles that child's boundary, so it stays here.
    fn place_in_children(&mut self, brick: Brick) -> InsertOutcome {
        let Self {
            children, bricks, ..
        } = self;
        let Some(children) = children.as_deref_mut() else {
            return InsertOutcome::Failed(brick);
        };

        let mut brick = brick;
        for child in children.iter_mut() {
            match child.insert(brick) {
                InsertOutcome::Succeeded => return InsertOutcome::Succeeded,
                InsertOutcome::Overflow(b) => {
                    bricks.push(b);
                    return InsertOutcome::Succeeded;
                }
                InsertOutcome::Failed(b) => brick = b,
            }
        }
        InsertOutcome::Failed(brick)
    }

    /// Split the region into four equal quadrants and redistribute the
    /// bricks held here. Bricks straddling a quadrant boundary come back
    /// and stay at this node.
    fn subdivide(&mut self) {
        let half = self.region.size * 0.5;
        let origin = self.region.top_left();
        let quadrant = |dx: f32, dy: f32| {
            QuadTree::new(Hitbox::new(
                origin.x + dx * half.x,
                origin.y + dy * half.y,
                half.x,
                half.y,
            ))
        };
        // Attempt order: NW, SW, NE, SE.
        self.children = Some(Box::new([
            quadrant(0.0, 0.0),
            quadrant(0.0, 1.0),
            quadrant(1.0, 0.0),
            quadrant(1.0, 1.0),
        ]));

        for brick in std::mem::take(&mut self.bricks) {
            if let InsertOutcome::Failed(b) = self.place_in_children(brick) {
                // Numerically on the region boundary; keep it here.
                self.bricks.push(b);
            }
        }
    }

    /// Sweep a ball hitbox through the tree, damaging every overlapping
    /// brick and accumulating the positional correction.
    ///
    /// Bricks reduced to zero health are removed and reported through
    /// `events` so the caller can award points and roll for item drops.
    pub fn check_ball(
        &mut self,
        ball: &Hitbox,
        power: u8,
        events: &mut Vec<GameEvent>,
    ) -> BallSweep {
        let mut sweep = BallSweep::default();
        if intersects(&self.region, ball) {
            self.sweep_ball(ball, power, events, &mut sweep);
        }
        sweep
    }

    fn sweep_ball(
        &mut self,
        ball: &Hitbox,
        power: u8,
        events: &mut Vec<GameEvent>,
        sweep: &mut BallSweep,
    ) {
        self.bricks.retain_mut(|brick| {
            let Some(pen) = contact(&brick.hitbox, ball) else {
                return true;
            };

            sweep.correction += pen.depth * pen.normal;
            sweep.hits += 1;
            if sweep.deepest.is_none_or(|d| pen.depth > d.depth) {
                sweep.deepest = Some(pen);
            }

            brick.damage(power);
            if brick.health == 0 {
                events.push(GameEvent::BrickBroken {
                    points: brick.points,
                    position: brick.hitbox.position,
                });
                false
            } else {
                events.push(GameEvent::BrickHit {
                    health: brick.health,
                });
                true
            }
        });

        if let Some(children) = self.children.as_deref_mut() {
            for child in children {
                if intersects(&child.region, ball) {
                    child.sweep_ball(ball, power, events, sweep);
                }
            }
        }
    }

    /// Destroy every brick a laser shot overlaps. Lasers punch through
    /// health outright. Returns true when the shot hit anything.
    pub fn check_laser(&mut self, shot: &Hitbox, events: &mut Vec<GameEvent>) -> bool {
        if !intersects(&self.region, shot) {
            return false;
        }

        let mut hit = false;
        self.bricks.retain(|brick| {
            if intersects(&brick.hitbox, shot) {
                events.push(GameEvent::BrickBroken {
                    points: brick.points,
                    position: brick.hitbox.position,
                });
                hit = true;
                false
            } else {
                true
            }
        });

        if let Some(children) = self.children.as_deref_mut() {
            for child in children {
                hit |= child.check_laser(shot, events);
            }
        }
        hit
    }

    /// Drop every brick and collapse all subdivisions.
    pub fn clear(&mut self) {
        self.children = None;
        self.bricks.clear();
    }

    /// Shift the whole tree horizontally. Used when the layout toggles
    /// between widescreen and narrow.
    pub fn translate_x(&mut self, dx: f32) {
        let delta = Vec2::new(dx, 0.0);
        self.region.translate(delta);
        for brick in &mut self.bricks {
            brick.hitbox.translate(delta);
        }
        if let Some(children) = self.children.as_deref_mut() {
            for child in children {
                child.translate_x(dx);
            }
        }
    }

    /// Bricks remaining in the subtree.
    pub fn brick_count(&self) -> usize {
        let mut count = self.bricks.len();
        if let Some(children) = self.children.as_deref() {
            for child in children {
                count += child.brick_count();
            }
        }
        count
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        match self.children.as_deref() {
            Some(children) => 1 + children.iter().map(QuadTree::depth).max().unwrap_or(0),
            None => 0,
        }
    }
}
