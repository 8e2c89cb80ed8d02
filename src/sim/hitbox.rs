//! Axis-aligned hitboxes and the support-point query
//!
//! Every object in the field collides through an axis-aligned rectangle: a
//! world position plus a hitbox offset and size. The offset decouples the
//! sprite rectangle from the collision rectangle (the ball sprite is 32x32
//! but only the inner 20x20 collides).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Anything GJK/EPA can collide: a convex shape answering
/// farthest-point-in-direction queries.
///
/// The support function is the only geometric primitive the collision
/// engine needs; any convex polygon could implement it, though every shape
/// in this game reduces to an axis-aligned rectangle.
pub trait Convex {
    /// Center of the shape, used to seed the GJK search direction.
    fn center(&self) -> Vec2;

    /// The vertex farthest along `direction`. Ties go to the earliest
    /// corner in scan order (top-left, top-right, bottom-left,
    /// bottom-right): the comparison is strictly-greater.
    fn farthest_point(&self, direction: Vec2) -> Vec2;
}

/// An axis-aligned collision rectangle positioned in the field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    /// World position (top-left of the owning sprite)
    pub position: Vec2,
    /// Offset from `position` to the collision rect's top-left
    pub offset: Vec2,
    /// Extent of the collision rect; components are non-negative
    pub size: Vec2,
}

impl Hitbox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            offset: Vec2::ZERO,
            size: Vec2::new(width, height),
        }
    }

    /// A hitbox whose collision rect is inset from the sprite position.
    pub fn with_offset(x: f32, y: f32, offset: Vec2, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            offset,
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn top_left(&self) -> Vec2 {
        self.position + self.offset
    }

    #[inline]
    pub fn top_right(&self) -> Vec2 {
        self.top_left() + Vec2::new(self.size.x, 0.0)
    }

    #[inline]
    pub fn bottom_left(&self) -> Vec2 {
        self.top_left() + Vec2::new(0.0, self.size.y)
    }

    #[inline]
    pub fn bottom_right(&self) -> Vec2 {
        self.top_left() + self.size
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}

impl Convex for Hitbox {
    fn center(&self) -> Vec2 {
        self.top_left() + self.size * 0.5
    }

    fn farthest_point(&self, direction: Vec2) -> Vec2 {
        let mut best = self.top_left();
        let mut max = direction.dot(best);

        for corner in [self.top_right(), self.bottom_left(), self.bottom_right()] {
            let proj = direction.dot(corner);
            if proj > max {
                best = corner;
                max = proj;
            }
        }

        best
    }
}
