//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies
//!
//! The collision pipeline runs synchronously inside one tick: GJK confirms
//! overlap, EPA computes penetration depth and normal, and the resolution
//! policy corrects position and reflects velocity. Nothing here suspends or
//! locks; the host must not mutate state mid-tick.

pub mod epa;
pub mod gjk;
pub mod hitbox;
pub mod items;
pub mod quadtree;
pub mod resolve;
pub mod state;
pub mod tick;

pub use epa::Penetration;
pub use gjk::{Simplex, Winding, contact, intersects, minkowski_support};
pub use hitbox::{Convex, Hitbox};
pub use items::{Item, ItemKind, ItemSpawner};
pub use quadtree::{BallSweep, InsertOutcome, QuadTree};
pub use resolve::{BouncePolicy, reflect, resolve_bounce};
pub use state::{
    Ball, BallState, Brick, GameEvent, GamePhase, GameState, Laser, Paddle,
};
pub use tick::{TickInput, tick};
