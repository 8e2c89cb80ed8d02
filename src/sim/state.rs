//! Game state and core simulation types
//!
//! Everything that must be persisted for save/resume and determinism lives
//! here. The tick loop in [`super::tick`] mutates this state in place.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::field_left;

use super::hitbox::{Convex, Hitbox};
use super::items::{Item, ItemKind, ItemSpawner};
use super::quadtree::{InsertOutcome, QuadTree};
use super::resolve::BouncePolicy;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball attached to paddle, waiting for launch input
    Serve,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Every brick destroyed; waiting for the next level
    Cleared,
    /// Run ended
    GameOver,
}

/// One-tick gameplay events, drained by the host for sound and UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    BrickHit { health: u8 },
    BrickBroken { points: u32, position: Vec2 },
    WallHit,
    PaddleHit,
    BallLost,
    ItemCaught { kind: ItemKind },
    ItemMissed { kind: ItemKind },
    LaserFired,
    EffectExpired,
    LevelCleared,
    GameOver,
}

/// Ball state - attached to paddle or free-moving
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BallState {
    /// Ball rests on the paddle at a horizontal offset from its center
    Attached { offset: f32 },
    /// Ball is free-moving
    Free,
}

/// A ball entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub hitbox: Hitbox,
    pub velocity: Vec2,
    pub state: BallState,
}

impl Ball {
    pub fn new(x: f32, y: f32) -> Self {
        let inset = (BALL_TEXTURE_SIZE - BALL_SIZE) / 2.0;
        Self {
            hitbox: Hitbox::with_offset(x, y, Vec2::splat(inset), BALL_SIZE, BALL_SIZE),
            velocity: Vec2::ZERO,
            state: BallState::Attached { offset: 0.0 },
        }
    }

    /// Snap an attached ball onto the paddle's top edge.
    pub fn update_attached(&mut self, paddle: &Paddle) {
        if let BallState::Attached { offset } = self.state {
            let top = paddle.hitbox.top_left();
            self.hitbox.position = Vec2::new(
                paddle.hitbox.center().x + offset - BALL_TEXTURE_SIZE / 2.0,
                top.y - BALL_TEXTURE_SIZE + self.hitbox.offset.y,
            );
        }
    }

    /// Launch the ball straight up from the attached state.
    pub fn launch(&mut self) {
        if matches!(self.state, BallState::Attached { .. }) {
            self.velocity = Vec2::new(0.0, -BALL_SPEED);
            self.state = BallState::Free;
        }
    }
}

/// The player's paddle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub hitbox: Hitbox,
    /// Laser shots remaining from laser-gun pickups
    pub laser_shots: u32,
    /// Width step, 0..=6 in increments of 2; 2 is the starting size
    grow: u8,
}

/// Width gained or lost per grow step pair
const GROW_WIDTH: f32 = 60.0;

const GROW_BASE: u8 = 2;
const GROW_MAX: u8 = 6;

impl Paddle {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            hitbox: Hitbox::new(x, y, Self::width_for(GROW_BASE), PADDLE_HEIGHT),
            laser_shots: 0,
            grow: GROW_BASE,
        }
    }

    fn width_for(grow: u8) -> f32 {
        PADDLE_WIDTH * (grow as f32 + 1.0) - 2.0 * grow as f32
    }

    pub fn width(&self) -> f32 {
        self.hitbox.size.x
    }

    /// Widen by one step, growing symmetrically around the center.
    pub fn grow(&mut self) {
        if self.grow < GROW_MAX {
            self.grow += 2;
            self.hitbox.size.x += GROW_WIDTH;
            self.hitbox.position.x -= GROW_WIDTH / 2.0;
        }
    }

    /// Narrow by one step, down to the bare 32-pixel segment.
    pub fn shrink(&mut self) {
        if self.grow > 0 {
            self.grow -= 2;
            self.hitbox.size.x -= GROW_WIDTH;
            self.hitbox.position.x += GROW_WIDTH / 2.0;
        }
    }

    /// Step toward a target center-x at the given speed.
    pub fn move_toward(&mut self, target_x: f32, dt: f32, max_speed: f32) {
        let delta = target_x - self.hitbox.center().x;
        let max_delta = max_speed * dt;
        self.hitbox.position.x += delta.clamp(-max_delta, max_delta);
    }

    /// Keep the paddle inside the field.
    pub fn clamp_to(&mut self, left: f32, right: f32) {
        let max_x = right - self.hitbox.size.x;
        self.hitbox.position.x = self.hitbox.position.x.clamp(left, max_x.max(left));
    }
}

/// A brick in the field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    pub hitbox: Hitbox,
    pub health: u8,
    pub points: u32,
}

impl Brick {
    pub fn new(x: f32, y: f32, health: u8) -> Self {
        Self {
            hitbox: Hitbox::new(x, y, BRICK_SIZE, BRICK_SIZE),
            health,
            points: health as u32,
        }
    }

    /// Decode a brick from a level-bitmap pixel. Only the five exact layout
    /// colors produce bricks; anything else is empty space.
    pub fn from_color(x: f32, y: f32, red: u8, green: u8, blue: u8) -> Option<Self> {
        let health = match (red, green, blue) {
            (0, 255, 0) => 1,
            (0, 0, 255) => 2,
            (255, 255, 0) => 3,
            (255, 0, 0) => 4,
            (255, 255, 255) => MAX_BRICK_HEALTH,
            _ => return None,
        };
        Some(Self::new(x, y, health))
    }

    /// Apply ball power. Power 0 (soft ball) bounces without damage.
    pub fn damage(&mut self, power: u8) {
        self.health = self.health.saturating_sub(power);
    }
}

/// A laser shot traveling up from the paddle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Laser {
    pub hitbox: Hitbox,
    pub velocity: Vec2,
}

impl Laser {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            hitbox: Hitbox::new(x, y, LASER_WIDTH, LASER_HEIGHT),
            velocity: Vec2::new(0.0, -LASER_SPEED),
        }
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Current phase
    pub phase: GamePhase,
    pub score: u32,
    /// Lives remaining
    pub health: u8,
    /// Whether the sidebar layout is active (shifts the field right)
    pub widescreen: bool,
    pub paddle: Paddle,
    pub balls: Vec<Ball>,
    pub items: Vec<Item>,
    pub lasers: Vec<Laser>,
    /// The brick field
    pub bricks: QuadTree,
    pub spawner: ItemSpawner,
    /// Damage every ball deals per brick contact (0 = soft, 3 = death ball)
    pub ball_power: u8,
    /// False while the invisible-ball effect runs
    pub balls_visible: bool,
    /// Steel wall across the bottom of the field
    pub wall_active: bool,
    pub power_timer: f32,
    pub visibility_timer: f32,
    pub wall_timer: f32,
    pub bounce_policy: BouncePolicy,
    /// Events from the most recent tick (not persisted)
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state with the given seed and screen layout.
    pub fn new(seed: u64, widescreen: bool) -> Self {
        let left = field_left(widescreen);
        let brick_area = Hitbox::new(left, 0.0, FIELD_WIDTH, BRICK_AREA_HEIGHT);
        let paddle = Paddle::new(
            left + (FIELD_WIDTH - Paddle::width_for(GROW_BASE)) / 2.0,
            FIELD_HEIGHT - 60.0,
        );

        let mut state = Self {
            seed,
            phase: GamePhase::Serve,
            score: 0,
            health: START_HEALTH,
            widescreen,
            paddle,
            balls: Vec::new(),
            items: Vec::new(),
            lasers: Vec::new(),
            bricks: QuadTree::new(brick_area),
            spawner: ItemSpawner::new(seed),
            ball_power: 1,
            balls_visible: true,
            wall_active: false,
            power_timer: 0.0,
            visibility_timer: 0.0,
            wall_timer: 0.0,
            bounce_policy: BouncePolicy::default(),
            events: Vec::new(),
        };
        state.spawn_ball_attached();
        state
    }

    /// Place a brick decoded from a level-bitmap pixel. Bricks the tree
    /// cannot fully contain are held at the root; pixels outside the brick
    /// area are dropped.
    pub fn add_brick(&mut self, x: f32, y: f32, red: u8, green: u8, blue: u8) {
        let Some(brick) = Brick::from_color(x, y, red, green, blue) else {
            return;
        };
        match self.bricks.insert(brick) {
            InsertOutcome::Succeeded => {}
            InsertOutcome::Overflow(b) => self.bricks.hold(b),
            InsertOutcome::Failed(b) => {
                log::warn!(
                    "brick at ({}, {}) lies outside the brick area, skipping",
                    b.hitbox.position.x,
                    b.hitbox.position.y
                );
            }
        }
    }

    /// Spawn a ball attached to the paddle.
    pub fn spawn_ball_attached(&mut self) {
        let mut ball = Ball::new(0.0, 0.0);
        ball.update_attached(&self.paddle);
        self.balls.push(ball);
    }

    /// Add two extra balls splitting off the lead ball's path.
    pub fn split_balls(&mut self) {
        if self.balls.is_empty() {
            self.spawn_ball_attached();
        }
        let lead = self.balls[0];
        for i in 0..2 {
            let mut ball = lead;
            ball.state = BallState::Free;
            ball.velocity = if i == 0 {
                Vec2::new(lead.velocity.x, -lead.velocity.y)
            } else {
                Vec2::new(-lead.velocity.x, lead.velocity.y)
            };
            self.balls.push(ball);
        }
    }

    /// Toggle the sidebar layout, shifting every field entity sideways.
    pub fn set_widescreen(&mut self, widescreen: bool) {
        if self.widescreen == widescreen {
            return;
        }
        let dx = if widescreen {
            SIDEBAR_WIDTH
        } else {
            -SIDEBAR_WIDTH
        };
        let delta = Vec2::new(dx, 0.0);

        self.bricks.translate_x(dx);
        self.paddle.hitbox.translate(delta);
        for ball in &mut self.balls {
            ball.hitbox.translate(delta);
        }
        for item in &mut self.items {
            item.hitbox.translate(delta);
        }
        for laser in &mut self.lasers {
            laser.hitbox.translate(delta);
        }
        self.widescreen = widescreen;
    }

    /// Apply a caught item's effect.
    pub fn apply_item(&mut self, kind: ItemKind) {
        match kind {
            ItemKind::Coin => self.score += 25,
            ItemKind::Heart => self.health = self.health.saturating_add(1),
            ItemKind::Diamond => self.score += 1000,
            ItemKind::FirstAid => self.health = self.health.max(START_HEALTH),
            ItemKind::DeathBall => {
                self.ball_power = 3;
                self.power_timer = 0.0;
            }
            ItemKind::ExtraBall => self.split_balls(),
            ItemKind::SteelWall => {
                self.wall_active = true;
                self.wall_timer = 0.0;
            }
            ItemKind::LaserGun => self.paddle.laser_shots += LASER_AMMO,
            ItemKind::InvisibleBall => {
                self.balls_visible = false;
                self.visibility_timer = 0.0;
            }
            ItemKind::SoftBall => {
                self.ball_power = 0;
                self.power_timer = 0.0;
            }
            ItemKind::PaddleEnlarge => self.paddle.grow(),
            ItemKind::PaddleShrink => self.paddle.shrink(),
        }
    }

    /// Field boundary hitboxes: left, top, right walls and the bottom
    /// death zone, in that order.
    pub fn field_borders(&self) -> [Hitbox; 4] {
        let left = field_left(self.widescreen);
        [
            Hitbox::new(left - 32.0, -32.0, 32.0, FIELD_HEIGHT + 64.0),
            Hitbox::new(left - 32.0, -32.0, FIELD_WIDTH + 64.0, 32.0),
            Hitbox::new(left + FIELD_WIDTH, -32.0, 32.0, FIELD_HEIGHT + 64.0),
            Hitbox::new(left - 32.0, FIELD_HEIGHT, FIELD_WIDTH + 64.0, 64.0),
        ]
    }

    /// Index of the death zone in [`Self::field_borders`].
    pub const DEATH_BORDER: usize = 3;

    /// The temporary floor spawned by the steel-wall item.
    pub fn steel_wall(&self) -> Hitbox {
        let left = field_left(self.widescreen);
        Hitbox::new(left, FIELD_HEIGHT - 16.0, FIELD_WIDTH, 16.0)
    }

    /// Reset timed item effects to their neutral values.
    pub fn reset_effects(&mut self) {
        self.ball_power = 1;
        self.balls_visible = true;
        self.wall_active = false;
        self.power_timer = 0.0;
        self.visibility_timer = 0.0;
        self.wall_timer = 0.0;
    }
}
