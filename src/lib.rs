//! Brickfield - a Breakout-style gameplay core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (GJK/EPA collision, quadtree brick
//!   field, bounce resolution, game state)
//!
//! Rendering, audio, input devices and persistence live in the host
//! application. The host feeds a [`sim::TickInput`] into [`sim::tick`]
//! once per fixed timestep, draws the resulting state, and drains
//! [`sim::state::GameState::events`] for sound/UI triggers.

pub mod sim;

pub use sim::state::GameState;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;

    /// Playing field dimensions (excludes splitter and sidebar)
    pub const FIELD_WIDTH: f32 = 720.0;
    pub const FIELD_HEIGHT: f32 = 720.0;
    /// Vertical extent reserved for the brick layout
    pub const BRICK_AREA_HEIGHT: f32 = 480.0;
    /// Decorative splitter column at the left field edge
    pub const SPLITTER_WIDTH: f32 = 24.0;
    /// Extra sidebar shown in widescreen layouts; the whole field shifts
    /// right by this much when widescreen is enabled
    pub const SIDEBAR_WIDTH: f32 = 256.0;

    /// Ball collision box (the sprite is `BALL_TEXTURE_SIZE` square)
    pub const BALL_SIZE: f32 = 20.0;
    pub const BALL_TEXTURE_SIZE: f32 = 32.0;
    /// Base ball speed; also the per-axis speed clamp after a bounce
    pub const BALL_SPEED: f32 = 220.0;

    /// Paddle base segment size; the hitbox widens in grow steps
    pub const PADDLE_WIDTH: f32 = 32.0;
    pub const PADDLE_HEIGHT: f32 = 40.0;
    /// Horizontal paddle speed toward the input target
    pub const PADDLE_SPEED: f32 = 600.0;

    /// Bricks are square and tile the field (30 x 20 grid)
    pub const BRICK_SIZE: f32 = 24.0;
    pub const MAX_BRICK_HEALTH: u8 = 5;

    /// Item collision box (the sprite is `ITEM_TEXTURE_SIZE` square)
    pub const ITEM_SIZE: f32 = 24.0;
    pub const ITEM_TEXTURE_SIZE: f32 = 32.0;
    pub const ITEM_FALL_SPEED: f32 = 100.0;
    /// Lifetime of timed item effects (power, visibility, steel wall)
    pub const EFFECT_DURATION: f32 = 10.0;

    pub const LASER_WIDTH: f32 = 16.0;
    pub const LASER_HEIGHT: f32 = 32.0;
    pub const LASER_SPEED: f32 = 250.0;
    /// Laser shots granted per laser-gun item
    pub const LASER_AMMO: u32 = 5;

    pub const START_HEALTH: u8 = 3;
    /// Score penalty for losing a ball
    pub const BALL_LOSS_PENALTY: u32 = 5;

    /// Maximum bricks a quadtree node holds before subdividing
    pub const QUADTREE_CAPACITY: usize = 16;
}

/// Left edge of the playing field for the given screen layout.
///
/// The field sits behind the splitter column; widescreen layouts add the
/// sidebar in front of it.
#[inline]
pub fn field_left(widescreen: bool) -> f32 {
    if widescreen {
        consts::SIDEBAR_WIDTH + consts::SPLITTER_WIDTH
    } else {
        consts::SPLITTER_WIDTH
    }
}
