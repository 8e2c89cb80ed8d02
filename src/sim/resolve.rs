//! Bounce resolution
//!
//! A ball can overlap several bricks and a wall in the same tick. The
//! policy is: apply the summed positional corrections from every contact,
//! then reflect the velocity once off the deepest contact's normal, then
//! clamp each velocity axis so stacked contacts cannot fling the ball.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::BALL_SPEED;

use super::epa::Penetration;
use super::hitbox::{Convex, Hitbox};
use super::state::Ball;

/// Tuning knobs for contact resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BouncePolicy {
    /// Ignore contacts whose penetration search did not converge instead
    /// of bouncing off the best-effort normal. Off by default: a slightly
    /// wrong bounce reads better in play than a ball tunneling through.
    pub skip_unconverged: bool,
}

/// Mirror `velocity` across the plane with unit normal `normal`.
#[inline]
pub fn reflect(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Clamp each velocity axis to `[-max, max]`.
#[inline]
pub fn clamp_speed(velocity: Vec2, max: f32) -> Vec2 {
    velocity.clamp(Vec2::splat(-max), Vec2::splat(max))
}

/// Resolve one tick's worth of accumulated contacts on a ball.
///
/// `correction` is the summed minimum-translation vector over every
/// contact; `deepest` is the single contact with the greatest penetration.
/// The velocity reflects only when it points into the contact, so a ball
/// already leaving the surface is not bounced back in.
pub fn resolve_bounce(
    ball: &mut Ball,
    correction: Vec2,
    deepest: Penetration,
    policy: BouncePolicy,
) {
    if policy.skip_unconverged && !deepest.converged {
        return;
    }

    ball.hitbox.translate(correction);
    if ball.velocity.dot(deepest.normal) <= 0.0 {
        ball.velocity = reflect(ball.velocity, deepest.normal);
    }
    ball.velocity = clamp_speed(ball.velocity, BALL_SPEED);
}

/// Paddle contacts steer instead of mirroring: after the reflection the
/// horizontal velocity is overridden in proportion to how far off-center
/// the ball struck, reaching full speed at the paddle's edge.
pub fn paddle_bounce(ball: &mut Ball, paddle: &Hitbox, pen: Penetration) {
    ball.hitbox.translate(pen.depth * pen.normal);
    if ball.velocity.dot(pen.normal) <= 0.0 {
        ball.velocity = reflect(ball.velocity, pen.normal);
    }

    let offset = (ball.hitbox.center() - paddle.center()) / (paddle.size * 0.5);
    ball.velocity.x = offset.x * BALL_SPEED;
    ball.velocity = clamp_speed(ball.velocity, BALL_SPEED);
}
