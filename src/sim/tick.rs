//! Fixed timestep simulation tick
//!
//! Core game loop that advances the simulation deterministically. Each tick
//! moves the paddle, integrates balls, lasers and items, runs the collision
//! pipeline against walls, paddle and the brick quadtree, and settles phase
//! transitions.

use glam::Vec2;

use crate::consts::*;
use crate::field_left;

use super::epa::Penetration;
use super::gjk::{contact, intersects};
use super::hitbox::Convex;
use super::items::ItemKind;
use super::resolve::{paddle_bounce, resolve_bounce};
use super::state::{BallState, GameEvent, GamePhase, GameState, Laser};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Target paddle center x (from mouse/touch position)
    pub target_x: Option<f32>,
    /// Launch attached balls (click/tap/space)
    pub launch: bool,
    /// Fire one laser shot if ammo remains
    pub fire_laser: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game state by one fixed timestep.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();

    if input.pause {
        match state.phase {
            GamePhase::Playing | GamePhase::Serve => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => {
                state.phase = if state
                    .balls
                    .iter()
                    .any(|b| matches!(b.state, BallState::Attached { .. }))
                {
                    GamePhase::Serve
                } else {
                    GamePhase::Playing
                };
            }
            _ => {}
        }
    }

    match state.phase {
        GamePhase::Paused | GamePhase::Cleared | GamePhase::GameOver => return,
        _ => {}
    }

    advance_effect_timers(state, dt);

    if let Some(target_x) = input.target_x {
        state.paddle.move_toward(target_x, dt, PADDLE_SPEED);
    }
    let left = field_left(state.widescreen);
    state.paddle.clamp_to(left, left + FIELD_WIDTH);

    match state.phase {
        GamePhase::Serve => {
            for ball in &mut state.balls {
                ball.update_attached(&state.paddle);
            }
            if input.launch {
                for ball in &mut state.balls {
                    ball.launch();
                }
                state.phase = GamePhase::Playing;
            }
        }
        GamePhase::Playing => {
            step_balls(state, dt);
            step_lasers(state, dt, input.fire_laser);
            settle_broken_bricks(state);
            step_items(state, dt);

            if state.balls.is_empty() {
                state.health = state.health.saturating_sub(1);
                if state.health == 0 {
                    state.phase = GamePhase::GameOver;
                    state.events.push(GameEvent::GameOver);
                } else {
                    state.reset_effects();
                    state.spawn_ball_attached();
                    state.phase = GamePhase::Serve;
                }
            } else if state.bricks.brick_count() == 0 {
                state.phase = GamePhase::Cleared;
                state.events.push(GameEvent::LevelCleared);
            }
        }
        _ => {}
    }
}

/// Run timed item effects down and snap them back to neutral on expiry.
fn advance_effect_timers(state: &mut GameState, dt: f32) {
    if state.ball_power != 1 {
        state.power_timer += dt;
        if state.power_timer >= EFFECT_DURATION {
            state.ball_power = 1;
            state.power_timer = 0.0;
            state.events.push(GameEvent::EffectExpired);
        }
    }
    if !state.balls_visible {
        state.visibility_timer += dt;
        if state.visibility_timer >= EFFECT_DURATION {
            state.balls_visible = true;
            state.visibility_timer = 0.0;
            state.events.push(GameEvent::EffectExpired);
        }
    }
    if state.wall_active {
        state.wall_timer += dt;
        if state.wall_timer >= EFFECT_DURATION {
            state.wall_active = false;
            state.wall_timer = 0.0;
            state.events.push(GameEvent::EffectExpired);
        }
    }
}

/// Integrate every ball and run its collision pipeline: death zone, then
/// walls, then paddle, then the brick field. Balls that fall out are
/// removed; the caller handles life loss when none remain.
fn step_balls(state: &mut GameState, dt: f32) {
    let borders = state.field_borders();
    let wall = state.wall_active.then(|| state.steel_wall());
    let policy = state.bounce_policy;
    let power = state.ball_power;

    let GameState {
        balls,
        bricks,
        events,
        paddle,
        score,
        ..
    } = state;

    balls.retain_mut(|ball| {
        if !matches!(ball.state, BallState::Free) {
            ball.update_attached(paddle);
            return true;
        }

        ball.hitbox.translate(ball.velocity * dt);

        if intersects(&borders[GameState::DEATH_BORDER], &ball.hitbox) {
            *score = score.saturating_sub(BALL_LOSS_PENALTY);
            events.push(GameEvent::BallLost);
            return false;
        }

        // Walls and the steel wall accumulate like brick contacts: summed
        // correction, one reflection off the deepest normal.
        let mut correction = Vec2::ZERO;
        let mut deepest: Option<Penetration> = None;
        let solid = borders.iter().take(GameState::DEATH_BORDER).chain(&wall);
        for surface in solid {
            if let Some(pen) = contact(surface, &ball.hitbox) {
                correction += pen.depth * pen.normal;
                if deepest.is_none_or(|d| pen.depth > d.depth) {
                    deepest = Some(pen);
                }
                events.push(GameEvent::WallHit);
            }
        }
        if let Some(deepest) = deepest {
            resolve_bounce(ball, correction, deepest, policy);
        }

        if let Some(pen) = contact(&paddle.hitbox, &ball.hitbox) {
            paddle_bounce(ball, &paddle.hitbox, pen);
            events.push(GameEvent::PaddleHit);
        }

        let sweep = bricks.check_ball(&ball.hitbox, power, events);
        if let Some(deepest) = sweep.deepest {
            resolve_bounce(ball, sweep.correction, deepest, policy);
        }

        true
    });
}

/// Fire a requested laser shot and advance the ones in flight. A shot is
/// spent on the first brick column it reaches.
fn step_lasers(state: &mut GameState, dt: f32, fire: bool) {
    if fire && state.paddle.laser_shots > 0 {
        state.paddle.laser_shots -= 1;
        let muzzle = Vec2::new(
            state.paddle.hitbox.center().x - LASER_WIDTH / 2.0,
            state.paddle.hitbox.top_left().y - LASER_HEIGHT,
        );
        state.lasers.push(Laser::new(muzzle.x, muzzle.y));
        state.events.push(GameEvent::LaserFired);
    }

    let GameState {
        lasers,
        bricks,
        events,
        ..
    } = state;

    lasers.retain_mut(|laser| {
        laser.hitbox.translate(laser.velocity * dt);
        if laser.hitbox.bottom_left().y < 0.0 {
            return false;
        }
        !bricks.check_laser(&laser.hitbox, events)
    });
}

/// Award points for bricks broken this tick and roll their item drops.
fn settle_broken_bricks(state: &mut GameState) {
    let broken: Vec<(u32, Vec2)> = state
        .events
        .iter()
        .filter_map(|event| match event {
            GameEvent::BrickBroken { points, position } => Some((*points, *position)),
            _ => None,
        })
        .collect();

    for (points, position) in broken {
        state.score += points;
        let item = state.spawner.spawn(position.x, position.y);
        state.items.push(item);
    }
}

/// Drop items toward the paddle, collecting catches and culling misses.
fn step_items(state: &mut GameState, dt: f32) {
    let paddle_box = state.paddle.hitbox;
    let mut caught: Vec<ItemKind> = Vec::new();

    let GameState { items, events, .. } = state;
    items.retain_mut(|item| {
        item.hitbox.translate(item.velocity * dt);
        if intersects(&paddle_box, &item.hitbox) {
            caught.push(item.kind);
            events.push(GameEvent::ItemCaught { kind: item.kind });
            return false;
        }
        if item.hitbox.top_left().y > FIELD_HEIGHT {
            events.push(GameEvent::ItemMissed { kind: item.kind });
            return false;
        }
        true
    });

    for kind in caught {
        state.apply_item(kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hitbox::Hitbox;
    use crate::sim::items::Item;
    use crate::sim::state::Brick;

    fn launch_input() -> TickInput {
        TickInput {
            launch: true,
            ..TickInput::default()
        }
    }

    /// Put a single free ball at an exact collision box, ignoring the
    /// sprite inset.
    fn place_free_ball(state: &mut GameState, x: f32, y: f32, velocity: Vec2) {
        state.balls.clear();
        state.balls.push(crate::sim::state::Ball {
            hitbox: Hitbox::new(x, y, BALL_SIZE, BALL_SIZE),
            velocity,
            state: BallState::Free,
        });
        state.phase = GamePhase::Playing;
    }

    #[test]
    fn test_serve_to_playing() {
        let mut state = GameState::new(1, false);
        state.add_brick(100.0, 100.0, 0, 255, 0);
        assert_eq!(state.phase, GamePhase::Serve);

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Serve);

        tick(&mut state, &launch_input(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.balls[0].state, BallState::Free);
        assert_eq!(state.balls[0].velocity, Vec2::new(0.0, -BALL_SPEED));
    }

    #[test]
    fn test_pause_toggle() {
        let mut state = GameState::new(1, false);
        let pause = TickInput {
            pause: true,
            ..TickInput::default()
        };

        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        // Paused state ignores launches.
        tick(&mut state, &launch_input(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        // Unpausing with an attached ball returns to Serve.
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Serve);
    }

    #[test]
    fn test_ball_brick_collision_end_to_end() {
        let mut state = GameState::new(7, false);
        state.bricks.insert(Brick::new(100.0, 90.0, 1));
        place_free_ball(&mut state, 100.0, 100.0, Vec2::new(0.0, -BALL_SPEED));

        tick(&mut state, &TickInput::default(), SIM_DT);

        // Brick destroyed, ball bounced downward, position pushed out of
        // the overlap.
        assert_eq!(state.bricks.brick_count(), 0);
        assert!(state.balls[0].velocity.y > 0.0);
        assert!(state.balls[0].hitbox.position.y > 100.0);
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::BrickBroken { points: 1, .. })));
        assert_eq!(state.score, 1);
        // The broken brick dropped an item.
        assert_eq!(state.items.len(), 1);
        // Last brick gone: level cleared.
        assert_eq!(state.phase, GamePhase::Cleared);
    }

    #[test]
    fn test_durable_brick_survives_hit() {
        let mut state = GameState::new(7, false);
        state.bricks.insert(Brick::new(100.0, 90.0, 3));
        place_free_ball(&mut state, 100.0, 100.0, Vec2::new(0.0, -BALL_SPEED));

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.bricks.brick_count(), 1);
        assert!(state.balls[0].velocity.y > 0.0);
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::BrickHit { health: 2 })));
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_losing_last_ball_costs_a_life() {
        let mut state = GameState::new(1, false);
        state.add_brick(100.0, 100.0, 0, 255, 0);
        place_free_ball(&mut state, 300.0, FIELD_HEIGHT + 1.0, Vec2::new(0.0, BALL_SPEED));
        state.score = 100;

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.health, START_HEALTH - 1);
        assert_eq!(state.score, 100 - BALL_LOSS_PENALTY);
        assert_eq!(state.phase, GamePhase::Serve);
        assert_eq!(state.balls.len(), 1);
        assert!(matches!(state.balls[0].state, BallState::Attached { .. }));
        assert!(state.events.contains(&GameEvent::BallLost));
    }

    #[test]
    fn test_game_over_on_last_life() {
        let mut state = GameState::new(1, false);
        state.add_brick(100.0, 100.0, 0, 255, 0);
        state.health = 1;
        place_free_ball(&mut state, 300.0, FIELD_HEIGHT + 1.0, Vec2::new(0.0, BALL_SPEED));

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.events.contains(&GameEvent::GameOver));

        // Further ticks are inert.
        tick(&mut state, &launch_input(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_side_wall_bounce() {
        let mut state = GameState::new(1, false);
        state.add_brick(100.0, 100.0, 0, 255, 0);
        let left = field_left(false);
        place_free_ball(&mut state, left + 1.0, 300.0, Vec2::new(-BALL_SPEED, 0.0));

        for _ in 0..4 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }

        assert!(state.balls[0].velocity.x > 0.0);
        assert!(state.balls[0].hitbox.top_left().x >= left - 1e-3);
    }

    #[test]
    fn test_steel_wall_saves_the_ball() {
        let mut state = GameState::new(1, false);
        state.add_brick(100.0, 100.0, 0, 255, 0);
        state.apply_item(ItemKind::SteelWall);
        place_free_ball(
            &mut state,
            300.0,
            FIELD_HEIGHT - 40.0,
            Vec2::new(0.0, BALL_SPEED),
        );
        // Park the paddle far away so it does not interfere.
        state.paddle.hitbox.position.x = field_left(false);

        for _ in 0..20 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }

        assert_eq!(state.balls.len(), 1);
        assert!(state.balls[0].velocity.y < 0.0);
        assert_eq!(state.health, START_HEALTH);
    }

    #[test]
    fn test_laser_fires_and_breaks_brick() {
        let mut state = GameState::new(1, false);
        let paddle_cx = state.paddle.hitbox.center().x;
        state
            .bricks
            .insert(Brick::new(paddle_cx - BRICK_SIZE / 2.0, 100.0, 5));
        state.apply_item(ItemKind::LaserGun);
        // Keep a ball alive far from everything.
        place_free_ball(&mut state, 600.0, 300.0, Vec2::ZERO);

        let fire = TickInput {
            fire_laser: true,
            ..TickInput::default()
        };
        tick(&mut state, &fire, SIM_DT);
        assert_eq!(state.paddle.laser_shots, LASER_AMMO - 1);
        assert!(state.events.contains(&GameEvent::LaserFired));
        assert_eq!(state.lasers.len(), 1);

        for _ in 0..400 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.bricks.brick_count(), 0);
        assert!(state.lasers.is_empty());
    }

    #[test]
    fn test_item_catch_applies_effect() {
        let mut state = GameState::new(1, false);
        state.add_brick(100.0, 100.0, 0, 255, 0);
        place_free_ball(&mut state, 600.0, 300.0, Vec2::ZERO);

        let paddle_center = state.paddle.hitbox.center();
        state.items.push(Item::new(
            ItemKind::Coin,
            paddle_center.x,
            paddle_center.y - 20.0,
        ));

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert!(state.items.is_empty());
        assert_eq!(state.score, 25);
        assert!(state
            .events
            .contains(&GameEvent::ItemCaught { kind: ItemKind::Coin }));
    }

    #[test]
    fn test_missed_item_is_culled() {
        let mut state = GameState::new(1, false);
        state.add_brick(100.0, 100.0, 0, 255, 0);
        place_free_ball(&mut state, 600.0, 300.0, Vec2::ZERO);
        state.items.push(Item::new(ItemKind::Heart, 100.0, FIELD_HEIGHT + 1.0));

        tick(&mut state, &TickInput::default(), SIM_DT);

        assert!(state.items.is_empty());
        assert_eq!(state.health, START_HEALTH);
        assert!(state
            .events
            .contains(&GameEvent::ItemMissed { kind: ItemKind::Heart }));
    }

    #[test]
    fn test_effect_expires_after_duration() {
        let mut state = GameState::new(1, false);
        state.apply_item(ItemKind::DeathBall);
        assert_eq!(state.ball_power, 3);
        state.power_timer = EFFECT_DURATION;

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.ball_power, 1);
        assert!(state.events.contains(&GameEvent::EffectExpired));
    }

    #[test]
    fn test_paddle_moves_toward_target() {
        let mut state = GameState::new(1, false);
        let start = state.paddle.hitbox.center().x;
        let input = TickInput {
            target_x: Some(start + 100.0),
            ..TickInput::default()
        };

        tick(&mut state, &input, SIM_DT);
        let moved = state.paddle.hitbox.center().x - start;
        assert!(moved > 0.0);
        assert!(moved <= PADDLE_SPEED * SIM_DT + 1e-3);
    }

    #[test]
    fn test_determinism() {
        let build = || {
            let mut state = GameState::new(1234, false);
            for col in 0..10 {
                state.add_brick(
                    field_left(false) + 60.0 + col as f32 * 48.0,
                    80.0,
                    255,
                    0,
                    0,
                );
            }
            state
        };

        let mut a = build();
        let mut b = build();
        let script = |t: u32| TickInput {
            target_x: Some(300.0 + (t as f32 * 0.1).sin() * 200.0),
            launch: t == 5,
            fire_laser: t % 60 == 0,
            ..TickInput::default()
        };

        for t in 0..1200 {
            tick(&mut a, &script(t), SIM_DT);
            tick(&mut b, &script(t), SIM_DT);
        }

        let ja = serde_json::to_string(&a).unwrap();
        let jb = serde_json::to_string(&b).unwrap();
        assert_eq!(ja, jb);
    }
}
