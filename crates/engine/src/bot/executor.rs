//! Tick-synchronous path following: advance the bot toward its next waypoint.
//! This module exists to keep kinematics out of the goal selector.
//! It does not change plan state; only the selector reassigns goals.

use super::*;
use crate::config::BASE_SPEED;
use crate::types::TileKind;

const AXIS_EPSILON: f64 = 1e-9;

/// Move the bot toward the front waypoint of its path and return the tile
/// direction actually taken this tick.
///
/// Waits in place when the waypoint is a hard block or bomb-occupied, and
/// holds before a soft block (plant signaling opens that route). Movement is
/// axis-priority, capped at the bot's speed, and snaps to the waypoint center
/// on arrival before popping it.
pub(super) fn follow_path(bot: &mut Player, world: &WorldSnapshot) -> (i8, i8) {
    let Some(&next) = bot.plan.path.front() else {
        return (0, 0);
    };

    match world.grid.tile_at(next) {
        TileKind::HardBlock | TileKind::SoftBlock => return (0, 0),
        TileKind::Empty => {}
    }
    if world.has_bomb(next) {
        return (0, 0);
    }

    let speed = BASE_SPEED * bot.speed_multiplier;
    let target_x = next.x as f64 + 0.5;
    let target_y = next.y as f64 + 0.5;
    let (from_x, from_y) = (bot.x, bot.y);
    let dx = target_x - bot.x;
    let dy = target_y - bot.y;

    if dx.abs() + dy.abs() <= speed {
        bot.x = target_x;
        bot.y = target_y;
        bot.plan.path.pop_front();
    } else if dx.abs() >= dy.abs() {
        // Larger axis first so corners are never cut diagonally.
        let step = dx.clamp(-speed, speed);
        bot.x += step;
        let budget = speed - step.abs();
        if budget > AXIS_EPSILON {
            bot.y += dy.clamp(-budget, budget);
        }
    } else {
        let step = dy.clamp(-speed, speed);
        bot.y += step;
        let budget = speed - step.abs();
        if budget > AXIS_EPSILON {
            bot.x += dx.clamp(-budget, budget);
        }
    }

    (direction(bot.x - from_x), direction(bot.y - from_y))
}

fn direction(delta: f64) -> i8 {
    if delta > AXIS_EPSILON {
        1
    } else if delta < -AXIS_EPSILON {
        -1
    } else {
        0
    }
}
