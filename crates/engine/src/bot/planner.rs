//! Goal selection: the per-bot priority state machine.
//! This module exists to keep the escape/attack/powerup/wander ladder in one
//! place, parameterized purely by archetype configuration.
//! It does not own kinematics or the re-evaluation cadence gate.

use super::danger::DangerMap;
use super::pathfinding::is_walkable;
use super::*;
use crate::types::{PlayerId, Pos, PowerupPolicy, TileKind};

const ESCAPE_SAMPLES: u32 = 20;
const WANDER_SAMPLES: u32 = 10;
const NEARBY_POWERUP_DIST: u32 = 4;

/// Run the decision ladder and install the chosen state, goal and path.
/// Priority is fixed: escape, then attack, then powerup, then wander.
pub(super) fn reevaluate(
    bot: &mut Player,
    world: &WorldSnapshot,
    cfg: &ArchetypeConfig,
    danger: &DangerMap,
    endangered: bool,
    rng: &mut ChaCha8Rng,
) {
    if endangered {
        if try_escape(bot, world, danger, rng) {
            return;
        }
        // Trapped: no safe reachable tile within the sampling budget.
        wander(bot, world, rng);
        return;
    }

    if try_attack(bot, world, cfg, rng) {
        return;
    }
    if try_powerup(bot, world, cfg, rng) {
        return;
    }
    wander(bot, world, rng);
}

/// Attack policy 2 tracks a moving target: refresh the pursuit path whenever
/// the target has left the planned goal tile.
pub(super) fn refresh_pursuit(bot: &mut Player, world: &WorldSnapshot) {
    let Some(target) = bot.plan.attack_target else {
        return;
    };
    let target_view = world.players.iter().find(|p| p.id == target);
    let Some(view) = target_view.filter(|p| p.is_alive) else {
        // Stale target: silent fallback, picked up by the next think.
        bot.plan.state = BotState::Wander;
        bot.plan.attack_target = None;
        bot.plan.goal = bot.tile();
        bot.plan.path.clear();
        return;
    };
    if view.tile == bot.plan.goal {
        return;
    }

    match find_path(&world.grid, &world.bombs, bot.tile(), view.tile, true, None) {
        Some(path) => {
            bot.plan.goal = view.tile;
            bot.plan.path = path.into();
        }
        None => bot.plan.path.clear(),
    }
}

/// Plant signaling, evaluated every tick after state assignment. A bot never
/// plants while its own tile is already dangerous.
pub(super) fn update_plant_signal(
    bot: &mut Player,
    world: &WorldSnapshot,
    cfg: &ArchetypeConfig,
    danger: &DangerMap,
) {
    let tile = bot.tile();
    if !world.grid.in_bounds(tile) || danger.contains(&world.grid.key(tile)) {
        return;
    }

    let next_is_soft = bot
        .plan
        .path
        .front()
        .is_some_and(|&next| world.grid.tile_at(next) == TileKind::SoftBlock);
    let target_in_range = bot.plan.state == BotState::Attack
        && manhattan(tile, bot.plan.goal) <= cfg.plant_range;
    if !next_is_soft && !target_in_range {
        return;
    }

    if cfg.checked_plant
        && !is_safe_to_plant(&world.grid, &world.bombs, &world.explosions, tile, bot.bomb_range, bot.id)
    {
        return;
    }

    bot.plan.should_plant = true;
}

fn try_escape(
    bot: &mut Player,
    world: &WorldSnapshot,
    danger: &DangerMap,
    rng: &mut ChaCha8Rng,
) -> bool {
    let tile = bot.tile();

    // Keep fleeing toward a goal that is still safe instead of re-sampling a
    // fresh target every endangered tick.
    if bot.plan.state == BotState::Escape
        && !bot.plan.path.is_empty()
        && world.grid.in_bounds(bot.plan.goal)
        && !danger.contains(&world.grid.key(bot.plan.goal))
    {
        return true;
    }

    let mut best: Option<(u32, Pos)> = None;
    for _ in 0..ESCAPE_SAMPLES {
        let x = rand_index(rng, world.grid.cols) as i32;
        let y = rand_index(rng, world.grid.rows) as i32;
        let pos = Pos { y, x };
        if !is_walkable(&world.grid, &world.bombs, pos, false, None) {
            continue;
        }
        if danger.contains(&world.grid.key(pos)) {
            continue;
        }
        let dist = manhattan(tile, pos);
        if best.is_none_or(|(best_dist, _)| dist < best_dist) {
            best = Some((dist, pos));
        }
    }

    let Some((_, goal)) = best else {
        return false;
    };
    // A fleeing bot must not stop to dig, so soft blocks stay walls here.
    let Some(path) = find_path(&world.grid, &world.bombs, tile, goal, false, Some(danger)) else {
        return false;
    };

    bot.plan.state = BotState::Escape;
    bot.plan.goal = goal;
    bot.plan.path = path.into();
    bot.plan.attack_target = None;
    true
}

fn try_attack(
    bot: &mut Player,
    world: &WorldSnapshot,
    cfg: &ArchetypeConfig,
    rng: &mut ChaCha8Rng,
) -> bool {
    let tile = bot.tile();

    let chosen: Option<(PlayerId, Pos, Vec<Pos>)> = match cfg.attack_policy {
        AttackPolicy::ReachableNearest => {
            let mut best: Option<(usize, PlayerId, Pos, Vec<Pos>)> = None;
            for enemy in world.enemies_of(bot.id) {
                if manhattan(tile, enemy.tile) > cfg.attack_reach_dist {
                    continue;
                }
                let Some(path) =
                    find_path(&world.grid, &world.bombs, tile, enemy.tile, false, None)
                else {
                    continue;
                };
                // Strictly-shorter keeps the first enemy on ties.
                if best.as_ref().is_none_or(|(len, ..)| path.len() < *len) {
                    best = Some((path.len(), enemy.id, enemy.tile, path));
                }
            }
            best.map(|(_, id, goal, path)| (id, goal, path))
        }
        AttackPolicy::RandomPursuit => {
            let enemies: Vec<_> = world.enemies_of(bot.id).collect();
            if enemies.is_empty() {
                None
            } else {
                let enemy = enemies[rand_index(rng, enemies.len())];
                find_path(&world.grid, &world.bombs, tile, enemy.tile, true, None)
                    .map(|path| (enemy.id, enemy.tile, path))
            }
        }
    };

    let Some((target, goal, path)) = chosen else {
        return false;
    };
    bot.plan.state = BotState::Attack;
    bot.plan.goal = goal;
    bot.plan.path = path.into();
    bot.plan.attack_target = Some(target);
    true
}

fn try_powerup(
    bot: &mut Player,
    world: &WorldSnapshot,
    cfg: &ArchetypeConfig,
    rng: &mut ChaCha8Rng,
) -> bool {
    if world.powerups.is_empty() || !percent_roll(rng, cfg.powerup_chance_pct) {
        return false;
    }
    let tile = bot.tile();

    let chosen: Option<(Pos, Vec<Pos>)> = match cfg.powerup_policy {
        PowerupPolicy::Closest => {
            let mut best: Option<(usize, Pos, Vec<Pos>)> = None;
            for powerup in world.powerups.values() {
                let Some(path) =
                    find_path(&world.grid, &world.bombs, tile, powerup.pos, true, None)
                else {
                    continue;
                };
                if best.as_ref().is_none_or(|(len, ..)| path.len() < *len) {
                    best = Some((path.len(), powerup.pos, path));
                }
            }
            best.map(|(_, goal, path)| (goal, path))
        }
        PowerupPolicy::RandomNearby => {
            let mut nearby: Vec<(Pos, Vec<Pos>)> = Vec::new();
            for powerup in world.powerups.values() {
                if manhattan(tile, powerup.pos) > NEARBY_POWERUP_DIST {
                    continue;
                }
                let Some(path) =
                    find_path(&world.grid, &world.bombs, tile, powerup.pos, false, None)
                else {
                    continue;
                };
                nearby.push((powerup.pos, path));
            }
            if nearby.is_empty() {
                None
            } else {
                Some(nearby.swap_remove(rand_index(rng, nearby.len())))
            }
        }
    };

    let Some((goal, path)) = chosen else {
        return false;
    };
    bot.plan.state = BotState::GetPowerup;
    bot.plan.goal = goal;
    bot.plan.path = path.into();
    bot.plan.attack_target = None;
    true
}

fn wander(bot: &mut Player, world: &WorldSnapshot, rng: &mut ChaCha8Rng) {
    bot.plan.state = BotState::Wander;
    bot.plan.attack_target = None;
    let tile = bot.tile();

    for _ in 0..WANDER_SAMPLES {
        let x = 1 + rand_index(rng, world.grid.cols - 2) as i32;
        let y = 1 + rand_index(rng, world.grid.rows - 2) as i32;
        let pos = Pos { y, x };
        if world.grid.tile_at(pos) == TileKind::HardBlock {
            continue;
        }
        let Some(path) = find_path(&world.grid, &world.bombs, tile, pos, true, None) else {
            continue;
        };
        bot.plan.goal = pos;
        bot.plan.path = path.into();
        return;
    }

    // Sampling failed: idle this tick and retry on the next forced think.
    bot.plan.goal = tile;
    bot.plan.path.clear();
}
