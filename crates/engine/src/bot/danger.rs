//! Danger-zone computation: which tiles a bot must treat as unsafe this tick.
//! This module exists to keep blast reasoning separate from goal selection.
//! It does not own bomb lifecycles or the decision to flee.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::pathfinding::is_walkable;
use super::*;
use crate::state::{Bomb, ExplosionCell, Grid};
use crate::types::{DangerPolicy, PlayerId, Pos, TileKey, TileKind};

pub type DangerMap = BTreeSet<TileKey>;

const BLAST_DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Maximum flood-fill expansions when probing for an escape tile after a
/// hypothetical plant.
const SAFE_FLOOD_BUDGET: u32 = 40;

/// Tiles considered unsafe for a given danger policy: every exploding tile,
/// every bomb tile, and (for `FutureExplosion`) every tile a blast line can
/// reach. Blast lines stop at hard blocks and are absorbed by the first soft
/// block they hit, which is itself marked.
pub fn danger_map(
    grid: &Grid,
    bombs: &BTreeMap<TileKey, Bomb>,
    explosions: &[ExplosionCell],
    policy: DangerPolicy,
) -> DangerMap {
    let mut danger = BTreeSet::new();

    for cell in explosions {
        if grid.in_bounds(cell.pos) {
            danger.insert(grid.key(cell.pos));
        }
    }

    for bomb in bombs.values() {
        if !grid.in_bounds(bomb.pos) {
            continue;
        }
        danger.insert(grid.key(bomb.pos));
        if policy == DangerPolicy::BombOnly {
            continue;
        }
        for (dy, dx) in BLAST_DIRECTIONS {
            for reach in 1..=bomb.blast_range as i32 {
                let pos = Pos { y: bomb.pos.y + dy * reach, x: bomb.pos.x + dx * reach };
                if !grid.in_bounds(pos) {
                    break;
                }
                match grid.tile_at(pos) {
                    TileKind::HardBlock => break,
                    TileKind::SoftBlock => {
                        danger.insert(grid.key(pos));
                        break;
                    }
                    TileKind::Empty => {
                        danger.insert(grid.key(pos));
                    }
                }
            }
        }
    }

    danger
}

/// True when any tile within Manhattan distance `dist` of `tile` is dangerous.
/// `dist` 0 checks only the bot's own tile.
pub fn is_in_danger(grid: &Grid, danger: &DangerMap, tile: Pos, dist: u32) -> bool {
    let dist = dist as i32;
    for dy in -dist..=dist {
        for dx in -dist..=dist {
            if dy.abs() + dx.abs() > dist {
                continue;
            }
            let pos = Pos { y: tile.y + dy, x: tile.x + dx };
            if grid.in_bounds(pos) && danger.contains(&grid.key(pos)) {
                return true;
            }
        }
    }
    false
}

/// Simulate a bomb on the bot's own tile and confirm at least one reachable
/// safe tile would remain. The simulation always uses the real blast shape,
/// not the archetype's danger policy.
pub fn is_safe_to_plant(
    grid: &Grid,
    bombs: &BTreeMap<TileKey, Bomb>,
    explosions: &[ExplosionCell],
    tile: Pos,
    blast_range: u32,
    owner: PlayerId,
) -> bool {
    if !grid.in_bounds(tile) {
        return false;
    }

    let mut simulated = bombs.clone();
    simulated.insert(
        grid.key(tile),
        Bomb { id: u64::MAX, pos: tile, ticks_remaining: 1, blast_range, owner },
    );
    let danger = danger_map(grid, &simulated, explosions, DangerPolicy::FutureExplosion);

    let mut visited = BTreeSet::new();
    let mut queue = VecDeque::new();
    visited.insert(tile);
    queue.push_back(tile);
    let mut budget = SAFE_FLOOD_BUDGET;

    while let Some(current) = queue.pop_front() {
        if !danger.contains(&grid.key(current)) {
            return true;
        }
        if budget == 0 {
            break;
        }
        budget -= 1;
        for next in neighbors(current) {
            if is_walkable(grid, &simulated, next, false, Some(tile)) && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    false
}
