//! Shared fixtures for the `bot` submodule test suites.
//! This module exists to avoid repeating grid and snapshot setup across tests.
//! It does not own production decision logic.

use std::collections::BTreeMap;

use slotmap::SlotMap;

use crate::state::{Bomb, ExplosionCell, Grid, Player, PlayerView, PowerUp, WorldSnapshot};
use crate::types::{Archetype, PlayerId, Pos, PowerUpKind};

/// Bordered grid with an all-empty interior.
pub(super) fn open_grid(rows: usize, cols: usize) -> Grid {
    Grid::new(rows, cols)
}

pub(super) fn bot_at(x: f64, y: f64, archetype: Archetype) -> Player {
    Player::new(PlayerId::default(), x, y, archetype)
}

pub(super) fn bomb(pos: Pos, blast_range: u32) -> Bomb {
    Bomb { id: 1, pos, ticks_remaining: 60, blast_range, owner: PlayerId::default() }
}

pub(super) fn explosion(pos: Pos) -> ExplosionCell {
    ExplosionCell { pos, ticks_remaining: 15, owner: PlayerId::default(), destroys_soft_block: false }
}

pub(super) fn powerup(pos: Pos) -> PowerUp {
    PowerUp { kind: PowerUpKind::BombUp, pos }
}

pub(super) fn bombs_at(grid: &Grid, bombs: &[Bomb]) -> BTreeMap<i32, Bomb> {
    bombs.iter().map(|b| (grid.key(b.pos), *b)).collect()
}

/// Distinct roster ids for tests that need more than one player.
pub(super) fn player_ids(count: usize) -> Vec<PlayerId> {
    let mut slots: SlotMap<PlayerId, ()> = SlotMap::with_key();
    (0..count).map(|_| slots.insert(())).collect()
}

pub(super) fn snapshot(
    grid: Grid,
    bombs: Vec<Bomb>,
    powerups: Vec<PowerUp>,
    explosions: Vec<ExplosionCell>,
    players: Vec<PlayerView>,
) -> WorldSnapshot {
    let bombs = bombs_at(&grid, &bombs);
    let powerups = powerups.into_iter().map(|p| (grid.key(p.pos), p)).collect();
    WorldSnapshot { grid, bombs, powerups, explosions, players }
}
