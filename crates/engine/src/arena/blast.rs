//! Bomb countdown and chain detonation for the match harness.
//! Blast rays mirror the danger builder's rules: stop at hard blocks, break
//! and stop at the first soft block, chain into other bombs.

use std::collections::{BTreeSet, VecDeque};

use super::*;

struct BlastOutcome {
    cells: Vec<ExplosionCell>,
    chained: Vec<TileKey>,
    broken_soft_blocks: Vec<Pos>,
    destroyed_powerups: Vec<TileKey>,
}

impl Arena {
    pub(super) fn resolve_bombs(&mut self) {
        for bomb in self.bombs.values_mut() {
            bomb.ticks_remaining = bomb.ticks_remaining.saturating_sub(1);
        }

        let due: Vec<TileKey> = self
            .bombs
            .iter()
            .filter(|(_, bomb)| bomb.ticks_remaining == 0)
            .map(|(&key, _)| key)
            .collect();

        let mut queue: VecDeque<TileKey> = due.into();
        let mut processed = BTreeSet::new();
        while let Some(key) = queue.pop_front() {
            if !processed.insert(key) {
                continue;
            }
            let Some(bomb) = self.bombs.remove(&key) else {
                continue;
            };

            let outcome = blast_rays(&self.grid, &self.bombs, &self.powerups, bomb);
            self.explosions.extend(outcome.cells);
            for destroyed in outcome.destroyed_powerups {
                self.powerups.remove(&destroyed);
            }
            for pos in outcome.broken_soft_blocks {
                self.grid.set_tile(pos, TileKind::Empty);
                self.log.push(LogEvent::SoftBlockDestroyed { pos });
                self.maybe_drop_powerup(pos);
            }
            for chained in outcome.chained {
                if !processed.contains(&chained) {
                    queue.push_back(chained);
                }
            }
        }
    }
}

fn blast_rays(
    grid: &Grid,
    bombs: &BTreeMap<TileKey, Bomb>,
    powerups: &BTreeMap<TileKey, PowerUp>,
    bomb: Bomb,
) -> BlastOutcome {
    let mut outcome = BlastOutcome {
        cells: Vec::new(),
        chained: Vec::new(),
        broken_soft_blocks: Vec::new(),
        destroyed_powerups: Vec::new(),
    };
    outcome.cells.push(ExplosionCell {
        pos: bomb.pos,
        ticks_remaining: EXPLOSION_DURATION_TICKS,
        owner: bomb.owner,
        destroys_soft_block: false,
    });

    for (dy, dx) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
        for reach in 1..=bomb.blast_range as i32 {
            let pos = Pos { y: bomb.pos.y + dy * reach, x: bomb.pos.x + dx * reach };
            if !grid.in_bounds(pos) {
                break;
            }
            match grid.tile_at(pos) {
                TileKind::HardBlock => break,
                TileKind::SoftBlock => {
                    outcome.cells.push(ExplosionCell {
                        pos,
                        ticks_remaining: EXPLOSION_DURATION_TICKS,
                        owner: bomb.owner,
                        destroys_soft_block: true,
                    });
                    outcome.broken_soft_blocks.push(pos);
                    break;
                }
                TileKind::Empty => {
                    let key = grid.key(pos);
                    if bombs.contains_key(&key) {
                        outcome.chained.push(key);
                    }
                    if powerups.contains_key(&key) {
                        outcome.destroyed_powerups.push(key);
                    }
                    outcome.cells.push(ExplosionCell {
                        pos,
                        ticks_remaining: EXPLOSION_DURATION_TICKS,
                        owner: bomb.owner,
                        destroys_soft_block: false,
                    });
                }
            }
        }
    }

    outcome
}
