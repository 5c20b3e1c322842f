//! Headless deterministic match harness: the physics-resolver role the engine
//! is otherwise agnostic about. Drives bomb timers, chain explosions, pickups
//! and deaths so the decision engine can be exercised end-to-end.

use std::collections::BTreeMap;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use slotmap::SlotMap;

use crate::bot::{BotEngine, percent_roll, rand_index};
use crate::config::{ArchetypeTable, TICKS_PER_SECOND};
use crate::state::{Bomb, ExplosionCell, Grid, Player, PlayerView, PowerUp, WorldSnapshot};
use crate::types::*;

mod blast;
mod mapgen;

pub const DEFAULT_ROWS: usize = 13;
pub const DEFAULT_COLS: usize = 15;

const BOMB_TIMER_TICKS: u32 = 3 * TICKS_PER_SECOND;
const EXPLOSION_DURATION_TICKS: u32 = TICKS_PER_SECOND;
const MATCH_TIME_LIMIT_TICKS: u64 = 120 * TICKS_PER_SECOND as u64;
const SOFT_BLOCK_CHANCE_PCT: u32 = 55;
const POWERUP_DROP_CHANCE_PCT: u32 = 30;
const PICKUP_RADIUS: f64 = 0.4;

pub struct Arena {
    seed: u64,
    tick: u64,
    status: MatchStatus,
    rng: ChaCha8Rng,
    engine: BotEngine,
    table: ArchetypeTable,
    grid: Grid,
    bombs: BTreeMap<TileKey, Bomb>,
    powerups: BTreeMap<TileKey, PowerUp>,
    explosions: Vec<ExplosionCell>,
    players: SlotMap<PlayerId, Player>,
    roster: Vec<PlayerId>,
    log: Vec<LogEvent>,
    next_bomb_id: u64,
    bomb_planted_last_tick: bool,
}

impl Arena {
    /// Seeded match of two to four bots on the default arena layout.
    pub fn new(seed: u64, lineup: &[Archetype], table: ArchetypeTable) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let engine = BotEngine::new(seed ^ 0x9E37_79B9_7F4A_7C15);
        let grid = mapgen::generate_grid(&mut rng, DEFAULT_ROWS, DEFAULT_COLS);

        let mut players = SlotMap::with_key();
        let mut roster = Vec::new();
        let spawns = mapgen::spawn_positions(DEFAULT_ROWS, DEFAULT_COLS);
        for (archetype, (x, y)) in lineup.iter().take(spawns.len()).zip(spawns) {
            let id = players.insert_with_key(|id| Player::new(id, x, y, *archetype));
            roster.push(id);
        }

        Self {
            seed,
            tick: 0,
            status: MatchStatus::Playing,
            rng,
            engine,
            table,
            grid,
            bombs: BTreeMap::new(),
            powerups: BTreeMap::new(),
            explosions: Vec::new(),
            players,
            roster,
            log: Vec::new(),
            next_bomb_id: 0,
            bomb_planted_last_tick: false,
        }
    }

    pub fn advance(&mut self, max_ticks: u32) -> MatchStatus {
        for _ in 0..max_ticks {
            if self.status != MatchStatus::Playing {
                break;
            }
            self.step_tick();
        }
        self.status
    }

    fn step_tick(&mut self) {
        let explosion_just_ended = self.expire_explosions();
        self.resolve_bombs();

        let events = TickEvents {
            bomb_just_planted: self.bomb_planted_last_tick,
            explosion_just_ended,
        };
        self.bomb_planted_last_tick = false;

        let snapshot = self.snapshot();
        for id in self.roster.clone() {
            let Some(bot) = self.players.get_mut(id) else {
                continue;
            };
            if !bot.is_alive || !bot.is_bot {
                continue;
            }
            let cfg = *self.table.get(bot.archetype);
            let before = (bot.plan.state, bot.plan.goal);
            let intent = self.engine.step(bot, &snapshot, &cfg, events);
            let after = (bot.plan.state, bot.plan.goal);
            let tile = bot.tile();
            let blast_range = bot.bomb_range;
            let max_bombs = bot.max_bombs;
            if before != after {
                self.log.push(LogEvent::StateChanged { player: id, state: after.0, goal: after.1 });
            }
            if intent.plant {
                self.try_plant(id, tile, blast_range, max_bombs);
            }
        }

        self.collect_powerups();
        self.apply_deaths();
        self.refresh_active_bomb_counts();
        self.update_status();
        self.tick += 1;
    }

    /// Frozen pre-movement view every bot reads this tick.
    fn snapshot(&self) -> WorldSnapshot {
        let players = self
            .roster
            .iter()
            .map(|&id| {
                let p = &self.players[id];
                PlayerView { id, tile: p.tile(), is_alive: p.is_alive }
            })
            .collect();
        WorldSnapshot {
            grid: self.grid.clone(),
            bombs: self.bombs.clone(),
            powerups: self.powerups.clone(),
            explosions: self.explosions.clone(),
            players,
        }
    }

    fn expire_explosions(&mut self) -> bool {
        let before = self.explosions.len();
        for cell in &mut self.explosions {
            cell.ticks_remaining = cell.ticks_remaining.saturating_sub(1);
        }
        self.explosions.retain(|cell| cell.ticks_remaining > 0);
        self.explosions.len() < before
    }

    fn try_plant(&mut self, owner: PlayerId, tile: Pos, blast_range: u32, max_bombs: u32) {
        if !self.grid.in_bounds(tile) {
            return;
        }
        let key = self.grid.key(tile);
        if self.bombs.contains_key(&key) {
            return;
        }
        let active = self.bombs.values().filter(|b| b.owner == owner).count() as u32;
        if active >= max_bombs {
            return;
        }
        let id = self.next_bomb_id;
        self.next_bomb_id += 1;
        self.bombs.insert(
            key,
            Bomb { id, pos: tile, ticks_remaining: BOMB_TIMER_TICKS, blast_range, owner },
        );
        self.bomb_planted_last_tick = true;
        self.log.push(LogEvent::BombPlanted { player: owner, pos: tile });
    }

    fn collect_powerups(&mut self) {
        for &id in &self.roster {
            let Some(player) = self.players.get(id) else {
                continue;
            };
            if !player.is_alive {
                continue;
            }
            let tile = player.tile();
            if !self.grid.in_bounds(tile) {
                continue;
            }
            let key = self.grid.key(tile);
            let centered = (player.x - (tile.x as f64 + 0.5)).abs() < PICKUP_RADIUS
                && (player.y - (tile.y as f64 + 0.5)).abs() < PICKUP_RADIUS;
            if !centered {
                continue;
            }
            let Some(powerup) = self.powerups.remove(&key) else {
                continue;
            };
            let player = &mut self.players[id];
            match powerup.kind {
                PowerUpKind::BombUp => player.max_bombs += 1,
                PowerUpKind::FireUp => player.bomb_range += 1,
                PowerUpKind::SpeedUp => player.speed_multiplier += 0.3,
            }
            self.log.push(LogEvent::PowerUpCollected { player: id, kind: powerup.kind });
        }
    }

    fn apply_deaths(&mut self) {
        for &id in &self.roster.clone() {
            let Some(player) = self.players.get(id) else {
                continue;
            };
            if !player.is_alive {
                continue;
            }
            let tile = player.tile();
            if self.explosions.iter().any(|cell| cell.pos == tile) {
                self.players[id].is_alive = false;
                self.log.push(LogEvent::PlayerDied { player: id, pos: tile });
            }
        }
    }

    fn refresh_active_bomb_counts(&mut self) {
        for &id in &self.roster {
            let count = self.bombs.values().filter(|b| b.owner == id).count() as u32;
            if let Some(player) = self.players.get_mut(id) {
                player.active_bombs = count;
            }
        }
    }

    fn update_status(&mut self) {
        let alive: Vec<PlayerId> =
            self.roster.iter().copied().filter(|&id| self.players[id].is_alive).collect();
        self.status = match alive.as_slice() {
            [] => MatchStatus::Finished(MatchOutcome::Draw),
            [winner] => MatchStatus::Finished(MatchOutcome::Winner(*winner)),
            _ if self.tick + 1 >= MATCH_TIME_LIMIT_TICKS => {
                MatchStatus::Finished(MatchOutcome::Draw)
            }
            _ => MatchStatus::Playing,
        };
    }

    fn maybe_drop_powerup(&mut self, pos: Pos) {
        if !percent_roll(&mut self.rng, POWERUP_DROP_CHANCE_PCT) {
            return;
        }
        let kind = match rand_index(&mut self.rng, 3) {
            0 => PowerUpKind::FireUp,
            1 => PowerUpKind::BombUp,
            _ => PowerUpKind::SpeedUp,
        };
        self.powerups.insert(self.grid.key(pos), PowerUp { kind, pos });
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn log(&self) -> &[LogEvent] {
        &self.log
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.roster.iter().map(|&id| &self.players[id])
    }

    pub fn snapshot_hash(&self) -> u64 {
        use std::hash::Hasher;
        use xxhash_rust::xxh3::Xxh3;

        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u64(self.tick);
        for &id in &self.roster {
            let p = &self.players[id];
            hasher.write_u64(p.x.to_bits());
            hasher.write_u64(p.y.to_bits());
            hasher.write_u8(u8::from(p.is_alive));
            hasher.write_u8(p.plan.state as u8);
            hasher.write_i32(p.plan.goal.y);
            hasher.write_i32(p.plan.goal.x);
        }
        hasher.write_usize(self.bombs.len());
        hasher.write_usize(self.explosions.len());
        hasher.write_usize(self.powerups.len());
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_match_spawns_bots_on_clear_corner_tiles() {
        let arena = Arena::new(
            1234,
            &[Archetype::Careful, Archetype::Greedy, Archetype::Hostile, Archetype::Extreme],
            ArchetypeTable::default(),
        );
        assert_eq!(arena.players().count(), 4);
        for player in arena.players() {
            assert_eq!(arena.grid().tile_at(player.tile()), TileKind::Empty);
            assert!(player.is_alive);
        }
    }

    #[test]
    fn lineup_is_capped_at_four_spawn_corners() {
        let arena = Arena::new(
            1,
            &[Archetype::Careful; 6],
            ArchetypeTable::default(),
        );
        assert_eq!(arena.players().count(), 4);
    }

    #[test]
    fn planted_bomb_detonates_after_its_timer_and_expires() {
        let mut arena =
            Arena::new(7, &[Archetype::Careful, Archetype::Greedy], ArchetypeTable::default());
        // Park the bots so nothing else plants or moves during the countdown.
        for id in arena.roster.clone() {
            arena.players[id].is_bot = false;
        }
        let owner = arena.roster[0];
        let tile = Pos { y: 5, x: 5 };
        arena.try_plant(owner, tile, 2, 1);
        assert_eq!(arena.bombs.len(), 1);

        arena.advance(BOMB_TIMER_TICKS);
        assert!(arena.bombs.is_empty(), "bomb must be gone after its timer");
        assert!(
            arena.explosions.iter().any(|cell| cell.pos == tile),
            "detonation leaves explosion cells"
        );

        arena.advance(EXPLOSION_DURATION_TICKS + 1);
        assert!(arena.explosions.is_empty(), "explosion cells expire");
    }

    #[test]
    fn plant_respects_the_bomb_budget_and_occupied_tiles() {
        let mut arena =
            Arena::new(7, &[Archetype::Careful, Archetype::Greedy], ArchetypeTable::default());
        let owner = arena.roster[0];
        arena.try_plant(owner, Pos { y: 5, x: 5 }, 1, 1);
        arena.try_plant(owner, Pos { y: 5, x: 5 }, 1, 2);
        assert_eq!(arena.bombs.len(), 1, "a tile holds at most one bomb");
        arena.try_plant(owner, Pos { y: 5, x: 6 }, 1, 1);
        assert_eq!(arena.bombs.len(), 1, "budget of one active bomb is enforced");
        arena.try_plant(owner, Pos { y: 5, x: 6 }, 1, 2);
        assert_eq!(arena.bombs.len(), 2);
    }

    #[test]
    fn match_runs_to_a_terminal_status_without_wedging() {
        let mut arena = Arena::new(
            99,
            &[Archetype::Hostile, Archetype::Careful, Archetype::Greedy, Archetype::Extreme],
            ArchetypeTable::default(),
        );
        let status = arena.advance(MATCH_TIME_LIMIT_TICKS as u32 + 10);
        assert!(matches!(status, MatchStatus::Finished(_)));
        assert!(arena.current_tick() <= MATCH_TIME_LIMIT_TICKS);
    }

    #[test]
    fn bots_never_occupy_hard_block_tiles_during_a_match() {
        let mut arena = Arena::new(
            2024,
            &[Archetype::Careful, Archetype::Greedy, Archetype::Hostile],
            ArchetypeTable::default(),
        );
        for _ in 0..600 {
            if arena.advance(1) != MatchStatus::Playing {
                break;
            }
            for player in arena.players() {
                if player.is_alive {
                    assert_ne!(arena.grid().tile_at(player.tile()), TileKind::HardBlock);
                }
            }
        }
    }
}
