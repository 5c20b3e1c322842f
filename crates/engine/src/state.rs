use std::collections::{BTreeMap, VecDeque};

use crate::types::*;

#[derive(Clone)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    pub tiles: Vec<TileKind>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut tiles = vec![TileKind::Empty; rows * cols];
        for x in 0..cols {
            tiles[x] = TileKind::HardBlock;
            tiles[(rows - 1) * cols + x] = TileKind::HardBlock;
        }
        for y in 0..rows {
            tiles[y * cols] = TileKind::HardBlock;
            tiles[y * cols + (cols - 1)] = TileKind::HardBlock;
        }
        Self { rows, cols, tiles }
    }

    pub fn tile_at(&self, pos: Pos) -> TileKind {
        if !self.in_bounds(pos) {
            return TileKind::HardBlock;
        }
        self.tiles[self.index(pos)]
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.cols && (pos.y as usize) < self.rows
    }

    pub fn set_tile(&mut self, pos: Pos, tile: TileKind) {
        if !self.in_bounds(pos) {
            return;
        }
        let idx = self.index(pos);
        self.tiles[idx] = tile;
    }

    /// Tile key for an in-bounds position. Callers bounds-check first.
    pub fn key(&self, pos: Pos) -> TileKey {
        pos.y * self.cols as i32 + pos.x
    }

    pub fn pos_of(&self, key: TileKey) -> Pos {
        Pos { y: key / self.cols as i32, x: key % self.cols as i32 }
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.cols + (pos.x as usize)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bomb {
    pub id: u64,
    pub pos: Pos,
    pub ticks_remaining: u32,
    pub blast_range: u32,
    pub owner: PlayerId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExplosionCell {
    pub pos: Pos,
    pub ticks_remaining: u32,
    pub owner: PlayerId,
    pub destroys_soft_block: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub pos: Pos,
}

/// Planning state owned exclusively by the decision engine, embedded in the
/// bot's own player record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BotPlan {
    pub state: BotState,
    pub goal: Pos,
    pub path: VecDeque<Pos>,
    pub ticks_since_think: u32,
    pub attack_target: Option<PlayerId>,
    pub should_plant: bool,
}

impl BotPlan {
    pub fn new(start: Pos) -> Self {
        Self {
            state: BotState::Wander,
            goal: start,
            path: VecDeque::new(),
            ticks_since_think: 0,
            attack_target: None,
            should_plant: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    /// Continuous position in tile units; a tile's center is at `tile + 0.5`.
    pub x: f64,
    pub y: f64,
    pub is_alive: bool,
    pub is_bot: bool,
    pub archetype: Archetype,
    pub bomb_range: u32,
    pub max_bombs: u32,
    pub active_bombs: u32,
    pub speed_multiplier: f64,
    pub plan: BotPlan,
}

impl Player {
    pub fn new(id: PlayerId, x: f64, y: f64, archetype: Archetype) -> Self {
        let start = Pos { y: y.floor() as i32, x: x.floor() as i32 };
        Self {
            id,
            x,
            y,
            is_alive: true,
            is_bot: true,
            archetype,
            bomb_range: 1,
            max_bombs: 1,
            active_bombs: 0,
            speed_multiplier: 1.0,
            plan: BotPlan::new(start),
        }
    }

    pub fn tile(&self) -> Pos {
        Pos { y: self.y.floor() as i32, x: self.x.floor() as i32 }
    }
}

/// A player as the frozen pre-tick snapshot exposes it to other bots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerView {
    pub id: PlayerId,
    pub tile: Pos,
    pub is_alive: bool,
}

/// Read-only view of the world taken at the start of a tick. Every bot stepped
/// within that tick reads the same snapshot.
#[derive(Clone)]
pub struct WorldSnapshot {
    pub grid: Grid,
    pub bombs: BTreeMap<TileKey, Bomb>,
    pub powerups: BTreeMap<TileKey, PowerUp>,
    pub explosions: Vec<ExplosionCell>,
    pub players: Vec<PlayerView>,
}

impl WorldSnapshot {
    pub fn has_bomb(&self, pos: Pos) -> bool {
        self.grid.in_bounds(pos) && self.bombs.contains_key(&self.grid.key(pos))
    }

    /// Living opponents of `me`, in fixed roster order.
    pub fn enemies_of(&self, me: PlayerId) -> impl Iterator<Item = &PlayerView> {
        self.players.iter().filter(move |p| p.id != me && p.is_alive)
    }
}
