use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct PlayerId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

/// Integer tile encoding `row * cols + col` for O(1) set membership.
pub type TileKey = i32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TileKind {
    Empty,
    SoftBlock,
    HardBlock,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Hostile,
    Careful,
    Greedy,
    Extreme,
}

impl Archetype {
    pub const ALL: [Archetype; 4] =
        [Archetype::Hostile, Archetype::Careful, Archetype::Greedy, Archetype::Extreme];
}

impl std::str::FromStr for Archetype {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "hostile" => Ok(Archetype::Hostile),
            "careful" => Ok(Archetype::Careful),
            "greedy" => Ok(Archetype::Greedy),
            "extreme" => Ok(Archetype::Extreme),
            other => Err(format!("unknown archetype '{other}'")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BotState {
    Wander,
    Attack,
    Escape,
    GetPowerup,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DangerPolicy {
    /// Only exploding tiles and tiles carrying a bomb count as dangerous.
    BombOnly,
    /// Tiles a bomb's blast lines can reach count as dangerous too.
    FutureExplosion,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackPolicy {
    /// Nearest enemy already reachable through open tiles, within reach.
    ReachableNearest,
    /// Uniformly random living enemy, digging through soft blocks en route.
    RandomPursuit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerupPolicy {
    Closest,
    RandomNearby,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PowerUpKind {
    FireUp,
    BombUp,
    SpeedUp,
}

/// Per-tick movement/plant intent handed to the physics resolver.
/// `dx`/`dy` are single-tile directions in `{-1, 0, 1}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BotIntent {
    pub dx: i8,
    pub dy: i8,
    pub plant: bool,
}

impl BotIntent {
    pub const IDLE: BotIntent = BotIntent { dx: 0, dy: 0, plant: false };
}

/// World events since the previous tick, supplied by the resolver to gate
/// forced re-evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickEvents {
    pub bomb_just_planted: bool,
    pub explosion_just_ended: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogEvent {
    StateChanged { player: PlayerId, state: BotState, goal: Pos },
    BombPlanted { player: PlayerId, pos: Pos },
    SoftBlockDestroyed { pos: Pos },
    PowerUpCollected { player: PlayerId, kind: PowerUpKind },
    PlayerDied { player: PlayerId, pos: Pos },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchStatus {
    Playing,
    Finished(MatchOutcome),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    Winner(PlayerId),
    Draw,
}
