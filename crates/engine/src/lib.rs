pub mod arena;
pub mod bot;
pub mod config;
pub mod state;
pub mod types;

pub use arena::Arena;
pub use bot::{BotEngine, DangerMap, danger_map, find_path, is_in_danger, manhattan};
pub use config::{ArchetypeConfig, ArchetypeTable, BASE_SPEED, TICKS_PER_SECOND};
pub use state::{Bomb, BotPlan, ExplosionCell, Grid, Player, PlayerView, PowerUp, WorldSnapshot};
pub use types::*;
