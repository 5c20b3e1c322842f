//! Archetype tuning data: a single external table rather than constants
//! scattered through the decision code. Only the priority ordering is fixed in
//! code; everything an archetype does differently is a field here.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{Archetype, AttackPolicy, DangerPolicy, PowerupPolicy};

pub const TICKS_PER_SECOND: u32 = 30;

/// Base movement speed in tiles per tick, before the speed multiplier.
pub const BASE_SPEED: f64 = 0.15;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeConfig {
    pub reeval_interval_secs: f64,
    pub reeval_chance_pct: u32,
    pub danger_dist: u32,
    pub danger_policy: DangerPolicy,
    pub attack_policy: AttackPolicy,
    pub attack_reach_dist: u32,
    pub powerup_policy: PowerupPolicy,
    pub powerup_chance_pct: u32,
    pub plant_range: u32,
    /// Refuse to plant unless a simulated blast still leaves a reachable safe
    /// tile.
    pub checked_plant: bool,
}

impl ArchetypeConfig {
    pub fn reeval_interval_ticks(&self) -> u32 {
        ((self.reeval_interval_secs * TICKS_PER_SECOND as f64) as u32).max(1)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeTable {
    pub hostile: ArchetypeConfig,
    pub careful: ArchetypeConfig,
    pub greedy: ArchetypeConfig,
    pub extreme: ArchetypeConfig,
}

impl ArchetypeTable {
    pub fn build_default() -> Self {
        Self {
            hostile: ArchetypeConfig {
                reeval_interval_secs: 0.5,
                reeval_chance_pct: 25,
                danger_dist: 0,
                danger_policy: DangerPolicy::BombOnly,
                attack_policy: AttackPolicy::RandomPursuit,
                attack_reach_dist: 0,
                powerup_policy: PowerupPolicy::RandomNearby,
                powerup_chance_pct: 20,
                plant_range: 2,
                checked_plant: false,
            },
            careful: ArchetypeConfig {
                reeval_interval_secs: 0.25,
                reeval_chance_pct: 100,
                danger_dist: 4,
                danger_policy: DangerPolicy::FutureExplosion,
                attack_policy: AttackPolicy::ReachableNearest,
                attack_reach_dist: 3,
                powerup_policy: PowerupPolicy::RandomNearby,
                powerup_chance_pct: 100,
                plant_range: 4,
                checked_plant: true,
            },
            greedy: ArchetypeConfig {
                reeval_interval_secs: 1.0,
                reeval_chance_pct: 100,
                danger_dist: 2,
                danger_policy: DangerPolicy::FutureExplosion,
                attack_policy: AttackPolicy::ReachableNearest,
                attack_reach_dist: 6,
                powerup_policy: PowerupPolicy::Closest,
                powerup_chance_pct: 100,
                plant_range: 3,
                checked_plant: true,
            },
            extreme: ArchetypeConfig {
                reeval_interval_secs: 0.1,
                reeval_chance_pct: 10,
                danger_dist: 10,
                danger_policy: DangerPolicy::FutureExplosion,
                attack_policy: AttackPolicy::RandomPursuit,
                attack_reach_dist: 10,
                powerup_policy: PowerupPolicy::Closest,
                powerup_chance_pct: 100,
                plant_range: 10,
                checked_plant: false,
            },
        }
    }

    pub fn get(&self, archetype: Archetype) -> &ArchetypeConfig {
        match archetype {
            Archetype::Hostile => &self.hostile,
            Archetype::Careful => &self.careful,
            Archetype::Greedy => &self.greedy,
            Archetype::Extreme => &self.extreme,
        }
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        let table: Self = serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(table)
    }

    pub fn write_atomic(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;

        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;

        Ok(())
    }
}

impl Default for ArchetypeTable {
    fn default() -> Self {
        Self::build_default()
    }
}
