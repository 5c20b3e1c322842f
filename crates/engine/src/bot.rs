//! Per-bot decision engine: danger reasoning, pathfinding, goal selection and
//! path-following glued into one tick-synchronous step.
//! This file wires focused submodules together and owns the injected RNG.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

use crate::config::ArchetypeConfig;
use crate::state::{Player, WorldSnapshot};
use crate::types::{AttackPolicy, BotIntent, BotState, TickEvents};

mod danger;
mod executor;
mod pathfinding;
mod planner;
#[cfg(test)]
mod test_support;

pub use danger::{DangerMap, danger_map, is_in_danger, is_safe_to_plant};
pub use pathfinding::{find_path, manhattan, neighbors};

pub struct BotEngine {
    rng: ChaCha8Rng,
}

impl BotEngine {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Advance one bot by one tick against a frozen world snapshot.
    ///
    /// Mutates only the bot's own record (plan fields and continuous
    /// position); the returned intent is what the physics resolver consumes.
    pub fn step(
        &mut self,
        bot: &mut Player,
        world: &WorldSnapshot,
        cfg: &ArchetypeConfig,
        events: TickEvents,
    ) -> BotIntent {
        if !bot.is_alive {
            return BotIntent::IDLE;
        }

        bot.plan.should_plant = false;
        bot.plan.ticks_since_think = bot.plan.ticks_since_think.saturating_add(1);

        let danger =
            danger_map(&world.grid, &world.bombs, &world.explosions, cfg.danger_policy);
        let tile = bot.tile();
        let endangered = is_in_danger(&world.grid, &danger, tile, cfg.danger_dist);

        let forced = endangered
            || tile == bot.plan.goal
            || bot.plan.path.is_empty()
            || events.bomb_just_planted
            || events.explosion_just_ended;
        let think = if forced {
            true
        } else {
            bot.plan.ticks_since_think >= cfg.reeval_interval_ticks()
                && percent_roll(&mut self.rng, cfg.reeval_chance_pct)
        };

        if think {
            planner::reevaluate(bot, world, cfg, &danger, endangered, &mut self.rng);
            bot.plan.ticks_since_think = 0;
        } else if bot.plan.state == BotState::Attack
            && cfg.attack_policy == AttackPolicy::RandomPursuit
        {
            planner::refresh_pursuit(bot, world);
        }

        let (dx, dy) = executor::follow_path(bot, world);
        planner::update_plant_signal(bot, world, cfg, &danger);

        BotIntent { dx, dy, plant: bot.plan.should_plant }
    }
}

pub(crate) fn rand_index(rng: &mut ChaCha8Rng, len: usize) -> usize {
    (rng.next_u64() % len as u64) as usize
}

pub(crate) fn percent_roll(rng: &mut ChaCha8Rng, pct: u32) -> bool {
    rng.next_u64() % 100 < u64::from(pct)
}
