use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use engine::{Archetype, ArchetypeTable, Arena, MatchOutcome, MatchStatus};

#[derive(Parser)]
#[command(author, version, about = "Headless bomb-arena bot match runner", long_about = None)]
struct Args {
    /// Match seed; generated from the clock when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Maximum number of ticks to simulate
    #[arg(short, long, default_value_t = 3600)]
    ticks: u32,

    /// Comma-separated bot lineup (hostile, careful, greedy, extreme)
    #[arg(short, long, default_value = "careful,greedy,hostile,extreme")]
    bots: String,

    /// Archetype table JSON file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the built-in archetype table to this path and exit
    #[arg(long)]
    dump_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = args.dump_config {
        ArchetypeTable::default()
            .write_atomic(&path)
            .with_context(|| format!("failed to write archetype table to {}", path.display()))?;
        println!("Wrote default archetype table to {}", path.display());
        return Ok(());
    }

    let table = match &args.config {
        Some(path) => ArchetypeTable::load(path)
            .with_context(|| format!("failed to load archetype table from {}", path.display()))?,
        None => ArchetypeTable::default(),
    };

    let lineup = parse_lineup(&args.bots)?;
    let seed = args.seed.unwrap_or_else(generate_runtime_seed);

    let mut arena = Arena::new(seed, &lineup, table);
    let status = arena.advance(args.ticks);

    println!("Seed: {seed}");
    println!("Ticks simulated: {}", arena.current_tick());
    match status {
        MatchStatus::Playing => println!("Outcome: still playing after {} ticks", args.ticks),
        MatchStatus::Finished(MatchOutcome::Draw) => println!("Outcome: draw"),
        MatchStatus::Finished(MatchOutcome::Winner(id)) => {
            let archetype = arena
                .players()
                .find(|p| p.id == id)
                .map(|p| format!("{:?}", p.archetype))
                .unwrap_or_else(|| "unknown".to_string());
            println!("Outcome: winner {archetype} ({id:?})");
        }
    }
    println!("Snapshot hash: {:#018x}", arena.snapshot_hash());

    Ok(())
}

fn parse_lineup(raw: &str) -> Result<Vec<Archetype>> {
    let lineup: Vec<Archetype> = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<Archetype>().map_err(anyhow::Error::msg))
        .collect::<Result<_>>()?;
    anyhow::ensure!(lineup.len() >= 2, "a match needs at least two bots, got {}", lineup.len());
    anyhow::ensure!(lineup.len() <= 4, "the arena has four spawn corners, got {}", lineup.len());
    Ok(lineup)
}

fn generate_runtime_seed() -> u64 {
    let now_nanos =
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0_u128, |duration| duration.as_nanos());
    let pid = u64::from(std::process::id());
    mix_seed((now_nanos as u64) ^ ((now_nanos >> 64) as u64) ^ pid.rotate_left(17))
}

fn mix_seed(mut value: u64) -> u64 {
    value ^= value >> 30;
    value = value.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    value ^= value >> 27;
    value = value.wrapping_mul(0x94D0_49BB_1331_11EB);
    value ^ (value >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lineup_parses_names_and_rejects_bad_sizes() {
        let lineup = parse_lineup("careful, greedy").expect("two bots should parse");
        assert_eq!(lineup, vec![Archetype::Careful, Archetype::Greedy]);

        assert!(parse_lineup("careful").is_err(), "one bot is not a match");
        assert!(parse_lineup("careful,greedy,hostile,extreme,careful").is_err());
        assert!(parse_lineup("careful,warlock").is_err(), "unknown archetype must error");
    }
}
