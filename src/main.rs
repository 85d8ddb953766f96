use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use peonsim::{
    engine::{Engine, EngineConfig},
    inventory::ItemKind,
    scenario::ScenarioLoader,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless peon simulation runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/island.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override snapshot interval in ticks (0 disables snapshots)
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    if let Some(interval) = cli.snapshot_interval {
        scenario.snapshot_interval_ticks = interval;
    }
    let ticks = scenario.ticks(cli.ticks);

    let mut config = EngineConfig::from_scenario(&scenario);
    if let Some(dir) = cli.snapshot_dir {
        config = config.with_snapshot_dir(dir.display().to_string());
    }

    let mut engine = Engine::from_scenario(&scenario, config);
    engine.run(ticks)?;

    let world = engine.world();
    let calendar = world.calendar();
    println!(
        "Scenario '{}' completed for {} ticks. Date: {} {}, Year {}. Peons: {}.",
        scenario.name,
        ticks,
        calendar.month_name(),
        calendar.day(),
        calendar.year(),
        world.peon_count()
    );
    if let Some(stockpile) = world.find_entity(peonsim::entity::EntityKind::Stockpile) {
        if let Some(stock) = world.inventory(stockpile) {
            let totals: Vec<String> = ItemKind::ALL
                .iter()
                .map(|item| format!("{}: {}", item.name(), stock.count(*item)))
                .collect();
            println!("Stockpile: {}", totals.join(", "));
        }
    }
    Ok(())
}
