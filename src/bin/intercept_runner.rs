//! Headless Intercept Runner
//!
//! Plans an interception for every enemy origin in a scenario file or a
//! seeded random scenario and prints the option tables as JSON. Blocking
//! hints are shared across origins.

use std::collections::BTreeMap;
use std::path::PathBuf;

use army_intercept::core::{InterceptConfig, Result, ThreatId, TileId};
use army_intercept::intercept::{ArmyInterception, InterceptPlanner, InterceptPointTileInfo, InterceptionOptionInfo, ThreatBlockTable};
use army_intercept::scenario::Scenario;
use army_intercept::threat::Threat;
use clap::Parser;
use serde::Serialize;

/// Headless Intercept Runner - plan an interception and print the options
#[derive(Parser, Debug)]
#[command(name = "intercept_runner")]
#[command(about = "Plan army interceptions for a board snapshot and output JSON")]
struct Args {
    /// Scenario file (.json or .toml); a random scenario is generated if omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Engine configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for generated scenarios
    #[arg(long)]
    seed: Option<u64>,

    /// Generated board width
    #[arg(long, default_value_t = 20)]
    width: u32,

    /// Generated board height
    #[arg(long, default_value_t = 9)]
    height: u32,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Also print the generated scenario
    #[arg(long)]
    dump_scenario: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunReport {
    seed: Option<u64>,
    plans: Vec<PlanReport>,
    block_hints: ThreatBlockTable,
}

#[derive(Serialize)]
struct PlanReport {
    target_tile: TileId,
    kept_threats: Vec<ThreatId>,
    ignored_threats: Vec<ThreatId>,
    best_threat: Option<ThreatId>,
    kill_threat: Option<ThreatId>,
    intercept_points: Vec<InterceptPointTileInfo>,
    options: BTreeMap<u32, InterceptionOptionInfo>,
    best_option_turns: Option<u32>,
}

impl PlanReport {
    fn new(result: &ArmyInterception) -> Self {
        Self {
            target_tile: result.target_tile,
            kept_threats: result.threats.iter().map(|t| t.threat.id).collect(),
            ignored_threats: result.ignored_threats.iter().map(|t| t.id).collect(),
            best_threat: result.best().map(|t| t.threat.id),
            kill_threat: result.kill().map(|t| t.threat.id),
            intercept_points: result.common_intercept_points.values().cloned().collect(),
            options: result.intercept_options.clone(),
            best_option_turns: result.best_option().map(|o| o.turns),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => InterceptConfig::load(path)?,
        None => InterceptConfig::default(),
    };

    let (scenario, seed) = match &args.scenario {
        Some(path) => (Scenario::load(path)?, None),
        None => {
            let seed = args.seed.unwrap_or_else(rand::random);
            (Scenario::random_corridor(seed, args.width, args.height)?, Some(seed))
        }
    };
    if args.dump_scenario {
        eprintln!("{}", scenario.to_json()?);
    }

    let (board, threats) = scenario.build()?;
    if threats.is_empty() {
        tracing::warn!("Scenario has no threats, nothing to plan");
        return Ok(());
    }

    let mut by_origin: BTreeMap<TileId, Vec<Threat>> = BTreeMap::new();
    for threat in &threats {
        by_origin.entry(threat.origin()).or_default().push(threat.clone());
    }

    let mut planner = InterceptPlanner::new(&board, config);
    let block_hints = planner.block_table(&threats);
    let mut plans = Vec::with_capacity(by_origin.len());
    for group in by_origin.values() {
        let result = planner.plan_with_blocks(group, &block_hints)?;
        plans.push(PlanReport::new(&result));
    }
    let report = RunReport {
        seed,
        plans,
        block_hints,
    };

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for plan in &report.plans {
            println!(
                "Target {}: {} kept, {} ignored threats",
                plan.target_tile,
                plan.kept_threats.len(),
                plan.ignored_threats.len()
            );
            for (turns, option) in &plan.options {
                println!(
                    "  {:>3} turns: value {:>7.2} blocked {:>6.2} via {} ({} moves, army left {})",
                    turns,
                    option.value,
                    option.damage_blocked,
                    option.intercept_tile,
                    option.path.length(),
                    option.intercepting_army_remaining
                );
            }
            match plan.best_option_turns {
                Some(turns) => println!("Best option: {} turns", turns),
                None => println!("No viable intercept"),
            }
        }
    }

    Ok(())
}
