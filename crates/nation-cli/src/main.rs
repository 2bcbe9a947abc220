//! Nation Sim
//!
//! Runs computer-controlled nations over a scenario map and records every
//! command they issue.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use nation_ai::config::default_tuning_toml;
use nation_ai::EngineTuning;
use nation_cli::{Runner, Scenario};
use nation_commands::CommandLog;

/// Command line arguments for the scenario runner
#[derive(Parser, Debug)]
#[command(name = "nation-sim")]
#[command(about = "Run AI nations over a scenario map")]
struct Args {
    /// Scenario TOML file
    #[arg(long, required_unless_present = "print_default_tuning")]
    scenario: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 2000)]
    ticks: u64,

    /// Session id seeding every nation; random when omitted
    #[arg(long)]
    game_id: Option<String>,

    /// Engine tuning TOML; built-in defaults when omitted
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Where to write the JSONL command stream
    #[arg(long, default_value = "commands.jsonl")]
    output: PathBuf,

    /// Also write the end-of-run summary as JSON
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Print the default tuning file and exit
    #[arg(long)]
    print_default_tuning: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    if args.print_default_tuning {
        print!("{}", default_tuning_toml());
        return Ok(());
    }
    let Some(scenario_path) = args.scenario else {
        return Err("--scenario is required".into());
    };

    let scenario = Scenario::from_file(&scenario_path)?;
    let tuning = match &args.tuning {
        Some(path) => EngineTuning::from_file(path)?,
        None => EngineTuning::default(),
    };
    let game_id = args.game_id.unwrap_or_else(|| Uuid::new_v4().to_string());

    tracing::info!(
        scenario = %scenario_path.display(),
        game_id = %game_id,
        ticks = args.ticks,
        nations = scenario.nations.len(),
        "starting run"
    );

    let mut runner = Runner::new(scenario, &game_id, &tuning);
    let mut log = CommandLog::new(&args.output)?;
    let summary = runner.run(args.ticks, &mut log)?;

    tracing::info!(commands = summary.commands, output = %args.output.display(), "run complete");
    for (kind, count) in &summary.by_kind {
        tracing::info!(kind = %kind, count, "commands by kind");
    }
    for (name, tiles) in &summary.territory {
        tracing::info!(faction = %name, tiles, "final territory");
    }
    tracing::info!(active = ?summary.active, "nations still in play");

    if let Some(path) = &args.summary {
        std::fs::write(path, serde_json::to_string_pretty(&summary)?)?;
        tracing::info!(path = %path.display(), "summary written");
    }
    Ok(())
}
