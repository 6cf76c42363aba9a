use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use log::error;
use roversim_sim::{load_environment, write_csv_file, Mission, MissionSummary, SimError};
use roversim_structs::MissionDefinition;

#[derive(Parser)]
#[command(name = "roversim")]
#[command(about = "Simulate a rover mission over slope and shadow maps")]
struct Cli {
    /// Mission definition (JSON). Runs the built-in demo mission when omitted
    mission: Option<PathBuf>,

    /// Slope map (flat terrain when omitted)
    #[arg(long)]
    slope: Option<PathBuf>,

    /// Shadow map (fully lit when omitted)
    #[arg(long)]
    shadow: Option<PathBuf>,

    /// Write the per-tick vehicle history to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn run(cli: &Cli) -> Result<bool, SimError> {
    let definition = match &cli.mission {
        Some(path) => MissionDefinition::from_file(path)?,
        None => MissionDefinition::demo(),
    };
    let environment = load_environment(&definition, cli.slope.as_deref(), cli.shadow.as_deref())?;

    let mut mission = Mission::new(&definition, environment)?;
    let outcome = mission.run();
    #[cfg(feature = "prof")]
    hprof::profiler().print_timing();

    println!("{}", outcome);
    print!("{}", MissionSummary::from_history(mission.history(), mission.completed(), mission.world()));
    if let Some(path) = &cli.csv {
        write_csv_file(mission.history(), path)?;
        println!("telemetry written to {}", path.display());
    }
    Ok(outcome.is_success())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
