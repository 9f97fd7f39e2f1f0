use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;

use sf_model::{Direction, topology_diagram};
use sf_project::{ProjectResult, Scenario, run_scenario};
use sf_sim::{IntegratorType, north_south_share};

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(about = "SignalFlow CLI - single-intersection traffic density simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and values
    Validate {
        /// Path to the scenario YAML/JSON file
        scenario_path: PathBuf,
    },
    /// Print the intersection parameters and layout
    Describe {
        /// Path to the scenario YAML/JSON file
        scenario_path: PathBuf,
    },
    /// Print the intersection layout only
    Topology,
    /// Run a scenario
    Simulate {
        /// Path to the scenario YAML/JSON file
        scenario_path: PathBuf,
        /// Override the time step in seconds
        #[arg(long)]
        dt: Option<f64>,
        /// Override the end time in seconds
        #[arg(long)]
        t_end: Option<f64>,
        /// Override the integrator
        #[arg(long, value_enum)]
        integrator: Option<IntegratorArg>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum IntegratorArg {
    Rk4,
    Euler,
}

impl From<IntegratorArg> for IntegratorType {
    fn from(arg: IntegratorArg) -> Self {
        match arg {
            IntegratorArg::Rk4 => IntegratorType::RK4,
            IntegratorArg::Euler => IntegratorType::ForwardEuler,
        }
    }
}

fn main() -> ProjectResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Describe { scenario_path } => cmd_describe(&scenario_path),
        Commands::Topology => {
            print!("{}", topology_diagram());
            Ok(())
        }
        Commands::Simulate {
            scenario_path,
            dt,
            t_end,
            integrator,
            output,
        } => cmd_simulate(&scenario_path, dt, t_end, integrator, output.as_deref()),
    }
}

fn cmd_validate(scenario_path: &Path) -> ProjectResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = sf_project::load(scenario_path)?;
    // Catch what the schema check cannot: parameter combinations the model rejects
    scenario.build_model()?;
    scenario.build_policy()?;
    println!("✓ Scenario is valid");
    Ok(())
}

fn cmd_describe(scenario_path: &Path) -> ProjectResult<()> {
    let scenario = sf_project::load(scenario_path)?;
    let model = scenario.build_model()?;
    println!("Scenario: {}", scenario.name);
    println!();
    print!("{model}");
    Ok(())
}

fn cmd_simulate(
    scenario_path: &Path,
    dt: Option<f64>,
    t_end: Option<f64>,
    integrator: Option<IntegratorArg>,
    output: Option<&Path>,
) -> ProjectResult<()> {
    let mut scenario: Scenario = sf_project::load(scenario_path)?;
    if let Some(dt) = dt {
        scenario.run.dt_s = dt;
    }
    if let Some(t_end) = t_end {
        scenario.run.t_end_s = t_end;
    }
    if let Some(integrator) = integrator {
        scenario.run.integrator = integrator.into();
    }

    eprintln!("Running scenario: {}", scenario.name);
    eprintln!(
        "  dt = {:.3} s, t_end = {:.3} s, integrator = {:?}",
        scenario.run.dt_s, scenario.run.t_end_s, scenario.run.integrator
    );

    let started = Instant::now();
    let record = run_scenario(&scenario)?;
    tracing::info!(
        records = record.len(),
        elapsed_s = started.elapsed().as_secs_f64(),
        "scenario finished"
    );

    match output {
        Some(path) => {
            record.write_csv(BufWriter::new(File::create(path)?))?;
            eprintln!("✓ Wrote {} rows to {}", record.len(), path.display());
        }
        None => record.write_csv(io::stdout().lock())?,
    }

    if let (Some(x), Some(sensor), Some(u)) =
        (record.x.last(), record.sensor.last(), record.control.last())
    {
        eprintln!("\nFinal state:");
        for dir in Direction::ALL {
            eprintln!("  {dir}: {:.4}", x[dir.index()]);
        }
        eprintln!("  split (East/West share): {u:.4}");
        eprintln!(
            "  North/South share of measured flow: {:.4}",
            north_south_share(sensor)
        );
    }
    Ok(())
}
