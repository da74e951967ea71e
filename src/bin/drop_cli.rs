use bullet_drop::{
    distance_steps, BallisticsError, CalibrationPreset, DragCalibration, DropSolver, DropTableRow,
    FileStore, ProfileCatalog, ProfileRepository, SimulationInput, SimulationResult,
};
use bullet_drop::solver::MAX_TABLE_ROWS;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::debug;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "drop-cli")]
#[command(author = "Ballistics Engine Team")]
#[command(version)]
#[command(about = "Bullet drop and mil correction calculator", long_about = None)]
struct Cli {
    /// Calibration preset (standard, extended)
    #[arg(long, global = true, default_value = "standard", value_parser = parse_preset)]
    calibration: CalibrationPreset,

    /// JSON file with drag_factor, min_velocity_mps, time_step_s, max_time_s
    #[arg(long, global = true)]
    calibration_file: Option<PathBuf>,

    /// Directory holding saved bullet profiles
    #[arg(long, global = true, env = "BULLET_DROP_HOME", default_value = ".bullet-drop")]
    store_dir: PathBuf,

    /// Log engine details to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate drop at a single target distance
    Drop {
        #[command(flatten)]
        shot: ShotArgs,

        /// Distance to target (yards)
        #[arg(short = 'd', long, default_value = "800")]
        distance: f64,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Calculate a drop table over a range of distances
    Table {
        #[command(flatten)]
        shot: ShotArgs,

        /// First target distance (yards)
        #[arg(long, default_value = "100")]
        start: f64,

        /// Last target distance (yards)
        #[arg(long, default_value = "1000")]
        end: f64,

        /// Distance between rows (yards)
        #[arg(long, default_value = "100")]
        step: f64,

        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Manage bullet profiles
    Profiles {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Display calculator information
    Info,
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// List built-in and saved profiles
    List {
        /// Output format
        #[arg(short = 'o', long, default_value = "table")]
        output: OutputFormat,
    },

    /// Save a custom profile (overwrites one with the same name)
    Add {
        /// Profile name
        name: String,

        /// Muzzle velocity (ft/s)
        velocity: String,

        /// Ballistic coefficient (G1)
        bc: String,
    },
}

#[derive(Args)]
struct ShotArgs {
    /// Bullet profile name (see `profiles list`)
    #[arg(short = 'p', long)]
    profile: Option<String>,

    /// Muzzle velocity (ft/s), overrides the profile
    #[arg(short = 'v', long)]
    velocity: Option<f64>,

    /// Ballistic coefficient (G1), overrides the profile
    #[arg(short = 'b', long)]
    bc: Option<f64>,

    /// Rifle zero distance (yards)
    #[arg(short = 'z', long, default_value = "100")]
    zero: f64,

    /// Elevation above sea level (meters)
    #[arg(short = 'e', long, default_value = "1500")]
    elevation: f64,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
    Table,
}

#[derive(Serialize)]
struct DropReport<'a> {
    profile: Option<&'a str>,
    input: SimulationInput,
    result: SimulationResult,
}

#[derive(Serialize)]
struct ProfileRow<'a> {
    name: &'a str,
    velocity: f64,
    bc: f64,
    source: String,
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let calibration = load_calibration(&cli)?;
    let solver = DropSolver::new(calibration)?;
    let repository = ProfileRepository::load_profiles(FileStore::new(&cli.store_dir));

    match cli.command {
        Commands::Drop { shot, distance, output } => {
            let input = resolve_shot(&repository, &shot, distance)?;
            let result = solver.simulate_drop(&input)?;

            let report = DropReport {
                profile: shot.profile.as_deref(),
                input,
                result,
            };
            display_drop(&report, output)?;
        },

        Commands::Table { shot, start, end, step, output } => {
            let input = resolve_shot(&repository, &shot, start)?;
            let distances = distance_steps(start, end, step);
            if distances.is_empty() {
                return Err(format!(
                    "no distances in {start}..{end} step {step} (at most {MAX_TABLE_ROWS} rows)"
                )
                .into());
            }

            let rows = solver.drop_table(&input, &distances)?;
            display_table(&input, &rows, output)?;
        },

        Commands::Profiles { command } => match command {
            ProfileCommands::List { output } => {
                display_profiles(&repository.list_profiles(), output)?;
            },
            ProfileCommands::Add { name, velocity, bc } => {
                let profile = repository
                    .add_profile(&name, &velocity, &bc)
                    .map_err(BallisticsError::from)?;
                println!("Saved profile \"{}\" ({} ft/s, BC {})",
                    profile.name, profile.muzzle_velocity, profile.drag_coefficient);
            },
        },

        Commands::Info => {
            println!("╔════════════════════════════════════════╗");
            println!("║      BULLET DROP CALCULATOR            ║");
            println!("╠════════════════════════════════════════╣");
            println!("║ Drag factor:       {:>10.6}          ║", calibration.drag_factor);
            println!("║ Velocity floor:    {:>8.1} m/s        ║", calibration.min_velocity_mps);
            println!("║ Time step:         {:>8.4} s          ║", calibration.time_step_s);
            println!("║ Max flight time:   {:>8.2} s          ║", calibration.max_time_s);
            println!("╠════════════════════════════════════════╣");
            println!("║ Profile store:                         ║");
            println!("║   {:<36} ║", repository.store().dir().display());
            println!("╚════════════════════════════════════════╝");
        }
    }

    Ok(())
}

fn load_calibration(cli: &Cli) -> Result<DragCalibration, BallisticsError> {
    if let Some(path) = &cli.calibration_file {
        debug!("loading calibration from {}", path.display());
        return Ok(DragCalibration::from_json_file(path)?);
    }

    Ok(cli.calibration.calibration())
}

fn parse_preset(s: &str) -> Result<CalibrationPreset, String> {
    CalibrationPreset::from_str(s)
        .ok_or_else(|| format!("unknown calibration {s:?} (expected standard or extended)"))
}

fn resolve_shot(
    repository: &ProfileRepository<FileStore>,
    shot: &ShotArgs,
    target_distance: f64,
) -> Result<SimulationInput, BallisticsError> {
    let defaults = SimulationInput::default();

    let (velocity, bc) = match &shot.profile {
        Some(name) => {
            let profile = repository
                .get(name)
                .ok_or_else(|| BallisticsError::UnknownProfile(name.clone()))?;
            (profile.muzzle_velocity, profile.drag_coefficient)
        }
        None => (defaults.muzzle_velocity, defaults.drag_coefficient),
    };

    Ok(SimulationInput {
        muzzle_velocity: shot.velocity.unwrap_or(velocity),
        drag_coefficient: shot.bc.unwrap_or(bc),
        target_distance,
        zero_distance: shot.zero,
        elevation: shot.elevation,
    })
}

fn display_drop(report: &DropReport, format: OutputFormat) -> Result<(), Box<dyn Error>> {
    let input = &report.input;
    let result = &report.result;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        },

        OutputFormat::Csv => {
            println!("distance_yd,zero_yd,time_s,drop_m,drop_in,drop_mil");
            println!("{:.1},{:.1},{:.4},{:.2},{:.2},{:.2}",
                input.target_distance, input.zero_distance, result.time_of_flight,
                result.drop_linear, result.drop_inches, result.drop_angular);
        },

        OutputFormat::Table => {
            println!("╔════════════════════════════════════════╗");
            println!("║         BULLET DROP RESULTS            ║");
            println!("╠════════════════════════════════════════╣");
            if let Some(profile) = report.profile {
                println!("║ Profile: {:<29} ║", profile);
            }
            println!("║ Velocity:          {:>8.0} ft/s       ║", input.muzzle_velocity);
            println!("║ BC (G1):           {:>8.3}            ║", input.drag_coefficient);
            println!("║ Distance:          {:>8.0} yd         ║", input.target_distance);
            println!("║ Zero:              {:>8.0} yd         ║", input.zero_distance);
            println!("║ Elevation:         {:>8.0} m          ║", input.elevation);
            println!("╠════════════════════════════════════════╣");
            println!("║ Time of Flight:    {:>8.3} s          ║", result.time_of_flight);
            println!("║ Drop:              {:>8.2} m          ║", result.drop_linear);
            println!("║ Drop:              {:>8.2} in         ║", result.drop_inches);
            println!("║ Correction:        {:>8.2} mil        ║", result.drop_angular);
            println!("╚════════════════════════════════════════╝");
        },
    }

    Ok(())
}

fn display_table(input: &SimulationInput, rows: &[DropTableRow], format: OutputFormat) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(rows)?);
        },

        OutputFormat::Csv => {
            println!("distance_yd,time_s,drop_m,drop_in,drop_mil");
            for row in rows {
                println!("{:.1},{:.4},{:.2},{:.2},{:.2}",
                    row.target_distance, row.result.time_of_flight, row.result.drop_linear,
                    row.result.drop_inches, row.result.drop_angular);
            }
        },

        OutputFormat::Table => {
            println!("Drop table: {:.0} ft/s, BC {:.3}, zero {:.0} yd, elevation {:.0} m",
                input.muzzle_velocity, input.drag_coefficient, input.zero_distance, input.elevation);
            println!("┌──────────┬──────────┬──────────┬──────────┬──────────┐");
            println!("│ Dist(yd) │ Time (s) │ Drop (m) │ Drop(in) │ Drop(mil)│");
            println!("├──────────┼──────────┼──────────┼──────────┼──────────┤");
            for row in rows {
                println!("│ {:>8.0} │ {:>8.3} │ {:>8.2} │ {:>8.1} │ {:>8.2} │",
                    row.target_distance, row.result.time_of_flight, row.result.drop_linear,
                    row.result.drop_inches, row.result.drop_angular);
            }
            println!("└──────────┴──────────┴──────────┴──────────┴──────────┘");
        },
    }

    Ok(())
}

fn display_profiles(catalog: &ProfileCatalog, format: OutputFormat) -> Result<(), Box<dyn Error>> {
    let rows: Vec<ProfileRow> = catalog
        .entries()
        .iter()
        .map(|entry| ProfileRow {
            name: &entry.profile.name,
            velocity: entry.profile.muzzle_velocity,
            bc: entry.profile.drag_coefficient,
            source: entry.source.to_string(),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        },

        OutputFormat::Csv => {
            println!("name,velocity_fps,bc,source");
            for row in &rows {
                println!("\"{}\",{},{},{}", row.name.replace('"', "\"\""), row.velocity, row.bc, row.source);
            }
        },

        OutputFormat::Table => {
            println!("┌────────────────────────────────┬──────────┬────────┬──────────┐");
            println!("│ Profile                        │ Vel(fps) │   BC   │ Source   │");
            println!("├────────────────────────────────┼──────────┼────────┼──────────┤");
            for row in &rows {
                println!("│ {:<30} │ {:>8.0} │ {:>6.3} │ {:<8} │",
                    row.name, row.velocity, row.bc, row.source);
            }
            println!("└────────────────────────────────┴──────────┴────────┴──────────┘");
        },
    }

    Ok(())
}
