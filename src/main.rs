//! waterlog - watering volume recommendations for houseplants
//!
//! CLI entry point.

use std::process::ExitCode;

use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use waterlog::cli::history::HistoryOptions;
use waterlog::cli::recommend::RecommendOptions;
use waterlog::cli::register::RegisterOptions;
use waterlog::cli::water::WaterOptions;
use waterlog::cli::{
    CommandOutput, HistoryCommand, RecommendCommand, RegisterCommand, WaterCommand,
};
use waterlog::config::Config;
use waterlog::core::{
    EventFilter, EventId, MaterialId, NewClimate, NewPlant, PlantId, PlantTypeId, UserId,
    WateringPatch, WateringRequest,
};
use waterlog::error::{exit_codes, WaterlogError};
use waterlog::storage::FileDiaryStore;

/// Env var holding the log filter directive.
const LOG_ENV: &str = "WATERLOG_LOG";

/// Filter used when `WATERLOG_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "waterlog=warn";

// =============================================================================
// CLI Definition
// =============================================================================

/// waterlog - watering volume recommendations for houseplants
#[derive(Parser)]
#[command(name = "waterlog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the built-in plant type and material catalog
    Seed {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
    },

    /// Manage plants
    Plant {
        #[command(subcommand)]
        action: PlantAction,
    },

    /// Manage climate readings
    Climate {
        #[command(subcommand)]
        action: ClimateAction,
    },

    /// Show how much to water a plant now
    Recommend {
        /// Plant ID
        plant_id: u32,
        /// Show every factor behind the volume
        #[arg(long, short)]
        explain: bool,
        /// Processing date (default: today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
    },

    /// Record a watering
    Water {
        /// Plant ID
        plant_id: u32,
        /// Volume applied in mL
        #[arg(long, short, allow_negative_numbers = true)]
        volume: i64,
        /// Date of the watering (default: today)
        #[arg(long, short)]
        date: Option<NaiveDate>,
        /// Time of the watering, HH:MM (default: now)
        #[arg(long, short, value_parser = parse_time)]
        time: Option<NaiveTime>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
    },

    /// Correct a recorded watering
    Amend {
        /// Event ID
        event_id: u32,
        /// New volume in mL
        #[arg(long, short, allow_negative_numbers = true)]
        volume: Option<i64>,
        /// New date
        #[arg(long, short)]
        date: Option<NaiveDate>,
        /// New time, HH:MM
        #[arg(long, short, value_parser = parse_time)]
        time: Option<NaiveTime>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
    },

    /// Delete a recorded watering
    Remove {
        /// Event ID
        event_id: u32,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
    },

    /// List recorded waterings
    History {
        /// Only plants owned by this user
        #[arg(long, short)]
        user: Option<u32>,
        /// Only this plant
        #[arg(long, short)]
        plant: Option<u32>,
        /// Earliest date (inclusive)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Latest date (inclusive)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Show only the most recent N events
        #[arg(long, short)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum PlantAction {
    /// Register a plant
    Add {
        /// Display name
        name: String,
        /// Owning user ID
        #[arg(long, short)]
        user: u32,
        /// Plant type ID (see `seed`)
        #[arg(long = "type", short = 't')]
        plant_type: u32,
        /// Pot material ID (see `seed`)
        #[arg(long, short)]
        material: u32,
        /// Plant height in cm
        #[arg(long)]
        height: Option<u32>,
        /// Pot diameter in cm
        #[arg(long)]
        pot_size: Option<u32>,
        /// Share of soil looseners in percent
        #[arg(long)]
        soil_loosener: Option<u32>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ClimateAction {
    /// Record a climate reading
    Add {
        /// User ID
        #[arg(long, short)]
        user: u32,
        /// Air temperature in °C
        #[arg(long, short, allow_negative_numbers = true)]
        temperature: f64,
        /// Relative humidity in percent
        #[arg(long = "humidity", short = 'H')]
        humidity: f64,
        /// Date of the reading (default: today)
        #[arg(long, short)]
        date: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
    },
}

/// Accept `HH:MM` or `HH:MM:SS`.
fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| format!("invalid time '{}', expected HH:MM", value))
}

// =============================================================================
// Entry point
// =============================================================================

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("waterlog error: {}", e);
            ExitCode::from(exit_codes::for_category(e.category()) as u8)
        }
    }
}

/// Install the stderr log subscriber.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

/// Run the CLI and return the exit code.
fn run() -> waterlog::Result<i32> {
    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        Commands::Seed { json } => {
            let cmd = RegisterCommand::new(open_store(&config)?);
            let output = cmd.seed();
            Ok(emit(&output, cmd.format_output(&output, &RegisterOptions { json })))
        }
        Commands::Plant {
            action:
                PlantAction::Add {
                    name,
                    user,
                    plant_type,
                    material,
                    height,
                    pot_size,
                    soil_loosener,
                    json,
                },
        } => {
            let cmd = RegisterCommand::new(open_store(&config)?);
            let output = cmd.add_plant(NewPlant {
                name,
                user_id: UserId(user),
                plant_type_id: PlantTypeId(plant_type),
                material_id: MaterialId(material),
                height_cm: height,
                pot_size_cm: pot_size,
                soil_loosener_pct: soil_loosener,
            });
            Ok(emit(&output, cmd.format_output(&output, &RegisterOptions { json })))
        }
        Commands::Climate {
            action:
                ClimateAction::Add {
                    user,
                    temperature,
                    humidity,
                    date,
                    json,
                },
        } => {
            let cmd = RegisterCommand::new(open_store(&config)?);
            let output = cmd.add_climate(NewClimate {
                user_id: UserId(user),
                date: date.unwrap_or_else(|| Local::now().date_naive()),
                temperature_c: temperature,
                humidity_pct: humidity,
            });
            Ok(emit(&output, cmd.format_output(&output, &RegisterOptions { json })))
        }
        Commands::Recommend {
            plant_id,
            explain,
            as_of,
            json,
        } => {
            let cmd = RecommendCommand::new(open_store(&config)?, &config);
            let options = RecommendOptions {
                json,
                explain,
                as_of,
            };
            let output = cmd.run(PlantId(plant_id), &options);
            Ok(emit(&output, cmd.format_output(&output, &options)))
        }
        Commands::Water {
            plant_id,
            volume,
            date,
            time,
            json,
        } => {
            let now = Local::now();
            let request = WateringRequest::new(
                PlantId(plant_id),
                date.unwrap_or_else(|| now.date_naive()),
                time.unwrap_or_else(|| now.time()),
                volume,
            );
            let cmd = WaterCommand::new(open_store(&config)?, &config);
            let options = WaterOptions { json, as_of: None };
            let output = cmd.record(&request, &options);
            Ok(emit(&output, cmd.format_output(&output, &options)))
        }
        Commands::Amend {
            event_id,
            volume,
            date,
            time,
            json,
        } => {
            let patch = WateringPatch {
                date,
                time,
                applied_volume_ml: volume,
            };
            let cmd = WaterCommand::new(open_store(&config)?, &config);
            let options = WaterOptions { json, as_of: None };
            let output = cmd.amend(EventId(event_id), &patch, &options);
            Ok(emit(&output, cmd.format_output(&output, &options)))
        }
        Commands::Remove { event_id, json } => {
            let cmd = WaterCommand::new(open_store(&config)?, &config);
            let options = WaterOptions { json, as_of: None };
            let output = cmd.remove(EventId(event_id));
            Ok(emit(&output, cmd.format_output(&output, &options)))
        }
        Commands::History {
            user,
            plant,
            from,
            to,
            limit,
            json,
        } => {
            let filter = EventFilter {
                user_id: user.map(UserId),
                plant_id: plant.map(PlantId),
                from,
                to,
            };
            let cmd = HistoryCommand::new(open_store(&config)?, &config);
            let options = HistoryOptions { json, limit };
            let output = cmd.run(&filter, &options);
            Ok(emit(&output, cmd.format_output(&output, &options)))
        }
    }
}

/// Open the diary file named by the configuration.
fn open_store(config: &Config) -> waterlog::Result<FileDiaryStore> {
    let path = config.diary_path().ok_or_else(|| {
        WaterlogError::config("Could not determine diary location (no home directory)")
    })?;
    FileDiaryStore::with_path(path)
}

/// Print formatted output and return its exit code.
fn emit(output: &impl CommandOutput, formatted: String) -> i32 {
    if !formatted.is_empty() {
        if output.exit_code() == exit_codes::OK {
            print!("{}", formatted);
            if !formatted.ends_with('\n') {
                println!();
            }
        } else {
            eprint!("{}", formatted);
            if !formatted.ends_with('\n') {
                eprintln!();
            }
        }
    }
    output.exit_code()
}
