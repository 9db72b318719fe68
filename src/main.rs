//! Streamflow retrieval CLI
//!
//! Pulls discharge records from the Colorado DWR export service for any date
//! range, splitting it into requests the service will accept.
//!
//! Usage:
//!   streamflow_service stations --search Bailey
//!   streamflow_service chunks --start 2015/10/01 --end 2017/10/01
//!   streamflow_service fetch --search Bailey --start 2015/10/01 --end 2017/10/01 > bailey.csv
//!
//! Environment:
//!   STREAMFLOW_CONFIG   - path to the configuration file (default: streamflow.toml)
//!   STREAMFLOW_BASE_URL - override for the export endpoint
//!   RUST_LOG            - tracing filter

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use streamflow_service::config::{self, FailureMode, StreamflowConfig};
use streamflow_service::export;
use streamflow_service::logging::init_logging;
use streamflow_service::retrieval::{StreamflowClient, plan_chunks};
use streamflow_service::stations::{StaticStations, StationDirectory};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(version, about = "Colorado DWR streamflow retrieval")]
struct Cli {
    /// Configuration file (overrides $STREAMFLOW_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the configured station directory
    Stations {
        /// Only stations whose name or abbreviation contains this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Print the sub-ranges a retrieval would request
    Chunks {
        #[command(flatten)]
        range: DateArgs,
        #[arg(long, default_value = "PLABAICO")]
        station: String,
    },
    /// Retrieve a discharge series and write it out
    Fetch {
        #[command(flatten)]
        target: StationArgs,
        #[command(flatten)]
        range: DateArgs,
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip failed sub-ranges instead of aborting
        #[arg(long)]
        best_effort: bool,
    },
}

#[derive(Args, Debug)]
struct DateArgs {
    /// Start date, YYYY/MM/DD
    #[arg(long)]
    start: String,
    /// End date, YYYY/MM/DD
    #[arg(long)]
    end: String,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct StationArgs {
    /// DWR station abbreviation
    #[arg(long)]
    station: Option<String>,
    /// Station name fragment, resolved through the directory
    #[arg(long)]
    search: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when the command ran but some sub-ranges failed.
fn run(cli: Cli) -> Result<bool, Box<dyn Error>> {
    let config = match &cli.config {
        Some(path) => {
            let mut config = config::load_config(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => config::load_config_from_env()?,
    };

    match cli.command {
        Command::Stations { search } => list_stations(config, search.as_deref()),
        Command::Chunks { range, station } => print_chunks(config, &station, &range),
        Command::Fetch {
            target,
            range,
            format,
            output,
            best_effort,
        } => fetch(config, &target, &range, format, output, best_effort),
    }
}

fn list_stations(config: StreamflowConfig, search: Option<&str>) -> Result<bool, Box<dyn Error>> {
    let directory = StationDirectory::open(StaticStations(config.station))?;
    let stations = match search {
        Some(query) => directory.search(query),
        None => directory.list().iter().collect(),
    };

    if stations.is_empty() {
        eprintln!("No matching stations ({} configured)", directory.len());
    }
    for station in stations {
        println!("{:<10} {}", station.abbrev, station.name);
    }
    Ok(true)
}

fn print_chunks(config: StreamflowConfig, station: &str, range: &DateArgs) -> Result<bool, Box<dyn Error>> {
    let chunks = plan_chunks(&config.service, station, &range.start, &range.end)?;

    for (i, chunk) in chunks.iter().enumerate() {
        println!("{:>3}  {}  ({} days)", i + 1, chunk.range(), chunk.range().span_days());
    }
    eprintln!("{} request(s) for {}", chunks.len(), station);
    Ok(true)
}

fn fetch(
    config: StreamflowConfig,
    target: &StationArgs,
    range: &DateArgs,
    format: Format,
    output: Option<PathBuf>,
    best_effort: bool,
) -> Result<bool, Box<dyn Error>> {
    let StreamflowConfig { mut service, station } = config;
    if best_effort {
        service.failure_mode = FailureMode::BestEffort;
    }

    let station_id = match (&target.station, &target.search) {
        (Some(id), _) => id.clone(),
        (None, Some(query)) => {
            let directory = StationDirectory::open(StaticStations(station))?;
            let found = directory.lookup_station(query)?;
            eprintln!("📍 {}", found);
            found.abbrev.clone()
        }
        (None, None) => return Err("either --station or --search is required".into()),
    };

    let client = StreamflowClient::from_config(service)?;
    let report = client.fetch(&station_id, &range.start, &range.end)?;

    let writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    match format {
        Format::Csv => export::write_csv(&report.series, writer)?,
        Format::Json => export::write_json(&report.series, writer)?,
    }

    eprintln!("✓ {}: {}", station_id, export::summarize(&report.series));
    for failure in &report.failures {
        eprintln!("   ✗ {} - {}", failure.range, failure.error);
    }
    Ok(report.is_complete())
}
