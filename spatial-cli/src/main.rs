use clap::Parser;
use nfdrs_grid_core::{
    run, DatasetFileSink, DatasetWeather, GridDataset, GridError, MoistureMode, RunConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Gridded NFDRS fire-danger run over a fine-resolution weather dataset
#[derive(Parser, Debug)]
#[command(name = "nfdrs-spatial")]
#[command(about = "Gridded NFDRS fire danger with hourly/daily coupling", long_about = None)]
struct Args {
    /// Input dataset (.json, or .nc with the netcdf feature) holding site fields, fine weather and (by default) daily aggregates
    #[arg(short, long)]
    input: PathBuf,

    /// Output dataset path
    #[arg(short, long)]
    output: PathBuf,

    /// Upstream dead fuel moisture dataset; selects upstream moisture mode
    #[arg(long)]
    fuel_moisture: Option<PathBuf>,

    /// Separate daily-aggregate dataset
    #[arg(long)]
    daily: Option<PathBuf>,

    /// Run configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match execute(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn execute(args: &Args) -> Result<(), GridError> {
    let start = Instant::now();

    let config = match &args.config {
        Some(path) => RunConfig::from_json_file(path)?,
        None => RunConfig::default(),
    };

    let input = GridDataset::read_file(&args.input)?;
    let mut daily = match &args.daily {
        Some(path) => GridDataset::read_file(path)?,
        None => input.clone(),
    };
    let fuel_moisture = args
        .fuel_moisture
        .as_deref()
        .map(GridDataset::read_file)
        .transpose()?;
    let site = input.clone();
    let mut weather = DatasetWeather::new(input, fuel_moisture)?;
    let mode = if weather.has_upstream_moisture() {
        MoistureMode::Upstream
    } else {
        MoistureMode::Inline
    };
    info!("Loaded inputs in {:.2?}", start.elapsed());

    let sim_start = Instant::now();
    let (grid, report) = run(&config, &site, &mut weather, &mut daily, mode)?;
    info!(
        "Simulated {} active cells over {} steps in {:.2?}",
        report.active_cells,
        report.fine_steps,
        sim_start.elapsed()
    );
    if !report.is_clean() {
        warn!(
            "Run anomalies: {} excluded cells, {} steps without hour, {} days without update, {} repeated observation steps",
            report.excluded.len(),
            report.missing_hour_steps.len(),
            report.days_without_update.len(),
            report.duplicate_observation_steps.len()
        );
    }

    let write_start = Instant::now();
    let mut sink = DatasetFileSink::new(&args.output);
    grid.persist(&mut sink)?;
    sink.commit()?;
    info!(
        "Wrote {} in {:.2?} (total {:.2?})",
        args.output.display(),
        write_start.elapsed(),
        start.elapsed()
    );
    Ok(())
}
