//! Shared in-memory dataset builders for the integration tests
#![allow(dead_code)]

use nfdrs_grid_core::GridDataset;

pub const GRID: [&str; 2] = ["south_north", "west_east"];
pub const TIME_GRID: [&str; 3] = ["time", "south_north", "west_east"];
pub const DAY_GRID: [&str; 3] = ["day", "south_north", "west_east"];

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Site table over a `rows x cols` grid, slope class 1, latitude 40
pub fn site(rows: usize, cols: usize, burnable: &[f64], fuel: &[f64]) -> GridDataset {
    let n = rows * cols;
    assert_eq!(burnable.len(), n);
    assert_eq!(fuel.len(), n);
    GridDataset::new()
        .with_dimension("south_north", rows)
        .with_dimension("west_east", cols)
        .with_variable("IsBurnable", &GRID, burnable.to_vec())
        .with_variable("Latitude", &GRID, vec![40.0; n])
        .with_variable("FuelModel", &GRID, fuel.to_vec())
        .with_variable("SlopeClass", &GRID, vec![1.0; n])
        .with_variable("AnnAvgPrec", &GRID, vec![30.0; n])
}

/// Hot, dry weather; `stamps` are `(day of July 2024, hour)`
pub fn weather(rows: usize, cols: usize, stamps: &[(u32, f64)]) -> GridDataset {
    let n = rows * cols;
    let t = stamps.len();
    let field = |v: f64| vec![v; t * n];
    GridDataset::new()
        .with_dimension("time", t)
        .with_dimension("south_north", rows)
        .with_dimension("west_east", cols)
        .with_variable("Year", &["time"], vec![2024.0; t])
        .with_variable("Month", &["time"], vec![7.0; t])
        .with_variable("Day", &["time"], stamps.iter().map(|(d, _)| f64::from(*d)).collect())
        .with_variable("Hour", &["time"], stamps.iter().map(|(_, h)| *h).collect())
        .with_variable("Temp", &TIME_GRID, field(85.0))
        .with_variable("RH", &TIME_GRID, field(20.0))
        .with_variable("PPT", &TIME_GRID, field(0.0))
        .with_variable("windSpeed", &TIME_GRID, field(10.0))
        .with_variable("SR", &TIME_GRID, field(600.0))
}

/// Six-hourly stamps `[0, 6, 13, 19]` for `days` consecutive days from July 1
pub fn four_per_day(days: u32) -> Vec<(u32, f64)> {
    (1..=days)
        .flat_map(|d| [0.0, 6.0, 13.0, 19.0].map(|h| (d, h)))
        .collect()
}

/// Daily aggregates: 10 in of rain, 90 °F maximum
pub fn daily(rows: usize, cols: usize, days: usize) -> GridDataset {
    let n = rows * cols;
    let field = |v: f64| vec![v; days * n];
    GridDataset::new()
        .with_dimension("day", days)
        .with_dimension("south_north", rows)
        .with_dimension("west_east", cols)
        .with_variable("PPT24", &DAY_GRID, field(10.0))
        .with_variable("MaxTemp", &DAY_GRID, field(90.0))
        .with_variable("MinTemp", &DAY_GRID, field(60.0))
        .with_variable("MinRH", &DAY_GRID, field(25.0))
        .with_variable("AnnAvgPrec", &GRID, vec![30.0; n])
}

/// Upstream dead fuel moisture on the same axis as `weather`
pub fn fuel_moisture(rows: usize, cols: usize, steps: usize, dead: f64) -> GridDataset {
    let field = |v: f64| vec![v; steps * rows * cols];
    GridDataset::new()
        .with_dimension("time", steps)
        .with_dimension("south_north", rows)
        .with_dimension("west_east", cols)
        .with_variable("MC1", &TIME_GRID, field(dead))
        .with_variable("MC10", &TIME_GRID, field(dead + 1.0))
        .with_variable("MC100", &TIME_GRID, field(dead + 3.0))
        .with_variable("MC1000", &TIME_GRID, field(dead + 6.0))
        .with_variable("FuelTemp", &TIME_GRID, field(95.0))
}
