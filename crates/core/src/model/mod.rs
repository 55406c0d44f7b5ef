//! Per-cell fire-danger models and their registry
//!
//! The driver only talks to a cell through [`CellModel`]. Construction happens
//! once per active cell before the time loop, and every later interaction is one
//! of the update calls below, in this order within a fine step:
//!
//! 1. [`CellModel::apply_weather`] or [`CellModel::set_dead_fuel_moisture`]
//! 2. [`CellModel::update_daily`] on the observation-hour step only
//! 3. [`CellModel::calc_indexes`]

pub mod nfdrs_cell;
pub mod registry;

pub use nfdrs_cell::{ModelFlags, Nfdrs4Cell};
pub use registry::ModelRegistry;

use crate::core_types::units::{Fahrenheit, Inches, MilesPerHour, Percent};
use crate::physics::{DangerIndexes, DeadFuelMoisture};

/// One fine step of weather at a cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellWeather {
    pub temperature: Fahrenheit,
    pub relative_humidity: Percent,
    pub precipitation: Inches,
    /// W/m², `None` when the feed carries no radiation
    pub solar_radiation: Option<f64>,
}

/// One day of aggregates at a cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellDaily {
    pub precip_24h: Inches,
    pub max_temp: Fahrenheit,
    pub min_temp: Option<Fahrenheit>,
    pub min_rh: Option<Percent>,
    pub annual_avg_precip: Inches,
}

/// Everything a cell reports for one output step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellOutput {
    pub kbdi: f64,
    pub gsi: f64,
    /// Herbaceous live fuel moisture (%)
    pub herb_moisture: f64,
    /// Woody live fuel moisture (%)
    pub wood_moisture: f64,
    pub indexes: DangerIndexes,
    pub dead: DeadFuelMoisture,
}

/// Stateful fire-danger model of a single cell
pub trait CellModel {
    /// Advance dead fuel moisture from this step's weather
    fn apply_weather(&mut self, weather: &CellWeather, step_hours: f64);

    /// Replace dead fuel moisture with upstream values
    fn set_dead_fuel_moisture(&mut self, moisture: DeadFuelMoisture);

    /// Daily transition: drought index and growing-season index
    fn update_daily(&mut self, daily: &CellDaily, day_of_year: u32);

    /// Fire-danger indexes from the current state
    fn calc_indexes(&self, wind_speed: MilesPerHour, snow: bool) -> CellOutput;

    /// Current drought index
    fn drought_index(&self) -> f64;
}
