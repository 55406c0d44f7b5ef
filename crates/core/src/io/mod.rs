//! Collaborator contracts for site metadata, weather feeds and output
//!
//! The driver never touches a file format directly. It consumes these traits,
//! and [`dataset`] provides the gridded-store implementation used by the CLI and
//! by the tests. Stores are JSON, or NetCDF with the `netcdf` feature.

pub mod dataset;
#[cfg(feature = "netcdf")]
mod netcdf_store;

pub use dataset::{DatasetFileSink, DatasetFormat, DatasetWeather, GridDataset, Variable};

use crate::error::GridError;
use crate::grid::{GridDims, StepTime};
use crate::simulation::MoistureMode;

/// Names of the static per-cell fields
pub mod site_fields {
    pub const IS_BURNABLE: &str = "IsBurnable";
    pub const LATITUDE: &str = "Latitude";
    pub const FUEL_MODEL: &str = "FuelModel";
    pub const SLOPE_CLASS: &str = "SlopeClass";
    pub const ANNUAL_AVG_PRECIP: &str = "AnnAvgPrec";
}

/// Time-invariant per-cell attributes
pub trait SiteSource {
    /// Grid dimensions `(N, M)`
    ///
    /// # Errors
    /// `Read` if the dimensions are not declared.
    fn grid_dimensions(&self) -> Result<GridDims, GridError>;

    /// A named static field of length `N * M`
    ///
    /// # Errors
    /// `Read` if the field is absent or its length is not `N * M`.
    fn static_field(&self, name: &str) -> Result<Vec<f64>, GridError>;

    /// Confirm every static field the site table needs is present
    ///
    /// # Errors
    /// `Configuration` naming the absent fields.
    fn require_site_fields(&self) -> Result<(), GridError>;
}

/// Fine-resolution weather and (optionally) upstream dead fuel moisture
pub trait WeatherSource {
    /// Grid dimensions `(N, M)`
    ///
    /// # Errors
    /// `Read` if the dimensions are not declared.
    fn grid_dimensions(&self) -> Result<GridDims, GridError>;

    /// Calendar stamp of every fine step; its length is `T`
    ///
    /// # Errors
    /// `Read` if the time variables are missing or inconsistent.
    fn time_axis(&self) -> Result<Vec<StepTime>, GridError>;

    /// Fields of fine step `t`
    ///
    /// # Errors
    /// `Read` if a required field is absent or mis-sized.
    fn step(&mut self, t: usize) -> Result<WeatherFrame, GridError>;

    /// Confirm every fine-step field `mode` needs is present
    ///
    /// # Errors
    /// `Configuration` naming the absent fields.
    fn require_weather_fields(&self, mode: MoistureMode) -> Result<(), GridError>;
}

/// Daily-resolution aggregates
pub trait DailySource {
    /// Grid dimensions `(N, M)`
    ///
    /// # Errors
    /// `Read` if the dimensions are not declared.
    fn grid_dimensions(&self) -> Result<GridDims, GridError>;

    /// Coarse axis length `D`
    ///
    /// # Errors
    /// `Read` if the day dimension is not declared.
    fn day_count(&self) -> Result<usize, GridError>;

    /// Aggregates of day `day`
    ///
    /// # Errors
    /// `Read` if a required field is absent or mis-sized.
    fn day(&mut self, day: usize) -> Result<DailyFrame, GridError>;

    /// Confirm every daily field is present; `MinTemp` and `MinRH` only when
    /// `live_fuel_moisture` is on
    ///
    /// # Errors
    /// `Configuration` naming the absent fields.
    fn require_daily_fields(&self, live_fuel_moisture: bool) -> Result<(), GridError>;
}

/// Destination for the assembled output arrays
///
/// Dimensions are declared before any field is written.
pub trait OutputSink {
    /// Declare the `[time_dim, south_north, west_east]` shape of every field
    ///
    /// # Errors
    /// `Write` if the sink cannot record the dimensions.
    fn declare_dimensions(
        &mut self,
        time_dim: &str,
        steps: usize,
        dims: GridDims,
    ) -> Result<(), GridError>;

    /// Store one field of length `steps * N * M`
    ///
    /// # Errors
    /// `Write` if dimensions are undeclared, the length is wrong, or the sink
    /// fails.
    fn write_field(&mut self, name: &str, data: &[f64]) -> Result<(), GridError>;
}

/// Upstream-computed dead fuel moistures (percent) and fuel temperature (°F)
#[derive(Debug, Clone, PartialEq)]
pub struct FuelMoistureFields {
    pub mc1: Vec<f64>,
    pub mc10: Vec<f64>,
    pub mc100: Vec<f64>,
    pub mc1000: Vec<f64>,
    pub fuel_temp: Vec<f64>,
}

/// One fine step of gridded weather
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherFrame {
    pub time: StepTime,
    /// Air temperature (°F)
    pub temperature: Vec<f64>,
    /// Relative humidity (%)
    pub relative_humidity: Vec<f64>,
    /// Precipitation over the step (inches)
    pub precipitation: Vec<f64>,
    /// 20-ft wind speed (mph)
    pub wind_speed: Vec<f64>,
    /// Solar radiation (W/m²)
    pub solar_radiation: Option<Vec<f64>>,
    /// Snow cover
    pub snow: Vec<bool>,
    pub fuel_moisture: Option<FuelMoistureFields>,
}

impl WeatherFrame {
    /// Check every field holds one value per cell
    ///
    /// # Errors
    /// `Read` naming the first mis-sized field.
    pub fn check_len(&self, cells: usize) -> Result<(), GridError> {
        let mut fields: Vec<(&str, usize)> = vec![
            ("Temp", self.temperature.len()),
            ("RH", self.relative_humidity.len()),
            ("PPT", self.precipitation.len()),
            ("windSpeed", self.wind_speed.len()),
            ("SnowFlag", self.snow.len()),
        ];
        if let Some(sr) = &self.solar_radiation {
            fields.push(("SR", sr.len()));
        }
        if let Some(fm) = &self.fuel_moisture {
            fields.extend([
                ("MC1", fm.mc1.len()),
                ("MC10", fm.mc10.len()),
                ("MC100", fm.mc100.len()),
                ("MC1000", fm.mc1000.len()),
                ("FuelTemp", fm.fuel_temp.len()),
            ]);
        }
        check_lengths(&fields, cells)
    }
}

/// One day of gridded aggregates
#[derive(Debug, Clone, PartialEq)]
pub struct DailyFrame {
    /// 24-hour precipitation total (inches)
    pub precip_24h: Vec<f64>,
    /// Daily maximum temperature (°F)
    pub max_temp: Vec<f64>,
    /// Daily minimum temperature (°F); required by the live-fuel submodel
    pub min_temp: Option<Vec<f64>>,
    /// Daily minimum relative humidity (%); required by the live-fuel submodel
    pub min_rh: Option<Vec<f64>>,
    /// Annual average precipitation (inches)
    pub annual_avg_precip: Vec<f64>,
}

impl DailyFrame {
    /// Check every field holds one value per cell
    ///
    /// # Errors
    /// `Read` naming the first mis-sized field.
    pub fn check_len(&self, cells: usize) -> Result<(), GridError> {
        let mut fields: Vec<(&str, usize)> = vec![
            ("PPT24", self.precip_24h.len()),
            ("MaxTemp", self.max_temp.len()),
            ("AnnAvgPrec", self.annual_avg_precip.len()),
        ];
        if let Some(v) = &self.min_temp {
            fields.push(("MinTemp", v.len()));
        }
        if let Some(v) = &self.min_rh {
            fields.push(("MinRH", v.len()));
        }
        check_lengths(&fields, cells)
    }
}

/// `Configuration` listing every name in `required` that `present` rejects
pub(crate) fn require_fields(
    source: &str,
    required: &[&str],
    present: impl Fn(&str) -> bool,
) -> Result<(), GridError> {
    let missing: Vec<&str> = required.iter().copied().filter(|name| !present(name)).collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(GridError::config(format!(
        "{source} is missing required fields: {}",
        missing.join(", ")
    )))
}

fn check_lengths(fields: &[(&str, usize)], cells: usize) -> Result<(), GridError> {
    match fields.iter().find(|(_, len)| *len != cells) {
        Some((name, len)) => Err(GridError::read(
            *name,
            format!("expected {cells} values, found {len}"),
        )),
        None => Ok(()),
    }
}
