//! Gridded fire-danger run: wiring from inputs to a filled output grid
//!
//! [`run`] does everything that can fail on configuration before any cell model
//! exists: every required field must be present, grid dimensions of all three
//! sources must agree, and the fine/coarse ratio must resolve. Only then are the active-cell index and the model registry
//! built and the time loop started.

pub mod driver;
pub mod output;

pub use driver::{
    InlineMoisture, MoistureFeed, MoistureMode, RunReport, TemporalDriver, UpstreamMoisture,
};
pub use output::{OutputField, OutputGrid, NO_DATA};

use crate::config::RunConfig;
use crate::error::GridError;
use crate::grid::{ActiveCellIndex, StaticSiteTable, TemporalCoupling};
use crate::io::{DailySource, SiteSource, WeatherSource};
use crate::model::{ModelFlags, ModelRegistry, Nfdrs4Cell};
use tracing::info;

/// Simulate every active cell over the full time axis
///
/// `mode` selects where dead fuel moisture comes from; in
/// [`MoistureMode::Upstream`] every weather frame must carry it.
///
/// # Errors
/// `Configuration` for invalid settings, absent required fields, mismatched
/// dimensions, a fine axis the coarse axis does not divide, or too many unknown
/// fuel codes. `Read` if any
/// source fails. Nothing is persisted here, so an error leaves no output.
pub fn run(
    config: &RunConfig,
    site: &impl SiteSource,
    weather: &mut impl WeatherSource,
    daily: &mut impl DailySource,
    mode: MoistureMode,
) -> Result<(OutputGrid, RunReport), GridError> {
    config.validate()?;
    site.require_site_fields()?;
    weather.require_weather_fields(mode)?;
    daily.require_daily_fields(config.live_fuel_moisture)?;

    let site = StaticSiteTable::load(site)?;
    let dims = site.dims();
    for (source, other) in [
        ("weather", weather.grid_dimensions()?),
        ("daily", daily.grid_dimensions()?),
    ] {
        if other != dims {
            return Err(GridError::config(format!(
                "{source} grid {other} does not match site grid {dims}"
            )));
        }
    }

    let time_axis = weather.time_axis()?;
    let coupling = TemporalCoupling::resolve(
        config.coupling,
        &time_axis,
        daily.day_count()?,
        config.check_calendar,
    )?;

    let index = ActiveCellIndex::build(&site, &config.fuel_models, config.max_unknown_fuel_cells)?;
    let flags = ModelFlags::from(config);
    let registry = ModelRegistry::build(&index, &site, |cell| Nfdrs4Cell::new(cell, flags));
    info!("Moisture mode: {mode}");

    match mode {
        MoistureMode::Inline => {
            TemporalDriver::new(config, dims, coupling, &index, registry, InlineMoisture)
                .run(weather, daily)
        }
        MoistureMode::Upstream => {
            TemporalDriver::new(config, dims, coupling, &index, registry, UpstreamMoisture)
                .run(weather, daily)
        }
    }
}
