//! Temporal coupling driver
//!
//! Steps every active cell through the fine time axis in order. Daily inputs are
//! looked up by `day = t / R`, never by `t`, and the daily transition fires only
//! on the step whose local hour equals the observation hour. The dead fuel
//! moisture source is fixed for the run by the [`MoistureFeed`] type parameter.

use super::output::{OutputField, OutputGrid};
use crate::config::{OutputResolution, RunConfig};
use crate::core_types::units::{Fahrenheit, Inches, MilesPerHour, Percent};
use crate::error::{GridError, UnknownFuelModel};
use crate::grid::{ActiveCellIndex, GridDims, TemporalCoupling};
use crate::io::dataset::{DAY_DIM, TIME_DIM};
use crate::io::{DailyFrame, DailySource, WeatherFrame, WeatherSource};
use crate::model::{CellDaily, CellModel, CellWeather, ModelRegistry};
use crate::physics::DeadFuelMoisture;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Where dead fuel moisture comes from, chosen once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoistureMode {
    /// Computed by each cell from the step's weather
    Inline,
    /// Read from precomputed fields in the weather frame
    Upstream,
}

impl fmt::Display for MoistureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => f.write_str("inline"),
            Self::Upstream => f.write_str("upstream"),
        }
    }
}

/// Dead fuel moisture strategy applied to every cell on every step
pub trait MoistureFeed {
    const MODE: MoistureMode;

    /// Output fields this mode produces
    fn output_fields() -> Vec<OutputField>;

    /// Reject a frame this mode cannot use
    ///
    /// # Errors
    /// `Configuration` if required fields are absent.
    fn check_frame(frame: &WeatherFrame, t: usize) -> Result<(), GridError>;

    /// Bring `model`'s dead fuel moisture up to date for this step
    fn feed<M: CellModel>(&self, model: &mut M, frame: &WeatherFrame, flat: usize, step_hours: f64);
}

/// Each cell computes its own dead fuel moisture
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineMoisture;

impl MoistureFeed for InlineMoisture {
    const MODE: MoistureMode = MoistureMode::Inline;

    fn output_fields() -> Vec<OutputField> {
        OutputField::INDEXES
            .into_iter()
            .chain(OutputField::DEAD_MOISTURE)
            .collect()
    }

    fn check_frame(_frame: &WeatherFrame, _t: usize) -> Result<(), GridError> {
        Ok(())
    }

    fn feed<M: CellModel>(&self, model: &mut M, frame: &WeatherFrame, flat: usize, step_hours: f64) {
        let weather = CellWeather {
            temperature: Fahrenheit::new(frame.temperature[flat]),
            relative_humidity: Percent::new(frame.relative_humidity[flat]),
            precipitation: Inches::new(frame.precipitation[flat]),
            solar_radiation: frame.solar_radiation.as_ref().map(|sr| sr[flat]),
        };
        model.apply_weather(&weather, step_hours);
    }
}

/// Dead fuel moisture supplied by an upstream model run
#[derive(Debug, Clone, Copy, Default)]
pub struct UpstreamMoisture;

impl MoistureFeed for UpstreamMoisture {
    const MODE: MoistureMode = MoistureMode::Upstream;

    fn output_fields() -> Vec<OutputField> {
        OutputField::INDEXES.to_vec()
    }

    fn check_frame(frame: &WeatherFrame, t: usize) -> Result<(), GridError> {
        if frame.fuel_moisture.is_none() {
            return Err(GridError::config(format!(
                "step {t} carries no upstream fuel moisture fields"
            )));
        }
        Ok(())
    }

    fn feed<M: CellModel>(&self, model: &mut M, frame: &WeatherFrame, flat: usize, _step_hours: f64) {
        if let Some(fm) = &frame.fuel_moisture {
            model.set_dead_fuel_moisture(DeadFuelMoisture {
                mc1: fm.mc1[flat],
                mc10: fm.mc10[flat],
                mc100: fm.mc100[flat],
                mc1000: fm.mc1000[flat],
                fuel_temp: fm.fuel_temp[flat],
            });
        }
    }
}

/// What happened during a run, beyond the output arrays
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub moisture_mode: MoistureMode,
    pub fine_steps: usize,
    pub days: usize,
    pub steps_per_day: usize,
    pub output_steps: usize,
    pub active_cells: usize,
    /// Burnable cells dropped for an unrecognized fuel code
    pub excluded: Vec<UnknownFuelModel>,
    /// Observation-hour steps on which the daily transition fired
    pub daily_updates: usize,
    /// Fine steps whose hour was missing or invalid
    pub missing_hour_steps: Vec<usize>,
    /// Days that ended without a daily transition
    pub days_without_update: Vec<usize>,
    /// Extra observation-hour steps skipped because the day had already fired
    pub duplicate_observation_steps: Vec<usize>,
}

impl RunReport {
    /// True when every day fired exactly once and every hour was readable
    pub fn is_clean(&self) -> bool {
        self.excluded.is_empty()
            && self.missing_hour_steps.is_empty()
            && self.days_without_update.is_empty()
            && self.duplicate_observation_steps.is_empty()
    }
}

/// Owns the cell models for the lifetime of a run and drives them through time
pub struct TemporalDriver<'a, M, F> {
    config: &'a RunConfig,
    coupling: TemporalCoupling,
    index: &'a ActiveCellIndex,
    registry: ModelRegistry<M>,
    feed: F,
    output: OutputGrid,
    report: RunReport,
    /// Coarse frame of the most recently fetched day
    day_cache: Option<(usize, DailyFrame)>,
    /// Day on which the daily transition last fired
    fired_day: Option<usize>,
}

impl<'a, M: CellModel, F: MoistureFeed> TemporalDriver<'a, M, F> {
    pub fn new(
        config: &'a RunConfig,
        dims: GridDims,
        coupling: TemporalCoupling,
        index: &'a ActiveCellIndex,
        registry: ModelRegistry<M>,
        feed: F,
    ) -> Self {
        let (output_steps, time_dim) = match config.output_resolution {
            OutputResolution::Fine => (coupling.fine_steps(), TIME_DIM),
            OutputResolution::Daily => (coupling.days(), DAY_DIM),
        };
        let output = OutputGrid::new(
            dims,
            output_steps,
            time_dim,
            &F::output_fields(),
        );
        let report = RunReport {
            moisture_mode: F::MODE,
            fine_steps: coupling.fine_steps(),
            days: coupling.days(),
            steps_per_day: coupling.steps_per_day(),
            output_steps,
            active_cells: index.len(),
            excluded: index.excluded().to_vec(),
            daily_updates: 0,
            missing_hour_steps: Vec::new(),
            days_without_update: Vec::new(),
            duplicate_observation_steps: Vec::new(),
        };
        Self {
            config,
            coupling,
            index,
            registry,
            feed,
            output,
            report,
            day_cache: None,
            fired_day: None,
        }
    }

    /// Run every fine step in order and return the filled output grid
    ///
    /// # Errors
    /// `Read` from either source, `Configuration` for frames missing required
    /// fields, `Write` if the output grid rejects a write.
    pub fn run(
        mut self,
        weather: &mut impl WeatherSource,
        daily: &mut impl DailySource,
    ) -> Result<(OutputGrid, RunReport), GridError> {
        info!(
            "Running {} fine steps over {} days for {} active cells ({} moisture)",
            self.coupling.fine_steps(),
            self.coupling.days(),
            self.index.len(),
            F::MODE
        );
        for t in 0..self.coupling.fine_steps() {
            self.step(t, weather, daily)?;
        }
        info!(
            "Run complete: {} daily updates, {} steps with missing hour, {} days without update",
            self.report.daily_updates,
            self.report.missing_hour_steps.len(),
            self.report.days_without_update.len()
        );
        Ok((self.output, self.report))
    }

    fn step(
        &mut self,
        t: usize,
        weather: &mut impl WeatherSource,
        daily: &mut impl DailySource,
    ) -> Result<(), GridError> {
        let day = self.coupling.day(t);
        let cells = self.index.cell_count();
        let frame = weather.step(t)?;
        frame.check_len(cells)?;
        F::check_frame(&frame, t)?;

        let fire = self.observation_gate(t, day, &frame);
        let day_of_year = if fire {
            self.load_day(day, daily)?;
            self.day_of_year(t, &frame)?
        } else {
            0
        };
        let daily_frame = match (&self.day_cache, fire) {
            (Some((_, cached)), true) => Some(cached),
            _ => None,
        };

        let last_of_day = self.coupling.is_last_step_of_day(t);
        let out_t = match self.config.output_resolution {
            OutputResolution::Fine => Some(t),
            OutputResolution::Daily => last_of_day.then_some(day),
        };
        let step_hours = self.coupling.step_hours();

        for (c, model) in self.registry.iter_mut() {
            let flat = self.index.flat_index(c);
            self.feed.feed(model, &frame, flat, step_hours);
            if let Some(d) = daily_frame {
                model.update_daily(&cell_daily(d, flat), day_of_year);
            }
            if let Some(o) = out_t {
                let wind = MilesPerHour::new(frame.wind_speed[flat]);
                let result = model.calc_indexes(wind, frame.snow[flat]);
                self.output.write_cell(o, flat, &result)?;
            }
        }

        if let Some(o) = out_t {
            for flat in self.index.inactive() {
                self.output.write_no_data(o, flat)?;
            }
        }

        if fire {
            self.fired_day = Some(day);
            self.report.daily_updates += 1;
        }
        if last_of_day && self.fired_day != Some(day) {
            warn!("Day {day} ended without an observation-hour step; drought index carried over");
            self.report.days_without_update.push(day);
        }
        debug!("Step {t} (day {day}) done, daily update: {fire}");
        Ok(())
    }

    /// Decide whether the daily transition fires on step `t`
    fn observation_gate(&mut self, t: usize, day: usize, frame: &WeatherFrame) -> bool {
        match frame.time.hour {
            Some(hour) if hour == self.config.observation_hour => {
                if self.fired_day == Some(day) {
                    warn!("Step {t} repeats the observation hour of day {day}; skipped");
                    self.report.duplicate_observation_steps.push(t);
                    false
                } else {
                    true
                }
            }
            Some(_) => false,
            None => {
                warn!("Step {t} has no valid hour; daily update not evaluated");
                self.report.missing_hour_steps.push(t);
                false
            }
        }
    }

    /// Fetch the coarse frame of `day` unless it is already cached
    fn load_day(&mut self, day: usize, daily: &mut impl DailySource) -> Result<(), GridError> {
        if matches!(&self.day_cache, Some((cached, _)) if *cached == day) {
            return Ok(());
        }
        let frame = daily.day(day)?;
        frame.check_len(self.index.cell_count())?;
        if self.config.live_fuel_moisture && (frame.min_temp.is_none() || frame.min_rh.is_none()) {
            return Err(GridError::config(
                "MinTemp and MinRH are required by the live fuel moisture submodel",
            ));
        }
        self.day_cache = Some((day, frame));
        Ok(())
    }

    fn day_of_year(&self, t: usize, frame: &WeatherFrame) -> Result<u32, GridError> {
        match frame.time.day_of_year() {
            Some(doy) => Ok(doy),
            None if !self.config.live_fuel_moisture => Ok(0),
            None => Err(GridError::config(format!(
                "step {t} has an invalid date {:?}; the live fuel moisture submodel needs the day of year",
                frame.time
            ))),
        }
    }
}

fn cell_daily(frame: &DailyFrame, flat: usize) -> CellDaily {
    CellDaily {
        precip_24h: Inches::new(frame.precip_24h[flat]),
        max_temp: Fahrenheit::new(frame.max_temp[flat]),
        min_temp: frame.min_temp.as_ref().map(|v| Fahrenheit::new(v[flat])),
        min_rh: frame.min_rh.as_ref().map(|v| Percent::new(v[flat])),
        annual_avg_precip: Inches::new(frame.annual_avg_precip[flat]),
    }
}
