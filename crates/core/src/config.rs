//! Run-wide configuration
//!
//! Every field has a default matching the operational NFDRS setup (13:00 local
//! observation, four fine steps per day, both submodels on), so an empty JSON
//! object is a valid configuration.

use crate::core_types::FuelModelTable;
use crate::error::GridError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fixed local hour at which the daily drought/live-fuel transition fires
pub const DEFAULT_OBSERVATION_HOUR: u8 = 13;

/// Fine steps per day in the reference coupling
pub const DEFAULT_STEPS_PER_DAY: usize = 4;

/// KBDI value a cell starts from when no spin-up state is available
pub const DEFAULT_INITIAL_KBDI: f64 = 100.0;

/// How the fine/coarse ratio `R` is established
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CouplingRatio {
    /// `R = T / D` from the two axes' lengths
    #[default]
    Derived,
    /// Fixed ratio; `T / R` must equal the coarse axis length
    Fixed { steps_per_day: usize },
}

/// Temporal resolution of the output arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputResolution {
    /// One record per fine step (`T_out = T`)
    #[default]
    Fine,
    /// One record per day, sampled at the day's final fine step (`T_out = D`)
    Daily,
}

/// Configuration for one gridded run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Local hour-of-day (exact match) at which the daily transition fires
    pub observation_hour: u8,
    /// Fine/coarse ratio policy
    pub coupling: CouplingRatio,
    /// Require every fine step of a coarse day to share that day's date
    pub check_calendar: bool,
    /// Output time axis
    pub output_resolution: OutputResolution,
    /// Run the GSI live-fuel-moisture submodel
    pub live_fuel_moisture: bool,
    /// Run the KBDI drought submodel
    pub drought: bool,
    /// Starting KBDI for every cell
    pub initial_kbdi: f64,
    /// Input fuel-model code → class
    pub fuel_models: FuelModelTable,
    /// Abort when more burnable cells than this carry unrecognized codes
    pub max_unknown_fuel_cells: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            observation_hour: DEFAULT_OBSERVATION_HOUR,
            coupling: CouplingRatio::Derived,
            check_calendar: true,
            output_resolution: OutputResolution::Fine,
            live_fuel_moisture: true,
            drought: true,
            initial_kbdi: DEFAULT_INITIAL_KBDI,
            fuel_models: FuelModelTable::nfdrs_default(),
            max_unknown_fuel_cells: None,
        }
    }
}

impl RunConfig {
    /// Load a configuration from a JSON file and validate it
    ///
    /// # Errors
    /// `Read` if the file cannot be read or parsed, `Configuration` if a value is
    /// out of range.
    pub fn from_json_file(path: &Path) -> Result<Self, GridError> {
        let text = std::fs::read_to_string(path).map_err(|e| GridError::read_file(path, e))?;
        let config: Self = serde_json::from_str(&text).map_err(|e| GridError::read_file(path, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Builder: fixed fine/coarse ratio
    pub fn with_fixed_ratio(mut self, steps_per_day: usize) -> Self {
        self.coupling = CouplingRatio::Fixed { steps_per_day };
        self
    }

    /// Builder: fuel-model table
    pub fn with_fuel_models(mut self, table: FuelModelTable) -> Self {
        self.fuel_models = table;
        self
    }

    /// Builder: output resolution
    pub fn with_output_resolution(mut self, resolution: OutputResolution) -> Self {
        self.output_resolution = resolution;
        self
    }

    /// Check value ranges
    ///
    /// # Errors
    /// `Configuration` describing the first offending field.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.observation_hour >= 24 {
            return Err(GridError::config(format!(
                "observation_hour must be in 0..24, got {}",
                self.observation_hour
            )));
        }
        if let CouplingRatio::Fixed { steps_per_day: 0 } = self.coupling {
            return Err(GridError::config("steps_per_day must be positive"));
        }
        if !self.initial_kbdi.is_finite() || !(0.0..=800.0).contains(&self.initial_kbdi) {
            return Err(GridError::config(format!(
                "initial_kbdi must be within 0..=800, got {}",
                self.initial_kbdi
            )));
        }
        if self.fuel_models.is_empty() {
            return Err(GridError::config("fuel model table is empty"));
        }
        Ok(())
    }
}
