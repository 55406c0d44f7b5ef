//! Gridded dataset store: named dimensions and named `[time, y, x]` variables
//!
//! The layout mirrors a NetCDF file the way WRF-style fire-weather inputs are
//! organised: dimensions `time`, `day`, `south_north`, `west_east`, and
//! variables stored as flat row-major arrays with their dimension names. The
//! on-disk encoding is JSON.
//!
//! # Example
//!
//! ```
//! use nfdrs_grid_core::io::{GridDataset, SiteSource};
//!
//! let site = GridDataset::new()
//!     .with_dimension("south_north", 1)
//!     .with_dimension("west_east", 2)
//!     .with_variable("Latitude", &["south_north", "west_east"], vec![45.0, 45.1]);
//!
//! assert_eq!(site.static_field("Latitude").unwrap(), vec![45.0, 45.1]);
//! ```

use super::{
    require_fields, site_fields, DailyFrame, DailySource, FuelMoistureFields, OutputSink,
    SiteSource, WeatherFrame, WeatherSource,
};
use crate::error::GridError;
use crate::grid::{GridDims, StepTime};
use crate::simulation::MoistureMode;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Fine time dimension
pub const TIME_DIM: &str = "time";
/// Daily time dimension
pub const DAY_DIM: &str = "day";
/// Row dimension
pub const ROW_DIM: &str = "south_north";
/// Column dimension
pub const COL_DIM: &str = "west_east";

/// One named array with its dimension names (outermost first)
///
/// Non-finite values are encoded as JSON `null` and read back as NaN.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub dims: Vec<String>,
    #[serde(deserialize_with = "nullable_values")]
    pub data: Vec<f64>,
}

fn nullable_values<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
    let values = Vec::<Option<f64>>::deserialize(deserializer)?;
    Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

/// In-memory gridded store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridDataset {
    pub dimensions: BTreeMap<String, usize>,
    pub variables: BTreeMap<String, Variable>,
    /// Leading dimension declared for output fields
    #[serde(skip)]
    output_axis: Option<String>,
}

impl GridDataset {
    /// Create an empty dataset
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: declare a dimension
    pub fn with_dimension(mut self, name: &str, len: usize) -> Self {
        self.dimensions.insert(name.to_string(), len);
        self
    }

    /// Builder: add a variable
    pub fn with_variable(mut self, name: &str, dims: &[&str], data: Vec<f64>) -> Self {
        self.insert_variable(name, dims, data);
        self
    }

    /// Add or replace a variable
    pub fn insert_variable(&mut self, name: &str, dims: &[&str], data: Vec<f64>) {
        self.variables.insert(
            name.to_string(),
            Variable {
                dims: dims.iter().map(|d| (*d).to_string()).collect(),
                data,
            },
        );
    }

    /// True if the named variable exists
    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Length of a named dimension
    ///
    /// # Errors
    /// `Read` if the dimension is not declared.
    pub fn dimension(&self, name: &str) -> Result<usize, GridError> {
        self.dimensions
            .get(name)
            .copied()
            .ok_or_else(|| GridError::read(name, "dimension not declared"))
    }

    /// A named variable
    ///
    /// # Errors
    /// `Read` if the variable is absent.
    pub fn variable(&self, name: &str) -> Result<&Variable, GridError> {
        self.variables
            .get(name)
            .ok_or_else(|| GridError::read(name, "variable not found"))
    }

    /// `south_north × west_east` grid
    ///
    /// # Errors
    /// `Read` if either dimension is missing.
    pub fn grid_dims(&self) -> Result<GridDims, GridError> {
        Ok(GridDims::new(
            self.dimension(ROW_DIM)?,
            self.dimension(COL_DIM)?,
        ))
    }

    /// Check every variable's dimensions are declared and its length matches
    ///
    /// # Errors
    /// `Read` naming the first inconsistent variable.
    pub fn validate(&self) -> Result<(), GridError> {
        for (name, var) in &self.variables {
            let mut expected = 1usize;
            for dim in &var.dims {
                expected *= self
                    .dimensions
                    .get(dim)
                    .copied()
                    .ok_or_else(|| GridError::read(name, format!("undeclared dimension '{dim}'")))?;
            }
            if var.data.len() != expected {
                return Err(GridError::read(
                    name,
                    format!(
                        "shape {:?} needs {expected} values, found {}",
                        var.dims,
                        var.data.len()
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Read and validate a dataset from a JSON file
    ///
    /// # Errors
    /// `Read` naming the file on I/O or decode failure, or the variable on a
    /// shape mismatch.
    pub fn from_json_file(path: &Path) -> Result<Self, GridError> {
        let file = File::open(path).map_err(|e| GridError::read_file(path, e))?;
        let dataset: Self = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| GridError::read_file(path, e))?;
        dataset.validate()?;
        info!(
            "Loaded {}: {} dimensions, {} variables",
            path.display(),
            dataset.dimensions.len(),
            dataset.variables.len()
        );
        Ok(dataset)
    }

    /// Write the dataset to a JSON file, replacing it atomically
    ///
    /// The bytes land in a temporary file beside `path` first. It is removed
    /// on any failure, so the destination is either the old file or the new one.
    ///
    /// # Errors
    /// `Write` naming the file on any I/O or encode failure.
    pub fn to_json_file(&self, path: &Path) -> Result<(), GridError> {
        let mut staging = staging_file(path)?;
        {
            let mut writer = BufWriter::new(staging.as_file_mut());
            serde_json::to_writer(&mut writer, self)
                .map_err(|e| GridError::write_file(path, e))?;
            writer.flush().map_err(|e| GridError::write_file(path, e))?;
        }
        staging
            .persist(path)
            .map_err(|e| GridError::write_file(path, e.error))?;
        Ok(())
    }

    /// Read a dataset in the encoding its extension names
    ///
    /// # Errors
    /// As [`GridDataset::from_json_file`] or [`GridDataset::from_netcdf_file`].
    pub fn read_file(path: &Path) -> Result<Self, GridError> {
        match DatasetFormat::from_path(path) {
            DatasetFormat::Json => Self::from_json_file(path),
            DatasetFormat::NetCdf => Self::from_netcdf_file(path),
        }
    }

    /// Write the dataset in the encoding the extension of `path` names
    ///
    /// # Errors
    /// As [`GridDataset::to_json_file`] or [`GridDataset::to_netcdf_file`].
    pub fn write_file(&self, path: &Path) -> Result<(), GridError> {
        match DatasetFormat::from_path(path) {
            DatasetFormat::Json => self.to_json_file(path),
            DatasetFormat::NetCdf => self.to_netcdf_file(path),
        }
    }

    /// Static `[south_north, west_east]` field
    ///
    /// # Errors
    /// `Read` if absent or not two-dimensional over the grid.
    pub fn field_2d(&self, name: &str) -> Result<Vec<f64>, GridError> {
        let var = self.variable(name)?;
        if var.dims != [ROW_DIM, COL_DIM] {
            return Err(GridError::read(
                name,
                format!("expected dimensions [{ROW_DIM}, {COL_DIM}], found {:?}", var.dims),
            ));
        }
        let cells = self.grid_dims()?.cell_count();
        if var.data.len() != cells {
            return Err(GridError::read(
                name,
                format!("expected {cells} values, found {}", var.data.len()),
            ));
        }
        Ok(var.data.clone())
    }

    /// Slice `index` of a `[leading, south_north, west_east]` field
    ///
    /// # Errors
    /// `Read` if absent, wrongly shaped, or `index` is past the leading axis.
    pub fn slice(&self, name: &str, leading: &str, index: usize) -> Result<Vec<f64>, GridError> {
        let var = self.variable(name)?;
        if var.dims != [leading, ROW_DIM, COL_DIM] {
            return Err(GridError::read(
                name,
                format!(
                    "expected dimensions [{leading}, {ROW_DIM}, {COL_DIM}], found {:?}",
                    var.dims
                ),
            ));
        }
        let cells = self.grid_dims()?.cell_count();
        let start = index * cells;
        var.data
            .get(start..start + cells)
            .map(<[f64]>::to_vec)
            .ok_or_else(|| GridError::read(name, format!("{leading} index {index} out of range")))
    }

    /// Like [`GridDataset::slice`], `None` when the variable is absent
    ///
    /// # Errors
    /// `Read` if present but wrongly shaped.
    pub fn optional_slice(
        &self,
        name: &str,
        leading: &str,
        index: usize,
    ) -> Result<Option<Vec<f64>>, GridError> {
        if self.has_variable(name) {
            self.slice(name, leading, index).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Scalar `[time]` variable at `index`
    fn scalar(&self, name: &str, index: usize) -> Result<f64, GridError> {
        let var = self.variable(name)?;
        if var.dims != [TIME_DIM] {
            return Err(GridError::read(
                name,
                format!("expected dimensions [{TIME_DIM}], found {:?}", var.dims),
            ));
        }
        var.data
            .get(index)
            .copied()
            .ok_or_else(|| GridError::read(name, format!("time index {index} out of range")))
    }
}

/// Temporary file in the destination's directory, deleted on drop unless persisted
pub(super) fn staging_file(path: &Path) -> Result<NamedTempFile, GridError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    tempfile::Builder::new()
        .prefix(".nfdrs-")
        .suffix(".partial")
        .tempfile_in(dir)
        .map_err(|e| GridError::write_file(path, e))
}

/// On-disk encodings of a [`GridDataset`], chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Json,
    /// `.nc` or `.nc4`; needs the `netcdf` feature
    NetCdf,
}

impl DatasetFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("nc") || ext.eq_ignore_ascii_case("nc4") => {
                Self::NetCdf
            }
            _ => Self::Json,
        }
    }
}

#[cfg(not(feature = "netcdf"))]
impl GridDataset {
    /// NetCDF reading is unavailable in this build
    ///
    /// # Errors
    /// Always `Configuration`.
    pub fn from_netcdf_file(path: &Path) -> Result<Self, GridError> {
        Err(netcdf_disabled(path))
    }

    /// NetCDF writing is unavailable in this build
    ///
    /// # Errors
    /// Always `Configuration`.
    #[allow(clippy::unused_self)]
    pub fn to_netcdf_file(&self, path: &Path) -> Result<(), GridError> {
        Err(netcdf_disabled(path))
    }
}

#[cfg(not(feature = "netcdf"))]
fn netcdf_disabled(path: &Path) -> GridError {
    GridError::config(format!(
        "{} is NetCDF but this build lacks the `netcdf` feature",
        path.display()
    ))
}

impl SiteSource for GridDataset {
    fn grid_dimensions(&self) -> Result<GridDims, GridError> {
        self.grid_dims()
    }

    fn static_field(&self, name: &str) -> Result<Vec<f64>, GridError> {
        self.field_2d(name)
    }

    fn require_site_fields(&self) -> Result<(), GridError> {
        use site_fields::{ANNUAL_AVG_PRECIP, FUEL_MODEL, IS_BURNABLE, LATITUDE, SLOPE_CLASS};
        require_fields(
            "site dataset",
            &[IS_BURNABLE, LATITUDE, FUEL_MODEL, SLOPE_CLASS, ANNUAL_AVG_PRECIP],
            |name| self.has_variable(name),
        )
    }
}

/// Daily variables
pub mod daily_fields {
    pub const PRECIP_24H: &str = "PPT24";
    pub const MAX_TEMP: &str = "MaxTemp";
    pub const MIN_TEMP: &str = "MinTemp";
    pub const MIN_RH: &str = "MinRH";
    pub const ANNUAL_AVG_PRECIP: &str = "AnnAvgPrec";
}

impl DailySource for GridDataset {
    fn grid_dimensions(&self) -> Result<GridDims, GridError> {
        self.grid_dims()
    }

    fn day_count(&self) -> Result<usize, GridError> {
        self.dimension(DAY_DIM)
    }

    fn require_daily_fields(&self, live_fuel_moisture: bool) -> Result<(), GridError> {
        use daily_fields::{ANNUAL_AVG_PRECIP, MAX_TEMP, MIN_RH, MIN_TEMP, PRECIP_24H};
        require_fields(
            "daily dataset",
            &[PRECIP_24H, MAX_TEMP, ANNUAL_AVG_PRECIP],
            |name| self.has_variable(name),
        )?;
        if live_fuel_moisture {
            require_fields(
                "daily dataset (live fuel moisture)",
                &[MIN_TEMP, MIN_RH],
                |name| self.has_variable(name),
            )?;
        }
        Ok(())
    }

    fn day(&mut self, day: usize) -> Result<DailyFrame, GridError> {
        use daily_fields::{ANNUAL_AVG_PRECIP, MAX_TEMP, MIN_RH, MIN_TEMP, PRECIP_24H};

        // Annual precipitation may be stored per day or once for the grid
        let annual_per_day = self
            .variable(ANNUAL_AVG_PRECIP)?
            .dims
            .first()
            .is_some_and(|d| d == DAY_DIM);
        let annual_avg_precip = if annual_per_day {
            self.slice(ANNUAL_AVG_PRECIP, DAY_DIM, day)?
        } else {
            self.field_2d(ANNUAL_AVG_PRECIP)?
        };

        Ok(DailyFrame {
            precip_24h: self.slice(PRECIP_24H, DAY_DIM, day)?,
            max_temp: self.slice(MAX_TEMP, DAY_DIM, day)?,
            min_temp: self.optional_slice(MIN_TEMP, DAY_DIM, day)?,
            min_rh: self.optional_slice(MIN_RH, DAY_DIM, day)?,
            annual_avg_precip,
        })
    }
}

impl OutputSink for GridDataset {
    fn declare_dimensions(
        &mut self,
        time_dim: &str,
        steps: usize,
        dims: GridDims,
    ) -> Result<(), GridError> {
        for (name, len) in [(time_dim, steps), (ROW_DIM, dims.rows), (COL_DIM, dims.cols)] {
            if let Some(existing) = self.dimensions.get(name) {
                if *existing != len {
                    return Err(GridError::write(
                        name,
                        format!("dimension already declared with length {existing}, not {len}"),
                    ));
                }
            }
            self.dimensions.insert(name.to_string(), len);
        }
        self.output_axis = Some(time_dim.to_string());
        Ok(())
    }

    fn write_field(&mut self, name: &str, data: &[f64]) -> Result<(), GridError> {
        let axis = self
            .output_axis
            .clone()
            .ok_or_else(|| GridError::write(name, "dimensions not declared before write"))?;
        let expected = self.dimension(&axis).map_err(|e| GridError::write(name, e))?
            * self.grid_dims().map_err(|e| GridError::write(name, e))?.cell_count();
        if data.len() != expected {
            return Err(GridError::write(
                name,
                format!("expected {expected} values, found {}", data.len()),
            ));
        }
        self.insert_variable(name, &[&axis, ROW_DIM, COL_DIM], data.to_vec());
        debug!("Stored output field {name} ({} values)", data.len());
        Ok(())
    }
}

/// Fine-step variables
pub mod weather_fields {
    pub const YEAR: &str = "Year";
    pub const MONTH: &str = "Month";
    pub const DAY: &str = "Day";
    pub const HOUR: &str = "Hour";
    pub const TEMP: &str = "Temp";
    pub const RH: &str = "RH";
    pub const PRECIP: &str = "PPT";
    pub const WIND_SPEED: &str = "windSpeed";
    pub const SOLAR_RADIATION: &str = "SR";
    pub const SNOW_FLAG: &str = "SnowFlag";
    pub const MC1: &str = "MC1";
    pub const MC10: &str = "MC10";
    pub const MC100: &str = "MC100";
    pub const MC1000: &str = "MC1000";
    pub const FUEL_TEMP: &str = "FuelTemp";
}

/// Weather feed backed by a weather dataset and, in upstream mode, a dead fuel
/// moisture dataset on the same fine axis
#[derive(Debug, Clone)]
pub struct DatasetWeather {
    weather: GridDataset,
    fuel_moisture: Option<GridDataset>,
}

impl DatasetWeather {
    /// Link a weather dataset with an optional upstream fuel-moisture dataset
    ///
    /// # Errors
    /// `Configuration` if the two datasets disagree on grid or time dimensions.
    pub fn new(weather: GridDataset, fuel_moisture: Option<GridDataset>) -> Result<Self, GridError> {
        if let Some(fm) = &fuel_moisture {
            let (wd, fd) = (weather.grid_dims()?, fm.grid_dims()?);
            if wd != fd {
                return Err(GridError::config(format!(
                    "fuel moisture grid {fd} does not match weather grid {wd}"
                )));
            }
            let (wt, ft) = (weather.dimension(TIME_DIM)?, fm.dimension(TIME_DIM)?);
            if wt != ft {
                return Err(GridError::config(format!(
                    "fuel moisture has {ft} time steps, weather has {wt}"
                )));
            }
        }
        Ok(Self {
            weather,
            fuel_moisture,
        })
    }

    /// True when dead fuel moistures come from upstream
    pub fn has_upstream_moisture(&self) -> bool {
        self.fuel_moisture.is_some()
    }

    fn stamp(&self, t: usize) -> Result<StepTime, GridError> {
        use weather_fields::{DAY, HOUR, MONTH, YEAR};
        Ok(StepTime::from_raw(
            self.weather.scalar(YEAR, t)?,
            self.weather.scalar(MONTH, t)?,
            self.weather.scalar(DAY, t)?,
            self.weather.scalar(HOUR, t)?,
        ))
    }
}

impl WeatherSource for DatasetWeather {
    fn grid_dimensions(&self) -> Result<GridDims, GridError> {
        self.weather.grid_dims()
    }

    fn require_weather_fields(&self, mode: MoistureMode) -> Result<(), GridError> {
        use weather_fields::{
            DAY, FUEL_TEMP, HOUR, MC1, MC10, MC100, MC1000, MONTH, PRECIP, RH, TEMP, WIND_SPEED,
            YEAR,
        };
        require_fields(
            "weather dataset",
            &[YEAR, MONTH, DAY, HOUR, TEMP, RH, PRECIP, WIND_SPEED],
            |name| self.weather.has_variable(name),
        )?;
        if mode == MoistureMode::Upstream {
            let fm = self.fuel_moisture.as_ref().ok_or_else(|| {
                GridError::config("upstream moisture mode needs a fuel moisture dataset")
            })?;
            require_fields(
                "fuel moisture dataset",
                &[MC1, MC10, MC100, MC1000, FUEL_TEMP],
                |name| fm.has_variable(name),
            )?;
        }
        Ok(())
    }

    fn time_axis(&self) -> Result<Vec<StepTime>, GridError> {
        let steps = self.weather.dimension(TIME_DIM)?;
        (0..steps).map(|t| self.stamp(t)).collect()
    }

    fn step(&mut self, t: usize) -> Result<WeatherFrame, GridError> {
        use weather_fields::{
            FUEL_TEMP, MC1, MC10, MC100, MC1000, PRECIP, RH, SNOW_FLAG, SOLAR_RADIATION, TEMP,
            WIND_SPEED,
        };
        let w = &self.weather;
        let snow = match w.optional_slice(SNOW_FLAG, TIME_DIM, t)? {
            Some(flags) => flags.iter().map(|v| *v > 0.5).collect(),
            None => vec![false; w.grid_dims()?.cell_count()],
        };
        let fuel_moisture = match &self.fuel_moisture {
            Some(fm) => Some(FuelMoistureFields {
                mc1: fm.slice(MC1, TIME_DIM, t)?,
                mc10: fm.slice(MC10, TIME_DIM, t)?,
                mc100: fm.slice(MC100, TIME_DIM, t)?,
                mc1000: fm.slice(MC1000, TIME_DIM, t)?,
                fuel_temp: fm.slice(FUEL_TEMP, TIME_DIM, t)?,
            }),
            None => None,
        };

        Ok(WeatherFrame {
            time: self.stamp(t)?,
            temperature: w.slice(TEMP, TIME_DIM, t)?,
            relative_humidity: w.slice(RH, TIME_DIM, t)?,
            precipitation: w.slice(PRECIP, TIME_DIM, t)?,
            wind_speed: w.slice(WIND_SPEED, TIME_DIM, t)?,
            solar_radiation: w.optional_slice(SOLAR_RADIATION, TIME_DIM, t)?,
            snow,
            fuel_moisture,
        })
    }
}

/// Output sink that commits a [`GridDataset`] to a file in one step
///
/// The encoding follows the extension of the path (see [`DatasetFormat`]).
/// Nothing touches the destination until [`DatasetFileSink::commit`], so a run
/// that aborts leaves no partial output behind.
#[derive(Debug)]
pub struct DatasetFileSink {
    path: PathBuf,
    dataset: GridDataset,
}

impl DatasetFileSink {
    /// Create a sink for `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dataset: GridDataset::new(),
        }
    }

    /// Write every accumulated field to disk
    ///
    /// # Errors
    /// `Write` naming the file on failure.
    pub fn commit(self) -> Result<(), GridError> {
        self.dataset.write_file(&self.path)?;
        info!(
            "Wrote {} fields to {}",
            self.dataset.variables.len(),
            self.path.display()
        );
        Ok(())
    }
}

impl OutputSink for DatasetFileSink {
    fn declare_dimensions(
        &mut self,
        time_dim: &str,
        steps: usize,
        dims: GridDims,
    ) -> Result<(), GridError> {
        self.dataset.declare_dimensions(time_dim, steps, dims)
    }

    fn write_field(&mut self, name: &str, data: &[f64]) -> Result<(), GridError> {
        self.dataset.write_field(name, data)
    }
}
