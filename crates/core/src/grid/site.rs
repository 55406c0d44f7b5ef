//! Static per-cell site attributes
//!
//! Loaded once from a [`SiteSource`] and immutable for the run. Integer-valued
//! fields (fuel model code, slope class) arrive as floating-point grid values and
//! are converted here.

use crate::core_types::{FuelModelClass, SlopeClass};
use crate::error::GridError;
use crate::grid::GridDims;
use crate::io::{site_fields, SiteSource};
use tracing::info;

/// Attributes of a single cell, as handed to a per-cell model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSite {
    pub flat_index: usize,
    /// Latitude in degrees north
    pub latitude: f64,
    pub fuel_model: FuelModelClass,
    pub slope_class: SlopeClass,
    /// Annual average precipitation (inches)
    pub annual_avg_precip: f64,
}

/// Time-invariant attributes of every grid cell
#[derive(Debug, Clone, PartialEq)]
pub struct StaticSiteTable {
    dims: GridDims,
    burnable: Vec<bool>,
    latitude: Vec<f64>,
    fuel_model: Vec<i32>,
    slope_class: Vec<u8>,
    annual_avg_precip: Vec<f64>,
}

impl StaticSiteTable {
    /// Read every static field from `source`
    ///
    /// # Errors
    /// `Read` if a field is missing or mis-sized. `Configuration` if a burnable
    /// cell has a non-integral fuel model code or a slope class outside `1..=5`.
    pub fn load(source: &impl SiteSource) -> Result<Self, GridError> {
        let dims = source.grid_dimensions()?;
        let cells = dims.cell_count();
        let field = |name: &str| -> Result<Vec<f64>, GridError> {
            let values = source.static_field(name)?;
            if values.len() != cells {
                return Err(GridError::read(
                    name,
                    format!("expected {cells} values, found {}", values.len()),
                ));
            }
            Ok(values)
        };

        let burnable: Vec<bool> = field(site_fields::IS_BURNABLE)?
            .into_iter()
            .map(|v| v.is_finite() && v != 0.0)
            .collect();
        let latitude = field(site_fields::LATITUDE)?;
        let annual_avg_precip = field(site_fields::ANNUAL_AVG_PRECIP)?;
        let raw_fuel = field(site_fields::FUEL_MODEL)?;
        let raw_slope = field(site_fields::SLOPE_CLASS)?;

        let mut fuel_model = Vec::with_capacity(cells);
        let mut slope_class = Vec::with_capacity(cells);
        for (i, ((&fuel, &slope), &active)) in raw_fuel
            .iter()
            .zip(&raw_slope)
            .zip(&burnable)
            .enumerate()
        {
            let integral = |v: f64| v.is_finite() && v.fract() == 0.0;
            if !active {
                // Attributes of non-burnable cells are never consulted
                fuel_model.push(if integral(fuel) { fuel as i32 } else { 0 });
                slope_class.push(0);
                continue;
            }
            if !integral(fuel) {
                return Err(GridError::config(format!(
                    "cell {i} has non-integral fuel model code {fuel}"
                )));
            }
            if !integral(slope) || SlopeClass::new(slope as u8).is_none() {
                return Err(GridError::config(format!(
                    "cell {i} has slope class {slope}, expected 1..=5"
                )));
            }
            fuel_model.push(fuel as i32);
            slope_class.push(slope as u8);
        }

        let table = Self {
            dims,
            burnable,
            latitude,
            fuel_model,
            slope_class,
            annual_avg_precip,
        };
        info!(
            "Site table loaded: grid {}, {} burnable cells",
            dims,
            table.burnable_count()
        );
        Ok(table)
    }

    /// Grid dimensions
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Number of cells flagged burnable
    pub fn burnable_count(&self) -> usize {
        self.burnable.iter().filter(|b| **b).count()
    }

    #[inline]
    pub fn is_burnable(&self, flat: usize) -> bool {
        self.burnable[flat]
    }

    /// Raw fuel model code of a cell
    #[inline]
    pub fn fuel_code(&self, flat: usize) -> i32 {
        self.fuel_model[flat]
    }

    /// Model-facing attributes of a burnable cell once its class is known
    ///
    /// Slope class falls back to 1 for cells that were never validated.
    pub fn cell_site(&self, flat: usize, fuel_model: FuelModelClass) -> CellSite {
        CellSite {
            flat_index: flat,
            latitude: self.latitude[flat],
            fuel_model,
            slope_class: SlopeClass::new(self.slope_class[flat]).unwrap_or_default(),
            annual_avg_precip: self.annual_avg_precip[flat],
        }
    }
}
