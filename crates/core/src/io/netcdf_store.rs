//! NetCDF encoding of [`GridDataset`]
//!
//! Every numeric variable is read as `f64` along with its dimension names, so
//! WRF-style NFDRS inputs load without conversion. Text and other
//! non-numeric variables (WRF's `Times`, for one) are skipped. Writes stage
//! through a temporary file beside the destination, like the JSON encoding.

use super::dataset::{staging_file, GridDataset};
use crate::error::GridError;
use std::path::Path;
use tracing::{debug, info};

impl GridDataset {
    /// Read every dimension and numeric variable of a NetCDF file
    ///
    /// # Errors
    /// `Read` naming the file if it cannot be opened, or the variable on a
    /// shape mismatch.
    pub fn from_netcdf_file(path: &Path) -> Result<Self, GridError> {
        let file = netcdf::open(path).map_err(|e| GridError::read_file(path, e))?;

        let mut dataset = GridDataset::new();
        for dim in file.dimensions() {
            dataset.dimensions.insert(dim.name(), dim.len());
        }
        for var in file.variables() {
            let name = var.name();
            let dim_names: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
            match var.get_values::<f64, _>(..) {
                Ok(data) => {
                    let dims: Vec<&str> = dim_names.iter().map(String::as_str).collect();
                    dataset.insert_variable(&name, &dims, data);
                }
                Err(e) => debug!("Skipping variable {} in {}: {}", name, path.display(), e),
            }
        }
        dataset.validate()?;

        info!(
            "Loaded {}: {} dimensions, {} variables",
            path.display(),
            dataset.dimensions.len(),
            dataset.variables.len()
        );
        Ok(dataset)
    }

    /// Write the dataset to a NetCDF file, replacing it atomically
    ///
    /// # Errors
    /// `Write` naming the file, or the dimension or variable the library
    /// rejected.
    pub fn to_netcdf_file(&self, path: &Path) -> Result<(), GridError> {
        let staging = staging_file(path)?;
        {
            let mut file =
                netcdf::create(staging.path()).map_err(|e| GridError::write_file(path, e))?;
            for (name, len) in &self.dimensions {
                file.add_dimension(name, *len)
                    .map_err(|e| GridError::write(name, e))?;
            }
            for (name, var) in &self.variables {
                let dims: Vec<&str> = var.dims.iter().map(String::as_str).collect();
                let mut nc_var = file
                    .add_variable::<f64>(name, &dims)
                    .map_err(|e| GridError::write(name, e))?;
                nc_var
                    .put_values(&var.data, ..)
                    .map_err(|e| GridError::write(name, e))?;
            }
        }
        staging
            .persist(path)
            .map_err(|e| GridError::write_file(path, e.error))?;
        Ok(())
    }
}
