//! Gridded NFDRS Fire-Danger Core Library
//!
//! Drives one stateful US National Fire Danger Rating System model per burnable
//! grid cell across a fine (sub-daily) time axis, with daily aggregates coupled
//! in at a fixed local observation hour. Produces dense `[time, y, x]` arrays of
//! drought index, growing-season index, live fuel moisture and the spread,
//! energy release, burning and ignition components.
//!
//! ## Pipeline
//!
//! - [`grid::StaticSiteTable`] loads per-cell site attributes
//! - [`grid::ActiveCellIndex`] maps burnable cells to dense model positions
//! - [`model::ModelRegistry`] holds one [`model::Nfdrs4Cell`] per position
//! - [`simulation::TemporalDriver`] advances every model through time
//! - [`simulation::OutputGrid`] collects results with [`NO_DATA`] elsewhere
//!
//! [`simulation::run`] wires the pipeline together; [`io::GridDataset`] provides
//! the JSON gridded store used for input and output.

pub mod config;
pub mod core_types;
pub mod error;
pub mod grid;
pub mod io;
pub mod model;
pub mod physics;
pub mod simulation;

pub use config::{CouplingRatio, OutputResolution, RunConfig};
pub use core_types::{FuelModelClass, FuelModelTable, SlopeClass};
pub use error::{GridError, UnknownFuelModel};
pub use grid::{ActiveCellIndex, GridDims, StaticSiteTable, StepTime, TemporalCoupling};
pub use io::{DatasetFileSink, DatasetFormat, DatasetWeather, GridDataset};
pub use model::{CellModel, ModelRegistry, Nfdrs4Cell};
pub use simulation::{run, MoistureMode, OutputField, OutputGrid, RunReport, NO_DATA};
