//! Core value types shared by the grid, model and I/O layers

pub mod fuel_model;
pub mod units;

pub use fuel_model::{FuelModelClass, FuelModelParams, FuelModelTable, SlopeClass};
pub use units::{Celsius, Fahrenheit, Inches, MilesPerHour, Percent};
