//! Fire-danger physics submodels driven per cell by [`crate::model`]

pub mod dead_fuel_moisture;
pub mod indexes;
pub mod kbdi;
pub mod live_fuel_moisture;

pub use dead_fuel_moisture::{equilibrium_moisture, DeadFuelMoisture};
pub use indexes::{calc_indexes, DangerIndexes, FuelMoistures};
pub use kbdi::{KbdiState, KBDI_MAX};
pub use live_fuel_moisture::{daily_gsi, GrowingSeasonIndex};
