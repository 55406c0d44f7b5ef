//! Grid geometry, time axes, site attributes and the active-cell index

pub mod active_cells;
pub mod dims;
pub mod site;
pub mod time_axis;

pub use active_cells::ActiveCellIndex;
pub use dims::GridDims;
pub use site::{CellSite, StaticSiteTable};
pub use time_axis::{StepTime, TemporalCoupling};
