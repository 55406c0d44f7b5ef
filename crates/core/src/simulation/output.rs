//! Output grid assembler
//!
//! One flat `[t, y, x]` buffer per output field, `index = t * (N*M) + i`. Every
//! buffer starts filled with [`NO_DATA`]. A written-mask per `(t, i)` enforces
//! that each cell of each output step is written exactly once, either with a
//! model result or with the sentinel.

use crate::error::GridError;
use crate::grid::GridDims;
use crate::io::OutputSink;
use crate::model::CellOutput;
use std::fmt;
use tracing::info;

/// Sentinel written for every non-simulated cell
pub const NO_DATA: f64 = -9999.0;

/// A named output array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputField {
    Kbdi,
    Gsi,
    McHerb,
    McWood,
    Sc,
    Erc,
    Bi,
    Ic,
    Mc1,
    Mc10,
    Mc100,
    Mc1000,
    FuelTemp,
}

impl OutputField {
    /// Fields produced in every mode
    pub const INDEXES: [OutputField; 8] = [
        Self::Kbdi,
        Self::Gsi,
        Self::McHerb,
        Self::McWood,
        Self::Sc,
        Self::Erc,
        Self::Bi,
        Self::Ic,
    ];

    /// Dead fuel moisture fields, produced only when computed inline
    pub const DEAD_MOISTURE: [OutputField; 5] = [
        Self::Mc1,
        Self::Mc10,
        Self::Mc100,
        Self::Mc1000,
        Self::FuelTemp,
    ];

    /// Variable name in the output dataset
    pub fn name(self) -> &'static str {
        match self {
            Self::Kbdi => "KBDI",
            Self::Gsi => "GSI",
            Self::McHerb => "MCHERB",
            Self::McWood => "MCWOOD",
            Self::Sc => "SC",
            Self::Erc => "ERC",
            Self::Bi => "BI",
            Self::Ic => "IC",
            Self::Mc1 => "MC1",
            Self::Mc10 => "MC10",
            Self::Mc100 => "MC100",
            Self::Mc1000 => "MC1000",
            Self::FuelTemp => "FuelTemp",
        }
    }

    /// This field's value in a cell result
    pub fn extract(self, out: &CellOutput) -> f64 {
        match self {
            Self::Kbdi => out.kbdi,
            Self::Gsi => out.gsi,
            Self::McHerb => out.herb_moisture,
            Self::McWood => out.wood_moisture,
            Self::Sc => out.indexes.sc,
            Self::Erc => out.indexes.erc,
            Self::Bi => out.indexes.bi,
            Self::Ic => out.indexes.ic,
            Self::Mc1 => out.dead.mc1,
            Self::Mc10 => out.dead.mc10,
            Self::Mc100 => out.dead.mc100,
            Self::Mc1000 => out.dead.mc1000,
            Self::FuelTemp => out.dead.fuel_temp,
        }
    }
}

impl fmt::Display for OutputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dense `[T_out, N, M]` buffers for a fixed set of fields
#[derive(Debug, Clone)]
pub struct OutputGrid {
    dims: GridDims,
    steps: usize,
    time_dim: &'static str,
    fields: Vec<OutputField>,
    buffers: Vec<Vec<f64>>,
    written: Vec<bool>,
}

impl OutputGrid {
    /// Allocate `steps` output steps of every field, pre-filled with [`NO_DATA`]
    pub fn new(
        dims: GridDims,
        steps: usize,
        time_dim: &'static str,
        fields: &[OutputField],
    ) -> Self {
        let len = steps * dims.cell_count();
        Self {
            dims,
            steps,
            time_dim,
            fields: fields.to_vec(),
            buffers: vec![vec![NO_DATA; len]; fields.len()],
            written: vec![false; len],
        }
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Output steps `T_out`
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Name of the leading dimension
    pub fn time_dim(&self) -> &'static str {
        self.time_dim
    }

    pub fn fields(&self) -> &[OutputField] {
        &self.fields
    }

    fn claim(&mut self, t: usize, flat: usize) -> Result<usize, GridError> {
        if t >= self.steps || flat >= self.dims.cell_count() {
            return Err(GridError::write(
                format!("({t}, {flat})"),
                format!(
                    "outside {} steps of a {} grid",
                    self.steps, self.dims
                ),
            ));
        }
        let offset = self.dims.offset(t, flat);
        if self.written[offset] {
            return Err(GridError::write(
                format!("({t}, {flat})"),
                "cell already written for this output step",
            ));
        }
        self.written[offset] = true;
        Ok(offset)
    }

    /// Store a model result at `(t, flat)`
    ///
    /// # Errors
    /// `Write` if `(t, flat)` is out of range or was already written.
    pub fn write_cell(&mut self, t: usize, flat: usize, out: &CellOutput) -> Result<(), GridError> {
        let offset = self.claim(t, flat)?;
        for (field, buffer) in self.fields.iter().zip(&mut self.buffers) {
            buffer[offset] = field.extract(out);
        }
        Ok(())
    }

    /// Store the sentinel at `(t, flat)` in every field
    ///
    /// # Errors
    /// `Write` if `(t, flat)` is out of range or was already written.
    pub fn write_no_data(&mut self, t: usize, flat: usize) -> Result<(), GridError> {
        let offset = self.claim(t, flat)?;
        for buffer in &mut self.buffers {
            buffer[offset] = NO_DATA;
        }
        Ok(())
    }

    /// Whole buffer of one field
    pub fn field(&self, field: OutputField) -> Option<&[f64]> {
        self.fields
            .iter()
            .position(|f| *f == field)
            .map(|k| self.buffers[k].as_slice())
    }

    /// One value, `None` if the field is not produced or `(t, flat)` is out of range
    pub fn value(&self, field: OutputField, t: usize, flat: usize) -> Option<f64> {
        if flat >= self.dims.cell_count() {
            return None;
        }
        self.field(field)?.get(self.dims.offset(t, flat)).copied()
    }

    /// `(t, i)` positions never written
    pub fn unwritten(&self) -> usize {
        self.written.iter().filter(|w| !**w).count()
    }

    /// Declare dimensions on `sink` and hand it every field
    ///
    /// # Errors
    /// `Write` if any `(t, i)` was never written, or the sink fails.
    pub fn persist(&self, sink: &mut impl OutputSink) -> Result<(), GridError> {
        let missing = self.unwritten();
        if missing > 0 {
            return Err(GridError::write(
                "output grid",
                format!("{missing} cell steps were never written"),
            ));
        }
        sink.declare_dimensions(self.time_dim, self.steps, self.dims)?;
        for (field, buffer) in self.fields.iter().zip(&self.buffers) {
            sink.write_field(field.name(), buffer)?;
        }
        info!(
            "Persisted {} fields of {} x {}",
            self.fields.len(),
            self.steps,
            self.dims
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::GridDataset;
    use crate::physics::{DangerIndexes, DeadFuelMoisture};

    fn result(kbdi: f64) -> CellOutput {
        CellOutput {
            kbdi,
            gsi: 0.5,
            herb_moisture: 120.0,
            wood_moisture: 150.0,
            indexes: DangerIndexes {
                sc: 10.0,
                erc: 20.0,
                bi: 30.0,
                ic: 40.0,
            },
            dead: DeadFuelMoisture::default(),
        }
    }

    #[test]
    fn test_prefilled_with_no_data() {
        let grid = OutputGrid::new(GridDims::new(2, 2), 3, "time", &OutputField::INDEXES);
        for field in OutputField::INDEXES {
            assert!(grid.field(field).unwrap().iter().all(|v| *v == NO_DATA));
        }
        assert_eq!(grid.unwritten(), 12);
        assert!(grid.field(OutputField::Mc1).is_none());
    }

    #[test]
    fn test_layout_is_time_major() {
        let mut grid = OutputGrid::new(GridDims::new(1, 3), 2, "time", &OutputField::INDEXES);
        grid.write_cell(1, 2, &result(55.0)).unwrap();
        assert_eq!(grid.field(OutputField::Kbdi).unwrap()[5], 55.0);
        assert_eq!(grid.value(OutputField::Bi, 1, 2), Some(30.0));
    }

    #[test]
    fn test_second_write_rejected() {
        let mut grid = OutputGrid::new(GridDims::new(1, 2), 1, "time", &OutputField::INDEXES);
        grid.write_cell(0, 0, &result(1.0)).unwrap();
        assert!(grid.write_cell(0, 0, &result(2.0)).is_err());
        assert!(grid.write_no_data(0, 0).is_err());
        assert_eq!(grid.value(OutputField::Kbdi, 0, 0), Some(1.0));
    }

    #[test]
    fn test_persist_requires_complete_grid() {
        let mut grid = OutputGrid::new(GridDims::new(1, 2), 1, "day", &OutputField::INDEXES);
        let mut sink = GridDataset::new();
        grid.write_cell(0, 0, &result(1.0)).unwrap();
        assert!(grid.persist(&mut sink).is_err());
        assert!(sink.variables.is_empty());

        grid.write_no_data(0, 1).unwrap();
        grid.persist(&mut sink).unwrap();
        assert_eq!(sink.variable("KBDI").unwrap().data, vec![1.0, NO_DATA]);
        assert_eq!(sink.dimension("day").unwrap(), 1);
    }
}
