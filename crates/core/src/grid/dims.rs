//! Grid dimensions and flat-index arithmetic

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed `rows × cols` grid, established once from input metadata
///
/// Cells are addressed by flat index `i = row * cols + col` in row-major order,
/// the same layout every `[y, x]` slice of a `[time, y, x]` array uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDims {
    /// Number of rows (`south_north`)
    pub rows: usize,
    /// Number of columns (`west_east`)
    pub cols: usize,
}

impl GridDims {
    /// Create new dimensions
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of cells `N * M`
    #[inline]
    pub const fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Flat index of `(row, col)`
    ///
    /// # Panics
    /// Panics if `(row, col)` is outside the grid.
    #[inline]
    #[must_use]
    pub fn flat_index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "Coordinates out of bounds"
        );
        row * self.cols + col
    }

    /// `(row, col)` of a flat index
    #[inline]
    #[must_use]
    pub fn row_col(&self, flat: usize) -> (usize, usize) {
        (flat / self.cols, flat % self.cols)
    }

    /// Offset of `(t, i)` in a flat `[t, y, x]` buffer
    #[inline]
    pub const fn offset(&self, t: usize, flat: usize) -> usize {
        t * self.cell_count() + flat
    }
}

impl fmt::Display for GridDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_index_round_trip() {
        let dims = GridDims::new(3, 4);
        assert_eq!(dims.cell_count(), 12);
        for row in 0..3 {
            for col in 0..4 {
                let flat = dims.flat_index(row, col);
                assert_eq!(dims.row_col(flat), (row, col));
            }
        }
    }

    #[test]
    fn test_time_offset_layout() {
        let dims = GridDims::new(2, 5);
        assert_eq!(dims.offset(0, 3), 3);
        assert_eq!(dims.offset(2, 3), 23);
    }

    #[test]
    #[should_panic(expected = "Coordinates out of bounds")]
    fn test_flat_index_out_of_bounds() {
        let _ = GridDims::new(2, 2).flat_index(2, 0);
    }
}
