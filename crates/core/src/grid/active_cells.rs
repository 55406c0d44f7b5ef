//! Active-cell index: the one bijection between grid cells and model slots
//!
//! Built once from the site table and the fuel-model table. Position `c` in the
//! dense per-cell model array corresponds to flat grid index `active[c]`, with
//! `active` in ascending flat order. Nothing else in the crate derives this
//! correspondence.

use crate::core_types::{FuelModelClass, FuelModelTable};
use crate::error::{GridError, UnknownFuelModel};
use crate::grid::{CellSite, StaticSiteTable};
use tracing::{info, warn};

/// Ordered burnable, recognized cells and their dense positions
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveCellIndex {
    /// Flat index of each position
    active: Vec<usize>,
    /// Position of each flat index, `None` for inactive cells
    positions: Vec<Option<usize>>,
    /// Model class of each position
    classes: Vec<FuelModelClass>,
    excluded: Vec<UnknownFuelModel>,
}

impl ActiveCellIndex {
    /// Index every burnable cell whose fuel code is in `fuel_models`
    ///
    /// A burnable cell with an unrecognized code is excluded and recorded as an
    /// [`UnknownFuelModel`]; it is never given a default class.
    ///
    /// # Errors
    /// `Configuration` when more than `max_unknown` cells are excluded.
    pub fn build(
        site: &StaticSiteTable,
        fuel_models: &FuelModelTable,
        max_unknown: Option<usize>,
    ) -> Result<Self, GridError> {
        let cells = site.dims().cell_count();
        let mut active = Vec::new();
        let mut positions = vec![None; cells];
        let mut classes = Vec::new();
        let mut excluded = Vec::new();

        for flat in (0..cells).filter(|&i| site.is_burnable(i)) {
            let code = site.fuel_code(flat);
            match fuel_models.class_for(code) {
                Some(class) => {
                    positions[flat] = Some(active.len());
                    active.push(flat);
                    classes.push(class);
                }
                None => {
                    let unknown = UnknownFuelModel {
                        flat_index: flat,
                        code,
                    };
                    warn!("{unknown}");
                    excluded.push(unknown);
                }
            }
        }

        if let Some(limit) = max_unknown {
            if excluded.len() > limit {
                return Err(GridError::config(format!(
                    "{} burnable cells have unrecognized fuel model codes (tolerance {limit})",
                    excluded.len()
                )));
            }
        }

        info!(
            "Active-cell index: {} of {} cells active, {} excluded",
            active.len(),
            cells,
            excluded.len()
        );
        Ok(Self {
            active,
            positions,
            classes,
            excluded,
        })
    }

    /// Number of active cells
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Total grid cells, active or not
    pub fn cell_count(&self) -> usize {
        self.positions.len()
    }

    /// Flat grid index of position `c`
    #[inline]
    pub fn flat_index(&self, c: usize) -> usize {
        self.active[c]
    }

    /// Dense position of flat index `i`, `None` if the cell is inactive
    #[inline]
    pub fn position(&self, flat: usize) -> Option<usize> {
        self.positions.get(flat).copied().flatten()
    }

    /// Model class assigned to position `c`
    #[inline]
    pub fn class(&self, c: usize) -> FuelModelClass {
        self.classes[c]
    }

    /// `(c, flat_index)` in ascending position order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.active.iter().copied().enumerate()
    }

    /// Flat indices of every inactive cell, ascending
    pub fn inactive(&self) -> impl Iterator<Item = usize> + '_ {
        self.positions
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.is_none().then_some(i))
    }

    /// Burnable cells dropped for an unrecognized fuel code
    pub fn excluded(&self) -> &[UnknownFuelModel] {
        &self.excluded
    }

    /// Static attributes of every active cell in position order
    pub fn cell_sites<'a>(
        &'a self,
        site: &'a StaticSiteTable,
    ) -> impl Iterator<Item = CellSite> + 'a {
        self.iter()
            .map(move |(c, flat)| site.cell_site(flat, self.classes[c]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::GridDataset;

    fn site_table(burnable: &[f64], fuel: &[f64]) -> StaticSiteTable {
        let dims = ["south_north", "west_east"];
        let n = burnable.len();
        let dataset = GridDataset::new()
            .with_dimension("south_north", 1)
            .with_dimension("west_east", n)
            .with_variable("IsBurnable", &dims, burnable.to_vec())
            .with_variable("Latitude", &dims, vec![40.0; n])
            .with_variable("FuelModel", &dims, fuel.to_vec())
            .with_variable("SlopeClass", &dims, vec![1.0; n])
            .with_variable("AnnAvgPrec", &dims, vec![30.0; n]);
        StaticSiteTable::load(&dataset).unwrap()
    }

    #[test]
    fn test_positions_are_a_bijection() {
        let site = site_table(&[1.0, 0.0, 1.0, 1.0, 0.0], &[1.0, 1.0, 2.0, 4.0, 5.0]);
        let index = ActiveCellIndex::build(&site, &FuelModelTable::nfdrs_default(), None).unwrap();

        assert_eq!(index.len(), 3);
        for (c, flat) in index.iter() {
            assert_eq!(index.position(flat), Some(c));
            assert_eq!(index.flat_index(c), flat);
        }
        assert_eq!(index.inactive().collect::<Vec<_>>(), vec![1, 4]);
        assert_eq!(index.class(2), FuelModelClass::Y);
    }

    #[test]
    fn test_rebuild_is_identical() {
        let site = site_table(&[1.0, 1.0, 0.0, 1.0], &[3.0, 2.0, 1.0, 1.0]);
        let table = FuelModelTable::nfdrs_default();
        let first = ActiveCellIndex::build(&site, &table, None).unwrap();
        let second = ActiveCellIndex::build(&site, &table, None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_code_excluded_with_warning() {
        let site = site_table(&[1.0, 1.0, 1.0], &[1.0, 99.0, 2.0]);
        let index = ActiveCellIndex::build(&site, &FuelModelTable::nfdrs_default(), None).unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.position(1), None);
        assert_eq!(
            index.excluded(),
            &[UnknownFuelModel {
                flat_index: 1,
                code: 99
            }]
        );
    }

    #[test]
    fn test_unknown_tolerance_exceeded() {
        let site = site_table(&[1.0, 1.0], &[98.0, 99.0]);
        let result = ActiveCellIndex::build(&site, &FuelModelTable::nfdrs_default(), Some(1));
        assert!(matches!(result, Err(GridError::Configuration(_))));
    }
}
