//! Dense per-cell model storage addressed by active-cell position

use crate::grid::{ActiveCellIndex, CellSite, StaticSiteTable};
use tracing::info;

/// One model per active cell, slot `c` holding the model of
/// `index.flat_index(c)`
#[derive(Debug, Clone)]
pub struct ModelRegistry<M> {
    models: Vec<M>,
}

impl<M> ModelRegistry<M> {
    /// Construct every model in active-cell order
    pub fn build(
        index: &ActiveCellIndex,
        site: &StaticSiteTable,
        factory: impl FnMut(CellSite) -> M,
    ) -> Self {
        let models: Vec<M> = index.cell_sites(site).map(factory).collect();
        info!("Constructed {} cell models", models.len());
        Self { models }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Model at position `c`
    pub fn get(&self, c: usize) -> Option<&M> {
        self.models.get(c)
    }

    /// `(c, model)` in position order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut M)> {
        self.models.iter_mut().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::FuelModelTable;
    use crate::io::GridDataset;

    #[test]
    fn test_models_follow_index_order() {
        let dims = ["south_north", "west_east"];
        let dataset = GridDataset::new()
            .with_dimension("south_north", 2)
            .with_dimension("west_east", 3)
            .with_variable("IsBurnable", &dims, vec![1.0, 0.0, 1.0, 1.0, 1.0, 0.0])
            .with_variable("Latitude", &dims, vec![40.0, 40.1, 40.2, 40.3, 40.4, 40.5])
            .with_variable("FuelModel", &dims, vec![1.0, 1.0, 99.0, 2.0, 3.0, 1.0])
            .with_variable("SlopeClass", &dims, vec![1.0; 6])
            .with_variable("AnnAvgPrec", &dims, vec![30.0; 6]);
        let site = StaticSiteTable::load(&dataset).unwrap();
        let index = ActiveCellIndex::build(&site, &FuelModelTable::nfdrs_default(), None).unwrap();

        let registry = ModelRegistry::build(&index, &site, |cell| cell.flat_index);
        assert_eq!(registry.len(), index.len());
        assert_eq!(registry.len(), site.burnable_count() - 1);
        for c in 0..registry.len() {
            assert_eq!(registry.get(c), Some(&index.flat_index(c)));
        }
    }
}
