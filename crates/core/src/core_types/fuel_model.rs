//! NFDRS fuel-model classes and the code → class lookup table
//!
//! The 2016 revision of the US National Fire Danger Rating System collapses the
//! twenty 1978 fuel models into five classes:
//! - `V`: Grass
//! - `W`: Grass-shrub
//! - `X`: Brush
//! - `Y`: Timber
//! - `Z`: Slash / blowdown
//!
//! Site rasters carry a numeric fuel-model code per cell. Which code maps to
//! which class is a per-run decision, so the table is an explicit value handed to
//! the active-cell index rather than process-wide state.
//!
//! # References
//! - Jolly, W.M. et al. (2024). "Relationships between fire danger and the daily
//!   number and daily size of fires in the United States" (NFDRS 2016 model
//!   definitions).
//! - Deeming, J.E., Burgan, R.E., Cohen, J.D. (1977). "The National Fire-Danger
//!   Rating System - 1978". USDA Forest Service GTR INT-39.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tons per acre to pounds per square foot
const TONS_PER_ACRE_TO_LB_PER_FT2: f64 = 0.0459137;

/// NFDRS 2016 fuel-model class tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelModelClass {
    V,
    W,
    X,
    Y,
    Z,
}

/// Static fuel-bed description for one class
///
/// Loadings are in tons/acre as published; use [`FuelModelParams::loading_lb_ft2`]
/// for the Rothermel formulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelModelParams {
    /// Dead loadings by timelag class [1h, 10h, 100h, 1000h] (tons/acre)
    pub dead_loading: [f64; 4],
    /// Live herbaceous loading (tons/acre)
    pub herb_loading: f64,
    /// Live woody loading (tons/acre)
    pub wood_loading: f64,
    /// Dead surface-area-to-volume ratios [1h, 10h, 100h, 1000h] (1/ft)
    pub dead_sav: [f64; 4],
    /// Live herbaceous surface-area-to-volume ratio (1/ft)
    pub herb_sav: f64,
    /// Live woody surface-area-to-volume ratio (1/ft)
    pub wood_sav: f64,
    /// Fuel bed depth (ft)
    pub depth: f64,
    /// Dead fuel moisture of extinction (%)
    pub dead_extinction: f64,
    /// Heat content of all fuels (Btu/lb)
    pub heat_content: f64,
    /// Spread component at which every ignition becomes a reportable fire
    pub scm: f64,
    /// Wind reduction from 20-ft to midflame height
    pub wind_factor: f64,
}

impl FuelModelParams {
    /// Convert a tons/acre loading to lb/ft²
    #[inline]
    pub fn loading_lb_ft2(tons_per_acre: f64) -> f64 {
        tons_per_acre * TONS_PER_ACRE_TO_LB_PER_FT2
    }
}

const DEAD_SAV: [f64; 4] = [2000.0, 109.0, 30.0, 8.0];

impl FuelModelClass {
    /// Every class in canonical order
    pub const ALL: [FuelModelClass; 5] = [Self::V, Self::W, Self::X, Self::Y, Self::Z];

    /// Fuel-bed parameters for this class
    pub fn params(self) -> FuelModelParams {
        match self {
            Self::V => FuelModelParams {
                dead_loading: [0.1, 0.0, 0.0, 0.0],
                herb_loading: 1.0,
                wood_loading: 0.0,
                dead_sav: DEAD_SAV,
                herb_sav: 2000.0,
                wood_sav: 1500.0,
                depth: 1.0,
                dead_extinction: 15.0,
                heat_content: 8000.0,
                scm: 108.0,
                wind_factor: 0.6,
            },
            Self::W => FuelModelParams {
                dead_loading: [0.5, 0.5, 0.0, 0.0],
                herb_loading: 0.6,
                wood_loading: 1.0,
                dead_sav: DEAD_SAV,
                herb_sav: 2000.0,
                wood_sav: 1500.0,
                depth: 1.5,
                dead_extinction: 15.0,
                heat_content: 8000.0,
                scm: 62.0,
                wind_factor: 0.4,
            },
            Self::X => FuelModelParams {
                dead_loading: [4.5, 2.45, 0.0, 0.0],
                herb_loading: 1.55,
                wood_loading: 7.0,
                dead_sav: DEAD_SAV,
                herb_sav: 2000.0,
                wood_sav: 1500.0,
                depth: 4.4,
                dead_extinction: 25.0,
                heat_content: 8000.0,
                scm: 104.0,
                wind_factor: 0.4,
            },
            Self::Y => FuelModelParams {
                dead_loading: [2.5, 2.2, 3.6, 10.16],
                herb_loading: 0.0,
                wood_loading: 0.0,
                dead_sav: DEAD_SAV,
                herb_sav: 2000.0,
                wood_sav: 1500.0,
                depth: 0.6,
                dead_extinction: 25.0,
                heat_content: 8000.0,
                scm: 5.0,
                wind_factor: 0.2,
            },
            Self::Z => FuelModelParams {
                dead_loading: [4.5, 14.03, 16.53, 24.0],
                herb_loading: 0.0,
                wood_loading: 0.0,
                dead_sav: DEAD_SAV,
                herb_sav: 2000.0,
                wood_sav: 1500.0,
                depth: 2.0,
                dead_extinction: 25.0,
                heat_content: 8000.0,
                scm: 31.0,
                wind_factor: 0.4,
            },
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Self::V => "Grass",
            Self::W => "Grass-Shrub",
            Self::X => "Brush",
            Self::Y => "Timber",
            Self::Z => "Slash",
        }
    }
}

impl fmt::Display for FuelModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.name())
    }
}

/// Mapping from input fuel-model code to model class
///
/// Codes absent from the table are unrecognized; the active-cell index excludes
/// such cells instead of running them with guessed parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FuelModelTable {
    mappings: FxHashMap<i32, FuelModelClass>,
}

impl FuelModelTable {
    /// Default table: codes 1-5 map to classes V, W, X, Y, Z
    #[must_use]
    pub fn nfdrs_default() -> Self {
        let mappings = FuelModelClass::ALL
            .iter()
            .zip(1..)
            .map(|(class, code)| (code, *class))
            .collect();
        Self { mappings }
    }

    /// Create an empty table
    #[must_use]
    pub fn empty() -> Self {
        Self {
            mappings: FxHashMap::default(),
        }
    }

    /// Builder-style insertion
    pub fn with(mut self, code: i32, class: FuelModelClass) -> Self {
        self.mappings.insert(code, class);
        self
    }

    /// Get the class for a given code
    #[must_use]
    pub fn class_for(&self, code: i32) -> Option<FuelModelClass> {
        self.mappings.get(&code).copied()
    }

    /// Set or replace the class for a code
    pub fn set_class(&mut self, code: i32, class: FuelModelClass) {
        self.mappings.insert(code, class);
    }

    /// Number of recognized codes
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// True if no code is recognized
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl Default for FuelModelTable {
    fn default() -> Self {
        Self::nfdrs_default()
    }
}

/// NFDRS slope class (1 = 0-25%, 2 = 26-40%, 3 = 41-55%, 4 = 56-75%, 5 = >75%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlopeClass(u8);

impl SlopeClass {
    /// Slope factor `φ_s · β^0.3` for each class, from the 1978 NFDRS tables
    const SLOPE_FACTORS: [f64; 5] = [0.267, 0.533, 1.068, 2.134, 4.273];

    /// Create a slope class, returning `None` outside 1..=5
    #[must_use]
    pub fn new(class: u8) -> Option<Self> {
        (1..=5).contains(&class).then_some(Self(class))
    }

    /// Raw class number
    pub fn value(self) -> u8 {
        self.0
    }

    /// Slope factor before the packing-ratio correction
    pub fn factor(self) -> f64 {
        Self::SLOPE_FACTORS[usize::from(self.0 - 1)]
    }
}

impl Default for SlopeClass {
    fn default() -> Self {
        Self(1)
    }
}
