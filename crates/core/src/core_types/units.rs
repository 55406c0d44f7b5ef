//! Semantic unit types for the fire-danger inputs
//!
//! NFDRS works in US customary units, while the growing-season index and the
//! fuel-temperature correction are defined in SI. These newtypes keep the two
//! from being mixed silently at the model boundary.
//!
//! # Usage
//! ```
//! use nfdrs_grid_core::core_types::units::{Celsius, Fahrenheit};
//!
//! let temp = Fahrenheit::new(212.0);
//! let celsius: Celsius = temp.into();
//! assert!((*celsius - 100.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

// ============================================================================
// TEMPERATURE TYPES
// ============================================================================

/// Temperature in degrees Fahrenheit
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Fahrenheit(f64);

impl Deref for Fahrenheit {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Fahrenheit {
    /// Create a new Fahrenheit temperature
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Fahrenheit(value)
    }

    /// Convert to Celsius
    #[inline]
    #[must_use]
    pub fn to_celsius(self) -> Celsius {
        Celsius((self.0 - 32.0) * 5.0 / 9.0)
    }
}

impl From<Fahrenheit> for Celsius {
    fn from(f: Fahrenheit) -> Celsius {
        f.to_celsius()
    }
}

impl fmt::Display for Fahrenheit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°F", self.0)
    }
}

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Celsius(f64);

impl Deref for Celsius {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Celsius {
    /// Create a new Celsius temperature
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Celsius(value)
    }

    /// Convert to Fahrenheit
    #[inline]
    #[must_use]
    pub fn to_fahrenheit(self) -> Fahrenheit {
        Fahrenheit(self.0 * 9.0 / 5.0 + 32.0)
    }
}

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°C", self.0)
    }
}

// ============================================================================
// RATIO / DEPTH / VELOCITY TYPES
// ============================================================================

/// Percentage value (relative humidity, fuel moisture content)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Percent(f64);

impl Deref for Percent {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Percent {
    /// Create a new percentage. Negative inputs are floored at zero.
    #[inline]
    #[must_use]
    pub fn new(value: f64) -> Self {
        Percent(value.max(0.0))
    }

    /// Convert to a fraction (0-1 for values up to 100%)
    #[inline]
    #[must_use]
    pub fn to_fraction(self) -> f64 {
        self.0 / 100.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

/// Precipitation depth in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Inches(f64);

impl Deref for Inches {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl Inches {
    /// Create a new depth. Negative inputs (missing-data artefacts) read as zero.
    #[inline]
    #[must_use]
    pub fn new(value: f64) -> Self {
        Inches(value.max(0.0))
    }

    /// Depth in hundredths of an inch, the unit of the KBDI recursion
    #[inline]
    #[must_use]
    pub fn hundredths(self) -> f64 {
        self.0 * 100.0
    }
}

impl fmt::Display for Inches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} in", self.0)
    }
}

/// Wind speed in miles per hour (20-ft observation height)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MilesPerHour(f64);

impl Deref for MilesPerHour {
    type Target = f64;
    #[inline]
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl MilesPerHour {
    /// Feet per minute in one mile per hour
    const FEET_PER_MINUTE: f64 = 88.0;

    /// Create a new wind speed. Negative inputs read as calm.
    #[inline]
    #[must_use]
    pub fn new(value: f64) -> Self {
        MilesPerHour(value.max(0.0))
    }

    /// Convert to feet per minute
    #[inline]
    #[must_use]
    pub fn to_feet_per_minute(self) -> f64 {
        self.0 * Self::FEET_PER_MINUTE
    }
}

impl fmt::Display for MilesPerHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} mph", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fahrenheit_celsius_round_trip() {
        let freezing = Fahrenheit::new(32.0).to_celsius();
        assert!(freezing.abs() < 1e-12);

        let body = Celsius::new(37.0).to_fahrenheit();
        assert!((*body - 98.6).abs() < 1e-9);
    }

    #[test]
    fn test_negative_precip_reads_as_zero() {
        assert_eq!(*Inches::new(-9999.0), 0.0);
        assert_eq!(Inches::new(0.25).hundredths(), 25.0);
    }

    #[test]
    fn test_wind_conversion() {
        assert_eq!(MilesPerHour::new(10.0).to_feet_per_minute(), 880.0);
        assert_eq!(*MilesPerHour::new(-1.0), 0.0);
    }
}
