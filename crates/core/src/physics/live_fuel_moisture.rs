//! Growing Season Index and live fuel moisture
//!
//! The GSI is the product of three 0-1 indicators (minimum temperature, vapour
//! pressure deficit, photoperiod) averaged over a 21-day window. Above the
//! green-up threshold it scales herbaceous and woody moisture linearly between
//! their cured and fully green values.
//!
//! # References
//! - Jolly, W.M., Nemani, R., Running, S.W. (2005). "A generalized, bioclimatic
//!   index to predict foliar phenology in response to climate". Global Change
//!   Biology 11, 619-632
//! - Forsythe, W.C. et al. (1995). "A model comparison for daylength as a function
//!   of latitude and day of year". Ecological Modelling 80, 87-95

use crate::core_types::units::{Celsius, Fahrenheit, Percent};
use std::collections::VecDeque;

/// Days in the GSI running average
pub const GSI_WINDOW_DAYS: usize = 21;

/// GSI above which live fuels begin greening
pub const GREENUP_THRESHOLD: f64 = 0.5;

/// Herbaceous moisture range, cured to fully green (%)
pub const HERB_MOISTURE_RANGE: (f64, f64) = (30.0, 250.0);

/// Woody moisture range, dormant to fully green (%)
pub const WOOD_MOISTURE_RANGE: (f64, f64) = (60.0, 200.0);

/// Herbaceous moisture used when the live-fuel submodel is off (%)
pub const FIXED_HERB_MOISTURE: f64 = 120.0;

/// Woody moisture used when the live-fuel submodel is off (%)
pub const FIXED_WOOD_MOISTURE: f64 = 150.0;

/// Linear ramp from 0 at `lo` to 1 at `hi`; `hi < lo` ramps downward
fn ramp(value: f64, lo: f64, hi: f64) -> f64 {
    ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
}

/// Saturation vapour pressure over water (Pa)
fn saturation_vapour_pressure(temperature: Celsius) -> f64 {
    let t = *temperature;
    610.7 * (17.38 * t / (239.0 + t)).exp()
}

/// Daylength in hours (CBM model, sunrise/sunset at upper limb with refraction)
pub fn daylength_hours(latitude: f64, day_of_year: u32) -> f64 {
    let doy = f64::from(day_of_year);
    let theta = 0.216_310_8 + 2.0 * (0.967_139_6 * (0.0086 * (doy - 186.0)).tan()).atan();
    let declination = (0.397_95 * theta.cos()).asin();
    let lat = latitude.to_radians();
    let p = 0.8333_f64.to_radians();
    let arg = (p.sin() + lat.sin() * declination.sin()) / (lat.cos() * declination.cos());
    24.0 - 24.0 / std::f64::consts::PI * arg.clamp(-1.0, 1.0).acos()
}

/// Single-day GSI
///
/// - minimum temperature: 0 at -2 °C, 1 at 5 °C
/// - vapour pressure deficit: 1 at 900 Pa, 0 at 4100 Pa
/// - photoperiod: 0 at 10 h, 1 at 11 h
pub fn daily_gsi(
    min_temp: Fahrenheit,
    max_temp: Fahrenheit,
    min_rh: Percent,
    latitude: f64,
    day_of_year: u32,
) -> f64 {
    let i_tmin = ramp(*min_temp.to_celsius(), -2.0, 5.0);
    let vpd = saturation_vapour_pressure(max_temp.to_celsius()) * (1.0 - min_rh.min(100.0) / 100.0);
    let i_vpd = ramp(vpd, 4100.0, 900.0);
    let i_photo = ramp(daylength_hours(latitude, day_of_year), 10.0, 11.0);
    i_tmin * i_vpd * i_photo
}

/// Running GSI and the live fuel moistures it implies
#[derive(Debug, Clone, PartialEq)]
pub struct GrowingSeasonIndex {
    window: VecDeque<f64>,
}

impl Default for GrowingSeasonIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl GrowingSeasonIndex {
    pub fn new() -> Self {
        Self {
            window: VecDeque::with_capacity(GSI_WINDOW_DAYS),
        }
    }

    /// Push one day's GSI into the window
    pub fn push_day(&mut self, daily: f64) {
        if self.window.len() == GSI_WINDOW_DAYS {
            self.window.pop_front();
        }
        self.window.push_back(daily);
    }

    /// Window average, 0 before the first day
    pub fn value(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.window.iter().sum::<f64>() / self.window.len() as f64
    }

    /// Herbaceous moisture (%)
    pub fn herb_moisture(&self) -> f64 {
        scale_above_threshold(self.value(), HERB_MOISTURE_RANGE)
    }

    /// Woody moisture (%)
    pub fn wood_moisture(&self) -> f64 {
        scale_above_threshold(self.value(), WOOD_MOISTURE_RANGE)
    }
}

fn scale_above_threshold(gsi: f64, (cured, green): (f64, f64)) -> f64 {
    let greenness = ramp(gsi, GREENUP_THRESHOLD, 1.0);
    cured + (green - cured) * greenness
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_daylength_equinox_and_solstice() {
        // Near 12 h everywhere at the equinox
        let equinox = daylength_hours(45.0, 80);
        assert!((equinox - 12.0).abs() < 0.5, "Equinox daylength {equinox:.2}");

        let summer = daylength_hours(45.0, 172);
        let winter = daylength_hours(45.0, 355);
        assert!(summer > 15.0 && winter < 9.5, "summer={summer:.2} winter={winter:.2}");
    }

    #[test]
    fn test_polar_day_clamped() {
        let day = daylength_hours(80.0, 172);
        assert_relative_eq!(day, 24.0, epsilon = 1e-9);
    }

    #[test]
    fn test_daily_gsi_extremes() {
        let summer = daily_gsi(
            Fahrenheit::new(60.0),
            Fahrenheit::new(75.0),
            Percent::new(90.0),
            45.0,
            172,
        );
        assert_relative_eq!(summer, 1.0);

        let frozen = daily_gsi(
            Fahrenheit::new(20.0),
            Fahrenheit::new(40.0),
            Percent::new(60.0),
            45.0,
            172,
        );
        assert_eq!(frozen, 0.0);
    }

    #[test]
    fn test_window_average_and_live_moisture() {
        let mut gsi = GrowingSeasonIndex::new();
        assert_eq!(gsi.herb_moisture(), HERB_MOISTURE_RANGE.0);
        assert_eq!(gsi.wood_moisture(), WOOD_MOISTURE_RANGE.0);

        for _ in 0..GSI_WINDOW_DAYS {
            gsi.push_day(1.0);
        }
        assert_relative_eq!(gsi.herb_moisture(), 250.0);
        assert_relative_eq!(gsi.wood_moisture(), 200.0);

        // The oldest days roll out of the window
        for _ in 0..GSI_WINDOW_DAYS {
            gsi.push_day(0.75);
        }
        assert_relative_eq!(gsi.value(), 0.75);
        assert_relative_eq!(gsi.herb_moisture(), 140.0);
    }
}
