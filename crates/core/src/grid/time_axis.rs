//! Fine and coarse time axes and the mapping between them
//!
//! A run carries a fine axis of `T` steps (sub-daily weather and dead fuel
//! moisture) and a coarse axis of `D` days (24-hour precipitation, daily
//! extremes). Fine step `t` belongs to day `t / R` with `R = T / D`.
//!
//! The ratio is resolved once, before any per-cell model exists, and a ratio that
//! does not divide `T` exactly is rejected rather than truncated.

use crate::config::CouplingRatio;
use crate::error::GridError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Calendar stamp of one fine step
///
/// `hour` is the local hour-of-day, `None` when the input value was missing or
/// not an integral hour in `0..24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: Option<u8>,
}

impl StepTime {
    /// Create a stamp with a known hour
    #[must_use]
    pub const fn new(year: i32, month: u32, day: u32, hour: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour: Some(hour),
        }
    }

    /// Build from the floating-point values a gridded store holds
    ///
    /// Non-finite or fractional components are treated as missing: the date
    /// becomes invalid (caught by the calendar check) and the hour becomes `None`.
    pub fn from_raw(year: f64, month: f64, day: f64, hour: f64) -> Self {
        let whole = |v: f64| v.is_finite() && v.fract() == 0.0;
        let hour = (whole(hour) && (0.0..24.0).contains(&hour)).then(|| hour as u8);
        Self {
            year: if whole(year) { year as i32 } else { 0 },
            month: if whole(month) && month > 0.0 { month as u32 } else { 0 },
            day: if whole(day) && day > 0.0 { day as u32 } else { 0 },
            hour,
        }
    }

    /// Calendar date, `None` if the components do not form one
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    /// Day of year (1-366), `None` for an invalid date
    pub fn day_of_year(&self) -> Option<u32> {
        self.date().map(|d| d.ordinal())
    }
}

/// Resolved fine/coarse coupling for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalCoupling {
    fine_steps: usize,
    days: usize,
    steps_per_day: usize,
}

impl TemporalCoupling {
    /// Resolve the ratio between a fine axis and a coarse axis of `days` days
    ///
    /// # Errors
    /// `Configuration` when either axis is empty, when `R` does not divide the
    /// fine length exactly, when `T / R` disagrees with `days`, or (with
    /// `check_calendar`) when a day's fine steps do not share one valid date.
    pub fn resolve(
        policy: CouplingRatio,
        time_axis: &[StepTime],
        days: usize,
        check_calendar: bool,
    ) -> Result<Self, GridError> {
        let fine_steps = time_axis.len();
        if fine_steps == 0 {
            return Err(GridError::config("fine time axis is empty"));
        }
        if days == 0 {
            return Err(GridError::config("daily time axis is empty"));
        }

        let steps_per_day = match policy {
            CouplingRatio::Derived => {
                if fine_steps % days != 0 {
                    return Err(GridError::config(format!(
                        "fine axis length {fine_steps} is not a whole multiple of daily axis length {days}"
                    )));
                }
                fine_steps / days
            }
            CouplingRatio::Fixed { steps_per_day } => {
                if steps_per_day == 0 || fine_steps % steps_per_day != 0 {
                    return Err(GridError::config(format!(
                        "fine axis length {fine_steps} is not divisible by {steps_per_day} steps per day"
                    )));
                }
                if fine_steps / steps_per_day != days {
                    return Err(GridError::config(format!(
                        "fine axis covers {} days at {} steps per day but daily axis has {} days",
                        fine_steps / steps_per_day,
                        steps_per_day,
                        days
                    )));
                }
                steps_per_day
            }
        };

        let coupling = Self {
            fine_steps,
            days,
            steps_per_day,
        };
        if check_calendar {
            coupling.check_calendar(time_axis)?;
        }

        info!(
            "Temporal coupling resolved: T={}, D={}, R={} ({:.1} h per step)",
            fine_steps,
            days,
            steps_per_day,
            coupling.step_hours()
        );
        Ok(coupling)
    }

    fn check_calendar(&self, time_axis: &[StepTime]) -> Result<(), GridError> {
        let mut previous: Option<NaiveDate> = None;
        for day in 0..self.days {
            let first_step = day * self.steps_per_day;
            let date = time_axis[first_step].date().ok_or_else(|| {
                GridError::config(format!(
                    "fine step {first_step} has an invalid date {:?}",
                    time_axis[first_step]
                ))
            })?;
            if previous.is_some_and(|p| date <= p) {
                return Err(GridError::config(format!(
                    "day {day} starts on {date}, not after the previous day"
                )));
            }
            for t in first_step + 1..first_step + self.steps_per_day {
                if time_axis[t].date() != Some(date) {
                    return Err(GridError::config(format!(
                        "fine step {t} ({:?}) does not fall on {date}, the date of day {day}",
                        time_axis[t]
                    )));
                }
            }
            previous = Some(date);
        }
        Ok(())
    }

    /// Coarse (day) index of fine step `t`
    #[inline]
    pub fn day(&self, t: usize) -> usize {
        t / self.steps_per_day
    }

    /// True on the final fine step of a day
    #[inline]
    pub fn is_last_step_of_day(&self, t: usize) -> bool {
        (t + 1) % self.steps_per_day == 0
    }

    /// Fine axis length `T`
    pub fn fine_steps(&self) -> usize {
        self.fine_steps
    }

    /// Coarse axis length `D`
    pub fn days(&self) -> usize {
        self.days
    }

    /// Fine steps per day `R`
    pub fn steps_per_day(&self) -> usize {
        self.steps_per_day
    }

    /// Duration of one fine step in hours
    pub fn step_hours(&self) -> f64 {
        24.0 / self.steps_per_day as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn six_hourly(days: u32) -> Vec<StepTime> {
        (1..=days)
            .flat_map(|d| [0, 6, 12, 18].map(|h| StepTime::new(2024, 7, d, h)))
            .collect()
    }

    #[test]
    fn test_derived_ratio() {
        let axis = six_hourly(3);
        let coupling = TemporalCoupling::resolve(CouplingRatio::Derived, &axis, 3, true).unwrap();
        assert_eq!(coupling.steps_per_day(), 4);
        assert_eq!(coupling.step_hours(), 6.0);
    }

    #[test]
    fn test_day_mapping_is_monotone_and_complete() {
        let axis = six_hourly(5);
        let coupling = TemporalCoupling::resolve(CouplingRatio::Derived, &axis, 5, true).unwrap();

        let days: Vec<usize> = (0..coupling.fine_steps()).map(|t| coupling.day(t)).collect();
        assert!(days.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(days[0], 0);
        assert_eq!(*days.last().unwrap(), coupling.days() - 1);
        for d in 0..coupling.days() {
            assert_eq!(days.iter().filter(|&&x| x == d).count(), 4);
        }
    }

    #[test]
    fn test_fixed_ratio_must_divide() {
        let axis: Vec<StepTime> = (0..10).map(|h| StepTime::new(2024, 7, 1, h)).collect();
        let err = TemporalCoupling::resolve(
            CouplingRatio::Fixed { steps_per_day: 4 },
            &axis,
            2,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, GridError::Configuration(_)));
    }

    #[test]
    fn test_fixed_ratio_must_match_daily_axis() {
        let axis = six_hourly(2);
        let err = TemporalCoupling::resolve(
            CouplingRatio::Fixed { steps_per_day: 4 },
            &axis,
            3,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, GridError::Configuration(_)));
    }

    #[test]
    fn test_calendar_mismatch_rejected() {
        let mut axis = six_hourly(2);
        // Second day's first step stamped with the first day's date
        axis[5] = StepTime::new(2024, 7, 1, 6);
        let result = TemporalCoupling::resolve(CouplingRatio::Derived, &axis, 2, true);
        assert!(result.is_err());

        // Same axis passes when the calendar check is off
        let relaxed = TemporalCoupling::resolve(CouplingRatio::Derived, &axis, 2, false);
        assert!(relaxed.is_ok());
    }

    #[test]
    fn test_raw_hour_parsing() {
        assert_eq!(StepTime::from_raw(2024.0, 7.0, 1.0, 13.0).hour, Some(13));
        assert_eq!(StepTime::from_raw(2024.0, 7.0, 1.0, f64::NAN).hour, None);
        assert_eq!(StepTime::from_raw(2024.0, 7.0, 1.0, 13.5).hour, None);
        assert_eq!(StepTime::from_raw(2024.0, 7.0, 1.0, -9999.0).hour, None);
        assert_eq!(StepTime::from_raw(2024.0, 7.0, 1.0, 24.0).hour, None);
    }

    #[test]
    fn test_day_of_year() {
        assert_eq!(StepTime::new(2024, 3, 1, 0).day_of_year(), Some(61));
        assert_eq!(StepTime::new(2023, 2, 30, 0).day_of_year(), None);
    }
}
