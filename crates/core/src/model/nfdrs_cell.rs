//! NFDRS 2016 cell model
//!
//! Couples dead fuel moisture, the Keetch-Byram drought index, the growing
//! season index and the index calculation for one cell. Either daily submodel
//! can be switched off for the run; a disabled live-fuel submodel leaves
//! herbaceous and woody moisture at fixed values.

use super::{CellDaily, CellModel, CellOutput, CellWeather};
use crate::config::RunConfig;
use crate::core_types::units::{Fahrenheit, MilesPerHour};
use crate::core_types::FuelModelParams;
use crate::grid::CellSite;
use crate::physics::indexes::{calc_indexes, DangerIndexes, FuelMoistures};
use crate::physics::live_fuel_moisture::{FIXED_HERB_MOISTURE, FIXED_WOOD_MOISTURE};
use crate::physics::{daily_gsi, DeadFuelMoisture, GrowingSeasonIndex, KbdiState};

/// Run-wide switches shared by every cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelFlags {
    pub live_fuel_moisture: bool,
    pub drought: bool,
    pub initial_kbdi: f64,
}

impl From<&RunConfig> for ModelFlags {
    fn from(config: &RunConfig) -> Self {
        Self {
            live_fuel_moisture: config.live_fuel_moisture,
            drought: config.drought,
            initial_kbdi: config.initial_kbdi,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Nfdrs4Cell {
    site: CellSite,
    params: FuelModelParams,
    dead: DeadFuelMoisture,
    kbdi: Option<KbdiState>,
    gsi: Option<GrowingSeasonIndex>,
}

impl Nfdrs4Cell {
    pub fn new(site: CellSite, flags: ModelFlags) -> Self {
        Self {
            site,
            params: site.fuel_model.params(),
            dead: DeadFuelMoisture::default(),
            kbdi: flags.drought.then(|| KbdiState::new(flags.initial_kbdi)),
            gsi: flags.live_fuel_moisture.then(GrowingSeasonIndex::new),
        }
    }

    pub fn dead_fuel_moisture(&self) -> DeadFuelMoisture {
        self.dead
    }

    fn live_moistures(&self) -> (f64, f64) {
        match &self.gsi {
            Some(gsi) => (gsi.herb_moisture(), gsi.wood_moisture()),
            None => (FIXED_HERB_MOISTURE, FIXED_WOOD_MOISTURE),
        }
    }
}

impl CellModel for Nfdrs4Cell {
    fn apply_weather(&mut self, weather: &CellWeather, step_hours: f64) {
        self.dead.update(
            weather.temperature,
            weather.relative_humidity,
            weather.precipitation,
            weather.solar_radiation,
            step_hours,
        );
    }

    fn set_dead_fuel_moisture(&mut self, moisture: DeadFuelMoisture) {
        self.dead = moisture;
    }

    fn update_daily(&mut self, daily: &CellDaily, day_of_year: u32) {
        if let Some(kbdi) = &mut self.kbdi {
            kbdi.update(daily.precip_24h, daily.max_temp, daily.annual_avg_precip);
        }
        if let (Some(gsi), Some(min_temp), Some(min_rh)) =
            (&mut self.gsi, daily.min_temp, daily.min_rh)
        {
            gsi.push_day(daily_gsi(
                min_temp,
                daily.max_temp,
                min_rh,
                self.site.latitude,
                day_of_year,
            ));
        }
    }

    fn calc_indexes(&self, wind_speed: MilesPerHour, snow: bool) -> CellOutput {
        let (herb, wood) = self.live_moistures();
        let indexes = if snow {
            DangerIndexes::default()
        } else {
            calc_indexes(
                self.params,
                &FuelMoistures {
                    mc1: self.dead.mc1,
                    mc10: self.dead.mc10,
                    mc100: self.dead.mc100,
                    mc1000: self.dead.mc1000,
                    herb,
                    wood,
                },
                wind_speed,
                self.site.slope_class,
                Fahrenheit::new(self.dead.fuel_temp),
            )
        };
        CellOutput {
            kbdi: self.drought_index(),
            gsi: self.gsi.as_ref().map_or(0.0, GrowingSeasonIndex::value),
            herb_moisture: herb,
            wood_moisture: wood,
            indexes,
            dead: self.dead,
        }
    }

    fn drought_index(&self) -> f64 {
        self.kbdi.as_ref().map_or(0.0, KbdiState::value)
    }
}
