//! NFDRS Fire-Danger Indexes (Rothermel two-category fuel bed)
//!
//! Computes the spread component, energy release component, burning index and
//! ignition component for one cell from its fuel-model class and current
//! moistures.
//!
//! The fuel bed is split into a dead category (1/10/100-hour, weighted by surface
//! area) and a live category (herbaceous, woody). Cured herbaceous fuel is
//! transferred to the 1-hour class before anything else is computed.
//!
//! # References
//! - Rothermel, R.C. (1972). "A mathematical model for predicting fire spread in
//!   wildland fuels." USDA Forest Service Research Paper INT-115.
//! - Deeming, J.E., Burgan, R.E., Cohen, J.D. (1977). "The National Fire-Danger
//!   Rating System - 1978". USDA Forest Service GTR INT-39.
//! - Cohen, J.D., Deeming, J.E. (1985). "The National Fire-Danger Rating System:
//!   basic equations". USDA Forest Service GTR PSW-82.

use crate::core_types::units::{Fahrenheit, MilesPerHour};
use crate::core_types::{FuelModelParams, SlopeClass};

/// Oven-dry particle density (lb/ft³)
const PARTICLE_DENSITY: f64 = 32.0;
/// Total mineral content
const TOTAL_MINERAL: f64 = 0.0555;
/// Mineral damping from an effective mineral content of 0.01: 0.174 × 0.01^-0.19
const MINERAL_DAMPING: f64 = 0.174 * 2.398_833;

/// Ignition component probability normalisers
const PNORM1: f64 = 0.00232;
const PNORM2: f64 = 0.99767;
const PNORM3: f64 = 0.0000185;

/// Moistures feeding the index calculation, all in percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelMoistures {
    pub mc1: f64,
    pub mc10: f64,
    pub mc100: f64,
    pub mc1000: f64,
    pub herb: f64,
    pub wood: f64,
}

/// Spread, energy release, burning and ignition components
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DangerIndexes {
    /// Spread component (ft/min)
    pub sc: f64,
    /// Energy release component (Btu/ft²)
    pub erc: f64,
    /// Burning index
    pub bi: f64,
    /// Ignition component (0-100)
    pub ic: f64,
}

/// Moisture damping coefficient (η_M)
///
/// ```text
/// η_M = 1 - 2.59 r + 5.11 r² - 3.52 r³,  r = M_f / M_x
/// ```
fn moisture_damping(moisture: f64, extinction: f64) -> f64 {
    if extinction <= 0.0 {
        return 0.0;
    }
    let ratio = (moisture / extinction).min(1.0);
    (1.0 - 2.59 * ratio + 5.11 * ratio.powi(2) - 3.52 * ratio.powi(3)).clamp(0.0, 1.0)
}

/// Weights of a category's members, zero when the category is empty
fn fractions<const N: usize>(values: [f64; N]) -> [f64; N] {
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return [0.0; N];
    }
    values.map(|v| v / total)
}

fn dot<const N: usize>(a: [f64; N], b: [f64; N]) -> f64 {
    a.iter().zip(&b).map(|(x, y)| x * y).sum()
}

/// Optimum reaction velocity scaled by the packing ratio (Γ')
fn reaction_velocity(sigma: f64, beta: f64) -> f64 {
    if sigma <= 0.0 {
        return 0.0;
    }
    let sigma_15 = sigma.powf(1.5);
    let gamma_max = sigma_15 / (495.0 + 0.0594 * sigma_15);
    let beta_op = 3.348 * sigma.powf(-0.8189);
    let a = 133.0 * sigma.powf(-0.7913);
    let ratio = beta / beta_op;
    gamma_max * ratio.powf(a) * (a * (1.0 - ratio)).exp()
}

/// Fuel bed after herbaceous curing transfer, loadings in lb/ft²
struct FuelBed {
    params: FuelModelParams,
    dead: [f64; 4],
    herb: f64,
    wood: f64,
}

impl FuelBed {
    fn new(params: FuelModelParams, herb_moisture: f64) -> Self {
        let cured = if herb_moisture < 120.0 {
            (1.33 - 0.0111 * herb_moisture).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mut dead = params.dead_loading.map(FuelModelParams::loading_lb_ft2);
        let herb_total = FuelModelParams::loading_lb_ft2(params.herb_loading);
        dead[0] += cured * herb_total;
        Self {
            params,
            dead,
            herb: (1.0 - cured) * herb_total,
            wood: FuelModelParams::loading_lb_ft2(params.wood_loading),
        }
    }

    /// Live fuel moisture of extinction (%)
    fn live_extinction(&self, m: &FuelMoistures) -> f64 {
        let p = &self.params;
        let dead_fine = [0, 1, 2].map(|k| self.dead[k] * (-138.0 / p.dead_sav[k]).exp());
        let live_fine =
            self.herb * (-500.0 / p.herb_sav).exp() + self.wood * (-500.0 / p.wood_sav).exp();
        let dead_fine_total: f64 = dead_fine.iter().sum();
        if live_fine <= 0.0 || dead_fine_total <= 0.0 {
            return p.dead_extinction;
        }
        let fine_moisture = dot(dead_fine, [m.mc1, m.mc10, m.mc100]) / dead_fine_total;
        let ratio = dead_fine_total / live_fine;
        ((2.9 * ratio * (1.0 - fine_moisture / p.dead_extinction) - 0.226) * 100.0)
            .max(p.dead_extinction)
    }
}

/// Compute SC, ERC, BI and IC
///
/// `fuel_temp` is the fuel-surface temperature used by the ignition component.
pub fn calc_indexes(
    params: FuelModelParams,
    moistures: &FuelMoistures,
    wind_speed: MilesPerHour,
    slope: SlopeClass,
    fuel_temp: Fahrenheit,
) -> DangerIndexes {
    let bed = FuelBed::new(params, moistures.herb);
    let p = &bed.params;
    let mxd = p.dead_extinction;
    let mxl = bed.live_extinction(moistures);

    // Spread: 1/10/100-hour dead and both live classes, weighted by surface area
    let dead3 = [bed.dead[0], bed.dead[1], bed.dead[2]];
    let sav3 = [p.dead_sav[0], p.dead_sav[1], p.dead_sav[2]];
    let dead_area = [0, 1, 2].map(|k| dead3[k] / PARTICLE_DENSITY * sav3[k]);
    let live_area = [
        bed.herb / PARTICLE_DENSITY * p.herb_sav,
        bed.wood / PARTICLE_DENSITY * p.wood_sav,
    ];
    let f_dead = fractions(dead_area);
    let f_live = fractions(live_area);
    let [f_dead_cat, f_live_cat] = fractions([dead_area.iter().sum::<f64>(), live_area.iter().sum::<f64>()]);

    let sigma_dead = dot(f_dead, sav3);
    let sigma_live = dot(f_live, [p.herb_sav, p.wood_sav]);
    let sigma = f_dead_cat * sigma_dead + f_live_cat * sigma_live;

    let dead_net = dot(f_dead, dead3) * (1.0 - TOTAL_MINERAL);
    let live_net = dot(f_live, [bed.herb, bed.wood]) * (1.0 - TOTAL_MINERAL);
    let total_load: f64 = dead3.iter().sum::<f64>() + bed.herb + bed.wood;
    let beta = total_load / (p.depth * PARTICLE_DENSITY);

    let dead_moisture = dot(f_dead, [moistures.mc1, moistures.mc10, moistures.mc100]);
    let live_moisture = dot(f_live, [moistures.herb, moistures.wood]);
    let eta_dead = moisture_damping(dead_moisture, mxd);
    let eta_live = moisture_damping(live_moisture, mxl);

    let gamma = reaction_velocity(sigma, beta);
    let heat = p.heat_content * MINERAL_DAMPING;
    let reaction_intensity = gamma * heat * (dead_net * eta_dead + live_net * eta_live);

    let zeta = if sigma > 0.0 {
        ((0.792 + 0.681 * sigma.sqrt()) * (beta + 0.1)).exp() / (192.0 + 0.2595 * sigma)
    } else {
        0.0
    };

    // Wind: 20-ft speed reduced to midflame, capped at 0.9 × I_R
    let beta_op = 3.348 * sigma.powf(-0.8189);
    let b = 0.02526 * sigma.powf(0.54);
    let c = 7.47 * (-0.133 * sigma.powf(0.55)).exp();
    let e = 0.715 * (-3.59e-4 * sigma).exp();
    let u_fact = c * (beta / beta_op).powf(-e);
    let midflame = (wind_speed.to_feet_per_minute() * p.wind_factor).min(0.9 * reaction_intensity);
    let phi_wind = u_fact * midflame.powf(b);
    let phi_slope = slope.factor() * beta.powf(-0.3);

    let heat_sink_of = |sav: f64, mc: f64| (-138.0 / sav).exp() * (250.0 + 11.16 * mc);
    let bulk_density = total_load / p.depth;
    let heat_sink = bulk_density
        * (f_dead_cat
            * dot(
                f_dead,
                [
                    heat_sink_of(sav3[0], moistures.mc1),
                    heat_sink_of(sav3[1], moistures.mc10),
                    heat_sink_of(sav3[2], moistures.mc100),
                ],
            )
            + f_live_cat
                * dot(
                    f_live,
                    [
                        heat_sink_of(p.herb_sav, moistures.herb),
                        heat_sink_of(p.wood_sav, moistures.wood),
                    ],
                ));

    let sc = if heat_sink > 0.0 {
        (reaction_intensity * zeta * (1.0 + phi_slope + phi_wind) / heat_sink).max(0.0)
    } else {
        0.0
    };

    let erc = energy_release(&bed, moistures, mxl, beta);
    let bi = 3.01 * (sc * erc).powf(0.46);
    let ic = ignition_component(moistures.mc1, fuel_temp, sc, p.scm);

    DangerIndexes { sc, erc, bi, ic }
}

/// Energy release component: all four dead classes, weighted by loading
///
/// ```text
/// ERC = 0.04 × I_R × τ,  τ = 384 / σ
/// ```
fn energy_release(bed: &FuelBed, m: &FuelMoistures, mxl: f64, beta: f64) -> f64 {
    let p = &bed.params;
    let f_dead = fractions(bed.dead);
    let f_live = fractions([bed.herb, bed.wood]);
    let dead_total: f64 = bed.dead.iter().sum();
    let live_total = bed.herb + bed.wood;
    let [f_dead_cat, f_live_cat] = fractions([dead_total, live_total]);

    let sigma = f_dead_cat * dot(f_dead, p.dead_sav)
        + f_live_cat * dot(f_live, [p.herb_sav, p.wood_sav]);
    if sigma <= 0.0 {
        return 0.0;
    }

    let dead_moisture = dot(f_dead, [m.mc1, m.mc10, m.mc100, m.mc1000]);
    let eta_dead = moisture_damping(dead_moisture, p.dead_extinction);
    let eta_live = moisture_damping(dot(f_live, [m.herb, m.wood]), mxl);
    let heat = p.heat_content * MINERAL_DAMPING;
    let reaction_intensity = reaction_velocity(sigma, beta)
        * heat
        * (f_dead_cat * dead_total * (1.0 - TOTAL_MINERAL) * eta_dead
            + f_live_cat * live_total * (1.0 - TOTAL_MINERAL) * eta_live);

    let residence_time = 384.0 / sigma;
    0.04 * reaction_intensity * residence_time
}

/// Ignition component (0-100)
///
/// Probability of ignition from the heat of ignition of 1-hour fuel at the
/// fuel-surface temperature, scaled by the normalised spread component.
fn ignition_component(mc1: f64, fuel_temp: Fahrenheit, sc: f64, scm: f64) -> f64 {
    let t = *fuel_temp.to_celsius();
    let q_ign = 144.5 - 0.266 * t - 0.00058 * t * t - 0.01 * t * mc1
        + 18.54 * (1.0 - (-0.151 * mc1).exp())
        + 6.4 * mc1;
    if q_ign >= 344.0 || scm <= 0.0 {
        return 0.0;
    }
    let chi = (344.0 - q_ign) / 10.0;
    let raw = chi.powf(3.6) * PNORM3;
    if raw <= PNORM1 {
        return 0.0;
    }
    let p_ign = ((raw - PNORM1) * 100.0 / PNORM2).clamp(0.0, 100.0);
    let spread = (100.0 * sc / scm).clamp(0.0, 100.0);
    (0.10 * p_ign * spread.sqrt()).clamp(0.0, 100.0)
}
