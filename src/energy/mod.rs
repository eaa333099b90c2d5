//! Heating and cooling energy of one batch.
//!
//! ```text
//! m      = V · 1.03                       (kg)
//! Q_heat = m · cp · (T_past − T_start) / 3600   (kWh)
//! Q_cool = m · cp · (T_past − T_ferm)  / 3600   (kWh)
//! ```

use std::ops::RangeInclusive;

use crate::domain::ProductProfile;
use crate::error::AppError;

/// Specific heat of milk, kJ/(kg·K).
pub const MILK_CP: f64 = 3.9;
/// Milk density relative to water.
pub const MILK_DENSITY: f64 = 1.03;

pub const VOLUME_RANGE: RangeInclusive<f64> = 100.0..=5000.0;
pub const INLET_RANGE: RangeInclusive<f64> = 4.0..=25.0;
pub const DEFAULT_VOLUME_L: f64 = 1000.0;
pub const DEFAULT_INLET_C: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyBalance {
    pub volume_l: f64,
    pub inlet_c: f64,
    pub mass_kg: f64,
    pub pasteurization_c: f64,
    pub cooled_c: f64,
    pub heating_kwh: f64,
    pub cooling_kwh: f64,
}

/// Energy balance of a batch of `volume_l` litres entering at `inlet_c`.
pub fn energy_balance(profile: &ProductProfile, volume_l: f64, inlet_c: f64) -> Result<EnergyBalance, AppError> {
    if !VOLUME_RANGE.contains(&volume_l) {
        return Err(AppError::new(
            2,
            format!(
                "Batch volume must be in [{}, {}] l (got {volume_l}).",
                VOLUME_RANGE.start(),
                VOLUME_RANGE.end()
            ),
        ));
    }
    if !INLET_RANGE.contains(&inlet_c) {
        return Err(AppError::new(
            2,
            format!(
                "Inlet temperature must be in [{}, {}] °C (got {inlet_c}).",
                INLET_RANGE.start(),
                INLET_RANGE.end()
            ),
        ));
    }

    let mass_kg = volume_l * MILK_DENSITY;
    let kwh = |delta: f64| mass_kg * MILK_CP * delta / 3600.0;

    Ok(EnergyBalance {
        volume_l,
        inlet_c,
        mass_kg,
        pasteurization_c: profile.pasteurization_c,
        cooled_c: profile.cooled_c,
        heating_kwh: kwh(profile.pasteurization_c - inlet_c),
        cooling_kwh: kwh(profile.pasteurization_c - profile.cooled_c),
    })
}
