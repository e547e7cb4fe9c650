//! Vapour pressure deficit.

use mira_schemas::{crop::StageTargets, environment::SetValues};

/// Saturated vapour pressure in kPa (Magnus formula).
pub fn saturated_vapor_pressure(temperature_c: f64) -> f64 {
    0.61094 * ((17.625 * temperature_c) / (temperature_c + 243.04)).exp()
}

/// Vapour pressure deficit in kPa for a temperature (°C) and relative humidity (%).
///
/// Inputs are not validated; the result is only clamped to be non-negative.
pub fn calculate_vpd(temperature_c: f64, relative_humidity_pct: f64) -> f64 {
    let vpd = (1.0 - relative_humidity_pct / 100.0) * saturated_vapor_pressure(temperature_c);
    vpd.max(0.0)
}

/// VPD a stage aims for: its explicit target, or the deficit implied by its
/// temperature and humidity targets.
pub fn stage_vpd_target(targets: &StageTargets) -> Option<f64> {
    targets.vpd.or_else(|| {
        match (targets.temperature, targets.relative_humidity) {
            (Some(t), Some(rh)) => Some(calculate_vpd(t, rh)),
            _ => None,
        }
    })
}

/// Recomputes the derived VPD setpoint after temperature or humidity changed.
pub fn refresh_vpd(set: &mut SetValues) {
    set.vpd = calculate_vpd(set.temperature, set.relative_humidity);
}
