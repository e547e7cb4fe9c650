//! Actuator duty levels implied by the setpoints and exterior climate.
//!
//! Each channel is a simple proportional response above a threshold, expressed as a
//! whole-number percentage. These figures are for display; nothing feeds them back
//! into the chamber.

use mira_schemas::{
    actuator::ActuatorState,
    environment::{ExternalConditions, SetValues},
};

/// Exterior humidity above which the waterside economizer stays off.
const ECONOMIZER_MAX_EXTERNAL_RH: f64 = 80.0;

pub fn derive_actuator_state(set: &SetValues, external: &ExternalConditions) -> ActuatorState {
    let above = |value: f64, threshold: f64, gain: f64| {
        if value > threshold {
            ((value - threshold) * gain).min(100.0)
        } else {
            0.0
        }
    };

    let heat_pump = above(set.relative_humidity, 75.0, 4.0);
    let cooldown = above(set.temperature, 24.0, 10.0);
    let co2_valve = above(set.co2, 400.0, 1.0 / 16.0);
    let chiller = above(set.solution_temperature, 22.0, 20.0);
    let ec_pump = above(set.ec, 1.0, 25.0);

    let ph_error = (set.ph - 6.0).abs();
    let ph_pump = if ph_error > 0.1 {
        (ph_error * 50.0).min(100.0)
    } else {
        0.0
    };

    ActuatorState {
        heat_pump: heat_pump.round(),
        cooldown: cooldown.round(),
        waterside_economizer: economizer_level(set, external).round(),
        co2_valve: co2_valve.round(),
        chiller: chiller.round(),
        ec_pump: ec_pump.round(),
        ph_pump: ph_pump.round(),
        led_dimmer: (set.ppfd / 10.0).min(100.0).round(),
    }
}

/// Free cooling from outside air, only when the air outside is cooler and not too humid.
fn economizer_level(set: &SetValues, external: &ExternalConditions) -> f64 {
    let temperature_gap = set.temperature - external.temperature;
    if external.relative_humidity >= ECONOMIZER_MAX_EXTERNAL_RH {
        0.0
    } else if temperature_gap > 3.0 {
        (temperature_gap * 8.0).min(100.0)
    } else if temperature_gap > 1.0 {
        (temperature_gap * 5.0).min(50.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_values() -> SetValues {
        SetValues {
            temperature: 20.0,
            relative_humidity: 70.0,
            vpd: 0.7,
            co2: 450.0,
            ppfd: 200.0,
            airflow_velocity: 1.2,
            solution_temperature: 18.0,
            ec: 1.2,
            ph: 6.0,
            stomata_openings: 60.0,
            photosynthesis_rate: 12.0,
        }
    }

    fn mild() -> ExternalConditions {
        ExternalConditions {
            temperature: 19.5,
            relative_humidity: 60.0,
        }
    }

    #[test]
    fn test_typical_lettuce_setpoints() {
        let state = derive_actuator_state(&set_values(), &mild());
        assert_eq!(state.heat_pump, 0.0);
        assert_eq!(state.cooldown, 0.0);
        assert_eq!(state.waterside_economizer, 0.0);
        assert_eq!(state.co2_valve, 3.0);
        assert_eq!(state.chiller, 0.0);
        assert_eq!(state.ec_pump, 5.0);
        assert_eq!(state.ph_pump, 0.0);
        assert_eq!(state.led_dimmer, 20.0);
    }

    #[test]
    fn test_channels_saturate_at_full_duty() {
        let set = SetValues {
            temperature: 30.0,
            relative_humidity: 95.0,
            co2: 2000.0,
            ppfd: 1000.0,
            solution_temperature: 30.0,
            ec: 5.0,
            ph: 4.0,
            ..set_values()
        };
        let cold_dry = ExternalConditions {
            temperature: 5.0,
            relative_humidity: 40.0,
        };
        let state = derive_actuator_state(&set, &cold_dry);
        assert_eq!(state.heat_pump, 80.0);
        assert_eq!(state.cooldown, 60.0);
        assert_eq!(state.waterside_economizer, 100.0);
        assert_eq!(state.co2_valve, 100.0);
        assert_eq!(state.chiller, 100.0);
        assert_eq!(state.ec_pump, 100.0);
        assert_eq!(state.ph_pump, 100.0);
        assert_eq!(state.led_dimmer, 100.0);
    }

    #[test]
    fn test_economizer_needs_dry_cool_air() {
        let set = SetValues {
            temperature: 22.0,
            ..set_values()
        };
        let humid = ExternalConditions {
            temperature: 10.0,
            relative_humidity: 85.0,
        };
        assert_eq!(derive_actuator_state(&set, &humid).waterside_economizer, 0.0);

        let slightly_cooler = ExternalConditions {
            temperature: 20.0,
            relative_humidity: 50.0,
        };
        assert_eq!(
            derive_actuator_state(&set, &slightly_cooler).waterside_economizer,
            10.0
        );

        let warmer = ExternalConditions {
            temperature: 25.0,
            relative_humidity: 50.0,
        };
        assert_eq!(derive_actuator_state(&set, &warmer).waterside_economizer, 0.0);
    }
}
