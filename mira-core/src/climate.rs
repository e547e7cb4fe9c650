//! Exterior climate around the chamber: a temperate coastal year with a seasonal
//! sinusoid and a day/night swing.

use mira_schemas::environment::ExternalConditions;
use rand::Rng;
use std::f64::consts::PI;

const TEMPERATURE_JITTER: f64 = 2.0;
const HUMIDITY_JITTER: f64 = 5.0;
const MIN_HUMIDITY: f64 = 45.0;
const MAX_HUMIDITY: f64 = 85.0;

fn day_of_year(day: u32) -> u32 {
    (day % 365) + 1
}

fn seasonal_phase(day: u32) -> f64 {
    (day_of_year(day) as f64 - 81.0) * (2.0 * PI / 365.0)
}

/// Ambient temperature and humidity for a simulated day and hour.
///
/// With `add_variation == false` the result depends only on `(day, hour)` and
/// `rng` is not touched. With variation, uniform jitter of ±1 °C and ±2.5 % RH is
/// added before humidity is clamped to 45-85 %.
pub fn generate_climate<R: Rng + ?Sized>(
    day: u32,
    hour: u32,
    add_variation: bool,
    rng: &mut R,
) -> ExternalConditions {
    let phase = seasonal_phase(day);
    let seasonal_temp = 15.0 + 9.0 * phase.sin();
    let seasonal_humidity = 70.0 - 5.0 * phase.sin();

    // Daytime runs 06:00-20:00 outside; afternoon warmth peaks mid-window.
    let is_daytime = (6..20).contains(&hour);
    let day_progress = if is_daytime {
        (hour as f64 - 6.0) / 14.0
    } else {
        0.0
    };

    let temp_swing = if is_daytime {
        (day_progress * PI).sin() * 4.0
    } else {
        -4.0
    };
    let humidity_swing = if is_daytime {
        -8.0 + (day_progress * PI).sin() * 3.0
    } else {
        10.0
    };

    let (temp_jitter, humidity_jitter) = if add_variation {
        (
            (rng.gen::<f64>() - 0.5) * TEMPERATURE_JITTER,
            (rng.gen::<f64>() - 0.5) * HUMIDITY_JITTER,
        )
    } else {
        (0.0, 0.0)
    };

    ExternalConditions {
        temperature: seasonal_temp + temp_swing + temp_jitter,
        relative_humidity: (seasonal_humidity + humidity_swing + humidity_jitter)
            .clamp(MIN_HUMIDITY, MAX_HUMIDITY),
    }
}
