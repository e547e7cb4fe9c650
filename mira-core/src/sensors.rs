//! Synthetic sensor readings for the chamber.
//!
//! The generator is fed the current setpoints, plant stage, exterior climate and
//! simulated time, and produces one noisy reading per call. A slow drift term shared
//! by every channel makes consecutive readings move together instead of looking like
//! independent white noise.

use crate::vpd::{calculate_vpd, stage_vpd_target};
use mira_schemas::{
    crop::{OptimalRanges, StageTargets},
    environment::{ExternalConditions, SensorData, SetValues},
    plant::{PlantStage, SimulationTime},
};
use rand::Rng;
use std::f64::consts::PI;

const TIME_STEP: f64 = 0.1;

pub struct SyntheticSensorGenerator {
    set_values: SetValues,
    plant_stage: PlantStage,
    optimal_ranges: OptimalRanges,
    external: ExternalConditions,
    time: SimulationTime,
    accumulator: f64,
}

impl SyntheticSensorGenerator {
    pub fn new(
        set_values: SetValues,
        plant_stage: PlantStage,
        optimal_ranges: OptimalRanges,
        external: ExternalConditions,
        time: SimulationTime,
    ) -> Self {
        Self {
            set_values,
            plant_stage,
            optimal_ranges,
            external,
            time,
            accumulator: 0.0,
        }
    }

    pub fn update_simulation_time(&mut self, time: SimulationTime) {
        self.time = time;
    }

    pub fn update_set_values(&mut self, set_values: SetValues) {
        self.set_values = set_values;
    }

    pub fn update_plant_stage(&mut self, stage: PlantStage) {
        self.plant_stage = stage;
    }

    pub fn update_external_conditions(&mut self, external: ExternalConditions) {
        self.external = external;
    }

    pub fn set_values(&self) -> &SetValues {
        &self.set_values
    }

    pub fn plant_stage(&self) -> PlantStage {
        self.plant_stage
    }

    pub fn external_conditions(&self) -> ExternalConditions {
        self.external
    }

    pub fn generate_sensor_data<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SensorData {
        self.accumulator += TIME_STEP;
        let drift = (self.accumulator * 0.01).sin() * 0.05;

        let set = self.set_values;
        let optimal = self.optimal_ranges.for_stage(self.plant_stage.stage);

        let is_daytime = self.time.is_daytime();
        let day_progress = if is_daytime {
            (self.time.hour as f64 - 6.0) / 14.0
        } else {
            0.0
        };
        let (temp_offset, humidity_offset) = if is_daytime {
            let swing = (day_progress * PI).sin();
            (swing * 1.5, -6.0 + swing * 2.0)
        } else {
            (-2.5, 9.0)
        };

        // Lamps cannot run at night.
        let ppfd = if is_daytime {
            (set.ppfd + jitter(rng, 1.0)).max(0.0)
        } else {
            0.0
        };

        let mut variation =
            |value: f64, variance: f64| -> f64 { value + jitter(rng, variance) + drift };

        let temperature = variation(set.temperature + temp_offset, 1.5);
        let relative_humidity =
            variation(set.relative_humidity + humidity_offset, 5.0).clamp(30.0, 95.0);
        let vpd = calculate_vpd(temperature, relative_humidity);

        let co2 = variation(set.co2, 50.0).max(300.0);
        let airflow_velocity = variation(set.airflow_velocity, 0.2);
        let solution_temperature = variation(set.solution_temperature, 1.0);
        let ec = variation(set.ec, 0.2).max(0.1);
        let ph = variation(set.ph, 0.2).clamp(4.0, 8.0);
        let stomata_openings =
            variation(stomata_opening_score(&set, optimal), 10.0).clamp(0.0, 100.0);
        let photosynthesis_rate =
            variation(photosynthesis_score(&set, optimal), 2.0).max(0.0);

        SensorData {
            temperature,
            relative_humidity,
            vpd,
            co2,
            ppfd,
            airflow_velocity,
            solution_temperature,
            ec,
            ph,
            stomata_openings,
            photosynthesis_rate,
        }
    }
}

/// Uniform noise in `[-variance / 2, variance / 2)`.
fn jitter<R: Rng + ?Sized>(rng: &mut R, variance: f64) -> f64 {
    (rng.gen::<f64>() - 0.5) * variance
}

/// A target of zero awards no bonus.
fn nonzero(target: Option<f64>) -> Option<f64> {
    target.filter(|v| *v != 0.0)
}

/// Stomatal opening (%) the setpoints should produce: driven by VPD, humidity and light.
pub fn stomata_opening_score(set: &SetValues, optimal: &StageTargets) -> f64 {
    let mut base: f64 = 60.0;
    if let Some(vpd) = nonzero(stage_vpd_target(optimal)) {
        if (set.vpd - vpd).abs() < 0.2 {
            base += 20.0;
        }
    }
    if let Some(rh) = nonzero(optimal.relative_humidity) {
        if (set.relative_humidity - rh).abs() < 10.0 {
            base += 10.0;
        }
    }
    if let Some(ppfd) = nonzero(optimal.ppfd) {
        if set.ppfd > ppfd * 0.8 {
            base += 10.0;
        }
    }
    base.min(100.0)
}

/// Photosynthesis rate the setpoints should produce: driven by CO₂, light and temperature.
pub fn photosynthesis_score(set: &SetValues, optimal: &StageTargets) -> f64 {
    let mut rate = 10.0;
    if let Some(co2) = nonzero(optimal.co2) {
        if set.co2 > co2 * 0.9 {
            rate += 5.0;
        }
    }
    if let Some(ppfd) = nonzero(optimal.ppfd) {
        if set.ppfd > ppfd * 0.8 {
            rate += 8.0;
        }
    }
    if let Some(t) = nonzero(optimal.temperature) {
        if (set.temperature - t).abs() < 2.0 {
            rate += 5.0;
        }
    }
    rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CropCatalog;
    use crate::vpd::refresh_vpd;
    use mira_schemas::plant::GrowthStage;
    use rand::{rngs::StdRng, SeedableRng};

    fn generator_at(hour: u32, stage: GrowthStage) -> SyntheticSensorGenerator {
        let crop = CropCatalog::builtin().get("lettuce").unwrap().clone();
        let mut set = crop.initial_set_values;
        crop.optimal_ranges.for_stage(stage).merge_into(&mut set);
        refresh_vpd(&mut set);
        SyntheticSensorGenerator::new(
            set,
            PlantStage { stage, day: 5 },
            crop.optimal_ranges,
            ExternalConditions {
                temperature: 15.0,
                relative_humidity: 60.0,
            },
            SimulationTime {
                day: 5,
                hour,
                minute: 0,
                cycle_day: 5,
            },
        )
    }

    #[test]
    fn test_ppfd_is_zero_at_night() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut generator = generator_at(22, GrowthStage::Vegetative);
        let mut set = *generator.set_values();
        set.ppfd = 900.0;
        generator.update_set_values(set);
        for _ in 0..200 {
            assert_eq!(generator.generate_sensor_data(&mut rng).ppfd, 0.0);
        }
    }

    #[test]
    fn test_ppfd_tracks_setpoint_by_day() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut generator = generator_at(12, GrowthStage::Vegetative);
        for _ in 0..100 {
            let reading = generator.generate_sensor_data(&mut rng);
            assert!((reading.ppfd - 200.0).abs() <= 0.5);
        }
    }

    #[test]
    fn test_readings_respect_clamps() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut generator = generator_at(3, GrowthStage::Germination);
        let mut set = *generator.set_values();
        set.relative_humidity = 99.0;
        set.co2 = 250.0;
        set.ec = 0.0;
        set.ph = 8.5;
        generator.update_set_values(set);
        for _ in 0..500 {
            let r = generator.generate_sensor_data(&mut rng);
            assert!((30.0..=95.0).contains(&r.relative_humidity));
            assert!(r.co2 >= 300.0);
            assert!(r.ec >= 0.1);
            assert!((4.0..=8.0).contains(&r.ph));
            assert!((0.0..=100.0).contains(&r.stomata_openings));
            assert!(r.photosynthesis_rate >= 0.0);
        }
    }

    #[test]
    fn test_vpd_is_derived_from_reading() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut generator = generator_at(9, GrowthStage::Vegetative);
        for _ in 0..50 {
            let r = generator.generate_sensor_data(&mut rng);
            assert_eq!(r.vpd, calculate_vpd(r.temperature, r.relative_humidity));
        }
    }

    #[test]
    fn test_night_readings_are_cooler_and_damper() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut day = generator_at(12, GrowthStage::Vegetative);
        let mut night = generator_at(23, GrowthStage::Vegetative);
        let n = 400;
        let (mut day_t, mut night_t, mut day_rh, mut night_rh) = (0.0, 0.0, 0.0, 0.0);
        for _ in 0..n {
            let d = day.generate_sensor_data(&mut rng);
            let k = night.generate_sensor_data(&mut rng);
            day_t += d.temperature;
            night_t += k.temperature;
            day_rh += d.relative_humidity;
            night_rh += k.relative_humidity;
        }
        assert!(night_t / n as f64 + 3.0 < day_t / n as f64);
        assert!(night_rh / n as f64 > day_rh / n as f64 + 10.0);
    }

    #[test]
    fn test_plant_scores_reward_optimal_setpoints() {
        let crop = CropCatalog::builtin().get("lettuce").unwrap().clone();
        let optimal = crop.optimal_ranges.for_stage(GrowthStage::Vegetative);
        let mut set = crop.initial_set_values;
        optimal.merge_into(&mut set);
        refresh_vpd(&mut set);

        assert_eq!(stomata_opening_score(&set, optimal), 100.0);
        assert_eq!(photosynthesis_score(&set, optimal), 28.0);

        set.ppfd = 0.0;
        set.temperature = 28.0;
        refresh_vpd(&mut set);
        assert!(stomata_opening_score(&set, optimal) < 100.0);
        assert_eq!(photosynthesis_score(&set, optimal), 15.0);
    }
}
