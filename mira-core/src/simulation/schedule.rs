//! Calendar arithmetic and the stage-dependent schedules the engine applies each tick.

use mira_schemas::{
    crop::{CropConfig, CropProfile},
    cycle::YieldProgress,
    parameter::Parameter,
    plant::{GrowthStage, SimulationTime},
};

/// Ambient CO₂ the dynamic target starts from, in ppm.
pub const BASE_CO2: f64 = 450.0;

/// Advances the clock by `hours` of simulated time.
///
/// Returns the new time and whether a day boundary was crossed. `day` and
/// `cycle_day` advance together.
pub fn advance_time(time: SimulationTime, hours: f64) -> (SimulationTime, bool) {
    let hours = if hours.is_finite() { hours.max(0.0) } else { 0.0 };

    let total_hours = time.hour as f64 + hours;
    let mut days = (total_hours / 24.0).floor() as u32;
    let mut hour = (total_hours % 24.0).floor() as u32;
    let mut minute = time.minute + ((hours % 1.0) * 60.0).floor() as u32;

    if minute >= 60 {
        minute -= 60;
        hour += 1;
        if hour >= 24 {
            hour -= 24;
            days += 1;
        }
    }

    let next = SimulationTime {
        day: time.day + days,
        hour,
        minute,
        cycle_day: time.cycle_day + days,
    };
    (next, days > 0)
}

/// Stage a plant should be in on a given cycle day.
pub fn stage_for_day(profile: CropProfile, cycle_day: u32) -> GrowthStage {
    let day = cycle_day as f64;
    let germination = profile.germination_days();

    if day < germination {
        return GrowthStage::Germination;
    }
    match profile {
        CropProfile::LeafyGreen => {
            if day < germination + 20.0 {
                GrowthStage::Vegetative
            } else if day < germination + 25.0 {
                GrowthStage::Flowering
            } else {
                GrowthStage::Harvest
            }
        }
        CropProfile::Fruiting => {
            if day < 30.0 {
                GrowthStage::Vegetative
            } else if day < 50.0 {
                GrowthStage::Flowering
            } else if day < 60.0 {
                GrowthStage::Fruiting
            } else {
                GrowthStage::Harvest
            }
        }
    }
}

/// Light setpoint for the hour, ramped in over the first days of each stage.
///
/// Lamps are off at night and while seeds are still germinating.
pub fn ramped_ppfd(crop: &CropConfig, stage: GrowthStage, time: &SimulationTime) -> f64 {
    let germination = crop.profile.germination_days();
    let day = time.cycle_day as f64;
    if !time.is_daytime() || day < germination {
        return 0.0;
    }

    let ranges = &crop.optimal_ranges;
    let ppfd_of = |stage: GrowthStage| ranges.for_stage(stage).ppfd.unwrap_or(0.0);
    let progress = |elapsed: f64, span: f64| (elapsed / span).clamp(0.0, 1.0);

    let optimal = ppfd_of(stage);
    let vegetative = ppfd_of(GrowthStage::Vegetative);
    let flowering = ppfd_of(GrowthStage::Flowering);
    let since_germination = day - germination;

    match stage {
        GrowthStage::Germination => vegetative * progress(since_germination, 5.0),
        GrowthStage::Vegetative => optimal * progress(since_germination, 7.0),
        GrowthStage::Flowering => {
            vegetative + (optimal - vegetative) * progress(since_germination - 7.0, 5.0)
        }
        GrowthStage::Fruiting if crop.profile.has_fruiting_stage() => {
            flowering + (optimal - flowering) * progress(since_germination - 12.0, 5.0)
        }
        GrowthStage::Fruiting => flowering,
        GrowthStage::Harvest => optimal,
    }
}

/// CO₂ setpoint rising with harvest progress, from ambient to the profile's ceiling.
pub fn dynamic_co2_target(profile: CropProfile, progress: &YieldProgress) -> f64 {
    BASE_CO2 + (profile.co2_ceiling() - BASE_CO2) * progress.fraction()
}

/// Range a manual setpoint is clamped to. `None` for values that cannot be set.
pub fn control_range(parameter: Parameter) -> Option<(f64, f64)> {
    match parameter {
        Parameter::Temperature => Some((15.0, 30.0)),
        Parameter::RelativeHumidity => Some((30.0, 95.0)),
        Parameter::Co2 => Some((300.0, 2000.0)),
        Parameter::Ppfd => Some((0.0, 1000.0)),
        Parameter::AirflowVelocity => Some((0.0, 5.0)),
        Parameter::SolutionTemperature => Some((15.0, 30.0)),
        Parameter::Ec => Some((0.1, 5.0)),
        Parameter::Ph => Some((4.0, 8.0)),
        Parameter::Vpd | Parameter::StomataOpenings | Parameter::PhotosynthesisRate => None,
    }
}

/// Yield target for the next cycle: a 2 % raise per completed cycle, capped.
pub fn next_yield_target(base_target: f64, completed_cycles: usize) -> f64 {
    let growth = (1.0 + 0.02 * completed_cycles as f64).min(1.15);
    (base_target * growth).min(base_target * 1.2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CropCatalog;

    fn at(cycle_day: u32, hour: u32) -> SimulationTime {
        SimulationTime {
            day: cycle_day,
            hour,
            minute: 0,
            cycle_day,
        }
    }

    #[test]
    fn test_advance_whole_hours() {
        let (t, crossed) = advance_time(SimulationTime::CYCLE_START, 1.0);
        assert_eq!((t.day, t.hour, t.minute, t.cycle_day), (0, 7, 0, 0));
        assert!(!crossed);

        let (t, crossed) = advance_time(at(3, 23), 2.0);
        assert_eq!((t.day, t.hour, t.cycle_day), (4, 1, 4));
        assert!(crossed);

        let (t, _) = advance_time(at(0, 6), 50.0);
        assert_eq!((t.day, t.hour), (2, 8));
    }

    #[test]
    fn test_advance_fractional_hours_carries_minutes() {
        let (t, _) = advance_time(SimulationTime::CYCLE_START, 0.5);
        assert_eq!((t.hour, t.minute), (6, 30));
        let (t, _) = advance_time(t, 0.5);
        assert_eq!((t.hour, t.minute), (7, 0));

        let late = SimulationTime {
            minute: 45,
            ..at(2, 23)
        };
        let (t, crossed) = advance_time(late, 0.5);
        assert_eq!((t.day, t.hour, t.minute), (3, 0, 15));
        assert!(crossed);
    }

    #[test]
    fn test_leafy_green_stages() {
        let p = CropProfile::LeafyGreen;
        assert_eq!(stage_for_day(p, 0), GrowthStage::Germination);
        assert_eq!(stage_for_day(p, 2), GrowthStage::Germination);
        assert_eq!(stage_for_day(p, 3), GrowthStage::Vegetative);
        assert_eq!(stage_for_day(p, 22), GrowthStage::Vegetative);
        assert_eq!(stage_for_day(p, 23), GrowthStage::Flowering);
        assert_eq!(stage_for_day(p, 27), GrowthStage::Flowering);
        assert_eq!(stage_for_day(p, 28), GrowthStage::Harvest);
    }

    #[test]
    fn test_stages_never_regress_and_fruiting_is_exclusive() {
        for profile in [CropProfile::LeafyGreen, CropProfile::Fruiting] {
            let mut previous = GrowthStage::Germination;
            let mut saw_fruiting = false;
            for day in 0..200 {
                let stage = stage_for_day(profile, day);
                assert!(stage >= previous);
                saw_fruiting |= stage == GrowthStage::Fruiting;
                previous = stage;
            }
            assert_eq!(saw_fruiting, profile.has_fruiting_stage());
        }
    }

    #[test]
    fn test_ppfd_ramp() {
        let catalog = CropCatalog::builtin();
        let lettuce = catalog.get("lettuce").unwrap();

        assert_eq!(ramped_ppfd(lettuce, GrowthStage::Vegetative, &at(10, 22)), 0.0);
        assert_eq!(ramped_ppfd(lettuce, GrowthStage::Germination, &at(1, 12)), 0.0);
        // Day 3 is half a day past germination: 0.5 / 7 of the vegetative target.
        let day3 = ramped_ppfd(lettuce, GrowthStage::Vegetative, &at(3, 12));
        assert!((day3 - 200.0 * 0.5 / 7.0).abs() < 1e-9);
        assert_eq!(ramped_ppfd(lettuce, GrowthStage::Vegetative, &at(12, 12)), 200.0);
        let early_flower = ramped_ppfd(lettuce, GrowthStage::Flowering, &at(23, 12));
        assert_eq!(early_flower, 300.0);
        assert_eq!(ramped_ppfd(lettuce, GrowthStage::Harvest, &at(29, 12)), 250.0);

        let strawberries = catalog.get("strawberries").unwrap();
        let fruiting_start = ramped_ppfd(strawberries, GrowthStage::Fruiting, &at(19, 12));
        assert_eq!(fruiting_start, 400.0);
        let fruiting_late = ramped_ppfd(strawberries, GrowthStage::Fruiting, &at(55, 12));
        assert_eq!(fruiting_late, 500.0);
    }

    #[test]
    fn test_dynamic_co2_tracks_progress() {
        let none = YieldProgress {
            current: 0.0,
            target: 200.0,
        };
        let half = YieldProgress {
            current: 100.0,
            target: 200.0,
        };
        let over = YieldProgress {
            current: 300.0,
            target: 200.0,
        };
        assert_eq!(dynamic_co2_target(CropProfile::LeafyGreen, &none), 450.0);
        assert_eq!(dynamic_co2_target(CropProfile::LeafyGreen, &half), 625.0);
        assert_eq!(dynamic_co2_target(CropProfile::Fruiting, &over), 1200.0);
    }

    #[test]
    fn test_control_ranges() {
        for parameter in Parameter::ALL {
            assert_eq!(control_range(parameter).is_some(), parameter.is_adjustable());
        }
        assert_eq!(control_range(Parameter::Ph), Some((4.0, 8.0)));
    }

    #[test]
    fn test_yield_target_growth_is_capped() {
        assert!((next_yield_target(200.0, 1) - 204.0).abs() < 1e-9);
        assert!((next_yield_target(200.0, 5) - 220.0).abs() < 1e-9);
        for completed in 0..100 {
            let target = next_yield_target(200.0, completed);
            assert!(target <= 240.0);
            assert!(target >= 200.0);
        }
    }
}
