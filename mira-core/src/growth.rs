//! Yield and quality model.
//!
//! Yield follows a crop-family growth curve (slow start, fast finish) scaled by how
//! well the plants have been performing. Quality scores a finished cycle.

use mira_schemas::{crop::CropProfile, plant::PlantStage};

/// Leafy greens reach this fraction of target by `LEAFY_BREAK_DAY`.
const LEAFY_BREAK_FRACTION: f64 = 0.55;
const LEAFY_BREAK_DAY: f64 = 24.0;
const LEAFY_HARVEST_DAY: f64 = 31.0;

/// Predicted harvest in grams for a cycle day, clamped to `[0, target_yield]`.
///
/// `_stage` is accepted for parity with the rest of the model; the curves are
/// driven by day alone.
#[allow(clippy::too_many_arguments)]
pub fn calculate_yield(
    day: f64,
    _stage: &PlantStage,
    avg_photosynthesis: f64,
    avg_stomata: f64,
    optimal_conditions: bool,
    cycle_length: u32,
    target_yield: f64,
    profile: CropProfile,
) -> f64 {
    let safe_cycle = (cycle_length as f64).max(1.0);
    let safe_target = if target_yield.is_finite() {
        target_yield.max(1.0)
    } else {
        1.0
    };

    let fraction = match profile {
        CropProfile::LeafyGreen => leafy_green_fraction(day),
        CropProfile::Fruiting => phased_fraction(day, safe_cycle),
    };

    let factor = response_factor(avg_photosynthesis, avg_stomata, optimal_conditions);
    (safe_target * fraction * factor).clamp(0.0, safe_target)
}

/// Linear to 55 % by day 24, then an exponential ease to 100 % at day 31.
fn leafy_green_fraction(day: f64) -> f64 {
    if day <= 0.0 {
        0.0
    } else if day <= LEAFY_BREAK_DAY {
        LEAFY_BREAK_FRACTION * day / LEAFY_BREAK_DAY
    } else if day >= LEAFY_HARVEST_DAY {
        1.0
    } else {
        let t = (day - LEAFY_BREAK_DAY) / (LEAFY_HARVEST_DAY - LEAFY_BREAK_DAY);
        let k: f64 = 3.0;
        let gain = (1.0 - (-k * t).exp()) / (1.0 - (-k).exp());
        LEAFY_BREAK_FRACTION + (1.0 - LEAFY_BREAK_FRACTION) * gain
    }
}

/// Window sizes (early, mid, late) in days for the phased curve.
pub fn phase_windows(cycle_length: f64) -> (f64, f64, f64) {
    let late = (cycle_length * 0.12).floor().clamp(5.0, 7.0);
    let early = (cycle_length - late - 7.0).min(14.0).clamp(7.0, 14.0);
    let mid = (cycle_length - early - late).max(0.0);
    (early, mid, late)
}

/// Near flat to 2 %, power-law ease to 40 %, exponential ease to 100 %.
fn phased_fraction(day: f64, cycle_length: f64) -> f64 {
    let (early, mid, late) = phase_windows(cycle_length);

    if day <= 0.0 {
        0.0
    } else if day <= early {
        0.02 * day / early.max(1.0)
    } else if day <= early + mid {
        let p = (day - early) / mid.max(1.0);
        0.02 + 0.38 * p.powf(1.2)
    } else {
        let p = ((day - early - mid).max(0.0) / late.max(1.0)).min(1.0);
        0.40 + 0.60 * (1.0 - (-4.0 * p).exp())
    }
}

/// Performance multiplier in `[0.8, 1.2]`.
fn response_factor(avg_photosynthesis: f64, avg_stomata: f64, optimal_conditions: bool) -> f64 {
    let mut factor: f64 = 1.0;
    if avg_photosynthesis > 15.0 {
        factor += 0.08;
    }
    if avg_photosynthesis < 8.0 {
        factor -= 0.08;
    }
    if avg_stomata > 70.0 {
        factor += 0.05;
    }
    if avg_stomata < 40.0 {
        factor -= 0.05;
    }
    if optimal_conditions {
        factor += 0.05;
    }
    factor.clamp(0.8, 1.2)
}

/// Quality score 0-100 for a cycle.
pub fn calculate_quality(
    avg_photosynthesis: f64,
    avg_stomata: f64,
    optimal_conditions: bool,
    cycle_duration_days: f64,
) -> f64 {
    let photosynthesis_score = (avg_photosynthesis / 15.0 * 40.0).min(40.0);
    let stomata_score = (avg_stomata / 80.0 * 30.0).min(30.0);
    let conditions_score = if optimal_conditions { 20.0 } else { 10.0 };
    // Faster cycles score higher.
    let efficiency_score = (120.0 / cycle_duration_days.max(1.0) * 10.0).min(10.0);

    (photosynthesis_score + stomata_score + conditions_score + efficiency_score).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mira_schemas::plant::GrowthStage;

    fn stage() -> PlantStage {
        PlantStage {
            stage: GrowthStage::Vegetative,
            day: 3,
        }
    }

    fn lettuce_yield(day: f64) -> f64 {
        calculate_yield(day, &stage(), 12.0, 55.0, false, 31, 200.0, CropProfile::LeafyGreen)
    }

    #[test]
    fn test_lettuce_curve_after_break_day() {
        let at_break = lettuce_yield(24.0) / 200.0;
        let at_thirty = lettuce_yield(30.0) / 200.0;
        assert!((at_break - 0.55).abs() < 1e-9);
        assert!(at_thirty > 0.55 && at_thirty <= 1.0);
        assert!(at_thirty > at_break);
        assert_eq!(lettuce_yield(31.0), 200.0);
    }

    #[test]
    fn test_yield_bounded_and_non_decreasing() {
        let performances = [(4.0, 20.0, false), (12.0, 55.0, true), (25.0, 95.0, true)];
        for profile in [CropProfile::LeafyGreen, CropProfile::Fruiting] {
            for (cycle, target) in [(31, 200.0), (65, 200.0), (12, 50.0), (1, 1.0)] {
                for (p, s, opt) in performances {
                    let mut previous = 0.0;
                    for step in 0..=(cycle * 3 * 4) {
                        let day = step as f64 / 4.0;
                        let y = calculate_yield(day, &stage(), p, s, opt, cycle, target, profile);
                        assert!((0.0..=target).contains(&y), "{} out of range", y);
                        assert!(y + 1e-9 >= previous, "decreased at day {}", day);
                        previous = y;
                    }
                }
            }
        }
    }

    #[test]
    fn test_strawberry_phase_windows() {
        let (early, mid, late) = phase_windows(65.0);
        assert_eq!(late, 7.0);
        assert_eq!(early, 14.0);
        assert_eq!(mid, 44.0);

        let base = |day: f64| {
            calculate_yield(day, &stage(), 12.0, 55.0, false, 65, 200.0, CropProfile::Fruiting)
        };
        assert!((base(14.0) - 4.0).abs() < 1e-9);
        assert!((base(58.0) - 80.0).abs() < 1e-9);
        assert!(base(65.0) > 190.0);
    }

    #[test]
    fn test_performance_scales_yield() {
        let poor = calculate_yield(20.0, &stage(), 4.0, 20.0, false, 31, 200.0, CropProfile::LeafyGreen);
        let good = calculate_yield(20.0, &stage(), 25.0, 95.0, true, 31, 200.0, CropProfile::LeafyGreen);
        let base = lettuce_yield(20.0);
        assert!((poor / base - 0.87).abs() < 1e-9);
        assert!((good / base - 1.18).abs() < 1e-9);
    }

    #[test]
    fn test_quality_bounds() {
        for p in [0.0, 5.0, 15.0, 40.0, 1e6] {
            for s in [0.0, 40.0, 80.0, 100.0] {
                for opt in [true, false] {
                    for d in [0.0, 1.0, 31.0, 200.0] {
                        let q = calculate_quality(p, s, opt, d);
                        assert!((0.0..=100.0).contains(&q));
                    }
                }
            }
        }
        assert_eq!(calculate_quality(15.0, 80.0, true, 12.0), 100.0);
        assert!((calculate_quality(0.0, 0.0, false, 240.0) - 15.0).abs() < 1e-9);
    }
}
