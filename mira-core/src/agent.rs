//! The rule-based control agent.
//!
//! Each invocation scores every adjustable parameter against its own setpoint and the
//! stage optimum, adds candidates suggested by the plant-response indicators, and
//! emits at most one setpoint correction. Keeping sensors on their setpoints comes
//! first; chasing the stage optimum comes second.

use crate::vpd::{calculate_vpd, stage_vpd_target};
use chrono::{DateTime, Utc};
use mira_schemas::{
    action::{ActionLogEntry, ActionSource},
    crop::{OptimalRanges, StageTargets},
    cycle::YieldProgress,
    environment::{SensorData, SetValues},
    parameter::Parameter,
    plant::PlantStage,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::VecDeque};

/// Empirically tuned constants of the agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentTuning {
    /// Candidates at or below this priority are ignored.
    pub priority_floor: f64,
    /// Below this priority a candidate may be skipped at random.
    pub skip_threshold: f64,
    pub skip_probability: f64,
    /// Share of the sensor/setpoint gap closed when a sensor drifts.
    pub drift_correction: f64,
    /// Smaller corrections are not emitted.
    pub min_change: f64,
    /// Entries kept in the learning history.
    pub history_capacity: usize,
}

impl Default for AgentTuning {
    fn default() -> Self {
        Self {
            priority_floor: 2.0,
            skip_threshold: 5.0,
            skip_probability: 0.8,
            drift_correction: 0.3,
            min_change: 0.05,
            history_capacity: 500,
        }
    }
}

/// Diagnostics only. The agent never reads these back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningRecord {
    pub sensor_data: SensorData,
    pub set_values: SetValues,
    pub stomata_openings: f64,
    pub photosynthesis_rate: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Candidate {
    pub parameter: Parameter,
    pub current: f64,
    pub optimal: f64,
    pub set: f64,
    pub priority: f64,
}

pub struct ControlAgent {
    optimal_ranges: OptimalRanges,
    tuning: AgentTuning,
    learning_history: VecDeque<LearningRecord>,
    next_id: u64,
}

impl ControlAgent {
    pub fn new(optimal_ranges: OptimalRanges, tuning: AgentTuning) -> Self {
        Self {
            optimal_ranges,
            tuning,
            learning_history: VecDeque::new(),
            next_id: 1,
        }
    }

    pub fn tuning(&self) -> &AgentTuning {
        &self.tuning
    }

    pub fn learning_history(&self) -> impl Iterator<Item = &LearningRecord> {
        self.learning_history.iter()
    }

    /// Compares a reading against setpoints and stage optima and proposes at most one
    /// setpoint correction. `None` means nothing worth changing this time.
    #[allow(clippy::too_many_arguments)]
    pub fn analyze_and_adjust<R: Rng + ?Sized>(
        &mut self,
        sensor: &SensorData,
        set_values: &SetValues,
        stage: &PlantStage,
        yield_progress: Option<YieldProgress>,
        cycle_day: Option<u32>,
        timestamp: DateTime<Utc>,
        rng: &mut R,
    ) -> Option<ActionLogEntry> {
        let urgency = yield_urgency(yield_progress, cycle_day);
        let optimal = *self.optimal_ranges.for_stage(stage.stage);

        let mut candidates = self.collect_candidates(sensor, set_values, &optimal, urgency);
        candidates.sort_by(|a, b| b.priority.partial_cmp(&a.priority).unwrap_or(Ordering::Equal));
        let chosen = *candidates.first()?;

        if chosen.priority < self.tuning.skip_threshold
            && rng.gen::<f64>() < self.tuning.skip_probability
        {
            return None;
        }

        let new_value = self.propose_value(&chosen, rng);
        if (new_value - chosen.set).abs() < self.tuning.min_change {
            return None;
        }

        self.record(sensor, set_values, timestamp);

        let entry = ActionLogEntry {
            id: format!("ai-{}", self.next_id),
            timestamp,
            parameter: chosen.parameter,
            old_value: chosen.set,
            new_value,
            reason: rationale(&chosen, stage, rng),
            source: ActionSource::Ai,
        };
        self.next_id += 1;

        log::debug!(
            "Agent adjusted {} {:.2} -> {:.2} (priority {:.1})",
            chosen.parameter.key(),
            chosen.set,
            new_value,
            chosen.priority
        );
        Some(entry)
    }

    pub(crate) fn collect_candidates(
        &self,
        sensor: &SensorData,
        set_values: &SetValues,
        optimal: &StageTargets,
        urgency: f64,
    ) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for parameter in Parameter::ADJUSTABLE {
            let Some(optimal_value) = optimal.get(parameter) else {
                continue;
            };
            let current = sensor.get(parameter);
            let set = set_values.get(parameter);

            let deviation_from_set = (current - set).abs();
            let deviation_from_optimal = (current - optimal_value).abs();
            let set_deviation_from_optimal = (set - optimal_value).abs();

            let mut priority: f64 = 0.0;

            // Sensor drifting away from its own setpoint.
            if deviation_from_set > set * 0.03 || deviation_from_set > 0.5 {
                priority = priority.max(deviation_from_set * 20.0 * urgency);
            }

            // Setpoint far from the stage optimum.
            if set_deviation_from_optimal > optimal_value * 0.05
                && set_deviation_from_optimal > 0.2
            {
                if deviation_from_optimal > set_deviation_from_optimal * 1.2 {
                    priority = priority.max(deviation_from_optimal * 15.0 * urgency);
                } else {
                    priority = priority.max(set_deviation_from_optimal * 8.0 * urgency);
                }
            }

            // Sensor far from optimum even though it tracks the setpoint.
            if deviation_from_optimal > optimal_value * 0.1 && deviation_from_set < set * 0.05 {
                priority = priority.max(deviation_from_optimal * 6.0 * urgency);
            }

            if priority > self.tuning.priority_floor {
                candidates.push(Candidate {
                    parameter,
                    current,
                    optimal: optimal_value,
                    set,
                    priority,
                });
            }
        }

        let mut propose = |parameter: Parameter, optimal_value: f64, priority: f64| {
            candidates.push(Candidate {
                parameter,
                current: sensor.get(parameter),
                optimal: optimal_value,
                set: set_values.get(parameter),
                priority,
            });
        };

        if sensor.photosynthesis_rate < 8.0 {
            if let Some(co2) = optimal.co2 {
                if set_values.co2 < co2 * 0.9 {
                    propose(Parameter::Co2, co2, 15.0);
                }
            }
            if let Some(ppfd) = optimal.ppfd {
                if set_values.ppfd < ppfd * 0.9 {
                    propose(Parameter::Ppfd, ppfd, 12.0);
                }
            }
        }

        if sensor.stomata_openings < 40.0 {
            if let Some(optimal_vpd) = stage_vpd_target(optimal) {
                let current_vpd = calculate_vpd(sensor.temperature, sensor.relative_humidity);
                let rh = optimal.relative_humidity;
                let t = optimal.temperature;

                if current_vpd > optimal_vpd * 1.2 {
                    // Air too dry: raise humidity, or failing that lower temperature.
                    match (rh, t) {
                        (Some(rh), _) if set_values.relative_humidity < rh * 0.95 => {
                            propose(Parameter::RelativeHumidity, rh, 12.0)
                        }
                        (_, Some(t)) if set_values.temperature > t * 1.05 => {
                            propose(Parameter::Temperature, t, 10.0)
                        }
                        _ => {}
                    }
                } else if current_vpd < optimal_vpd * 0.8 {
                    if let Some(rh) = rh {
                        if set_values.relative_humidity > rh * 1.05 {
                            propose(Parameter::RelativeHumidity, rh, 10.0);
                        }
                    }
                }
            }
        }

        candidates
    }

    fn propose_value<R: Rng + ?Sized>(&self, candidate: &Candidate, rng: &mut R) -> f64 {
        if (candidate.current - candidate.set).abs() > candidate.set * 0.03 {
            // Close part of the drift, staying inside the optimum band.
            let corrected =
                candidate.set + (candidate.current - candidate.set) * self.tuning.drift_correction;
            let (low, high) = optimum_band(candidate.optimal);
            corrected.clamp(low, high)
        } else {
            step_toward_optimal(candidate.set, candidate.optimal, rng)
        }
    }

    fn record(&mut self, sensor: &SensorData, set_values: &SetValues, timestamp: DateTime<Utc>) {
        if self.tuning.history_capacity == 0 {
            return;
        }
        while self.learning_history.len() >= self.tuning.history_capacity {
            self.learning_history.pop_front();
        }
        self.learning_history.push_back(LearningRecord {
            sensor_data: *sensor,
            set_values: *set_values,
            stomata_openings: sensor.stomata_openings,
            photosynthesis_rate: sensor.photosynthesis_rate,
            timestamp,
        });
    }
}

/// Priority multiplier in `[1, 3]`; grows as yield falls behind target.
pub fn yield_urgency(yield_progress: Option<YieldProgress>, cycle_day: Option<u32>) -> f64 {
    match (yield_progress, cycle_day) {
        (Some(progress), Some(day)) if day > 0 && progress.target > 0.0 => {
            (1.0 + (progress.target - progress.current) / progress.target * 2.0).clamp(1.0, 3.0)
        }
        _ => 1.0,
    }
}

/// Moves a setpoint 10-20 % of the way to `optimal`, rounded to one decimal and kept
/// within the optimum band.
fn step_toward_optimal<R: Rng + ?Sized>(set: f64, optimal: f64, rng: &mut R) -> f64 {
    let difference = (optimal - set).abs();
    if difference < 0.2 {
        return set;
    }

    let step_size = 0.1 + rng.gen::<f64>() * 0.1;
    let direction = if optimal > set { 1.0 } else { -1.0 };
    let stepped = set + direction * difference * step_size;
    let (low, high) = optimum_band(optimal);
    let rounded = (stepped.clamp(low, high) * 10.0).round() / 10.0;
    rounded.clamp(low, high)
}

/// Half to one and a half times the optimum. Every correction lands in here.
fn optimum_band(optimal: f64) -> (f64, f64) {
    let (a, b) = (optimal * 0.5, optimal * 1.5);
    (a.min(b), a.max(b))
}

fn rationale<R: Rng + ?Sized>(candidate: &Candidate, stage: &PlantStage, rng: &mut R) -> String {
    let name = candidate.parameter.display_name();
    match rng.gen_range(0..4) {
        0 => format!(
            "Optimizing {} for {} stage. Current reading ({:.1}) deviates from optimal ({:.1}).",
            name, stage.stage, candidate.current, candidate.optimal
        ),
        1 => format!(
            "Adjusting {} to improve plant response. Target: {:.1}.",
            name, candidate.optimal
        ),
        2 => format!("Fine-tuning {} based on plant performance indicators.", name),
        _ => format!("Adapting {} for optimal {} growth conditions.", name, stage.stage),
    }
}
