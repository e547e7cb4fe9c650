use mira_schemas::{
    action::{ActionLogEntry, ActionSource},
    actuator::ActuatorState,
    cycle::{CycleData, YieldProgress},
    environment::{ExternalConditions, SensorData, SetValues},
    parameter::Parameter,
    plant::{GrowthStage, PlantStage, SimulationTime},
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Plant-response samples kept for the yield and quality averages.
pub const PERFORMANCE_HISTORY_LEN: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimulationEvent {
    StageChanged {
        from: GrowthStage,
        to: GrowthStage,
        cycle_day: u32,
    },
    SetpointAdjusted {
        parameter: Parameter,
        old_value: f64,
        new_value: f64,
        source: ActionSource,
    },
    CycleCompleted {
        cycle_number: u32,
        final_yield: f64,
        quality: f64,
        duration: u32,
    },
}

/// Rolling window of `(photosynthesis_rate, stomata_openings)` readings.
#[derive(Debug, Clone, Default)]
pub struct PerformanceHistory {
    samples: VecDeque<(f64, f64)>,
}

impl PerformanceHistory {
    pub fn push(&mut self, photosynthesis_rate: f64, stomata_openings: f64) {
        if self.samples.len() >= PERFORMANCE_HISTORY_LEN {
            self.samples.pop_front();
        }
        self.samples.push_back((photosynthesis_rate, stomata_openings));
    }

    /// Mean photosynthesis and stomata; zero when empty.
    pub fn averages(&self) -> (f64, f64) {
        if self.samples.is_empty() {
            return (0.0, 0.0);
        }
        let n = self.samples.len() as f64;
        let (p, s) = self
            .samples
            .iter()
            .fold((0.0_f64, 0.0_f64), |(p, s), &(dp, ds)| (p + dp, s + ds));
        (p / n, s / n)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SimulationState {
    pub tick: u64,
    /// Simulated hours since the session started; not reset on rollover.
    pub elapsed_hours: f64,
    pub speed: f64,
    pub time: SimulationTime,
    pub plant_stage: PlantStage,
    pub set_values: SetValues,
    pub sensor_data: SensorData,
    pub external: ExternalConditions,
    pub actuators: ActuatorState,
    pub yield_progress: YieldProgress,
    pub current_cycle: CycleData,
    pub cycles: Vec<CycleData>,
    pub action_log: Vec<ActionLogEntry>,
    pub performance: PerformanceHistory,
    /// Parameter changed during the last tick, if any.
    pub adjusted_parameter: Option<Parameter>,
    pub events: Vec<SimulationEvent>,
}

/// Read-only view of the engine after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub tick: u64,
    pub time: SimulationTime,
    pub plant_stage: PlantStage,
    pub set_values: SetValues,
    pub sensor_data: SensorData,
    pub external: ExternalConditions,
    pub actuators: ActuatorState,
    pub yield_progress: YieldProgress,
    pub speed: f64,
    pub current_cycle: CycleData,
    pub completed_cycles: usize,
    pub adjusted_parameter: Option<Parameter>,
    pub events: Vec<SimulationEvent>,
}

impl From<&SimulationState> for SimulationSnapshot {
    fn from(state: &SimulationState) -> Self {
        Self {
            tick: state.tick,
            time: state.time,
            plant_stage: state.plant_stage,
            set_values: state.set_values,
            sensor_data: state.sensor_data,
            external: state.external,
            actuators: state.actuators,
            yield_progress: state.yield_progress,
            speed: state.speed,
            current_cycle: state.current_cycle.clone(),
            completed_cycles: state.cycles.len(),
            adjusted_parameter: state.adjusted_parameter,
            events: state.events.clone(),
        }
    }
}
