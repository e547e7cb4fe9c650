use super::{
    schedule::{
        advance_time, control_range, dynamic_co2_target, next_yield_target, ramped_ppfd,
        stage_for_day,
    },
    state::{SimulationEvent, SimulationSnapshot, SimulationState},
};
use crate::{
    actuators::derive_actuator_state,
    agent::ControlAgent,
    climate::generate_climate,
    error::MiraError,
    growth::{calculate_quality, calculate_yield},
    logger::{TimeSeriesLogger, TICK_PHASE},
    sensors::SyntheticSensorGenerator,
    vpd::refresh_vpd,
};
use chrono::{DateTime, Duration, Utc};
use mira_schemas::{
    action::{ActionLogEntry, ActionSource},
    crop::CropConfig,
    cycle::{CycleData, YieldProgress},
    environment::{ExternalConditions, SensorData, SetValues},
    parameter::Parameter,
    plant::{PlantStage, SimulationTime},
};
use rand::rngs::StdRng;
use std::mem;

pub const MIN_SPEED: f64 = 0.1;
pub const MAX_SPEED: f64 = 200.0;

/// Plant-response setpoints restored at the start of every cycle.
const RESET_STOMATA_OPENINGS: f64 = 60.0;
const RESET_PHOTOSYNTHESIS_RATE: f64 = 12.0;

/// Setpoint ramps are only rewritten when they move by more than this.
const PPFD_UPDATE_THRESHOLD: f64 = 1.0;
const CO2_UPDATE_THRESHOLD: f64 = 5.0;

/// Conditions count as optimal within this many degrees of the stage temperature.
const OPTIMAL_TEMPERATURE_BAND: f64 = 2.0;

pub struct SimulationEngine {
    pub(super) crop: CropConfig,
    pub(super) state: SimulationState,
    pub(super) generator: SyntheticSensorGenerator,
    pub(super) agent: ControlAgent,
    pub(super) rng: StdRng,
    pub(super) epoch: DateTime<Utc>,
    pub(super) base_target_yield: f64,
    pub(super) manual_adjustments: u64,
    /// Events raised between ticks, reported with the next tick.
    pub(super) queued_events: Vec<SimulationEvent>,
    pub(super) logger: Option<TimeSeriesLogger>,
}

impl SimulationEngine {
    /// Advances the session by one tick of `speed` simulated hours.
    pub fn tick(&mut self) -> Result<(), MiraError> {
        self.step(self.state.speed)
    }

    pub fn run_ticks(&mut self, ticks: u64) -> Result<(), MiraError> {
        for _ in 0..ticks {
            self.tick()?;
        }
        Ok(())
    }

    /// One full transition of the chamber over `hours` of simulated time.
    pub fn step(&mut self, hours: f64) -> Result<(), MiraError> {
        let hours = if hours.is_finite() { hours.max(0.0) } else { 0.0 };

        self.state.events = mem::take(&mut self.queued_events);
        self.state.adjusted_parameter = None;
        self.state.tick += 1;
        self.state.elapsed_hours += hours;

        let (time, crossed_day) = advance_time(self.state.time, hours);
        self.state.time = time;
        self.state.current_cycle.cycle_day = time.cycle_day;
        self.generator.update_simulation_time(time);

        self.update_stage_and_ramps();

        if crossed_day && self.cycle_finished() {
            self.rollover();
        }

        let time = self.state.time;
        let external = generate_climate(time.day, time.hour, true, &mut self.rng);
        self.state.external = external;
        self.generator.update_external_conditions(external);

        let reading = self.generator.generate_sensor_data(&mut self.rng);
        self.state.sensor_data = reading;
        self.state
            .performance
            .push(reading.photosynthesis_rate, reading.stomata_openings);

        self.update_yield();
        self.consult_agent();

        self.state.actuators = derive_actuator_state(&self.state.set_values, &self.state.external);

        if let Some(logger) = &mut self.logger {
            logger.log_state(&self.state, TICK_PHASE)?;
        }
        Ok(())
    }

    /// Sets a setpoint by hand, clamped to the parameter's control range.
    ///
    /// # Errors
    ///
    /// `ReadOnlyParameter` for VPD and the plant-response values, `ConfigError` for a
    /// non-finite value.
    pub fn apply_manual_adjustment(
        &mut self,
        parameter: Parameter,
        value: f64,
    ) -> Result<ActionLogEntry, MiraError> {
        let (low, high) = control_range(parameter).ok_or(MiraError::ReadOnlyParameter(parameter))?;
        if !value.is_finite() {
            return Err(MiraError::ConfigError(format!(
                "{} must be a finite number",
                parameter.key()
            )));
        }

        self.manual_adjustments += 1;
        let entry = ActionLogEntry {
            id: format!("manual-{}", self.manual_adjustments),
            timestamp: self.now(),
            parameter,
            old_value: self.state.set_values.get(parameter),
            new_value: value.clamp(low, high),
            reason: format!("Manual {} adjustment", parameter.display_name()),
            source: ActionSource::Manual,
        };
        self.apply_action(entry.clone());
        // The tick that already ran has been reported; the event goes out with the next one.
        if let Some(event) = self.state.events.pop() {
            self.queued_events.push(event);
        }
        Ok(entry)
    }

    /// Clamps to `[0.1, 200]` simulated hours per tick and returns the applied value.
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        if speed.is_finite() {
            self.state.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        }
        self.state.speed
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot::from(&self.state)
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn crop(&self) -> &CropConfig {
        &self.crop
    }

    pub fn agent(&self) -> &ControlAgent {
        &self.agent
    }

    pub fn time(&self) -> SimulationTime {
        self.state.time
    }

    pub fn plant_stage(&self) -> PlantStage {
        self.state.plant_stage
    }

    pub fn set_values(&self) -> &SetValues {
        &self.state.set_values
    }

    pub fn sensor_data(&self) -> &SensorData {
        &self.state.sensor_data
    }

    pub fn external_conditions(&self) -> ExternalConditions {
        self.state.external
    }

    pub fn yield_progress(&self) -> YieldProgress {
        self.state.yield_progress
    }

    pub fn speed(&self) -> f64 {
        self.state.speed
    }

    pub fn current_cycle(&self) -> &CycleData {
        &self.state.current_cycle
    }

    pub fn cycles(&self) -> &[CycleData] {
        &self.state.cycles
    }

    pub fn action_log(&self) -> &[ActionLogEntry] {
        &self.state.action_log
    }

    /// Simulated instant for the current elapsed time.
    fn now(&self) -> DateTime<Utc> {
        self.epoch + Duration::milliseconds((self.state.elapsed_hours * 3_600_000.0) as i64)
    }

    fn update_stage_and_ramps(&mut self) {
        let time = self.state.time;
        let current = self.state.plant_stage;
        let next = stage_for_day(self.crop.profile, time.cycle_day);

        if next > current.stage {
            let set = &mut self.state.set_values;
            self.crop.optimal_ranges.for_stage(next).merge_into(set);
            refresh_vpd(set);
            set.ppfd = ramped_ppfd(&self.crop, next, &time);
            set.co2 = dynamic_co2_target(self.crop.profile, &self.state.yield_progress);

            self.state.plant_stage = PlantStage {
                stage: next,
                day: time.cycle_day,
            };
            self.generator.update_plant_stage(self.state.plant_stage);
            self.generator.update_set_values(self.state.set_values);
            self.state.events.push(SimulationEvent::StageChanged {
                from: current.stage,
                to: next,
                cycle_day: time.cycle_day,
            });
            log::info!(
                "Cycle {} day {}: {} -> {}",
                self.state.current_cycle.cycle_number,
                time.cycle_day,
                current.stage,
                next
            );
            return;
        }

        let ppfd = ramped_ppfd(&self.crop, current.stage, &time);
        let co2 = dynamic_co2_target(self.crop.profile, &self.state.yield_progress);
        let set = &mut self.state.set_values;
        let mut changed = false;
        if (ppfd - set.ppfd).abs() > PPFD_UPDATE_THRESHOLD {
            set.ppfd = ppfd;
            changed = true;
        }
        if (co2 - set.co2).abs() > CO2_UPDATE_THRESHOLD {
            set.co2 = co2;
            changed = true;
        }
        if changed {
            self.generator.update_set_values(self.state.set_values);
        }
    }

    fn cycle_finished(&self) -> bool {
        self.state.yield_progress.is_met()
            || self.state.time.cycle_day as f64 >= self.crop.max_cycle_days()
    }

    /// Closes the running cycle and starts the next one from germination.
    fn rollover(&mut self) {
        let (avg_photosynthesis, avg_stomata) = self.state.performance.averages();
        let duration = self.state.time.cycle_day;
        let quality = calculate_quality(avg_photosynthesis, avg_stomata, true, duration as f64);
        let final_yield = self.state.yield_progress.current;
        let now = self.now();

        let next_number = self.state.current_cycle.cycle_number + 1;
        let mut finished = mem::replace(
            &mut self.state.current_cycle,
            CycleData::start(next_number, now),
        );
        finished.end_date = Some(now);
        finished.duration = Some(duration);
        finished.final_yield = Some(final_yield);
        finished.quality = Some(quality);
        finished.average_photosynthesis = Some(avg_photosynthesis);
        finished.average_stomata = Some(avg_stomata);
        finished.cycle_day = duration;

        self.state.events.push(SimulationEvent::CycleCompleted {
            cycle_number: finished.cycle_number,
            final_yield,
            quality,
            duration,
        });
        log::info!(
            "Cycle {} complete after {} days: {:.1} g, quality {:.0}",
            finished.cycle_number,
            duration,
            final_yield,
            quality
        );
        self.state.cycles.push(finished);

        self.state.yield_progress = YieldProgress {
            current: 0.0,
            target: next_yield_target(self.base_target_yield, self.state.cycles.len()),
        };
        self.state.performance.clear();
        let previous_stage = self.state.plant_stage.stage;
        self.state.plant_stage = self.crop.initial_stage;
        self.state.time = SimulationTime::CYCLE_START;
        if previous_stage != self.state.plant_stage.stage {
            self.state.events.push(SimulationEvent::StageChanged {
                from: previous_stage,
                to: self.state.plant_stage.stage,
                cycle_day: self.state.time.cycle_day,
            });
        }

        let set = &mut self.state.set_values;
        self.crop.optimal_ranges.germination.merge_into(set);
        refresh_vpd(set);
        set.stomata_openings = RESET_STOMATA_OPENINGS;
        set.photosynthesis_rate = RESET_PHOTOSYNTHESIS_RATE;

        self.generator.update_simulation_time(self.state.time);
        self.generator.update_plant_stage(self.state.plant_stage);
        self.generator.update_set_values(self.state.set_values);
    }

    fn update_yield(&mut self) {
        let (avg_photosynthesis, avg_stomata) = self.state.performance.averages();
        let stage = self.state.plant_stage;
        let optimal_conditions = self
            .crop
            .optimal_ranges
            .for_stage(stage.stage)
            .temperature
            .map_or(false, |t| {
                (self.state.set_values.temperature - t).abs() < OPTIMAL_TEMPERATURE_BAND
            });

        self.state.yield_progress.current = calculate_yield(
            self.state.time.cycle_day as f64,
            &stage,
            avg_photosynthesis,
            avg_stomata,
            optimal_conditions,
            self.crop.cycle_length,
            self.state.yield_progress.target,
            self.crop.profile,
        );
    }

    fn consult_agent(&mut self) {
        let timestamp = self.now();
        let correction = self.agent.analyze_and_adjust(
            &self.state.sensor_data,
            &self.state.set_values,
            &self.state.plant_stage,
            Some(self.state.yield_progress),
            Some(self.state.time.cycle_day),
            timestamp,
            &mut self.rng,
        );
        if let Some(entry) = correction {
            self.apply_action(entry);
        }
    }

    fn apply_action(&mut self, entry: ActionLogEntry) {
        let set = &mut self.state.set_values;
        set.set(entry.parameter, entry.new_value);
        if matches!(
            entry.parameter,
            Parameter::Temperature | Parameter::RelativeHumidity
        ) {
            refresh_vpd(set);
        }
        self.generator.update_set_values(self.state.set_values);
        self.state.actuators = derive_actuator_state(&self.state.set_values, &self.state.external);

        self.state.adjusted_parameter = Some(entry.parameter);
        self.state.events.push(SimulationEvent::SetpointAdjusted {
            parameter: entry.parameter,
            old_value: entry.old_value,
            new_value: entry.new_value,
            source: entry.source,
        });
        self.state.action_log.push(entry);
    }
}
