use crate::{
    actuators::derive_actuator_state,
    agent::{AgentTuning, ControlAgent},
    catalog::validate_crop,
    climate::generate_climate,
    error::MiraError,
    logger::{TimeSeriesLogger, INITIAL_PHASE},
    sensors::SyntheticSensorGenerator,
    simulation::{
        engine::{SimulationEngine, MAX_SPEED, MIN_SPEED},
        state::{PerformanceHistory, SimulationState},
    },
    vpd::refresh_vpd,
};
use chrono::{DateTime, Utc};
use mira_schemas::{
    action::{ActionLogEntry, ActionSource},
    crop::CropConfig,
    cycle::{CycleData, YieldProgress},
    environment::SensorData,
    parameter::Parameter,
    plant::SimulationTime,
};
use rand::{rngs::StdRng, SeedableRng};

/// A fluent builder for constructing a `SimulationEngine`.
///
/// Only the crop is required. Without a seed the engine draws from system entropy,
/// and without an epoch the session starts at the current wall-clock time.
#[derive(Default)]
pub struct SimulationBuilder {
    crop: Option<CropConfig>,
    seed: Option<u64>,
    speed: Option<f64>,
    epoch: Option<DateTime<Utc>>,
    tuning: AgentTuning,
    log_path: Option<String>,
}

impl SimulationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the crop variety to grow.
    pub fn with_crop(mut self, crop: CropConfig) -> Self {
        self.crop = Some(crop);
        self
    }

    /// Seeds the engine's random source, making the session reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Simulated hours per tick. Clamped like `SimulationEngine::set_speed`.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Wall-clock instant that simulated hour zero maps to.
    pub fn with_epoch(mut self, epoch: DateTime<Utc>) -> Self {
        self.epoch = Some(epoch);
        self
    }

    pub fn with_agent_tuning(mut self, tuning: AgentTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Configures the simulation to write time-series data to the specified CSV file.
    pub fn with_timeseries_logging_to_file(mut self, path: &str) -> Self {
        self.log_path = Some(path.to_string());
        self
    }

    /// Consumes the builder and returns a ready-to-tick `SimulationEngine`.
    ///
    /// # Errors
    ///
    /// Returns a `MiraError` if no crop was given, the crop fails validation, or the
    /// log file cannot be created.
    pub fn build(self) -> Result<SimulationEngine, MiraError> {
        let crop = self.crop.ok_or(MiraError::CropNotDefined)?;
        validate_crop(&crop)?;

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let epoch = self.epoch.unwrap_or_else(Utc::now);
        let speed = self.speed.unwrap_or(1.0);
        let speed = if speed.is_finite() {
            speed.clamp(MIN_SPEED, MAX_SPEED)
        } else {
            1.0
        };

        let time = SimulationTime::CYCLE_START;
        let plant_stage = crop.initial_stage;
        let mut set_values = crop.initial_set_values;
        refresh_vpd(&mut set_values);
        let external = generate_climate(time.day, time.hour, false, &mut rng);

        let action_log = Parameter::ADJUSTABLE
            .iter()
            .map(|&parameter| ActionLogEntry {
                id: format!("initial-{}", parameter.key()),
                timestamp: epoch,
                parameter,
                old_value: 0.0,
                new_value: set_values.get(parameter),
                reason: format!(
                    "Initial {} setpoint for {}",
                    parameter.display_name(),
                    crop.name
                ),
                source: ActionSource::Ai,
            })
            .collect();

        let state = SimulationState {
            tick: 0,
            elapsed_hours: 0.0,
            speed,
            time,
            plant_stage,
            set_values,
            sensor_data: SensorData::from(set_values),
            external,
            actuators: derive_actuator_state(&set_values, &external),
            yield_progress: YieldProgress {
                current: 0.0,
                target: crop.target_yield,
            },
            current_cycle: CycleData::start(1, epoch),
            cycles: Vec::new(),
            action_log,
            performance: PerformanceHistory::default(),
            adjusted_parameter: None,
            events: Vec::new(),
        };

        let generator = SyntheticSensorGenerator::new(
            set_values,
            plant_stage,
            crop.optimal_ranges.clone(),
            external,
            time,
        );
        let agent = ControlAgent::new(crop.optimal_ranges.clone(), self.tuning);

        let mut logger = match self.log_path {
            Some(path) => Some(
                TimeSeriesLogger::new(&path).map_err(|e| MiraError::FileIO(path.clone(), e))?,
            ),
            None => None,
        };
        if let Some(logger) = &mut logger {
            logger.log_state(&state, INITIAL_PHASE)?;
        }

        log::info!(
            "Session started: {} ({} day cycle, target {} g)",
            crop.name,
            crop.cycle_length,
            crop.target_yield
        );

        Ok(SimulationEngine {
            base_target_yield: crop.target_yield,
            crop,
            state,
            generator,
            agent,
            rng,
            epoch,
            manual_adjustments: 0,
            queued_events: Vec::new(),
            logger,
        })
    }
}
