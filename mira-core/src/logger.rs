use crate::simulation::state::SimulationState;
use csv::Writer;
use mira_schemas::{parameter::Parameter, plant::GrowthStage};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// One CSV row of the time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickLogEntry {
    pub tick: u64,
    /// `INITIAL` for the row written at build time, `TICK` afterwards.
    pub phase: String,
    pub cycle_number: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub cycle_day: u32,
    pub stage: GrowthStage,
    pub sensor_temperature: f64,
    pub set_temperature: f64,
    pub sensor_relative_humidity: f64,
    pub set_relative_humidity: f64,
    pub sensor_vpd: f64,
    pub set_vpd: f64,
    pub sensor_co2: f64,
    pub set_co2: f64,
    pub sensor_ppfd: f64,
    pub set_ppfd: f64,
    pub sensor_ec: f64,
    pub set_ec: f64,
    pub sensor_ph: f64,
    pub set_ph: f64,
    pub sensor_stomata_openings: f64,
    pub set_stomata_openings: f64,
    pub sensor_photosynthesis_rate: f64,
    pub set_photosynthesis_rate: f64,
    pub external_temperature: f64,
    pub external_relative_humidity: f64,
    pub yield_current: f64,
    pub yield_target: f64,
    pub adjusted_parameter: Option<Parameter>,
    pub events_json: String,
}

impl TickLogEntry {
    pub fn is_initial(&self) -> bool {
        self.phase == INITIAL_PHASE
    }

    /// Reading and setpoint for a logged parameter. `None` for channels not in the log.
    pub fn tracking_pair(&self, parameter: Parameter) -> Option<(f64, f64)> {
        match parameter {
            Parameter::Temperature => Some((self.sensor_temperature, self.set_temperature)),
            Parameter::RelativeHumidity => {
                Some((self.sensor_relative_humidity, self.set_relative_humidity))
            }
            Parameter::Vpd => Some((self.sensor_vpd, self.set_vpd)),
            Parameter::Co2 => Some((self.sensor_co2, self.set_co2)),
            Parameter::Ppfd => Some((self.sensor_ppfd, self.set_ppfd)),
            Parameter::Ec => Some((self.sensor_ec, self.set_ec)),
            Parameter::Ph => Some((self.sensor_ph, self.set_ph)),
            Parameter::StomataOpenings => {
                Some((self.sensor_stomata_openings, self.set_stomata_openings))
            }
            Parameter::PhotosynthesisRate => {
                Some((self.sensor_photosynthesis_rate, self.set_photosynthesis_rate))
            }
            Parameter::AirflowVelocity | Parameter::SolutionTemperature => None,
        }
    }
}

pub const INITIAL_PHASE: &str = "INITIAL";
pub const TICK_PHASE: &str = "TICK";

pub struct TimeSeriesLogger {
    writer: Writer<fs::File>,
}

impl TimeSeriesLogger {
    pub fn new(path: &str) -> Result<Self, io::Error> {
        let writer = Writer::from_path(path)?;
        Ok(Self { writer })
    }

    pub fn log_state(&mut self, state: &SimulationState, phase: &str) -> Result<(), anyhow::Error> {
        let sensor = &state.sensor_data;
        let set = &state.set_values;

        let entry = TickLogEntry {
            tick: state.tick,
            phase: phase.to_string(),
            cycle_number: state.current_cycle.cycle_number,
            day: state.time.day,
            hour: state.time.hour,
            minute: state.time.minute,
            cycle_day: state.time.cycle_day,
            stage: state.plant_stage.stage,
            sensor_temperature: sensor.temperature,
            set_temperature: set.temperature,
            sensor_relative_humidity: sensor.relative_humidity,
            set_relative_humidity: set.relative_humidity,
            sensor_vpd: sensor.vpd,
            set_vpd: set.vpd,
            sensor_co2: sensor.co2,
            set_co2: set.co2,
            sensor_ppfd: sensor.ppfd,
            set_ppfd: set.ppfd,
            sensor_ec: sensor.ec,
            set_ec: set.ec,
            sensor_ph: sensor.ph,
            set_ph: set.ph,
            sensor_stomata_openings: sensor.stomata_openings,
            set_stomata_openings: set.stomata_openings,
            sensor_photosynthesis_rate: sensor.photosynthesis_rate,
            set_photosynthesis_rate: set.photosynthesis_rate,
            external_temperature: state.external.temperature,
            external_relative_humidity: state.external.relative_humidity,
            yield_current: state.yield_progress.current,
            yield_target: state.yield_progress.target,
            adjusted_parameter: state.adjusted_parameter,
            events_json: serde_json::to_string(&state.events)?,
        };

        self.writer.serialize(entry)?;
        self.writer.flush()?;
        Ok(())
    }
}
