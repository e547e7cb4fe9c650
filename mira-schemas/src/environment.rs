use crate::parameter::Parameter;
use serde::{Deserialize, Serialize};

/// Commanded targets for every chamber actuator.
///
/// `vpd` is always derived from `temperature` and `relative_humidity`; callers
/// that change either must recompute it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetValues {
    pub temperature: f64,
    pub relative_humidity: f64,
    pub vpd: f64,
    pub co2: f64,
    pub ppfd: f64,
    pub airflow_velocity: f64,
    pub solution_temperature: f64,
    pub ec: f64,
    pub ph: f64,
    pub stomata_openings: f64,
    pub photosynthesis_rate: f64,
}

impl SetValues {
    pub fn get(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Temperature => self.temperature,
            Parameter::RelativeHumidity => self.relative_humidity,
            Parameter::Vpd => self.vpd,
            Parameter::Co2 => self.co2,
            Parameter::Ppfd => self.ppfd,
            Parameter::AirflowVelocity => self.airflow_velocity,
            Parameter::SolutionTemperature => self.solution_temperature,
            Parameter::Ec => self.ec,
            Parameter::Ph => self.ph,
            Parameter::StomataOpenings => self.stomata_openings,
            Parameter::PhotosynthesisRate => self.photosynthesis_rate,
        }
    }

    pub fn set(&mut self, parameter: Parameter, value: f64) {
        let slot = match parameter {
            Parameter::Temperature => &mut self.temperature,
            Parameter::RelativeHumidity => &mut self.relative_humidity,
            Parameter::Vpd => &mut self.vpd,
            Parameter::Co2 => &mut self.co2,
            Parameter::Ppfd => &mut self.ppfd,
            Parameter::AirflowVelocity => &mut self.airflow_velocity,
            Parameter::SolutionTemperature => &mut self.solution_temperature,
            Parameter::Ec => &mut self.ec,
            Parameter::Ph => &mut self.ph,
            Parameter::StomataOpenings => &mut self.stomata_openings,
            Parameter::PhotosynthesisRate => &mut self.photosynthesis_rate,
        };
        *slot = value;
    }
}

/// One instantaneous, noisy observation of the chamber.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorData {
    pub temperature: f64,
    pub relative_humidity: f64,
    pub vpd: f64,
    pub co2: f64,
    pub ppfd: f64,
    pub airflow_velocity: f64,
    pub solution_temperature: f64,
    pub ec: f64,
    pub ph: f64,
    pub stomata_openings: f64,
    pub photosynthesis_rate: f64,
}

impl SensorData {
    pub fn get(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Temperature => self.temperature,
            Parameter::RelativeHumidity => self.relative_humidity,
            Parameter::Vpd => self.vpd,
            Parameter::Co2 => self.co2,
            Parameter::Ppfd => self.ppfd,
            Parameter::AirflowVelocity => self.airflow_velocity,
            Parameter::SolutionTemperature => self.solution_temperature,
            Parameter::Ec => self.ec,
            Parameter::Ph => self.ph,
            Parameter::StomataOpenings => self.stomata_openings,
            Parameter::PhotosynthesisRate => self.photosynthesis_rate,
        }
    }
}

/// A perfect reading: what the sensors would report with no noise.
impl From<SetValues> for SensorData {
    fn from(set: SetValues) -> Self {
        Self {
            temperature: set.temperature,
            relative_humidity: set.relative_humidity,
            vpd: set.vpd,
            co2: set.co2,
            ppfd: set.ppfd,
            airflow_velocity: set.airflow_velocity,
            solution_temperature: set.solution_temperature,
            ec: set.ec,
            ph: set.ph,
            stomata_openings: set.stomata_openings,
            photosynthesis_rate: set.photosynthesis_rate,
        }
    }
}

/// Ambient conditions outside the chamber.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExternalConditions {
    pub temperature: f64,
    pub relative_humidity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SetValues {
        SetValues {
            temperature: 20.0,
            relative_humidity: 70.0,
            vpd: 0.7,
            co2: 450.0,
            ppfd: 0.0,
            airflow_velocity: 1.2,
            solution_temperature: 18.0,
            ec: 1.2,
            ph: 6.0,
            stomata_openings: 60.0,
            photosynthesis_rate: 12.0,
        }
    }

    #[test]
    fn test_set_then_get_every_parameter() {
        let mut values = sample();
        for (i, p) in Parameter::ALL.iter().enumerate() {
            values.set(*p, i as f64 + 0.5);
        }
        for (i, p) in Parameter::ALL.iter().enumerate() {
            assert_eq!(values.get(*p), i as f64 + 0.5);
        }
    }

    #[test]
    fn test_sensor_from_set_values_copies_fields() {
        let set = sample();
        let reading = SensorData::from(set);
        for p in Parameter::ALL {
            assert_eq!(reading.get(p), set.get(p));
        }
    }
}
