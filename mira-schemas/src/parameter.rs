//! Names for every quantity carried by a chamber reading or setpoint table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One field of a `SetValues` / `SensorData` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Temperature,
    RelativeHumidity,
    Vpd,
    Co2,
    Ppfd,
    AirflowVelocity,
    SolutionTemperature,
    Ec,
    Ph,
    StomataOpenings,
    PhotosynthesisRate,
}

impl Parameter {
    /// Every parameter, in reading order.
    pub const ALL: [Parameter; 11] = [
        Parameter::Temperature,
        Parameter::RelativeHumidity,
        Parameter::Vpd,
        Parameter::Co2,
        Parameter::Ppfd,
        Parameter::AirflowVelocity,
        Parameter::SolutionTemperature,
        Parameter::Ec,
        Parameter::Ph,
        Parameter::StomataOpenings,
        Parameter::PhotosynthesisRate,
    ];

    /// Parameters backed by an actuator. VPD is derived and the last two are plant responses.
    pub const ADJUSTABLE: [Parameter; 8] = [
        Parameter::Temperature,
        Parameter::RelativeHumidity,
        Parameter::Co2,
        Parameter::Ppfd,
        Parameter::AirflowVelocity,
        Parameter::SolutionTemperature,
        Parameter::Ec,
        Parameter::Ph,
    ];

    pub fn is_adjustable(self) -> bool {
        Self::ADJUSTABLE.contains(&self)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Parameter::Temperature => "Temperature",
            Parameter::RelativeHumidity => "Relative Humidity",
            Parameter::Vpd => "VPD",
            Parameter::Co2 => "CO₂",
            Parameter::Ppfd => "PPFD",
            Parameter::AirflowVelocity => "Airflow Velocity",
            Parameter::SolutionTemperature => "Solution Temperature",
            Parameter::Ec => "EC",
            Parameter::Ph => "pH",
            Parameter::StomataOpenings => "Stomata Openings",
            Parameter::PhotosynthesisRate => "Photosynthesis Rate",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Parameter::Temperature | Parameter::SolutionTemperature => "°C",
            Parameter::RelativeHumidity | Parameter::StomataOpenings => "%",
            Parameter::Vpd => "kPa",
            Parameter::Co2 => "ppm",
            Parameter::Ppfd => "μmol/m²/s",
            Parameter::AirflowVelocity => "m/s",
            Parameter::Ec => "mS/cm",
            Parameter::Ph => "",
            Parameter::PhotosynthesisRate => "μmol CO₂/m²/s",
        }
    }

    /// Snake-case key, matching the serde representation.
    pub fn key(self) -> &'static str {
        match self {
            Parameter::Temperature => "temperature",
            Parameter::RelativeHumidity => "relative_humidity",
            Parameter::Vpd => "vpd",
            Parameter::Co2 => "co2",
            Parameter::Ppfd => "ppfd",
            Parameter::AirflowVelocity => "airflow_velocity",
            Parameter::SolutionTemperature => "solution_temperature",
            Parameter::Ec => "ec",
            Parameter::Ph => "ph",
            Parameter::StomataOpenings => "stomata_openings",
            Parameter::PhotosynthesisRate => "photosynthesis_rate",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
