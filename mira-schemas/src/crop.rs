//! Defines the data structures for a crop variety in the MIRA catalog: its cycle length,
//! target yield, starting setpoints, and the optimal environment for each growth stage.

use crate::{
    environment::SetValues,
    parameter::Parameter,
    plant::{GrowthStage, PlantStage},
};
use serde::{Deserialize, Serialize};

/// Broad growth habit of a crop. Decides the stage schedule, the yield curve family and
/// how long a cycle may overrun before it is forced to harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropProfile {
    /// Fast leafy greens and herbs (lettuce, basil). No fruiting stage.
    LeafyGreen,
    /// Fruit-bearing crops (strawberries) with a distinct fruiting stage.
    Fruiting,
}

impl CropProfile {
    /// Days spent germinating before lights come on.
    pub fn germination_days(self) -> f64 {
        match self {
            CropProfile::LeafyGreen => 2.5,
            CropProfile::Fruiting => 7.0,
        }
    }

    pub fn has_fruiting_stage(self) -> bool {
        matches!(self, CropProfile::Fruiting)
    }

    /// Hard cap on cycle length, as a multiple of the nominal cycle length.
    pub fn max_cycle_factor(self) -> f64 {
        match self {
            CropProfile::LeafyGreen => 1.0,
            CropProfile::Fruiting => 1.5,
        }
    }

    /// CO₂ setpoint reached when the crop is fully grown (ppm).
    pub fn co2_ceiling(self) -> f64 {
        match self {
            CropProfile::LeafyGreen => 800.0,
            CropProfile::Fruiting => 1200.0,
        }
    }
}

/// Optimal environment for one stage. Any field may be left unspecified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageTargets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ppfd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airflow_velocity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution_temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ec: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
}

impl StageTargets {
    pub fn get(&self, parameter: Parameter) -> Option<f64> {
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
            Parameter::StomataOpenings | Parameter::PhotosynthesisRate => None,
        }
    }

    /// Overwrites every setpoint this stage specifies, leaving the rest untouched.
    /// Does not recompute VPD.
    pub fn merge_into(&self, set: &mut SetValues) {
        for parameter in Parameter::ALL {
            if let Some(value) = self.get(parameter) {
                set.set(parameter, value);
            }
        }
    }
}

/// Optimal ranges for every growth stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalRanges {
    pub germination: StageTargets,
    pub vegetative: StageTargets,
    pub flowering: StageTargets,
    pub fruiting: StageTargets,
    pub harvest: StageTargets,
}

impl OptimalRanges {
    pub fn for_stage(&self, stage: GrowthStage) -> &StageTargets {
        match stage {
            GrowthStage::Germination => &self.germination,
            GrowthStage::Vegetative => &self.vegetative,
            GrowthStage::Flowering => &self.flowering,
            GrowthStage::Fruiting => &self.fruiting,
            GrowthStage::Harvest => &self.harvest,
        }
    }
}

/// The top-level struct representing one crop variety in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Nominal cycle length in days.
    pub cycle_length: u32,
    /// Harvest target for the first cycle, in grams.
    pub target_yield: f64,
    pub profile: CropProfile,
    pub initial_set_values: SetValues,
    #[serde(default)]
    pub initial_stage: PlantStage,
    pub optimal_ranges: OptimalRanges,
}

impl CropConfig {
    /// Cycle day at which a cycle is closed regardless of yield.
    pub fn max_cycle_days(&self) -> f64 {
        self.cycle_length as f64 * self.profile.max_cycle_factor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_only_overwrites_specified_fields() {
        let mut set = SetValues {
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
        };
        let targets = StageTargets {
            temperature: Some(18.0),
            ppfd: Some(300.0),
            ..Default::default()
        };
        targets.merge_into(&mut set);
        assert_eq!(set.temperature, 18.0);
        assert_eq!(set.ppfd, 300.0);
        assert_eq!(set.relative_humidity, 70.0);
        assert_eq!(set.airflow_velocity, 1.2);
    }

    #[test]
    fn test_profile_constants() {
        assert!(CropProfile::Fruiting.has_fruiting_stage());
        assert!(!CropProfile::LeafyGreen.has_fruiting_stage());
        assert_eq!(CropProfile::LeafyGreen.max_cycle_factor(), 1.0);
        assert_eq!(CropProfile::Fruiting.co2_ceiling(), 1200.0);
    }
}
