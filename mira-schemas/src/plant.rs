//! Growth stages and the simulated calendar.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five phases of a grow cycle, in the order a plant passes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStage {
    Germination,
    Vegetative,
    Flowering,
    Fruiting,
    Harvest,
}

impl GrowthStage {
    pub const ALL: [GrowthStage; 5] = [
        GrowthStage::Germination,
        GrowthStage::Vegetative,
        GrowthStage::Flowering,
        GrowthStage::Fruiting,
        GrowthStage::Harvest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GrowthStage::Germination => "germination",
            GrowthStage::Vegetative => "vegetative",
            GrowthStage::Flowering => "flowering",
            GrowthStage::Fruiting => "fruiting",
            GrowthStage::Harvest => "harvest",
        }
    }
}

impl fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The stage a plant is in, and the cycle day it entered that stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantStage {
    pub stage: GrowthStage,
    pub day: u32,
}

impl Default for PlantStage {
    fn default() -> Self {
        Self {
            stage: GrowthStage::Germination,
            day: 0,
        }
    }
}

/// Simulated wall clock. `cycle_day` counts days since the current grow cycle began.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationTime {
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub cycle_day: u32,
}

impl SimulationTime {
    /// Every cycle starts at 06:00 of a fresh day index.
    pub const CYCLE_START: SimulationTime = SimulationTime {
        day: 0,
        hour: 6,
        minute: 0,
        cycle_day: 0,
    };

    /// Lamps may run between 06:00 and 18:00.
    pub fn is_daytime(&self) -> bool {
        (6..18).contains(&self.hour)
    }
}

impl Default for SimulationTime {
    fn default() -> Self {
        Self::CYCLE_START
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_follows_growth() {
        let mut sorted = GrowthStage::ALL;
        sorted.sort();
        assert_eq!(sorted, GrowthStage::ALL);
    }

    #[test]
    fn test_daytime_window() {
        let mut t = SimulationTime::CYCLE_START;
        assert!(t.is_daytime());
        t.hour = 18;
        assert!(!t.is_daytime());
        t.hour = 5;
        assert!(!t.is_daytime());
    }
}
