use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Harvest progress of the running cycle, in grams.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldProgress {
    pub current: f64,
    pub target: f64,
}

impl YieldProgress {
    /// Fraction of target reached, in `[0, 1]`. Zero when the target is not positive.
    pub fn fraction(&self) -> f64 {
        if self.target > 0.0 {
            (self.current / self.target).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn is_met(&self) -> bool {
        self.current >= self.target
    }
}

/// One grow cycle. The optional fields are filled in when the cycle is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleData {
    pub cycle_number: u32,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    /// Length in days.
    pub duration: Option<u32>,
    /// Grams harvested.
    pub final_yield: Option<f64>,
    /// 0-100.
    pub quality: Option<f64>,
    pub average_photosynthesis: Option<f64>,
    pub average_stomata: Option<f64>,
    pub cycle_day: u32,
}

impl CycleData {
    pub fn start(cycle_number: u32, start_date: DateTime<Utc>) -> Self {
        Self {
            cycle_number,
            start_date,
            end_date: None,
            duration: None,
            final_yield: None,
            quality: None,
            average_photosynthesis: None,
            average_stomata: None,
            cycle_day: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.end_date.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_guards_zero_target() {
        let progress = YieldProgress {
            current: 10.0,
            target: 0.0,
        };
        assert_eq!(progress.fraction(), 0.0);
    }

    #[test]
    fn test_fraction_is_clamped() {
        let progress = YieldProgress {
            current: 250.0,
            target: 200.0,
        };
        assert_eq!(progress.fraction(), 1.0);
        assert!(progress.is_met());
    }
}
