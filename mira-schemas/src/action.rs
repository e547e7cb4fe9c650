use crate::parameter::Parameter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSource {
    Ai,
    Manual,
}

/// One setpoint change, either proposed by the control agent or entered by an operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub parameter: Parameter,
    pub old_value: f64,
    pub new_value: f64,
    pub reason: String,
    pub source: ActionSource,
}

impl ActionLogEntry {
    pub fn delta(&self) -> f64 {
        self.new_value - self.old_value
    }
}
