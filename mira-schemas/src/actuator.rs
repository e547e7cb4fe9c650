use serde::{Deserialize, Serialize};

/// Duty of each chamber actuator, 0-100 %.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActuatorState {
    /// Dehumidifying heat pump.
    pub heat_pump: f64,
    pub cooldown: f64,
    /// Free cooling from outside air; only useful when it is cooler outside.
    pub waterside_economizer: f64,
    pub co2_valve: f64,
    /// Nutrient solution chiller.
    pub chiller: f64,
    pub ec_pump: f64,
    pub ph_pump: f64,
    pub led_dimmer: f64,
}
