//! Simulation engine for a climate-controlled grow chamber.
//!
//! A [`simulation::SimulationEngine`] owns one session: the crop being grown, the
//! chamber setpoints, a synthetic sensor feed and a rule-based control agent that
//! nudges setpoints toward the targets of the current growth stage.

pub mod actuators;
pub mod agent;
pub mod analysis;
pub mod catalog;
pub mod climate;
pub mod error;
pub mod growth;
pub mod logger;
pub mod sensors;
pub mod simulation;
pub mod vpd;

pub use error::MiraError;
