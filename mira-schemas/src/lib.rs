//! Shared data model for the MIRA grow-chamber simulation.

pub mod action;
pub mod actuator;
pub mod crop;
pub mod cycle;
pub mod environment;
pub mod file_formats;
pub mod parameter;
pub mod plant;
