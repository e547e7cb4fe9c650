pub mod builder;
pub mod engine;
pub mod schedule;
pub mod state;

pub use builder::SimulationBuilder;
pub use engine::SimulationEngine;
pub use state::{SimulationEvent, SimulationSnapshot, SimulationState};
