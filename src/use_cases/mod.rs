// Use cases layer: application workflows for the simulation.

pub mod manager;
pub mod simulation;
pub mod types;

pub use manager::{Phase, SimulationManager, Snapshot};
pub use simulation::{SimulationHandle, SimulationSettings};
pub use types::{SimCommand, SimUpdate, SimulationError};
