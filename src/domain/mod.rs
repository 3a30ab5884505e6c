// Domain layer: core simulation types and rules.

pub mod aircraft;
pub mod airspace;
pub mod errors;
pub mod kinematics;
pub mod state;

pub use aircraft::{Aircraft, Instruction, Position};
pub use airspace::{AircraftId, Airspace};
pub use errors::SimError;
pub use kinematics::Vec2;
pub use state::AircraftSnapshot;
