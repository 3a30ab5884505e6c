// Use-case level inputs/outputs for the simulation task.

use crate::domain::{Aircraft, AircraftId, AircraftSnapshot, Instruction, SimError};
use crate::use_cases::manager::Snapshot;
use tokio::sync::oneshot;

/// Requests handled one at a time by the simulation task.
#[derive(Debug)]
pub enum SimCommand {
    Start {
        reply: oneshot::Sender<Snapshot>,
    },
    Next {
        reply: oneshot::Sender<Snapshot>,
    },
    Evolve {
        dt: f64,
        reply: oneshot::Sender<Result<Snapshot, SimError>>,
    },
    Spawn {
        aircraft: Aircraft,
        reply: oneshot::Sender<AircraftId>,
    },
    Instruct {
        id: AircraftId,
        instruction: Instruction,
        reply: oneshot::Sender<Result<(), SimError>>,
    },
    Snapshot {
        reply: oneshot::Sender<Snapshot>,
    },
    LogSnapshot {
        reply: oneshot::Sender<()>,
    },
}

/// Published after every state change.
#[derive(Debug, Clone)]
pub struct SimUpdate {
    pub tick: u64,
    pub aircraft: Vec<AircraftSnapshot>,
}

impl From<&Snapshot> for SimUpdate {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            tick: snapshot.tick,
            aircraft: snapshot.aircraft.clone(),
        }
    }
}

/// Errors returned by `SimulationHandle` calls.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("simulation task is not running")]
    Closed,
    #[error(transparent)]
    Rejected(#[from] SimError),
}
