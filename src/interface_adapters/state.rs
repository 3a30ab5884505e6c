use crate::use_cases::SimulationHandle;
use axum::extract::ws::Utf8Bytes;
use tokio::sync::{broadcast, watch};

#[derive(Clone)]
pub struct AppState {
    // Handle to the single task that owns the simulation.
    pub simulation: SimulationHandle,
    // Serialized snapshot updates, shared across all connections.
    pub update_bytes_tx: broadcast::Sender<Utf8Bytes>,
    // Latest serialized update for lag recovery and new connections.
    pub update_latest_tx: watch::Sender<Utf8Bytes>,
}
