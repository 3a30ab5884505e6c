// Request/response routes that map 1:1 onto simulation handle calls.

use crate::domain::{Aircraft, AircraftId, Instruction};
use crate::interface_adapters::http::{error_response, simulation_error_response};
use crate::interface_adapters::protocol::{
    AircraftPositionDto, EvolveRequest, InstructionRequest, SnapshotDto, SpawnAircraftRequest,
    SpawnAircraftResponse,
};
use crate::interface_adapters::state::AppState;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

pub async fn start_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.simulation.start().await {
        Ok(snapshot) => Json(SnapshotDto::from(snapshot)).into_response(),
        Err(e) => simulation_error_response(e),
    }
}

pub async fn next_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.simulation.next().await {
        Ok(snapshot) => Json(SnapshotDto::from(snapshot)).into_response(),
        Err(e) => simulation_error_response(e),
    }
}

pub async fn evolve_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EvolveRequest>,
) -> Response {
    match state.simulation.evolve(payload.dt).await {
        Ok(snapshot) => Json(SnapshotDto::from(snapshot)).into_response(),
        Err(e) => simulation_error_response(e),
    }
}

pub async fn log_snapshot_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.simulation.log_snapshot().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => simulation_error_response(e),
    }
}

pub async fn list_aircraft_handler(State(state): State<Arc<AppState>>) -> Response {
    match state.simulation.snapshot().await {
        Ok(snapshot) => {
            let aircraft: Vec<AircraftPositionDto> = snapshot
                .aircraft
                .iter()
                .map(AircraftPositionDto::from)
                .collect();
            Json(aircraft).into_response()
        }
        Err(e) => simulation_error_response(e),
    }
}

pub async fn get_aircraft_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Response {
    let snapshot = match state.simulation.snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => return simulation_error_response(e),
    };

    match snapshot.aircraft.iter().find(|a| a.id == AircraftId(id)) {
        Some(aircraft) => Json(AircraftPositionDto::from(aircraft)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, format!("aircraft {id} not found")),
    }
}

pub async fn spawn_aircraft_handler(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<SpawnAircraftRequest>>,
) -> Response {
    // An empty body spawns a default aircraft at the origin.
    let request = payload.map(|Json(req)| req).unwrap_or_default();
    let aircraft = match Aircraft::try_from(request) {
        Ok(aircraft) => aircraft,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match state.simulation.spawn_aircraft(aircraft).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(SpawnAircraftResponse { id: id.0 }),
        )
            .into_response(),
        Err(e) => simulation_error_response(e),
    }
}

pub async fn instruct_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(payload): Json<InstructionRequest>,
) -> Response {
    let instruction = match Instruction::try_from(payload) {
        Ok(instruction) => instruction,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match state.simulation.instruct(AircraftId(id), instruction).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => simulation_error_response(e),
    }
}
