// Shared HTTP response types for consistent API error payloads.

use crate::domain::SimError;
use crate::use_cases::SimulationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    // Human-readable error string for consistent JSON error responses.
    pub error: String,
}

pub fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

pub fn simulation_error_response(err: SimulationError) -> Response {
    let status = match &err {
        SimulationError::Closed => StatusCode::SERVICE_UNAVAILABLE,
        SimulationError::Rejected(SimError::UnknownAircraft(_)) => StatusCode::NOT_FOUND,
        SimulationError::Rejected(_) => StatusCode::BAD_REQUEST,
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "simulation unavailable");
    }
    error_response(status, err.to_string())
}
