// Wire protocol DTOs and conversions for the public simulation API.

use crate::domain::{Aircraft, AircraftSnapshot, Instruction, Position, SimError, Vec2};
use crate::use_cases::{SimUpdate, Snapshot};
use serde::{Deserialize, Serialize};

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Airspace state after a change, or in answer to Query.
    Snapshot(SnapshotDto),
    // A client request was rejected; the connection stays open.
    Error { message: String },
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    // Advance the clock by one tick.
    Next,
    // Move every aircraft forward.
    Evolve(EvolveRequest),
    // Ask for the current positions without changing anything.
    Query,
}

fn default_dt() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvolveRequest {
    #[serde(default = "default_dt")]
    pub dt: f64,
}

/// Initial state for an explicitly spawned aircraft. Omitted fields default to zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpawnAircraftRequest {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub altitude_ft: f64,
    #[serde(default)]
    pub speed_kt: f64,
    #[serde(default)]
    pub heading: i32,
}

impl TryFrom<SpawnAircraftRequest> for Aircraft {
    type Error = SimError;

    fn try_from(req: SpawnAircraftRequest) -> Result<Self, Self::Error> {
        Aircraft::new(Position::new(
            Vec2::new(req.x, req.y),
            req.altitude_ft,
            req.speed_kt,
            req.heading,
        ))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnAircraftResponse {
    pub id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstructionRequest {
    pub altitude_ft: f64,
    pub speed_kt: f64,
    pub heading: i32,
}

impl TryFrom<InstructionRequest> for Instruction {
    type Error = SimError;

    fn try_from(req: InstructionRequest) -> Result<Self, Self::Error> {
        Instruction::new(req.altitude_ft, req.speed_kt, req.heading)
    }
}

/// Airspace state for a given tick.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotDto {
    pub tick: u64,
    pub aircraft: Vec<AircraftPositionDto>,
    // Text listing; only present on direct snapshot responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing: Option<String>,
}

impl From<SimUpdate> for SnapshotDto {
    fn from(update: SimUpdate) -> Self {
        Self {
            tick: update.tick,
            aircraft: update.aircraft.iter().map(AircraftPositionDto::from).collect(),
            listing: None,
        }
    }
}

impl From<Snapshot> for SnapshotDto {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            tick: snapshot.tick,
            aircraft: snapshot
                .aircraft
                .iter()
                .map(AircraftPositionDto::from)
                .collect(),
            listing: Some(snapshot.listing),
        }
    }
}

/// Flattened aircraft state for wire transmission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AircraftPositionDto {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub altitude_ft: f64,
    pub speed_kt: f64,
    pub heading: u16,
}

impl From<&AircraftSnapshot> for AircraftPositionDto {
    fn from(aircraft: &AircraftSnapshot) -> Self {
        Self {
            id: aircraft.id.0,
            x: aircraft.x,
            y: aircraft.y,
            altitude_ft: aircraft.altitude_ft,
            speed_kt: aircraft.speed_kt,
            heading: aircraft.heading,
        }
    }
}
