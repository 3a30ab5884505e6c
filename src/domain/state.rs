// Read-only views of simulation entities handed to outer layers.

use crate::domain::aircraft::Aircraft;
use crate::domain::airspace::AircraftId;

#[derive(Debug, Clone, PartialEq)]
pub struct AircraftSnapshot {
    pub id: AircraftId,
    pub x: f64,
    pub y: f64,
    pub altitude_ft: f64,
    pub speed_kt: f64,
    pub heading: u16,
}

impl From<(AircraftId, &Aircraft)> for AircraftSnapshot {
    fn from((id, aircraft): (AircraftId, &Aircraft)) -> Self {
        let p = aircraft.position();
        Self {
            id,
            x: p.location.x,
            y: p.location.y,
            altitude_ft: p.altitude_ft,
            speed_kt: p.speed_kt,
            heading: p.heading(),
        }
    }
}
