// Domain-level errors for simulation inputs.

use crate::domain::airspace::AircraftId;

/// Rejected inputs. Finite inputs never fail; these guard against NaN/inf leaking into state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("time delta must be finite, got {0}")]
    NonFiniteDeltaTime(f64),
    #[error("distance must be finite, got {0}")]
    NonFiniteDistance(f64),
    #[error("{field} must be finite, got {value}")]
    NonFiniteValue { field: &'static str, value: f64 },
    #[error("speed must not be negative, got {0}")]
    NegativeSpeed(f64),
    #[error("time delta {dt} at rate {rate} overflows the travel distance")]
    DistanceOverflow { dt: f64, rate: f64 },
    #[error("movement leaves the representable range at ({x}, {y})")]
    PositionOverflow { x: f64, y: f64 },
    #[error("aircraft {0} not found")]
    UnknownAircraft(AircraftId),
}

/// Returns the value unchanged if finite, otherwise a `NonFiniteValue` error naming the field.
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64, SimError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimError::NonFiniteValue { field, value })
    }
}
