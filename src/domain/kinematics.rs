// Heading/position math shared by every moving entity.
//
// Heading convention: heading 0 points along +y. The direction vector is the unit
// circle rotated by +90 degrees, so heading 90 points along -x.

use crate::domain::errors::{SimError, ensure_finite};
use std::f64::consts::PI;

/// A 2D coordinate or direction in simulation units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ORIGIN: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// Folds any integer heading into `[0, 360)`.
pub fn normalize_heading(heading_deg: i32) -> u16 {
    // rem_euclid keeps negative headings positive; the result always fits in u16.
    heading_deg.rem_euclid(360) as u16
}

/// Converts a compass heading into a unit direction vector.
///
/// The heading is normalized first so `h` and `h mod 360` map to bit-identical vectors.
pub fn heading_to_vector(heading_deg: i32) -> Vec2 {
    let normalized = f64::from(normalize_heading(heading_deg));
    let (dy, dx) = ((normalized + 90.0) * PI / 180.0).sin_cos();
    Vec2 { x: dx, y: dy }
}

/// Moves `location` by `distance` along `heading_deg`.
///
/// Zero and negative distances are valid (negative moves backwards along the heading).
/// Finite inputs whose sum overflows are rejected with `SimError::PositionOverflow`.
pub fn advance(location: Vec2, heading_deg: i32, distance: f64) -> Result<Vec2, SimError> {
    if !distance.is_finite() {
        return Err(SimError::NonFiniteDistance(distance));
    }
    ensure_finite("location.x", location.x)?;
    ensure_finite("location.y", location.y)?;

    let dir = heading_to_vector(heading_deg);
    let x = location.x + distance * dir.x;
    let y = location.y + distance * dir.y;
    if !(x.is_finite() && y.is_finite()) {
        return Err(SimError::PositionOverflow { x, y });
    }
    Ok(Vec2 { x, y })
}

/// Straight-line magnitude of `a - b`. A unitless number, not nautical miles.
pub fn euclidean_gap(a: Vec2, b: Vec2) -> f64 {
    Vec2::new(a.x - b.x, a.y - b.y).length()
}
