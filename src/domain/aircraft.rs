// A single simulated aircraft: kinematic state plus a pending clearance.

use crate::domain::errors::{SimError, ensure_finite};
use crate::domain::kinematics::{self, Vec2};

/// Distance per unit of time used when an aircraft has no positive speed set.
pub const UNIT_RATE: f64 = 1.0;

/// Kinematic state of an aircraft.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub location: Vec2,
    pub altitude_ft: f64,
    /// Never negative once validated. Zero means "unset" and moves at `UNIT_RATE`.
    pub speed_kt: f64,
    // Always within 0..360; only `Position::new` and `set_heading` write it.
    heading: u16,
}

impl Position {
    pub fn new(location: Vec2, altitude_ft: f64, speed_kt: f64, heading_deg: i32) -> Self {
        Self {
            location,
            altitude_ft,
            speed_kt,
            heading: kinematics::normalize_heading(heading_deg),
        }
    }

    pub fn heading(&self) -> u16 {
        self.heading
    }

    pub fn set_heading(&mut self, heading_deg: i32) {
        self.heading = kinematics::normalize_heading(heading_deg);
    }

    /// Distance covered per unit of time. Unset (zero) speed falls back to `UNIT_RATE`.
    pub fn rate(&self) -> f64 {
        if self.speed_kt > 0.0 {
            self.speed_kt
        } else {
            UNIT_RATE
        }
    }

    fn validate(&self) -> Result<(), SimError> {
        ensure_finite("location.x", self.location.x)?;
        ensure_finite("location.y", self.location.y)?;
        ensure_finite("altitude_ft", self.altitude_ft)?;
        if ensure_finite("speed_kt", self.speed_kt)? < 0.0 {
            return Err(SimError::NegativeSpeed(self.speed_kt));
        }
        Ok(())
    }
}

/// Pending clearance for an aircraft.
///
/// Stored and reported, but nothing applies it to `Position` yet.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Instruction {
    pub altitude_ft: f64,
    pub speed_kt: f64,
    heading: u16,
}

impl Instruction {
    pub fn new(altitude_ft: f64, speed_kt: f64, heading_deg: i32) -> Result<Self, SimError> {
        Ok(Self {
            altitude_ft: ensure_finite("instruction.altitude_ft", altitude_ft)?,
            speed_kt: ensure_finite("instruction.speed_kt", speed_kt)?,
            heading: kinematics::normalize_heading(heading_deg),
        })
    }

    pub fn heading(&self) -> u16 {
        self.heading
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aircraft {
    position: Position,
    instruction: Instruction,
}

impl Aircraft {
    /// Builds an aircraft at an explicit initial state.
    pub fn new(position: Position) -> Result<Self, SimError> {
        position.validate()?;
        Ok(Self {
            position,
            instruction: Instruction::default(),
        })
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn instruction(&self) -> &Instruction {
        &self.instruction
    }

    pub fn set_instruction(&mut self, instruction: Instruction) {
        self.instruction = instruction;
    }

    /// Where `proceed(dt)` would put the aircraft, without moving it.
    pub fn location_after(&self, dt: f64) -> Result<Vec2, SimError> {
        if !dt.is_finite() {
            return Err(SimError::NonFiniteDeltaTime(dt));
        }
        let rate = self.position.rate();
        let distance = dt * rate;
        if !distance.is_finite() {
            return Err(SimError::DistanceOverflow { dt, rate });
        }
        kinematics::advance(
            self.position.location,
            i32::from(self.position.heading),
            distance,
        )
    }

    /// Moves the aircraft along its current heading for `dt` units of time.
    /// On error the position is left untouched.
    pub fn proceed(&mut self, dt: f64) -> Result<(), SimError> {
        self.position.location = self.location_after(dt)?;
        Ok(())
    }

    pub(crate) fn move_to(&mut self, location: Vec2) {
        self.position.location = location;
    }

    pub fn describe(&self) -> String {
        let p = &self.position;
        format!(
            "Aircraft Position: [{:.3}, {:.3}] Altitude: {:.0}ft Speed: {:.0}kt Heading: {:03}",
            p.location.x, p.location.y, p.altitude_ft, p.speed_kt, p.heading
        )
    }
}
