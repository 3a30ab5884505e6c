// The collection of aircraft in the simulated sector.

use crate::domain::aircraft::{Aircraft, Instruction};
use crate::domain::errors::SimError;
use crate::domain::state::AircraftSnapshot;
use std::collections::BTreeMap;
use std::fmt;

/// Stable aircraft identity, assigned in spawn order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AircraftId(pub u64);

impl fmt::Display for AircraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Aircraft keyed by id. Ids only grow, so iteration order is spawn order.
#[derive(Debug, Clone, Default)]
pub struct Airspace {
    aircraft: BTreeMap<AircraftId, Aircraft>,
    next_id: u64,
}

impl Airspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one aircraft in its default state (origin, heading 0).
    pub fn spawn(&mut self) -> AircraftId {
        self.spawn_with(Aircraft::default())
    }

    pub fn spawn_with(&mut self, aircraft: Aircraft) -> AircraftId {
        self.next_id += 1;
        let id = AircraftId(self.next_id);
        self.aircraft.insert(id, aircraft);
        id
    }

    pub fn len(&self) -> usize {
        self.aircraft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aircraft.is_empty()
    }

    pub fn get(&self, id: AircraftId) -> Option<&Aircraft> {
        self.aircraft.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AircraftId, &Aircraft)> {
        self.aircraft.iter().map(|(id, a)| (*id, a))
    }

    /// Stores a pending clearance for one aircraft. The clearance is not flown.
    pub fn instruct(&mut self, id: AircraftId, instruction: Instruction) -> Result<(), SimError> {
        let aircraft = self
            .aircraft
            .get_mut(&id)
            .ok_or(SimError::UnknownAircraft(id))?;
        aircraft.set_instruction(instruction);
        Ok(())
    }

    /// Moves every aircraft along its heading for `dt` units of time.
    ///
    /// All or nothing: if any aircraft cannot move, none of them do.
    pub fn proceed_all(&mut self, dt: f64) -> Result<(), SimError> {
        if !dt.is_finite() {
            return Err(SimError::NonFiniteDeltaTime(dt));
        }
        let moved = self
            .aircraft
            .values()
            .map(|aircraft| aircraft.location_after(dt))
            .collect::<Result<Vec<_>, _>>()?;
        for (aircraft, location) in self.aircraft.values_mut().zip(moved) {
            aircraft.move_to(location);
        }
        Ok(())
    }

    /// Structured per-aircraft view in spawn order.
    pub fn snapshots(&self) -> Vec<AircraftSnapshot> {
        self.iter().map(AircraftSnapshot::from).collect()
    }

    /// One line per aircraft, in spawn order. Empty airspace renders as "".
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for aircraft in self.aircraft.values() {
            out.push_str(&aircraft.describe());
            out.push('\n');
        }
        out
    }
}
