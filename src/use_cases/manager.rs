// Time-stepped owner of the simulation clock and the live airspace.

use crate::domain::{Aircraft, AircraftId, AircraftSnapshot, Airspace, Instruction, SimError};
use std::io::{self, Write};
use tracing::{debug, info, warn};

pub const SNAPSHOT_START_MARKER: &str = "*** Airspace Snapshot Start ***";
pub const SNAPSHOT_END_MARKER: &str = "*** Airspace Snapshot End ***";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Running,
}

/// Point-in-time copy of the airspace at a given tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub tick: u64,
    /// Human-readable listing, one line per aircraft.
    pub listing: String,
    pub aircraft: Vec<AircraftSnapshot>,
}

impl Snapshot {
    /// The listing bracketed by the fixed start/end markers.
    pub fn render(&self) -> String {
        format!(
            "{SNAPSHOT_START_MARKER}\ntick: {}\n{}{SNAPSHOT_END_MARKER}\n",
            self.tick, self.listing
        )
    }
}

/// Single-threaded simulation state. Share it through `SimulationHandle`, not directly.
#[derive(Debug)]
pub struct SimulationManager {
    phase: Phase,
    tick: u64,
    airspace: Airspace,
}

impl Default for SimulationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationManager {
    pub fn new() -> Self {
        Self {
            phase: Phase::Uninitialized,
            tick: 0,
            airspace: Airspace::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn airspace(&self) -> &Airspace {
        &self.airspace
    }

    /// Resets the clock and replaces the airspace with one holding a single fresh aircraft.
    pub fn start(&mut self) {
        self.tick = 0;
        self.airspace = Airspace::new();
        self.airspace.spawn();
        self.phase = Phase::Running;
        info!(tick = self.tick, "simulation started");
    }

    /// Advances the clock by one tick and spawns one more aircraft.
    ///
    /// Existing aircraft do not move here; `evolve` is the motion step.
    pub fn next(&mut self) {
        if self.phase == Phase::Uninitialized {
            warn!("next called before start; stepping an empty simulation");
            self.phase = Phase::Running;
        }
        self.tick += 1;
        let id = self.airspace.spawn();
        debug!(tick = self.tick, aircraft_id = %id, "tick advanced");
    }

    /// Moves every existing aircraft forward by `dt` time units. The tick is unchanged.
    pub fn evolve(&mut self, dt: f64) -> Result<(), SimError> {
        self.airspace.proceed_all(dt)?;
        debug!(tick = self.tick, dt, "airspace evolved");
        Ok(())
    }

    pub fn spawn(&mut self, aircraft: Aircraft) -> AircraftId {
        self.airspace.spawn_with(aircraft)
    }

    pub fn instruct(&mut self, id: AircraftId, instruction: Instruction) -> Result<(), SimError> {
        self.airspace.instruct(id, instruction)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            listing: self.airspace.describe(),
            aircraft: self.airspace.snapshots(),
        }
    }

    /// Emits the bracketed snapshot through the tracing subscriber.
    pub fn log_snapshot(&self) {
        let snapshot = self.snapshot();
        info!(
            tick = snapshot.tick,
            aircraft = snapshot.aircraft.len(),
            "\n{}",
            snapshot.render()
        );
    }

    /// Writes the bracketed snapshot to an arbitrary sink.
    pub fn write_snapshot<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.snapshot().render().as_bytes())?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Position, Vec2};

    fn rendered(manager: &SimulationManager) -> String {
        let mut out = Vec::new();
        manager.write_snapshot(&mut out).expect("vec sink");
        String::from_utf8(out).expect("utf8 output")
    }

    #[test]
    fn new_manager_is_uninitialized_and_empty() {
        let manager = SimulationManager::new();
        assert_eq!(manager.phase(), Phase::Uninitialized);
        assert_eq!(manager.tick(), 0);
        assert!(manager.airspace().is_empty());
    }

    #[test]
    fn start_then_snapshot_lists_one_aircraft_at_origin() {
        let mut manager = SimulationManager::new();
        manager.start();
        assert_eq!(manager.phase(), Phase::Running);

        let text = rendered(&manager);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.first(), Some(&SNAPSHOT_START_MARKER));
        assert_eq!(lines.last(), Some(&SNAPSHOT_END_MARKER));
        assert_eq!(lines[1], "tick: 0");
        // Markers, tick line, and exactly one aircraft line.
        assert_eq!(lines.len(), 4);
        assert!(lines[2].contains("[0.000, 0.000]"));

        let snapshot = manager.snapshot();
        assert_eq!(snapshot.aircraft.len(), 1);
        assert_eq!((snapshot.aircraft[0].x, snapshot.aircraft[0].y), (0.0, 0.0));
    }

    #[test]
    fn next_increments_tick_and_spawns() {
        let mut manager = SimulationManager::new();
        manager.start();
        manager.next();
        assert_eq!(manager.tick(), 1);
        assert_eq!(manager.airspace().len(), 2);
    }

    #[test]
    fn next_does_not_move_existing_aircraft() {
        let mut manager = SimulationManager::new();
        manager.start();
        manager.next();
        manager.next();
        assert!(
            manager
                .snapshot()
                .aircraft
                .iter()
                .all(|a| a.x == 0.0 && a.y == 0.0)
        );
    }

    #[test]
    fn start_resets_clock_and_airspace() {
        let mut manager = SimulationManager::new();
        manager.start();
        for _ in 0..3 {
            manager.next();
        }
        manager.start();
        assert_eq!(manager.tick(), 0);
        assert_eq!(manager.airspace().len(), 1);
    }

    #[test]
    fn next_before_start_still_steps() {
        let mut manager = SimulationManager::new();
        manager.next();
        assert_eq!(manager.phase(), Phase::Running);
        assert_eq!(manager.tick(), 1);
        assert_eq!(manager.airspace().len(), 1);
    }

    #[test]
    fn evolve_moves_aircraft_without_ticking() {
        let mut manager = SimulationManager::new();
        manager.start();
        let id = manager.spawn(
            Aircraft::new(Position::new(Vec2::new(0.0, 0.0), 3000.0, 2.0, 180)).expect("finite"),
        );
        manager.evolve(1.0).expect("finite dt");

        assert_eq!(manager.tick(), 0);
        let moved = manager
            .snapshot()
            .aircraft
            .into_iter()
            .find(|a| a.id == id)
            .expect("spawned aircraft");
        assert!((moved.y + 2.0).abs() < 1e-3);
    }

    #[test]
    fn evolve_rejects_non_finite_dt() {
        let mut manager = SimulationManager::new();
        manager.start();
        assert_eq!(
            manager.evolve(f64::NEG_INFINITY),
            Err(SimError::NonFiniteDeltaTime(f64::NEG_INFINITY))
        );
    }

    #[test]
    fn logging_does_not_mutate_state() {
        let mut manager = SimulationManager::new();
        manager.start();
        let before = manager.snapshot();
        manager.log_snapshot();
        let _ = rendered(&manager);
        assert_eq!(manager.snapshot(), before);
    }
}
