// The authoritative simulation loop and the handle callers use to reach it.
//
// One task owns the `SimulationManager`. Everything else talks to it over channels, so
// commands are applied strictly one after another.

use super::manager::{Phase, SimulationManager, Snapshot};
use super::types::{SimCommand, SimUpdate, SimulationError};
use crate::domain::{Aircraft, AircraftId, Instruction};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, broadcast, mpsc, oneshot};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Configuration for spawning a simulation task.
#[derive(Debug, Clone)]
pub struct SimulationSettings {
    /// Capacity for inbound commands.
    pub command_channel_capacity: usize,
    /// Capacity for broadcast updates.
    pub update_broadcast_capacity: usize,
    /// Automatic `next()` interval once started. Zero means callers drive every tick.
    pub tick_interval: Duration,
}

pub async fn simulation_task(
    mut cmd_rx: mpsc::Receiver<SimCommand>,
    update_tx: broadcast::Sender<SimUpdate>,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
) {
    let mut manager = SimulationManager::new();

    let mut interval = (!tick_interval.is_zero()).then(|| {
        let mut interval = tokio::time::interval(tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!("simulation task shutting down");
                break;
            }
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    debug!("all simulation handles dropped");
                    break;
                };
                handle_command(&mut manager, cmd, &update_tx);
            }
            _ = auto_tick(&mut interval) => {
                // Automatic stepping only begins after an explicit start.
                if manager.phase() == Phase::Running {
                    manager.next();
                    publish(&manager.snapshot(), &update_tx);
                }
            }
        }
    }
}

async fn auto_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn handle_command(
    manager: &mut SimulationManager,
    cmd: SimCommand,
    update_tx: &broadcast::Sender<SimUpdate>,
) {
    match cmd {
        SimCommand::Start { reply } => {
            manager.start();
            let snapshot = manager.snapshot();
            publish(&snapshot, update_tx);
            let _ = reply.send(snapshot);
        }
        SimCommand::Next { reply } => {
            manager.next();
            let snapshot = manager.snapshot();
            publish(&snapshot, update_tx);
            let _ = reply.send(snapshot);
        }
        SimCommand::Evolve { dt, reply } => {
            let result = manager.evolve(dt).map(|()| manager.snapshot());
            match &result {
                Ok(snapshot) => publish(snapshot, update_tx),
                Err(e) => warn!(error = %e, "evolve rejected"),
            }
            let _ = reply.send(result);
        }
        SimCommand::Spawn { aircraft, reply } => {
            let id = manager.spawn(aircraft);
            info!(aircraft_id = %id, "aircraft spawned");
            publish(&manager.snapshot(), update_tx);
            let _ = reply.send(id);
        }
        SimCommand::Instruct {
            id,
            instruction,
            reply,
        } => {
            let result = manager.instruct(id, instruction);
            if let Err(e) = &result {
                warn!(error = %e, "instruction rejected");
            }
            let _ = reply.send(result);
        }
        SimCommand::Snapshot { reply } => {
            let _ = reply.send(manager.snapshot());
        }
        SimCommand::LogSnapshot { reply } => {
            manager.log_snapshot();
            let _ = reply.send(());
        }
    }
}

fn publish(snapshot: &Snapshot, update_tx: &broadcast::Sender<SimUpdate>) {
    // No subscribers is fine; updates are fire-and-forget.
    let _ = update_tx.send(SimUpdate::from(snapshot));
}

/// Cloneable access to a running simulation task.
#[derive(Debug, Clone)]
pub struct SimulationHandle {
    cmd_tx: mpsc::Sender<SimCommand>,
    update_tx: broadcast::Sender<SimUpdate>,
    shutdown: Arc<Notify>,
}

impl SimulationHandle {
    /// Spawns a fresh simulation task on the current runtime.
    pub fn spawn(settings: &SimulationSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<SimCommand>(settings.command_channel_capacity);
        let (update_tx, _update_rx) =
            broadcast::channel::<SimUpdate>(settings.update_broadcast_capacity);
        let shutdown = Arc::new(Notify::new());

        tokio::spawn(simulation_task(
            cmd_rx,
            update_tx.clone(),
            settings.tick_interval,
            shutdown.clone(),
        ));

        Self {
            cmd_tx,
            update_tx,
            shutdown,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SimUpdate> {
        self.update_tx.subscribe()
    }

    pub async fn start(&self) -> Result<Snapshot, SimulationError> {
        self.request(|reply| SimCommand::Start { reply }).await
    }

    pub async fn next(&self) -> Result<Snapshot, SimulationError> {
        self.request(|reply| SimCommand::Next { reply }).await
    }

    pub async fn evolve(&self, dt: f64) -> Result<Snapshot, SimulationError> {
        Ok(self.request(|reply| SimCommand::Evolve { dt, reply }).await??)
    }

    pub async fn spawn_aircraft(&self, aircraft: Aircraft) -> Result<AircraftId, SimulationError> {
        self.request(|reply| SimCommand::Spawn { aircraft, reply })
            .await
    }

    pub async fn instruct(
        &self,
        id: AircraftId,
        instruction: Instruction,
    ) -> Result<(), SimulationError> {
        Ok(self
            .request(|reply| SimCommand::Instruct {
                id,
                instruction,
                reply,
            })
            .await??)
    }

    pub async fn snapshot(&self) -> Result<Snapshot, SimulationError> {
        self.request(|reply| SimCommand::Snapshot { reply }).await
    }

    pub async fn log_snapshot(&self) -> Result<(), SimulationError> {
        self.request(|reply| SimCommand::LogSnapshot { reply }).await
    }

    /// Stops the task. Pending and later calls fail with `SimulationError::Closed`.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> SimCommand,
    ) -> Result<T, SimulationError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.cmd_tx
            .send(make(reply_tx))
            .await
            .map_err(|_| SimulationError::Closed)?;
        reply_rx.await.map_err(|_| SimulationError::Closed)
    }
}
