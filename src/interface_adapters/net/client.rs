// WebSocket surface of the simulation: pushes airspace snapshots and accepts step requests.

use crate::interface_adapters::protocol::{ClientMessage, ServerMessage, SnapshotDto};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{SimUpdate, SimulationError, SimulationHandle};

use axum::extract::{
    State,
    ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
};
use axum::response::IntoResponse;
use futures::SinkExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, watch};
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug, thiserror::Error)]
enum ConnectionError {
    #[error("websocket transport: {0}")]
    Transport(#[from] axum::Error),
    #[error("encoding server message: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("simulation task stopped")]
    SimulationGone,
    #[error("snapshot stream closed")]
    StreamClosed,
}

enum LoopControl {
    Continue,
    Disconnect,
}

const MAX_INVALID_JSON: u32 = 10;

static CONNECTION_IDS: AtomicU64 = AtomicU64::new(1);

/// Rate limit for the "client is lagging" warning, per connection.
struct LagWarning {
    last: Option<Instant>,
}

impl LagWarning {
    const EVERY: Duration = Duration::from_secs(2);

    fn new() -> Self {
        Self { last: None }
    }

    fn due(&mut self) -> bool {
        let due = self.last.is_none_or(|last| last.elapsed() >= Self::EVERY);
        if due {
            self.last = Some(Instant::now());
        }
        due
    }
}

fn encode_update(update: SimUpdate) -> Result<Utf8Bytes, serde_json::Error> {
    let msg = ServerMessage::Snapshot(SnapshotDto::from(update));
    serde_json::to_string(&msg).map(Utf8Bytes::from)
}

/// Turns simulation updates into JSON frames once, shared by every connection.
///
/// `latest_tx` is written before `frames_tx` so a connection that reads `latest_tx` after
/// subscribing to `frames_tx` never misses a newer frame.
pub async fn update_serializer(
    mut update_rx: broadcast::Receiver<SimUpdate>,
    frames_tx: broadcast::Sender<Utf8Bytes>,
    latest_tx: watch::Sender<Utf8Bytes>,
) {
    loop {
        let update = match update_rx.recv().await {
            Ok(update) => update,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "snapshot encoder fell behind the simulation");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => {
                info!("simulation stopped publishing; snapshot encoder exiting");
                return;
            }
        };

        match encode_update(update) {
            Ok(frame) => {
                latest_tx.send_replace(frame.clone());
                let _ = frames_tx.send(frame);
            }
            Err(e) => error!(error = %e, "failed to encode snapshot update"),
        }
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        let conn_id = CONNECTION_IDS.fetch_add(1, Ordering::Relaxed);
        handle_socket(socket, state).instrument(info_span!("conn", conn_id))
    })
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    // Subscribe first, then seed from the encoder's latest frame. Anything the stream
    // delivers afterwards is at least as new as the seed.
    let mut frames_rx = state.update_bytes_tx.subscribe();
    let latest_rx = state.update_latest_tx.subscribe();

    info!("client connected");

    if let Err(e) = send_initial_snapshot(&mut socket, &state.simulation, &latest_rx).await {
        warn!(error = %e, "failed to send initial snapshot");
        let _ = send_close_with_reason(&mut socket, close_code::ERROR, "simulation unavailable")
            .await;
        return;
    }

    match run_client_loop(&mut socket, &state.simulation, &mut frames_rx, &latest_rx).await {
        Ok(()) => info!("client disconnected"),
        Err(e) => warn!(error = %e, "client loop exited with error"),
    }
}

async fn send_initial_snapshot(
    socket: &mut WebSocket,
    simulation: &SimulationHandle,
    latest_rx: &watch::Receiver<Utf8Bytes>,
) -> Result<(), ConnectionError> {
    let latest = latest_rx.borrow().clone();
    if !latest.is_empty() {
        socket.send(Message::Text(latest)).await?;
        return Ok(());
    }

    // Nothing encoded yet, so there is no older frame that could overtake this one.
    let snapshot = simulation
        .snapshot()
        .await
        .map_err(|_| ConnectionError::SimulationGone)?;
    send_message(socket, &ServerMessage::Snapshot(SnapshotDto::from(snapshot))).await
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<(), ConnectionError> {
    let txt = serde_json::to_string(msg)?;
    socket.send(Message::Text(txt.into())).await?;
    Ok(())
}

async fn send_close_with_reason(
    socket: &mut WebSocket,
    code: u16,
    reason: &'static str,
) -> Result<(), ConnectionError> {
    socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await?;
    Ok(())
}

async fn run_client_loop(
    socket: &mut WebSocket,
    simulation: &SimulationHandle,
    frames_rx: &mut broadcast::Receiver<Utf8Bytes>,
    latest_rx: &watch::Receiver<Utf8Bytes>,
) -> Result<(), ConnectionError> {
    let mut invalid_json: u32 = 0;
    let mut lag_warning = LagWarning::new();

    loop {
        let control = tokio::select! {
            incoming = socket.recv() => {
                let Some(incoming) = incoming else {
                    return Ok(());
                };
                match incoming? {
                    Message::Text(text) => {
                        handle_client_text(socket, simulation, text.as_str(), &mut invalid_json).await?
                    }
                    Message::Binary(_) => {
                        let _ = send_close_with_reason(
                            socket,
                            close_code::UNSUPPORTED,
                            "binary messages not supported",
                        )
                        .await;
                        LoopControl::Disconnect
                    }
                    Message::Ping(_) | Message::Pong(_) => LoopControl::Continue,
                    Message::Close(_) => LoopControl::Disconnect,
                }
            }

            frame = frames_rx.recv() => {
                match frame {
                    Ok(bytes) => forward_bytes(socket, bytes).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        if lag_warning.due() {
                            warn!(missed = n, "client lagging; skipping to latest snapshot");
                        }
                        let latest = latest_rx.borrow().clone();
                        if latest.is_empty() {
                            LoopControl::Continue
                        } else {
                            forward_bytes(socket, latest).await
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(ConnectionError::StreamClosed);
                    }
                }
            }
        };

        if let LoopControl::Disconnect = control {
            if let Err(err) = socket.close().await {
                debug!(error = ?err, "socket close error");
            }
            return Ok(());
        }
    }
}

async fn forward_bytes(socket: &mut WebSocket, bytes: Utf8Bytes) -> LoopControl {
    match socket.send(Message::Text(bytes)).await {
        Ok(()) => LoopControl::Continue,
        Err(e) => {
            debug!(error = ?e, "failed to forward update; disconnecting");
            LoopControl::Disconnect
        }
    }
}

async fn handle_client_text(
    socket: &mut WebSocket,
    simulation: &SimulationHandle,
    text: &str,
    invalid_json: &mut u32,
) -> Result<LoopControl, ConnectionError> {
    let msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            *invalid_json += 1;
            debug!(error = %e, count = *invalid_json, "invalid client message");
            if *invalid_json >= MAX_INVALID_JSON {
                let _ =
                    send_close_with_reason(socket, close_code::POLICY, "too many invalid messages")
                        .await;
                return Ok(LoopControl::Disconnect);
            }
            send_message(
                socket,
                &ServerMessage::Error {
                    message: "invalid message".to_string(),
                },
            )
            .await?;
            return Ok(LoopControl::Continue);
        }
    };

    // State-changing requests reach the client through the update broadcast;
    // only Query and rejections are answered directly.
    let outcome = match msg {
        ClientMessage::Next => simulation.next().await.map(|_| None),
        ClientMessage::Evolve(req) => simulation.evolve(req.dt).await.map(|_| None),
        ClientMessage::Query => simulation
            .snapshot()
            .await
            .map(|snapshot| Some(ServerMessage::Snapshot(SnapshotDto::from(snapshot)))),
    };

    match outcome {
        Ok(Some(reply)) => send_message(socket, &reply).await?,
        Ok(None) => {}
        Err(SimulationError::Closed) => return Err(ConnectionError::SimulationGone),
        Err(SimulationError::Rejected(e)) => {
            send_message(
                socket,
                &ServerMessage::Error {
                    message: e.to_string(),
                },
            )
            .await?;
        }
    }
    Ok(LoopControl::Continue)
}
