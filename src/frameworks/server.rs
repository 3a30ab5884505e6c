// Boots the airspace simulation: logging, the simulation task, its snapshot encoder and the
// HTTP/WebSocket routes in front of them.

use crate::frameworks::config;
use crate::interface_adapters::net::{rest, update_serializer, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{SimulationHandle, SimulationSettings};

use axum::{
    Router,
    extract::ws::Utf8Bytes,
    routing::{get, post},
};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch};
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().with_current_span(true).init(),
        _ => builder.compact().init(),
    }
}

fn log_panics() {
    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "simulation server panicked");
    }));
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/simulation/start", post(rest::start_handler))
        .route("/simulation/next", post(rest::next_handler))
        .route("/simulation/evolve", post(rest::evolve_handler))
        .route("/simulation/log", post(rest::log_snapshot_handler))
        .route(
            "/aircraft",
            get(rest::list_aircraft_handler).post(rest::spawn_aircraft_handler),
        )
        .route("/aircraft/{id}", get(rest::get_aircraft_handler))
        .route("/aircraft/{id}/instruction", post(rest::instruct_handler))
        .with_state(state)
}

/// Serves the simulation on an already bound listener until the server stops.
pub async fn run(listener: TcpListener) -> io::Result<()> {
    let address = listener.local_addr()?;
    let app = router(boot_simulation().await?);

    tracing::info!(%address, "airspace simulation accepting connections");
    axum::serve(listener, app)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "simulation server stopped"))
}

/// Reads `.env` and the environment, sets up logging, then binds and serves.
pub async fn run_with_config() -> io::Result<()> {
    // A missing .env is normal; the process environment still applies.
    let _ = dotenvy::dotenv();
    init_tracing();
    log_panics();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));
    let listener = TcpListener::bind(address)
        .await
        .inspect_err(|e| tracing::error!(%address, error = %e, "cannot bind simulation port"))?;

    run(listener).await
}

/// Spawns the simulation task and its encoder, starts the run and logs the first snapshot.
///
/// Returns once the start snapshot has been encoded, so every WebSocket client is seeded
/// from the encoder rather than from a separate request.
async fn boot_simulation() -> io::Result<Arc<AppState>> {
    let settings = SimulationSettings {
        command_channel_capacity: config::COMMAND_CHANNEL_CAPACITY,
        update_broadcast_capacity: config::UPDATE_BROADCAST_CAPACITY,
        tick_interval: config::tick_interval(),
    };
    tracing::debug!(
        tick_interval_ms = settings.tick_interval.as_millis(),
        "simulation configured"
    );

    let simulation = SimulationHandle::spawn(&settings);

    let (frames_tx, _) = broadcast::channel::<Utf8Bytes>(config::UPDATE_BROADCAST_CAPACITY);
    let (latest_tx, mut latest_rx) = watch::channel(Utf8Bytes::from(""));
    tokio::spawn(update_serializer(
        simulation.subscribe(),
        frames_tx.clone(),
        latest_tx.clone(),
    ));

    simulation
        .start()
        .await
        .map_err(|e| io::Error::other(format!("simulation did not start: {e}")))?;
    latest_rx
        .changed()
        .await
        .map_err(|e| io::Error::other(format!("snapshot encoder stopped: {e}")))?;
    simulation
        .log_snapshot()
        .await
        .map_err(|e| io::Error::other(format!("simulation did not log its snapshot: {e}")))?;

    Ok(Arc::new(AppState {
        simulation,
        update_bytes_tx: frames_tx,
        update_latest_tx: latest_tx,
    }))
}
