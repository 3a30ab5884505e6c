use std::{env, time::Duration};

// Runtime/server settings read from the environment.

pub fn http_port() -> u16 {
    env::var("SIM_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3001)
}

// Zero (the default) leaves ticking to clients.
pub fn tick_interval() -> Duration {
    let millis = env::var("SIM_TICK_INTERVAL_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(0);
    Duration::from_millis(millis)
}

pub const COMMAND_CHANNEL_CAPACITY: usize = 1024;
pub const UPDATE_BROADCAST_CAPACITY: usize = 128;
