//! Time utilities and tick rates for the arena

use std::time::{Duration, Instant};

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Tick rate configuration
pub const SIMULATION_TPS: u32 = 60; // physics ticks per second
pub const BROADCAST_TPS: u32 = 30; // state updates per second
pub const COIN_SPAWN_INTERVAL_MS: u64 = 3_000;

/// Artificial one-way latency applied to every message
pub const DEFAULT_LATENCY_MS: u64 = 200;

/// Render delay behind "now" on the client, must exceed the broadcast period
pub const INTERPOLATION_DELAY_MS: u64 = 150;

pub fn simulation_period() -> Duration {
    Duration::from_micros(1_000_000 / SIMULATION_TPS as u64)
}

pub fn broadcast_period() -> Duration {
    Duration::from_micros(1_000_000 / BROADCAST_TPS as u64)
}

pub fn coin_spawn_period() -> Duration {
    Duration::from_millis(COIN_SPAWN_INTERVAL_MS)
}
