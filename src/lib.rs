//! Coin Arena - authoritative multiplayer arena with latency simulation
//! and client-side interpolation

pub mod app;
pub mod client;
pub mod config;
pub mod game;
pub mod http;
pub mod net;
pub mod util;
pub mod ws;
