//! Network plumbing shared by the arena and connections

pub mod latency;

pub use latency::{DelayQueue, Delivery};
