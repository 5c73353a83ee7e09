//! Game simulation modules

pub mod arena;
pub mod ids;
pub mod physics;
pub mod registry;
pub mod simulation;
pub mod snapshot;
pub mod spawner;
pub mod world;

pub use arena::{Arena, ArenaCommand, ArenaError, ArenaHandle, ArenaSettings};
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use registry::Frame;
pub use world::{Coin, CoinId, InputVector, Player, PlayerId, WorldState};
