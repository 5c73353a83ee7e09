//! Identity generation for players and coins

use uuid::Uuid;

use super::world::{CoinId, PlayerId};

/// Source of unique entity ids, injected into the arena
pub trait IdGenerator: Send {
    fn player_id(&mut self) -> PlayerId;
    fn coin_id(&mut self) -> CoinId;
}

/// Random v4 UUIDs, used by the running server
#[derive(Debug, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn player_id(&mut self) -> PlayerId {
        PlayerId(format!("player_{}", Uuid::new_v4().simple()))
    }

    fn coin_id(&mut self) -> CoinId {
        CoinId(format!("coin_{}", Uuid::new_v4().simple()))
    }
}

/// Monotonic counter ids, deterministic for tests and replays
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}

impl IdGenerator for SequentialIds {
    fn player_id(&mut self) -> PlayerId {
        PlayerId(format!("player_{}", self.bump()))
    }

    fn coin_id(&mut self) -> CoinId {
        CoinId(format!("coin_{}", self.bump()))
    }
}
