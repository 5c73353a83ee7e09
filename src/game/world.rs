//! World model: players, coins and map bounds

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Map width in world units
pub const MAP_WIDTH: f32 = 800.0;
/// Map height in world units
pub const MAP_HEIGHT: f32 = 600.0;
/// Side length of the square player body
pub const PLAYER_SIZE: f32 = 20.0;
/// Coin pickup radius
pub const COIN_RADIUS: f32 = 5.0;
/// Distance moved per simulation tick along each input axis
pub const PLAYER_SPEED: f32 = 5.0;
/// Maximum number of coins alive at once
pub const MAX_COINS: usize = 10;
/// Coins never spawn closer than this to a wall
pub const COIN_SPAWN_INSET: i32 = 20;
/// Players spawn at least this far from the map edges
pub const PLAYER_SPAWN_MARGIN: i32 = 50;

/// Opaque player identity, unique for the lifetime of the process
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque coin identity
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoinId(pub String);

impl fmt::Display for CoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Movement direction requested by a client, each axis in {-1, 0, 1}
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputVector {
    pub x: i8,
    pub y: i8,
}

impl InputVector {
    pub const IDLE: Self = Self { x: 0, y: 0 };

    pub fn is_idle(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

/// Authoritative player record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub color: String,
    pub score: u32,
    pub input: InputVector,
}

impl Player {
    pub fn new(id: PlayerId, x: f32, y: f32, color: String) -> Self {
        Self {
            id,
            x,
            y,
            color,
            score: 0,
            input: InputVector::IDLE,
        }
    }

    /// Center of the player's square body
    pub fn center(&self) -> (f32, f32) {
        (self.x + PLAYER_SIZE / 2.0, self.y + PLAYER_SIZE / 2.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: CoinId,
    pub x: f32,
    pub y: f32,
}

/// The single authoritative world instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub players: BTreeMap<PlayerId, Player>,
    pub coins: Vec<Coin>,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_player(&mut self, player: Player) {
        self.players.insert(player.id.clone(), player);
    }

    pub fn remove_player(&mut self, id: &PlayerId) -> Option<Player> {
        self.players.remove(id)
    }

    /// Overwrite a player's stored input. Returns false if the player is gone.
    pub fn set_input(&mut self, id: &PlayerId, input: InputVector) -> bool {
        match self.players.get_mut(id) {
            Some(player) => {
                player.input = input;
                true
            }
            None => false,
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn coin_count(&self) -> usize {
        self.coins.len()
    }
}
