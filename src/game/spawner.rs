//! Coin spawning and random placement

use rand::Rng;

use super::ids::IdGenerator;
use super::world::{
    Coin, WorldState, COIN_SPAWN_INSET, MAP_HEIGHT, MAP_WIDTH, MAX_COINS, PLAYER_SPAWN_MARGIN,
};

/// Keeps the coin population topped up, one coin per spawn tick
#[derive(Debug, Clone)]
pub struct CoinSpawner {
    cap: usize,
    inset: i32,
}

impl Default for CoinSpawner {
    fn default() -> Self {
        Self {
            cap: MAX_COINS,
            inset: COIN_SPAWN_INSET,
        }
    }
}

impl CoinSpawner {
    pub fn new(cap: usize, inset: i32) -> Self {
        Self { cap, inset }
    }

    /// Spawn one coin if the world is below the cap. Returns the new coin.
    pub fn tick<R: Rng + ?Sized>(
        &self,
        world: &mut WorldState,
        rng: &mut R,
        ids: &mut dyn IdGenerator,
    ) -> Option<Coin> {
        if world.coins.len() >= self.cap {
            return None;
        }

        let coin = Coin {
            id: ids.coin_id(),
            x: rng.gen_range(self.inset..=MAP_WIDTH as i32 - self.inset) as f32,
            y: rng.gen_range(self.inset..=MAP_HEIGHT as i32 - self.inset) as f32,
        };
        world.coins.push(coin.clone());
        Some(coin)
    }
}

/// Random integer spawn point for a new player, away from the walls
pub fn player_spawn_position<R: Rng + ?Sized>(rng: &mut R) -> (f32, f32) {
    let x = rng.gen_range(PLAYER_SPAWN_MARGIN..=MAP_WIDTH as i32 - PLAYER_SPAWN_MARGIN);
    let y = rng.gen_range(PLAYER_SPAWN_MARGIN..=MAP_HEIGHT as i32 - PLAYER_SPAWN_MARGIN);
    (x as f32, y as f32)
}

/// Random display color as "#rrggbb"
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("#{:06x}", rng.gen_range(0..=0xFF_FFFFu32))
}
