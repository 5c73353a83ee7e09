//! Fixed-tick simulation: movement then coin pickups

use super::physics::PhysicsSystem;
use super::world::{CoinId, PlayerId, WorldState};

/// A coin collected during a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pickup {
    pub player_id: PlayerId,
    pub coin_id: CoinId,
}

/// Run one simulation tick over the world.
///
/// Players are visited in id order. Each player moves by its stored input, is
/// clamped into the map, then collects every coin its center overlaps. A
/// player may collect several coins in one tick; each coin is awarded once.
pub fn run_tick(world: &mut WorldState) -> Vec<Pickup> {
    let mut pickups = Vec::new();

    for player in world.players.values_mut() {
        let (x, y) = PhysicsSystem::step_player(player.x, player.y, player.input);
        player.x = x;
        player.y = y;

        let (px, py) = player.center();
        let before = world.coins.len();
        world.coins.retain(|coin| {
            if PhysicsSystem::touches_coin(px, py, coin.x, coin.y) {
                pickups.push(Pickup {
                    player_id: player.id.clone(),
                    coin_id: coin.id.clone(),
                });
                false
            } else {
                true
            }
        });

        player.score += (before - world.coins.len()) as u32;
    }

    pickups
}
