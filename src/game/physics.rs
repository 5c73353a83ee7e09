//! Player movement and coin overlap tests

use super::world::{InputVector, COIN_RADIUS, MAP_HEIGHT, MAP_WIDTH, PLAYER_SIZE, PLAYER_SPEED};

/// Stateless physics helpers used by the simulation tick
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Advance a player one tick along its input and clamp into the map.
    /// Returns (new_x, new_y)
    pub fn step_player(x: f32, y: f32, input: InputVector) -> (f32, f32) {
        // Inputs outside {-1, 0, 1} never reach here, clamp anyway
        let dx = input.x.clamp(-1, 1) as f32 * PLAYER_SPEED;
        let dy = input.y.clamp(-1, 1) as f32 * PLAYER_SPEED;

        Self::clamp_to_map(x + dx, y + dy)
    }

    /// Keep the player's whole body inside the map
    pub fn clamp_to_map(x: f32, y: f32) -> (f32, f32) {
        (
            x.clamp(0.0, MAP_WIDTH - PLAYER_SIZE),
            y.clamp(0.0, MAP_HEIGHT - PLAYER_SIZE),
        )
    }

    /// Pickup threshold: player half-size plus coin radius
    pub fn pickup_distance() -> f32 {
        PLAYER_SIZE / 2.0 + COIN_RADIUS
    }

    /// Check whether a player centered at (px, py) touches a coin at (cx, cy)
    pub fn touches_coin(px: f32, py: f32, cx: f32, cy: f32) -> bool {
        let dx = px - cx;
        let dy = py - cy;
        let dist = (dx * dx + dy * dy).sqrt();
        dist < Self::pickup_distance()
    }
}
