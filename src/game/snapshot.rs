//! Broadcast snapshot building

use crate::ws::protocol::ServerMsg;

use super::world::WorldState;

/// Builds `update` messages from the authoritative world
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    stats: SnapshotStats,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample the current world into an update message
    pub fn build(&self, world: &WorldState) -> ServerMsg {
        ServerMsg::Update {
            players: world.players.clone(),
            coins: world.coins.clone(),
        }
    }

    /// Account for one serialized snapshot fanned out to `recipients` sessions
    pub fn record(&mut self, player_count: usize, bytes: usize, recipients: usize) {
        self.stats.record(player_count, bytes * recipients);
    }

    pub fn stats(&self) -> &SnapshotStats {
        &self.stats
    }
}

/// Snapshot stats for debugging
#[derive(Debug, Default, Clone)]
pub struct SnapshotStats {
    pub total_snapshots: u64,
    pub total_bytes: u64,
    pub avg_players_per_snapshot: f32,
}

impl SnapshotStats {
    pub fn record(&mut self, player_count: usize, bytes: usize) {
        self.total_snapshots += 1;
        self.total_bytes += bytes as u64;

        // Running average
        let n = self.total_snapshots as f32;
        self.avg_players_per_snapshot =
            self.avg_players_per_snapshot * ((n - 1.0) / n) + (player_count as f32 / n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::{Coin, CoinId, Player, PlayerId};
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn update_copies_players_and_coins() {
        let mut world = WorldState::new();
        world.insert_player(Player::new(PlayerId("a".into()), 5.0, 6.0, "#123456".into()));
        world.coins.push(Coin {
            id: CoinId("c".into()),
            x: 30.0,
            y: 40.0,
        });

        match SnapshotBuilder::new().build(&world) {
            ServerMsg::Update { players, coins } => {
                assert_eq!(players, world.players);
                assert_eq!(coins, world.coins);
            }
            other => panic!("Unexpected message: {other:?}"),
        }
    }

    #[test]
    fn stats_track_running_average() {
        let mut builder = SnapshotBuilder::new();
        builder.record(2, 100, 2);
        builder.record(4, 100, 4);

        let stats = builder.stats();
        assert_eq!(stats.total_snapshots, 2);
        assert_eq!(stats.total_bytes, 600);
        assert_approx_eq!(stats.avg_players_per_snapshot, 3.0);
    }
}
