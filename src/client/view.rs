//! Client-side world view: message handling and render reconstruction

use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::game::world::{Coin, PlayerId};
use crate::util::time::INTERPOLATION_DELAY_MS;
use crate::ws::protocol::ServerMsg;

use super::buffer::{PlayerView, PlayerViews, Snapshot, SnapshotBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// Connected, waiting for `init`
    Uninitialized,
    /// Own id and world known
    Live,
}

/// One player as it should be drawn this frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPlayer {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub color: String,
    pub score: u32,
    pub is_self: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderFrame {
    pub players: Vec<RenderedPlayer>,
    pub coins: Vec<Coin>,
}

/// Everything a client knows about the arena.
///
/// The roster is the authoritative id set, driven by `init`, `newPlayer` and
/// `removePlayer`. Updates feed the interpolation buffer and refresh roster
/// entries; they never bring back an id that was removed.
#[derive(Debug)]
pub struct ClientView {
    phase: ConnectionPhase,
    my_id: Option<PlayerId>,
    roster: PlayerViews,
    // Removed ids still named by in-flight updates
    departed: HashSet<PlayerId>,
    coins: Vec<Coin>,
    buffer: SnapshotBuffer,
    interpolation_delay: Duration,
}

impl Default for ClientView {
    fn default() -> Self {
        Self::new(Duration::from_millis(INTERPOLATION_DELAY_MS))
    }
}

impl ClientView {
    pub fn new(interpolation_delay: Duration) -> Self {
        Self {
            phase: ConnectionPhase::Uninitialized,
            my_id: None,
            roster: BTreeMap::new(),
            departed: HashSet::new(),
            coins: Vec::new(),
            buffer: SnapshotBuffer::default(),
            interpolation_delay,
        }
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    pub fn my_id(&self) -> Option<&PlayerId> {
        self.my_id.as_ref()
    }

    pub fn player_ids(&self) -> impl Iterator<Item = &PlayerId> {
        self.roster.keys()
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn buffered_snapshots(&self) -> usize {
        self.buffer.len()
    }

    /// Apply a server message that arrived at `now`
    pub fn handle_message(&mut self, msg: ServerMsg, now: Instant) {
        match msg {
            ServerMsg::Init { id, state } => {
                debug!(player_id = %id, players = state.players.len(), "Initialized");
                self.phase = ConnectionPhase::Live;
                self.my_id = Some(id);
                self.roster = state
                    .players
                    .values()
                    .map(|p| (p.id.clone(), PlayerView::from(p)))
                    .collect();
                self.departed.clear();
                self.coins = state.coins;
                self.buffer.clear();
            }
            _ if self.phase == ConnectionPhase::Uninitialized => {
                trace!("Ignoring message before init");
            }
            ServerMsg::NewPlayer { player } => {
                self.departed.remove(&player.id);
                self.roster
                    .insert(player.id.clone(), PlayerView::from(&player));
            }
            ServerMsg::RemovePlayer { id } => {
                self.roster.remove(&id);
                self.departed.insert(id);
            }
            ServerMsg::Update { players, coins } => {
                // A tombstone is no longer needed once updates stop naming the id
                self.departed.retain(|id| players.contains_key(id));

                let views: PlayerViews = players
                    .values()
                    .map(|p| (p.id.clone(), PlayerView::from(p)))
                    .collect();
                for (id, view) in &views {
                    if !self.departed.contains(id) {
                        self.roster.insert(id.clone(), view.clone());
                    }
                }

                self.buffer.push(Snapshot {
                    timestamp: now,
                    players: views,
                });
                // Latest update is ground truth for coins
                self.coins = coins;
            }
        }
    }

    /// Reconstruct the frame to draw at `now`
    pub fn render(&self, now: Instant) -> RenderFrame {
        let render_time = now.checked_sub(self.interpolation_delay);
        let reconstructed = self.buffer.reconstruct(render_time).unwrap_or_default();

        let players = self
            .roster
            .iter()
            .map(|(id, latest)| {
                let view = reconstructed.get(id).unwrap_or(latest);
                RenderedPlayer {
                    id: id.clone(),
                    x: view.x,
                    y: view.y,
                    color: view.color.clone(),
                    score: view.score,
                    is_self: self.my_id.as_ref() == Some(id),
                }
            })
            .collect();

        RenderFrame {
            players,
            coins: self.coins.clone(),
        }
    }
}
