//! Connection registry: session bookkeeping and join/move/leave handling

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::Rng;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

use crate::ws::protocol::{ClientMsg, ServerMsg};

use super::ids::IdGenerator;
use super::spawner::{player_spawn_position, random_color};
use super::world::{Player, PlayerId, WorldState};

/// A serialized JSON text frame ready for the socket
pub type Frame = Arc<str>;

/// Outbound half of a connected session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub outbound: mpsc::Sender<Frame>,
}

/// What a session is owed once its latency delay elapses
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// `init` for the recipient, built from the world at delivery time
    Init,
    Message(ServerMsg),
}

/// A message the arena must deliver (through the latency queue) to one session
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub to: PlayerId,
    pub msg: Outbound,
}

/// Full-state `init` for `id` as the world stands now
pub fn init_message(world: &WorldState, id: &PlayerId) -> ServerMsg {
    ServerMsg::Init {
        id: id.clone(),
        state: world.clone(),
    }
}

/// Result of handing a frame to a session's writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// Session already gone or its socket closed
    Closed,
    /// Writer is backed up; frame dropped
    Full,
}

/// Tracks live sessions keyed by the player they control
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    sessions: BTreeMap<PlayerId, SessionHandle>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session, spawn its player, and return the messages the
    /// join produces: `init` for the newcomer and `newPlayer` for everyone else.
    /// The `init` state is filled in when it is delivered, so players joining
    /// within the latency window are included.
    pub fn join<R: Rng + ?Sized>(
        &mut self,
        world: &mut WorldState,
        rng: &mut R,
        ids: &mut dyn IdGenerator,
        session: SessionHandle,
    ) -> (PlayerId, Vec<Outgoing>) {
        let id = ids.player_id();
        let (x, y) = player_spawn_position(rng);
        let player = Player::new(id.clone(), x, y, random_color(rng));

        world.insert_player(player.clone());

        let mut out = vec![Outgoing {
            to: id.clone(),
            msg: Outbound::Init,
        }];
        out.extend(self.sessions.keys().map(|other| Outgoing {
            to: other.clone(),
            msg: Outbound::Message(ServerMsg::NewPlayer {
                player: player.clone(),
            }),
        }));

        self.sessions.insert(id.clone(), session);

        info!(player_id = %id, x, y, sessions = self.sessions.len(), "Player joined");
        (id, out)
    }

    /// Apply a validated client message for `id`. Returns false if the player is gone.
    pub fn apply(&self, world: &mut WorldState, id: &PlayerId, msg: ClientMsg) -> bool {
        match msg {
            ClientMsg::Move { input } => {
                let applied = world.set_input(id, input);
                if !applied {
                    debug!(player_id = %id, "Dropping input for departed player");
                }
                applied
            }
        }
    }

    /// Forget a session and its player. Returns the `removePlayer` messages
    /// for the remaining sessions, or nothing if the session was unknown.
    pub fn leave(&mut self, world: &mut WorldState, id: &PlayerId) -> Vec<Outgoing> {
        let known = self.sessions.remove(id).is_some();
        let removed = world.remove_player(id).is_some();
        if !known && !removed {
            return Vec::new();
        }

        info!(player_id = %id, sessions = self.sessions.len(), "Player left");

        self.sessions
            .keys()
            .map(|other| Outgoing {
                to: other.clone(),
                msg: Outbound::Message(ServerMsg::RemovePlayer { id: id.clone() }),
            })
            .collect()
    }

    /// Hand a frame to a session's writer without waiting
    pub fn send(&self, id: &PlayerId, frame: Frame) -> SendOutcome {
        let Some(session) = self.sessions.get(id) else {
            return SendOutcome::Closed;
        };

        match session.outbound.try_send(frame) {
            Ok(()) => SendOutcome::Sent,
            Err(TrySendError::Closed(_)) => SendOutcome::Closed,
            Err(TrySendError::Full(_)) => {
                warn!(player_id = %id, "Session writer full, dropping frame");
                SendOutcome::Full
            }
        }
    }

    pub fn session_ids(&self) -> impl Iterator<Item = &PlayerId> {
        self.sessions.keys()
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
