//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::game::world::{Coin, InputVector, Player, PlayerId, WorldState};

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMsg {
    /// New movement direction, sent only when it changes
    Move { input: InputVector },
}

impl ClientMsg {
    /// Parse and validate a text frame from a client
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let msg: ClientMsg = serde_json::from_str(text)?;
        msg.validate()?;
        Ok(msg)
    }

    fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            ClientMsg::Move { input } => {
                let in_range = |v: i8| (-1..=1).contains(&v);
                if in_range(input.x) && in_range(input.y) {
                    Ok(())
                } else {
                    Err(ProtocolError::InputOutOfRange {
                        x: input.x,
                        y: input.y,
                    })
                }
            }
        }
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMsg {
    /// Sent once to a new session with its id and the full world
    Init { id: PlayerId, state: WorldState },

    /// Another session joined
    NewPlayer { player: Player },

    /// Another session left
    RemovePlayer { id: PlayerId },

    /// Periodic full snapshot
    Update {
        players: BTreeMap<PlayerId, Player>,
        coins: Vec<Coin>,
    },
}

/// Rejected client frames
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Input component out of range: ({x}, {y})")]
    InputOutOfRange { x: i8, y: i8 },
}
