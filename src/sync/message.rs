//! Messages exchanged with the transport.
//!
//! The transport delivers [`InboundMessage`]s in order and relays every
//! [`OutboundMessage`] to all other players in the room.

use serde::{Deserialize, Serialize};

use crate::core::{Action, ActionKind, Coord, PlayerId};

/// A player action as it travels on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAction {
    pub kind: ActionKind,
    pub coordinate: Option<Coord>,
    pub issuer: PlayerId,
}

impl PlayerAction {
    #[must_use]
    pub fn new(issuer: PlayerId, action: Action) -> Self {
        Self {
            kind: action.kind(),
            coordinate: action.coordinate(),
            issuer,
        }
    }

    /// Typed action, `None` if the kind and coordinate do not fit together.
    #[must_use]
    pub fn action(&self) -> Option<Action> {
        Action::from_wire(self.kind, self.coordinate)
    }
}

/// A player joined or left the room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub player: PlayerId,
    pub connected: bool,
}

/// Room metadata, sent when every seat is taken.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub room_size: usize,
    pub players: Vec<PlayerId>,
}

/// Full board snapshot from another player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    pub issuer: PlayerId,
    pub state: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InboundMessage {
    Action(PlayerAction),
    Connection(ConnectionInfo),
    RoomFull(RoomInfo),
    BoardState(BoardState),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutboundMessage {
    Action(PlayerAction),
    /// Encoded snapshot, see [`crate::sync::snapshot`].
    BoardState(Vec<u8>),
}
