//! Player actions.
//!
//! `Conquer` is the only board action a player chooses. `TurnDone` is the
//! commit signal of the turn handshake, and `Resolved` marks a slot that a
//! conflict already settled during resolution; it never comes from a player.
//!
//! On the wire an action travels as an `ActionKind` tag plus an optional
//! coordinate. [`Action::from_wire`] is the only way back into the typed
//! form and refuses every combination that has no meaning.

use serde::{Deserialize, Serialize};

use super::coord::{Coord, NodeCoord};

/// Field-less action tag used on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Conquer,
    TurnDone,
    Resolved,
}

/// A typed player action.
///
/// ```
/// use trigon::core::{Action, ActionKind, Coord, NodeCoord};
///
/// let node = NodeCoord::new(2, 3, true);
/// let action = Action::Conquer(node);
/// assert_eq!(action.kind(), ActionKind::Conquer);
/// assert_eq!(Action::from_wire(ActionKind::Conquer, Some(Coord::Node(node))), Some(action));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Claim an empty node.
    Conquer(NodeCoord),
    /// The issuing player has committed this turn.
    TurnDone,
    /// Slot already settled by a conflict in the current resolution.
    Resolved,
}

impl Action {
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Conquer(_) => ActionKind::Conquer,
            Action::TurnDone => ActionKind::TurnDone,
            Action::Resolved => ActionKind::Resolved,
        }
    }

    /// Node targeted by this action, if any.
    #[must_use]
    pub fn target(&self) -> Option<NodeCoord> {
        match self {
            Action::Conquer(node) => Some(*node),
            Action::TurnDone | Action::Resolved => None,
        }
    }

    /// Wire coordinate for this action.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coord> {
        self.target().map(Coord::Node)
    }

    /// Rebuild a typed action from its wire parts.
    ///
    /// Returns `None` for `Resolved`, for a `Conquer` without a node
    /// coordinate, and for a `TurnDone` carrying a coordinate.
    #[must_use]
    pub fn from_wire(kind: ActionKind, coordinate: Option<Coord>) -> Option<Self> {
        match (kind, coordinate) {
            (ActionKind::Conquer, Some(Coord::Node(node))) => Some(Action::Conquer(node)),
            (ActionKind::TurnDone, None) => Some(Action::TurnDone),
            _ => None,
        }
    }
}
