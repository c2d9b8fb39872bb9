//! Core types: players, coordinates, actions, configuration, RNG, board state.
//!
//! Everything here is plain data plus pure geometry. The rules that mutate
//! the board live in [`crate::rules`].

pub mod action;
pub mod config;
pub mod coord;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{Action, ActionKind};
pub use config::{
    BoardRules, ConfigFile, GameConfig, InitWeight, NodeDef, NodeType, NodeTypeId, TileDef, TileType,
    TileTypeId,
};
pub use coord::{BoardShape, Coord, NodeCoord, TileCoord};
pub use player::{PlayerId, PlayerMap};
pub use rng::GameRng;
pub use state::{ChangeSet, GameLogicState, Node, NodeOwner, Ownership, Tile};
