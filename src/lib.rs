//! # trigon
//!
//! Game logic for a two-player territorial board game on a triangular
//! tiling. Players claim nodes (tile corners); a tile belongs to whoever
//! holds a strict majority of its corners. Turns are simultaneous: both
//! players commit, then reveal, then the turn resolves in one batch.
//! A node surrounded by two nodes of one opponent is captured.
//!
//! ## Design Principles
//!
//! 1. **N-Player Structures**: Every per-player array is a `PlayerMap` sized
//!    from the configuration. The rules are tuned for two players but nothing
//!    assumes it.
//!
//! 2. **Configuration Over Globals**: Tile and node catalogs, board size and
//!    the initial layout weights live in an immutable `GameConfig` passed to
//!    whatever needs them.
//!
//! 3. **Deterministic**: The initial layout is a pure function of the
//!    configuration and a seed; resolution has no hidden inputs. Two clients
//!    fed the same messages hold the same board.
//!
//! ## Modules
//!
//! - `core`: Coordinates, players, actions, configuration, RNG, board state
//! - `rules`: Legality checks, simultaneous resolution, capture
//! - `layout`: Authority-side initial board
//! - `sync`: Turn handshake, snapshots, session boundary
//! - `error`: Error types

pub mod core;
pub mod error;
pub mod layout;
pub mod rules;
pub mod sync;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionKind, BoardShape, ChangeSet, Coord, GameConfig, GameLogicState, GameRng,
    NodeCoord, NodeOwner, PlayerId, PlayerMap, TileCoord,
};

pub use crate::error::{ConfigError, LayoutError, ProtocolViolation, RuleViolation, SessionError, SnapshotError};

pub use crate::rules::{PendingActions, PerformOutcome};

pub use crate::layout::{distribute, BoardSide};

pub use crate::sync::{InboundMessage, OutboundMessage, PumpReport, Session, SessionEvent, StateSummary, TurnPhase};
