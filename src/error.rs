//! Error types.
//!
//! - [`RuleViolation`]: a move the rules do not allow. Harmless for local
//!   input; suspicious when it arrives over the network.
//! - [`ProtocolViolation`]: a peer broke the turn handshake or sent data it
//!   had no business sending. Surfaced to the session layer as suspected
//!   tampering.
//! - [`ConfigError`], [`LayoutError`], [`SessionError`]: fatal at session
//!   start.
//! - [`SnapshotError`]: a state blob that cannot be adopted.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::{NodeCoord, PlayerId};

/// Why an action was refused by the rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("node {0} is not on the board")]
    UnknownNode(NodeCoord),

    #[error("node {0} is already taken")]
    Occupied(NodeCoord),

    #[error("node {node} does not touch a tile owned by {player}")]
    NotConnected { node: NodeCoord, player: PlayerId },

    #[error("{0} has already ended this turn")]
    TurnEnded(PlayerId),

    #[error("the board has not been set up yet")]
    NotInitialized,
}

/// A peer message that breaks the session protocol.
#[derive(Debug, Error)]
pub enum ProtocolViolation {
    #[error("message from {0}, which is not a player in this room")]
    UnknownPlayer(PlayerId),

    #[error("peer message claims to come from the local player {0}")]
    ForgedIssuer(PlayerId),

    #[error("{player} sent an action before the board was initialized")]
    NotInitialized { player: PlayerId },

    #[error("unexpected board snapshot from {issuer}")]
    UnexpectedSnapshot { issuer: PlayerId },

    #[error("invalid board snapshot: {0}")]
    InvalidSnapshot(#[from] SnapshotError),

    #[error("{player} revealed an action before every player ended the turn")]
    RevealBeforeCommit { player: PlayerId },

    #[error("{player} revealed a second action in the same turn")]
    DuplicateReveal { player: PlayerId },

    #[error("{player} sent a malformed action")]
    MalformedAction { player: PlayerId },

    #[error("{player} sent an illegal action: {reason}")]
    IllegalAction { player: PlayerId, reason: RuleViolation },
}

/// Invalid rules or catalog configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("player count {0} outside 2..=255")]
    PlayerCount(usize),

    #[error("board must have at least one row and one column")]
    EmptyBoard,

    #[error("duplicate tile type {0:?}")]
    DuplicateTileType(String),

    #[error("duplicate node type {0:?}")]
    DuplicateNodeType(String),

    #[error("unknown tile type {0:?}")]
    UnknownTileType(String),

    #[error("unknown node type {0:?}")]
    UnknownNodeType(String),

    #[error("tile type {0:?} declares more than one resource")]
    MultipleResources(String),

    #[error("initial layout catalog is empty")]
    EmptyInitCatalog,

    #[error("tile type {tile:?} has invalid weight {weight}")]
    InvalidWeight { tile: String, weight: f64 },

    #[error("grace period must be a non-negative number of seconds that fits a duration, got {0}")]
    InvalidGracePeriod(f64),
}

/// A session could not publish its board.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// The initial layout could not be completed.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("{side} tile stock ran out")]
    StockExhausted { side: &'static str },
}

/// A snapshot blob that cannot be adopted.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is truncated")]
    Truncated,

    #[error("snapshot has bad magic bytes")]
    BadMagic,

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u16),

    #[error("snapshot payload failed to decode: {0}")]
    Decode(#[from] bincode::Error),

    #[error("snapshot is for {actual} players, expected {expected}")]
    PlayerCountMismatch { expected: usize, actual: usize },

    #[error("snapshot references unknown tile type {0}")]
    UnknownTileType(u16),

    #[error("snapshot references unknown node type {0}")]
    UnknownNodeType(u16),

    #[error("snapshot state is inconsistent: {0}")]
    Inconsistent(String),
}
