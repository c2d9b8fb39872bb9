//! Board state: tiles, nodes and per-player tallies.
//!
//! ## Ownership model
//!
//! Players claim nodes directly. A tile's owner is derived: the player
//! holding strictly more of its corner nodes than anyone else, or nobody on
//! a tie. Each tile keeps a per-player count of its owned corners so the
//! owner can be recomputed incrementally whenever a corner changes hands.
//!
//! ## Mutation
//!
//! After setup (`add_tile` / `add_node`) the state is only changed by the
//! resolution engine in [`crate::rules`]. Boards live in persistent
//! `im::OrdMap`s: cloning a state for a snapshot is O(1) and iteration
//! order is deterministic.

use std::collections::BTreeSet;

use im::OrdMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::config::{NodeTypeId, TileTypeId};
use super::coord::{Coord, NodeCoord, TileCoord};
use super::player::{PlayerId, PlayerMap};

/// Who holds a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeOwner {
    /// Unclaimed; the only state a node can be conquered from.
    #[default]
    Empty,
    /// Permanent neutral stone left behind by a conflict.
    Neutral,
    Player(PlayerId),
}

impl NodeOwner {
    #[must_use]
    pub fn player(self) -> Option<PlayerId> {
        match self {
            NodeOwner::Player(p) => Some(p),
            NodeOwner::Empty | NodeOwner::Neutral => None,
        }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self == NodeOwner::Empty
    }
}

/// Owner of any board coordinate, as exposed to the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ownership {
    Tile(Option<PlayerId>),
    Node(NodeOwner),
}

/// One board cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileTypeId,
    owner: Option<PlayerId>,
    node_counts: PlayerMap<u32>,
}

impl Tile {
    #[must_use]
    pub fn new(kind: TileTypeId, owner: Option<PlayerId>, player_count: usize) -> Self {
        Self {
            kind,
            owner,
            node_counts: PlayerMap::with_value(player_count, 0),
        }
    }

    /// Current owner, `None` when neutral or contested.
    #[must_use]
    pub fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    /// Number of this tile's corners each player holds.
    #[must_use]
    pub fn node_counts(&self) -> &PlayerMap<u32> {
        &self.node_counts
    }

    /// The unique player with the most corners, if there is one.
    #[must_use]
    pub fn majority_owner(&self) -> Option<PlayerId> {
        let mut best: Option<(PlayerId, u32)> = None;
        let mut tied = false;
        for (player, &count) in self.node_counts.iter() {
            match best {
                Some((_, top)) if count == top => tied = true,
                Some((_, top)) if count < top => {}
                _ => {
                    best = Some((player, count));
                    tied = false;
                }
            }
        }
        if tied {
            None
        } else {
            best.map(|(player, _)| player)
        }
    }

    /// Move one corner from `from` to `to` and recompute the owner.
    pub(crate) fn transfer_corner(&mut self, from: Option<PlayerId>, to: Option<PlayerId>) {
        if let Some(p) = to {
            self.node_counts[p] += 1;
        }
        if let Some(p) = from {
            self.node_counts[p] = self.node_counts[p].saturating_sub(1);
        }
        self.owner = self.majority_owner();
    }
}

/// One tile corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub object: NodeTypeId,
    pub owner: NodeOwner,
}

/// Coordinates whose owner changed during a resolution.
///
/// Ordered so that renderers and tests see a stable sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    coords: BTreeSet<Coord>,
}

impl ChangeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, coord: impl Into<Coord>) -> bool {
        self.coords.insert(coord.into())
    }

    pub fn extend(&mut self, other: ChangeSet) {
        self.coords.extend(other.coords);
    }

    #[must_use]
    pub fn contains(&self, coord: impl Into<Coord>) -> bool {
        self.coords.contains(&coord.into())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.coords.iter().copied()
    }

    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.iter().filter_map(Coord::as_tile)
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeCoord> + '_ {
        self.iter().filter_map(Coord::as_node)
    }
}

/// Full game state shared by both clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLogicState {
    player_count: usize,
    pub(crate) tiles: OrdMap<TileCoord, Tile>,
    pub(crate) nodes: OrdMap<NodeCoord, Node>,
    pub(crate) turn_validated: PlayerMap<bool>,
    pub(crate) owned_tile_count: PlayerMap<u32>,
    pub(crate) capture_count: PlayerMap<u32>,
    pub(crate) victory_points: PlayerMap<u32>,
}

impl GameLogicState {
    /// Create an empty board for `player_count` players.
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        Self {
            player_count,
            tiles: OrdMap::new(),
            nodes: OrdMap::new(),
            turn_validated: PlayerMap::with_value(player_count, false),
            owned_tile_count: PlayerMap::with_value(player_count, 0),
            capture_count: PlayerMap::with_value(player_count, 0),
            victory_points: PlayerMap::with_value(player_count, 0),
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        PlayerId::all(self.player_count)
    }

    // === Setup ===

    /// Place a tile. Setup only.
    pub fn add_tile(&mut self, coord: TileCoord, kind: TileTypeId, owner: Option<PlayerId>) {
        if let Some(old) = self.tiles.get(&coord).and_then(Tile::owner) {
            self.owned_tile_count[old] -= 1;
        }
        if let Some(p) = owner {
            self.owned_tile_count[p] += 1;
        }
        self.tiles.insert(coord, Tile::new(kind, owner, self.player_count));
    }

    /// Place a node. Setup only.
    ///
    /// Tile corner counts are not touched: nodes start `Empty` and change
    /// hands through resolution.
    pub fn add_node(&mut self, coord: NodeCoord, object: NodeTypeId, owner: NodeOwner) {
        self.nodes.insert(coord, Node { object, owner });
    }

    // === Lookup ===

    #[must_use]
    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    #[must_use]
    pub fn node(&self, coord: NodeCoord) -> Option<&Node> {
        self.nodes.get(&coord)
    }

    /// Owner of any coordinate on the board.
    #[must_use]
    pub fn owner_of(&self, coord: Coord) -> Option<Ownership> {
        match coord {
            Coord::Tile(t) => self.tile(t).map(|tile| Ownership::Tile(tile.owner())),
            Coord::Node(n) => self.node(n).map(|node| Ownership::Node(node.owner)),
        }
    }

    pub fn tiles(&self) -> impl Iterator<Item = (&TileCoord, &Tile)> {
        self.tiles.iter()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&NodeCoord, &Node)> {
        self.nodes.iter()
    }

    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // === Adjacency ===

    /// Tiles adjacent to a tile, or touched by a node, that exist on this board.
    #[must_use]
    pub fn adjacent_tiles(&self, coord: impl Into<Coord>) -> SmallVec<[TileCoord; 6]> {
        let mut tiles = coord.into().raw_adjacent_tiles();
        tiles.retain(|t| self.tiles.contains_key(t));
        tiles
    }

    /// Nodes sharing a mesh edge with `node` that exist on this board.
    #[must_use]
    pub fn adjacent_nodes(&self, node: NodeCoord) -> SmallVec<[NodeCoord; 3]> {
        node.neighbours()
            .into_iter()
            .filter(|n| self.nodes.contains_key(n))
            .collect()
    }

    // === Turn validation ===

    #[must_use]
    pub fn is_turn_validated(&self, player: PlayerId) -> bool {
        self.turn_validated[player]
    }

    /// Set a player's commit flag, returning the previous value.
    pub fn set_turn_validated(&mut self, player: PlayerId, validated: bool) -> bool {
        std::mem::replace(&mut self.turn_validated[player], validated)
    }

    #[must_use]
    pub fn all_validated(&self) -> bool {
        self.turn_validated.values().all(|&v| v)
    }

    #[must_use]
    pub fn turn_validated(&self) -> &PlayerMap<bool> {
        &self.turn_validated
    }

    // === Scores ===

    #[must_use]
    pub fn owned_tile_count(&self) -> &PlayerMap<u32> {
        &self.owned_tile_count
    }

    #[must_use]
    pub fn capture_count(&self) -> &PlayerMap<u32> {
        &self.capture_count
    }

    #[must_use]
    pub fn victory_points(&self) -> &PlayerMap<u32> {
        &self.victory_points
    }

    pub(crate) fn recompute_victory_points(&mut self) {
        for player in PlayerId::all(self.player_count) {
            self.victory_points[player] = self.capture_count[player] + self.owned_tile_count[player];
        }
    }

    /// Check every derived field against the board.
    ///
    /// Used when adopting a snapshot from a peer.
    pub fn check_invariants(&self) -> Result<(), String> {
        let per_player = [
            ("turn_validated", self.turn_validated.player_count()),
            ("owned_tile_count", self.owned_tile_count.player_count()),
            ("capture_count", self.capture_count.player_count()),
            ("victory_points", self.victory_points.player_count()),
        ];
        for (name, len) in per_player {
            if len != self.player_count {
                return Err(format!("{name} has {len} entries for {} players", self.player_count));
            }
        }

        let mut owned = PlayerMap::with_value(self.player_count, 0u32);
        for (coord, tile) in self.tiles.iter() {
            if tile.node_counts.player_count() != self.player_count {
                return Err(format!("tile {coord} has a malformed node count"));
            }
            let mut expected = PlayerMap::with_value(self.player_count, 0u32);
            for corner in coord.corners() {
                if let Some(p) = self.node(corner).and_then(|n| n.owner.player()) {
                    if p.index() >= self.player_count {
                        return Err(format!("node {corner} owned by unknown {p}"));
                    }
                    expected[p] += 1;
                }
            }
            if expected != tile.node_counts {
                return Err(format!("tile {coord} node counts disagree with its corners"));
            }
            let untouched = tile.node_counts.values().all(|&c| c == 0);
            if !untouched && tile.owner != tile.majority_owner() {
                return Err(format!("tile {coord} owner is not the corner majority"));
            }
            if let Some(p) = tile.owner {
                if p.index() >= self.player_count {
                    return Err(format!("tile {coord} owned by unknown {p}"));
                }
                owned[p] += 1;
            }
        }
        if owned != self.owned_tile_count {
            return Err("owned tile counts disagree with the board".to_string());
        }

        for player in PlayerId::all(self.player_count) {
            let expected = self.capture_count[player] + self.owned_tile_count[player];
            if self.victory_points[player] != expected {
                return Err(format!("{player} victory points are out of date"));
            }
        }
        Ok(())
    }
}
