//! Board coordinates and raw adjacency geometry.
//!
//! Tiles are addressed on a skewed integer grid. Nodes sit on tile corners
//! and come in two flavours, `upper` and lower, per grid position. Every
//! tile touches six nodes and every node touches up to three tiles and three
//! other nodes.
//!
//! Functions here are pure geometry: they know nothing about which
//! coordinates exist on a particular board. `GameLogicState` filters them to
//! in-bounds coordinates.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// One triangular board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    /// Offsets to the six neighbouring tiles.
    pub const NEIGHBOUR_OFFSETS: [(i32, i32); 6] = [(1, 0), (-1, 0), (0, 1), (0, -1), (1, 1), (-1, -1)];

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// The six tiles sharing an edge with this one, unfiltered.
    #[must_use]
    pub fn neighbours(self) -> [TileCoord; 6] {
        Self::NEIGHBOUR_OFFSETS.map(|(dx, dy)| self.offset(dx, dy))
    }

    /// The six corner nodes of this tile.
    #[must_use]
    pub fn corners(self) -> [NodeCoord; 6] {
        let TileCoord { x, y } = self;
        [
            NodeCoord::new(x, y, false),
            NodeCoord::new(x, y, true),
            NodeCoord::new(x + 1, y + 1, false),
            NodeCoord::new(x + 1, y + 1, true),
            NodeCoord::new(x + 1, y, false),
            NodeCoord::new(x, y + 1, true),
        ]
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One tile corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeCoord {
    pub x: i32,
    pub y: i32,
    pub upper: bool,
}

impl NodeCoord {
    #[must_use]
    pub const fn new(x: i32, y: i32, upper: bool) -> Self {
        Self { x, y, upper }
    }

    /// Tiles this node is a corner of, unfiltered.
    ///
    /// Inverse of [`TileCoord::corners`]: `n` is in `t.corners()` exactly
    /// when `t` is in `n.touching_tiles()`.
    #[must_use]
    pub fn touching_tiles(self) -> [TileCoord; 3] {
        let third = if self.upper { (0, -1) } else { (-1, 0) };
        [
            TileCoord::new(self.x, self.y),
            TileCoord::new(self.x - 1, self.y - 1),
            TileCoord::new(self.x + third.0, self.y + third.1),
        ]
    }

    /// Nodes sharing a mesh edge with this one, unfiltered.
    ///
    /// Neighbours always have the opposite `upper` flag.
    #[must_use]
    pub fn neighbours(self) -> [NodeCoord; 3] {
        let sign = if self.upper { 1 } else { -1 };
        [(0, 0), (1, 0), (0, -1)]
            .map(|(dx, dy)| NodeCoord::new(self.x + sign * dx, self.y + sign * dy, !self.upper))
    }
}

impl std::fmt::Display for NodeCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let half = if self.upper { "up" } else { "down" };
        write!(f, "({}, {}, {})", self.x, self.y, half)
    }
}

/// Any addressable board position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Coord {
    Tile(TileCoord),
    Node(NodeCoord),
}

impl Coord {
    #[must_use]
    pub fn as_node(self) -> Option<NodeCoord> {
        match self {
            Coord::Node(node) => Some(node),
            Coord::Tile(_) => None,
        }
    }

    #[must_use]
    pub fn as_tile(self) -> Option<TileCoord> {
        match self {
            Coord::Tile(tile) => Some(tile),
            Coord::Node(_) => None,
        }
    }

    /// Tiles touched by this coordinate, unfiltered.
    #[must_use]
    pub fn raw_adjacent_tiles(self) -> SmallVec<[TileCoord; 6]> {
        match self {
            Coord::Tile(tile) => SmallVec::from_slice(&tile.neighbours()),
            Coord::Node(node) => SmallVec::from_slice(&node.touching_tiles()),
        }
    }
}

impl From<TileCoord> for Coord {
    fn from(tile: TileCoord) -> Self {
        Coord::Tile(tile)
    }
}

impl From<NodeCoord> for Coord {
    fn from(node: NodeCoord) -> Self {
        Coord::Node(node)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Coord::Tile(tile) => write!(f, "tile {}", tile),
            Coord::Node(node) => write!(f, "node {}", node),
        }
    }
}

/// Hexagonal board outline of `rows` x `cols`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardShape {
    pub rows: u32,
    pub cols: u32,
}

impl BoardShape {
    #[must_use]
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// Number of tiles on the board.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        if self.rows == 0 || self.cols == 0 {
            return 0;
        }
        let (rows, cols) = (self.rows as usize, self.cols as usize);
        rows * cols + (rows - 1) * (cols + rows - 1)
    }

    /// Tile coordinates, row by row from `y = 0`.
    pub fn tile_coords(&self) -> impl Iterator<Item = TileCoord> {
        let rows = self.rows as i32;
        let cols = self.cols as i32;
        let upper_half = (0..rows).flat_map(move |y| (0..cols + y).map(move |x| TileCoord::new(x, y)));
        let lower_half = (rows..(2 * rows - 1).max(rows))
            .flat_map(move |y| (y - rows + 1..cols + rows - 1).map(move |x| TileCoord::new(x, y)));
        upper_half.chain(lower_half)
    }

    /// Every corner of every tile, deduplicated and sorted.
    #[must_use]
    pub fn node_coords(&self) -> BTreeSet<NodeCoord> {
        self.tile_coords().flat_map(TileCoord::corners).collect()
    }

    /// The tile at the point-symmetric centre of the board, if any.
    ///
    /// Exists only when `rows + cols` is even.
    #[must_use]
    pub fn centre(&self) -> Option<TileCoord> {
        if self.rows == 0 || (self.rows + self.cols) % 2 != 0 {
            return None;
        }
        let y = self.rows as i32 - 1;
        Some(TileCoord::new((y + self.cols as i32 - 1) / 2, y))
    }

    /// Row index of the middle row.
    #[must_use]
    pub fn middle_row(&self) -> i32 {
        self.rows as i32 - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_count_matches_enumeration() {
        for (rows, cols) in [(1, 1), (2, 3), (3, 2), (5, 5), (4, 7)] {
            let shape = BoardShape::new(rows, cols);
            assert_eq!(shape.tile_coords().count(), shape.tile_count(), "{rows}x{cols}");
        }
        assert_eq!(BoardShape::new(5, 5).tile_count(), 61);
    }

    #[test]
    fn test_enumeration_bounds() {
        let shape = BoardShape::new(5, 5);
        let tiles: Vec<_> = shape.tile_coords().collect();
        assert_eq!(tiles.first(), Some(&TileCoord::new(0, 0)));
        assert_eq!(tiles.last(), Some(&TileCoord::new(8, 8)));
        assert!(tiles.contains(&TileCoord::new(8, 4)));
        assert!(!tiles.contains(&TileCoord::new(0, 5)));
    }

    #[test]
    fn test_corners_and_touching_tiles_are_inverse() {
        let tile = TileCoord::new(3, 2);
        for corner in tile.corners() {
            assert!(corner.touching_tiles().contains(&tile), "{corner} should touch {tile}");
        }
    }

    #[test]
    fn test_node_neighbours_flip_half() {
        let node = NodeCoord::new(2, 2, true);
        let neighbours = node.neighbours();
        assert_eq!(
            neighbours,
            [
                NodeCoord::new(2, 2, false),
                NodeCoord::new(3, 2, false),
                NodeCoord::new(2, 1, false),
            ]
        );
        for n in neighbours {
            assert!(n.neighbours().contains(&node));
        }
    }

    #[test]
    fn test_centre() {
        assert_eq!(BoardShape::new(5, 5).centre(), Some(TileCoord::new(4, 4)));
        assert_eq!(BoardShape::new(4, 5).centre(), None);
    }

    #[test]
    fn test_coord_conversions() {
        let node = NodeCoord::new(1, 1, false);
        let coord: Coord = node.into();
        assert_eq!(coord.as_node(), Some(node));
        assert_eq!(coord.as_tile(), None);
        assert_eq!(coord.raw_adjacent_tiles().len(), 3);
        assert_eq!(Coord::from(TileCoord::new(0, 0)).raw_adjacent_tiles().len(), 6);
    }
}
