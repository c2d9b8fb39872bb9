//! Authority-side initial board generation.
//!
//! The board is split along its central diagonal into two point-symmetric
//! halves. Both halves draw from identical, independently shuffled stocks,
//! so each side starts with the same multiset of tile types in a different
//! arrangement. The single tile at the centre gets the fill type.

use tracing::{debug, info};

use crate::core::{BoardShape, GameConfig, GameLogicState, GameRng, NodeOwner, TileCoord, TileTypeId};
use crate::error::LayoutError;

/// Which stock a tile draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BoardSide {
    Left,
    Right,
    /// The centre tile, which always gets the fill type.
    Middle,
}

impl BoardSide {
    /// Classify `coord` against the central diagonal `y = 2x + 1 - cols`.
    #[must_use]
    pub fn of(coord: TileCoord, shape: BoardShape) -> Self {
        let diagonal = 2 * coord.x + 1 - shape.cols as i32;
        let middle = shape.middle_row();

        if coord.y == diagonal {
            match coord.y.cmp(&middle) {
                std::cmp::Ordering::Less => BoardSide::Right,
                std::cmp::Ordering::Greater => BoardSide::Left,
                std::cmp::Ordering::Equal => BoardSide::Middle,
            }
        } else if coord.y < diagonal {
            BoardSide::Right
        } else {
            BoardSide::Left
        }
    }

    fn name(self) -> &'static str {
        match self {
            BoardSide::Left => "left",
            BoardSide::Right => "right",
            BoardSide::Middle => "middle",
        }
    }
}

/// The tile multiset dealt to each side, before shuffling.
///
/// Each catalog entry gets `round(half * weight / total_weight)` copies,
/// rounding half to even. Rounding drift is absorbed by padding with the
/// first catalog entry or truncating, so the stock holds exactly
/// `tile_count / 2` tiles.
#[must_use]
pub fn stock(config: &GameConfig) -> Vec<TileTypeId> {
    let half = config.shape().tile_count() / 2;
    let weights = config.init_weights();
    let total: f64 = weights.iter().map(|(_, w)| w).sum();

    let mut stock = Vec::with_capacity(half);
    for &(kind, weight) in weights {
        let copies = (half as f64 * weight / total).round_ties_even() as usize;
        stock.extend(std::iter::repeat(kind).take(copies));
    }

    if let Some(&(first, _)) = weights.first() {
        if stock.len() < half {
            stock.resize(half, first);
        }
    }
    stock.truncate(half);
    stock
}

/// Build the initial board for a new session.
///
/// Deterministic in `rng`'s seed. Every node starts empty and carries the
/// configured node object.
pub fn distribute(config: &GameConfig, rng: &mut GameRng) -> Result<GameLogicState, LayoutError> {
    let shape = config.shape();
    let mut left = stock(config);
    let mut right = left.clone();
    rng.for_context("left").shuffle(&mut left);
    rng.for_context("right").shuffle(&mut right);

    let mut state = GameLogicState::new(config.player_count());
    for coord in shape.tile_coords() {
        let side = BoardSide::of(coord, shape);
        let kind = match side {
            BoardSide::Middle => config.fill(),
            BoardSide::Left => left.pop().ok_or(LayoutError::StockExhausted { side: side.name() })?,
            BoardSide::Right => right.pop().ok_or(LayoutError::StockExhausted { side: side.name() })?,
        };
        state.add_tile(coord, kind, None);
    }

    for coord in shape.node_coords() {
        state.add_node(coord, config.node_object(), NodeOwner::Empty);
    }

    if !left.is_empty() || !right.is_empty() {
        debug!(left = left.len(), right = right.len(), "unused layout stock");
    }
    info!(
        seed = rng.seed(),
        rows = shape.rows,
        cols = shape.cols,
        tiles = state.tile_count(),
        nodes = state.node_count(),
        "initial layout generated"
    );
    Ok(state)
}
