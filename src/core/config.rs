//! Game configuration: board rules and object catalogs.
//!
//! A session is configured once, at startup, from a [`ConfigFile`] (usually
//! parsed from JSON). Validation turns it into an immutable [`GameConfig`]
//! in which catalog names have been interned to [`TileTypeId`] /
//! [`NodeTypeId`] indices. The engine only ever sees `GameConfig`; there is
//! no global catalog.
//!
//! ```
//! use trigon::core::{ConfigFile, GameConfig, TileDef};
//!
//! let file = ConfigFile::new(5, 5, "lake", "stone")
//!     .with_tile(TileDef::new("forest").with_resource("wood"))
//!     .with_tile(TileDef::new("lake"))
//!     .with_node("stone")
//!     .with_init("forest", 1.0);
//!
//! let config = GameConfig::from_file(file).unwrap();
//! assert_eq!(config.shape().tile_count(), 61);
//! assert_eq!(config.tile_def(config.fill()).name, "lake");
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::coord::BoardShape;
use crate::error::ConfigError;

const DEFAULT_PLAYERS: usize = 2;
const DEFAULT_GRACE_PERIOD_SECS: f64 = 3.0;

/// Tile type identifier: index into the tile catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileTypeId(pub u16);

impl TileTypeId {
    /// Get the raw catalog index.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for TileTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TileType({})", self.0)
    }
}

/// Node object identifier: index into the node catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeTypeId(pub u16);

impl NodeTypeId {
    /// Get the raw catalog index.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for NodeTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeType({})", self.0)
    }
}

/// Tile catalog entry as written in the configuration file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileDef {
    pub name: String,

    /// At most one resource per tile type.
    #[serde(default)]
    pub resources: Vec<String>,

    /// Texture names by layer, opaque to the engine.
    #[serde(default)]
    pub textures: BTreeMap<String, String>,
}

impl TileDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: Vec::new(),
            textures: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resources.push(resource.into());
        self
    }

    #[must_use]
    pub fn with_texture(mut self, layer: impl Into<String>, texture: impl Into<String>) -> Self {
        self.textures.insert(layer.into(), texture.into());
        self
    }
}

/// Node catalog entry as written in the configuration file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    pub name: String,

    #[serde(default)]
    pub textures: BTreeMap<String, String>,
}

/// Relative frequency of a tile type in the initial layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InitWeight {
    pub tile: String,
    pub weight: f64,
}

/// Board rules section of the configuration file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardRules {
    pub rows: u32,
    pub cols: u32,

    /// Tile type placed on the centre tile.
    pub fill: String,

    /// Node object placed on every node.
    pub node_object: String,

    /// Weighted catalog the two halves of the board are drawn from.
    pub init: Vec<InitWeight>,
}

/// Raw, unvalidated configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default = "default_players")]
    pub players: usize,

    /// Seconds a player must wait after a peer disconnects before leaving.
    #[serde(default = "default_grace_period")]
    pub grace_period_secs: f64,

    pub board: BoardRules,
    pub tiles: Vec<TileDef>,
    pub nodes: Vec<NodeDef>,
}

fn default_players() -> usize {
    DEFAULT_PLAYERS
}

fn default_grace_period() -> f64 {
    DEFAULT_GRACE_PERIOD_SECS
}

impl ConfigFile {
    /// Start an empty two-player configuration.
    pub fn new(rows: u32, cols: u32, fill: impl Into<String>, node_object: impl Into<String>) -> Self {
        Self {
            players: DEFAULT_PLAYERS,
            grace_period_secs: DEFAULT_GRACE_PERIOD_SECS,
            board: BoardRules {
                rows,
                cols,
                fill: fill.into(),
                node_object: node_object.into(),
                init: Vec::new(),
            },
            tiles: Vec::new(),
            nodes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_players(mut self, players: usize) -> Self {
        self.players = players;
        self
    }

    #[must_use]
    pub fn with_grace_period(mut self, secs: f64) -> Self {
        self.grace_period_secs = secs;
        self
    }

    #[must_use]
    pub fn with_tile(mut self, tile: TileDef) -> Self {
        self.tiles.push(tile);
        self
    }

    #[must_use]
    pub fn with_node(mut self, name: impl Into<String>) -> Self {
        self.nodes.push(NodeDef {
            name: name.into(),
            textures: BTreeMap::new(),
        });
        self
    }

    #[must_use]
    pub fn with_init(mut self, tile: impl Into<String>, weight: f64) -> Self {
        self.board.init.push(InitWeight {
            tile: tile.into(),
            weight,
        });
        self
    }
}

/// Validated tile type.
#[derive(Clone, Debug, PartialEq)]
pub struct TileType {
    pub name: String,
    pub resource: Option<String>,
    pub textures: BTreeMap<String, String>,
}

/// Validated node object type.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeType {
    pub name: String,
    pub textures: BTreeMap<String, String>,
}

/// Immutable session configuration.
#[derive(Clone, Debug)]
pub struct GameConfig {
    player_count: usize,
    shape: BoardShape,
    tiles: Vec<TileType>,
    nodes: Vec<NodeType>,
    tile_index: FxHashMap<String, TileTypeId>,
    node_index: FxHashMap<String, NodeTypeId>,
    init: Vec<(TileTypeId, f64)>,
    fill: TileTypeId,
    node_object: NodeTypeId,
    grace_period: Duration,
}

impl GameConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Validate a raw configuration.
    pub fn from_file(file: ConfigFile) -> Result<Self, ConfigError> {
        if !(2..=255).contains(&file.players) {
            return Err(ConfigError::PlayerCount(file.players));
        }
        if file.board.rows == 0 || file.board.cols == 0 {
            return Err(ConfigError::EmptyBoard);
        }
        let grace_period = Duration::try_from_secs_f64(file.grace_period_secs)
            .map_err(|_| ConfigError::InvalidGracePeriod(file.grace_period_secs))?;

        let mut tiles = Vec::with_capacity(file.tiles.len());
        let mut tile_index = FxHashMap::default();
        for def in file.tiles {
            if def.resources.len() > 1 {
                return Err(ConfigError::MultipleResources(def.name));
            }
            let id = TileTypeId(tiles.len() as u16);
            if tile_index.insert(def.name.clone(), id).is_some() {
                return Err(ConfigError::DuplicateTileType(def.name));
            }
            tiles.push(TileType {
                name: def.name,
                resource: def.resources.into_iter().next(),
                textures: def.textures,
            });
        }

        let mut nodes = Vec::with_capacity(file.nodes.len());
        let mut node_index = FxHashMap::default();
        for def in file.nodes {
            let id = NodeTypeId(nodes.len() as u16);
            if node_index.insert(def.name.clone(), id).is_some() {
                return Err(ConfigError::DuplicateNodeType(def.name));
            }
            nodes.push(NodeType {
                name: def.name,
                textures: def.textures,
            });
        }

        let lookup_tile = |name: &str| {
            tile_index
                .get(name)
                .copied()
                .ok_or_else(|| ConfigError::UnknownTileType(name.to_string()))
        };

        if file.board.init.is_empty() {
            return Err(ConfigError::EmptyInitCatalog);
        }
        let mut init = Vec::with_capacity(file.board.init.len());
        for entry in &file.board.init {
            if !entry.weight.is_finite() || entry.weight <= 0.0 {
                return Err(ConfigError::InvalidWeight {
                    tile: entry.tile.clone(),
                    weight: entry.weight,
                });
            }
            init.push((lookup_tile(&entry.tile)?, entry.weight));
        }

        let fill = lookup_tile(&file.board.fill)?;
        let node_object = node_index
            .get(&file.board.node_object)
            .copied()
            .ok_or_else(|| ConfigError::UnknownNodeType(file.board.node_object.clone()))?;

        Ok(Self {
            player_count: file.players,
            shape: BoardShape::new(file.board.rows, file.board.cols),
            tiles,
            nodes,
            tile_index,
            node_index,
            init,
            fill,
            node_object,
            grace_period,
        })
    }

    /// Number of players in a session.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    /// Board outline.
    #[must_use]
    pub fn shape(&self) -> BoardShape {
        self.shape
    }

    /// Weighted initial layout catalog, in file order.
    #[must_use]
    pub fn init_weights(&self) -> &[(TileTypeId, f64)] {
        &self.init
    }

    /// Tile type of the board centre.
    #[must_use]
    pub fn fill(&self) -> TileTypeId {
        self.fill
    }

    /// Node object placed on every node.
    #[must_use]
    pub fn node_object(&self) -> NodeTypeId {
        self.node_object
    }

    /// How long to wait after a disconnect before a player may leave.
    #[must_use]
    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Look up a tile type by name.
    #[must_use]
    pub fn tile_type(&self, name: &str) -> Option<TileTypeId> {
        self.tile_index.get(name).copied()
    }

    /// Look up a node object type by name.
    #[must_use]
    pub fn node_type(&self, name: &str) -> Option<NodeTypeId> {
        self.node_index.get(name).copied()
    }

    /// Is `id` a valid tile catalog index?
    #[must_use]
    pub fn has_tile_type(&self, id: TileTypeId) -> bool {
        (id.0 as usize) < self.tiles.len()
    }

    /// Is `id` a valid node catalog index?
    #[must_use]
    pub fn has_node_type(&self, id: NodeTypeId) -> bool {
        (id.0 as usize) < self.nodes.len()
    }

    /// Tile catalog entry.
    ///
    /// # Panics
    ///
    /// If `id` did not come from this configuration.
    #[must_use]
    pub fn tile_def(&self, id: TileTypeId) -> &TileType {
        &self.tiles[id.0 as usize]
    }

    /// Node catalog entry.
    ///
    /// # Panics
    ///
    /// If `id` did not come from this configuration.
    #[must_use]
    pub fn node_def(&self, id: NodeTypeId) -> &NodeType {
        &self.nodes[id.0 as usize]
    }
}
