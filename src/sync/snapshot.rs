//! Versioned binary encoding of [`GameLogicState`].
//!
//! Layout: `b"TRGN"`, a little-endian `u16` format version, then the
//! bincode encoding of the state. Decoding checks the result against the
//! local configuration before handing it out, so an adopted snapshot always
//! satisfies every board invariant.

use crate::core::{GameConfig, GameLogicState};
use crate::error::SnapshotError;

pub const MAGIC: [u8; 4] = *b"TRGN";
pub const VERSION: u16 = 1;

const HEADER_LEN: usize = MAGIC.len() + 2;

/// Encode `state` for the wire.
pub fn serialize(state: &GameLogicState) -> Result<Vec<u8>, SnapshotError> {
    let mut bytes = Vec::with_capacity(HEADER_LEN + 1024);
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&VERSION.to_le_bytes());
    bincode::serialize_into(&mut bytes, state)?;
    Ok(bytes)
}

/// Decode and validate a snapshot produced by [`serialize`].
pub fn deserialize(bytes: &[u8], config: &GameConfig) -> Result<GameLogicState, SnapshotError> {
    if bytes.len() < HEADER_LEN {
        return Err(SnapshotError::Truncated);
    }
    let (header, payload) = bytes.split_at(HEADER_LEN);
    if header[..MAGIC.len()] != MAGIC {
        return Err(SnapshotError::BadMagic);
    }
    let version = u16::from_le_bytes([header[4], header[5]]);
    if version != VERSION {
        return Err(SnapshotError::UnsupportedVersion(version));
    }

    let state: GameLogicState = bincode::deserialize(payload)?;
    validate(&state, config)?;
    Ok(state)
}

fn validate(state: &GameLogicState, config: &GameConfig) -> Result<(), SnapshotError> {
    if state.player_count() != config.player_count() {
        return Err(SnapshotError::PlayerCountMismatch {
            expected: config.player_count(),
            actual: state.player_count(),
        });
    }

    for (_, tile) in state.tiles() {
        if !config.has_tile_type(tile.kind) {
            return Err(SnapshotError::UnknownTileType(tile.kind.raw()));
        }
    }
    for (_, node) in state.nodes() {
        if !config.has_node_type(node.object) {
            return Err(SnapshotError::UnknownNodeType(node.object.raw()));
        }
    }

    let shape = config.shape();
    let tiles_match =
        state.tile_count() == shape.tile_count() && shape.tile_coords().all(|c| state.tile(c).is_some());
    let nodes = shape.node_coords();
    let nodes_match = state.node_count() == nodes.len() && nodes.iter().all(|&c| state.node(c).is_some());
    if !tiles_match || !nodes_match {
        return Err(SnapshotError::Inconsistent(
            "board outline does not match the configured shape".to_string(),
        ));
    }

    state.check_invariants().map_err(SnapshotError::Inconsistent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ConfigFile, GameRng, TileDef};
    use crate::layout::distribute;

    fn config(players: usize) -> GameConfig {
        let file = ConfigFile::new(3, 3, "lake", "stone")
            .with_players(players)
            .with_tile(TileDef::new("lake"))
            .with_tile(TileDef::new("forest"))
            .with_node("stone")
            .with_init("forest", 1.0);
        GameConfig::from_file(file).unwrap()
    }

    #[test]
    fn test_header_and_decode() {
        let cfg = config(2);
        let state = distribute(&cfg, &mut GameRng::new(1)).unwrap();
        let bytes = serialize(&state).unwrap();

        assert_eq!(&bytes[..4], b"TRGN");
        assert_eq!(&bytes[4..6], &[1, 0]);
        assert_eq!(deserialize(&bytes, &cfg).unwrap(), state);
    }

    #[test]
    fn test_rejects_bad_headers() {
        let cfg = config(2);
        assert!(matches!(deserialize(b"TRG", &cfg), Err(SnapshotError::Truncated)));
        assert!(matches!(deserialize(b"XXXX\x01\x00", &cfg), Err(SnapshotError::BadMagic)));
        assert!(matches!(
            deserialize(b"TRGN\x02\x00", &cfg),
            Err(SnapshotError::UnsupportedVersion(2))
        ));
        assert!(matches!(deserialize(b"TRGN\x01\x00\xff", &cfg), Err(SnapshotError::Decode(_))));
    }

    #[test]
    fn test_rejects_foreign_player_count() {
        let state = distribute(&config(3), &mut GameRng::new(1)).unwrap();
        let bytes = serialize(&state).unwrap();
        assert!(matches!(
            deserialize(&bytes, &config(2)),
            Err(SnapshotError::PlayerCountMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_rejects_tampered_counts() {
        let cfg = config(2);
        let mut state = distribute(&cfg, &mut GameRng::new(1)).unwrap();
        state.capture_count[crate::core::PlayerId::new(1)] = 5;
        let bytes = serialize(&state).unwrap();
        assert!(matches!(deserialize(&bytes, &cfg), Err(SnapshotError::Inconsistent(_))));
    }
}
