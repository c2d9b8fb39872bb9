//! Turn resolution scenarios on a 5x5 board.

mod common;

use trigon::core::{Action, GameLogicState, NodeCoord, NodeOwner, PlayerId, PlayerMap, TileCoord};
use trigon::rules::{PendingActions, PerformOutcome};
use trigon::{ChangeSet, RuleViolation};

const P0: PlayerId = PlayerId::new(0);
const P1: PlayerId = PlayerId::new(1);

/// Play one two-player turn through `PendingActions`, returning the changes.
fn play(state: &mut GameLogicState, a0: NodeCoord, a1: NodeCoord) -> ChangeSet {
    let mut pending = PendingActions::new(2);
    let first = pending.perform(state, P0, Action::Conquer(a0));
    assert_eq!(first, Ok(PerformOutcome::Recorded));
    match pending.perform(state, P1, Action::Conquer(a1)) {
        Ok(PerformOutcome::Resolved(changed)) => changed,
        other => panic!("turn did not resolve: {other:?}"),
    }
}

fn owner(state: &GameLogicState, node: NodeCoord) -> NodeOwner {
    state.node(node).map(|n| n.owner).expect("node on board")
}

/// Player 0 may open anywhere; the claimed node counts toward every tile it touches.
#[test]
fn test_opening_move() {
    let mut state = common::board(5, 5, 2, 11);
    let opening = NodeCoord::new(2, 2, true);
    assert_eq!(state.owned_tile_count()[P0], 0);
    assert!(state.can_perform(P0, &Action::Conquer(opening)));

    let changed = play(&mut state, opening, NodeCoord::new(6, 6, false));

    assert_eq!(owner(&state, opening), NodeOwner::Player(P0));
    assert!(changed.contains(opening));
    let touching = state.adjacent_tiles(opening);
    assert_eq!(touching.len(), 3);
    for tile in touching {
        let tile_state = state.tile(tile).expect("tile on board");
        assert_eq!(tile_state.node_counts()[P0], 1);
        assert_eq!(tile_state.owner(), Some(P0));
        assert!(changed.contains(tile));
    }
    assert_eq!(state.owned_tile_count()[P0], 3);
    assert_eq!(state.victory_points()[P0], 3);
    assert!(state.check_invariants().is_ok());
}

/// Two claims on the same node leave a permanent neutral stone.
#[test]
fn test_conflict_makes_neutral_stone() {
    let mut state = common::board(5, 5, 2, 11);
    let contested = NodeCoord::new(4, 4, false);

    let changed = play(&mut state, contested, contested);

    assert_eq!(owner(&state, contested), NodeOwner::Neutral);
    assert!(changed.contains(contested));
    assert_eq!(changed.tiles().count(), 0);
    assert_eq!(state.owned_tile_count().as_slice(), &[0, 0]);
    assert_eq!(state.capture_count().as_slice(), &[0, 0]);

    for player in [P0, P1] {
        assert_eq!(
            state.check_perform(player, &Action::Conquer(contested)),
            Err(RuleViolation::Occupied(contested))
        );
    }
}

/// Once a player owns tiles, new claims must touch one of them.
#[test]
fn test_expansion_must_stay_connected() {
    let mut state = common::board(5, 5, 2, 11);
    play(&mut state, NodeCoord::new(2, 2, true), NodeCoord::new(6, 6, false));

    let far = NodeCoord::new(0, 0, true);
    assert_eq!(
        state.check_perform(P0, &Action::Conquer(far)),
        Err(RuleViolation::NotConnected { node: far, player: P0 })
    );
    assert!(state.can_perform(P0, &Action::Conquer(NodeCoord::new(2, 2, false))));
}

/// A node flanked by two enemy nodes is captured and the captor scores.
#[test]
fn test_capture_after_encirclement() {
    let mut state = common::board(5, 5, 2, 11);
    let target = NodeCoord::new(4, 4, false);

    // Turn 1: player 1 takes the target, player 0 one of its neighbours.
    play(&mut state, NodeCoord::new(4, 4, true), target);
    assert_eq!(state.owned_tile_count().as_slice(), &[1, 1]);

    // Turn 2: player 0 wins tile (3, 3) to reach the second neighbour.
    play(&mut state, NodeCoord::new(4, 3, false), NodeCoord::new(3, 5, true));
    assert_eq!(state.tile(TileCoord::new(3, 3)).and_then(|t| t.owner()), Some(P0));
    assert_eq!(owner(&state, target), NodeOwner::Player(P1));

    // Turn 3: the second neighbour closes the trap.
    let changed = play(&mut state, NodeCoord::new(3, 4, true), NodeCoord::new(4, 5, false));

    assert_eq!(owner(&state, target), NodeOwner::Empty);
    assert!(changed.contains(target));
    assert!(changed.contains(TileCoord::new(4, 4)));
    assert_eq!(state.capture_count().as_slice(), &[1, 0]);
    assert_eq!(state.owned_tile_count().as_slice(), &[5, 4]);
    assert_eq!(state.victory_points().as_slice(), &[6, 4]);
    assert!(state.check_invariants().is_ok());
}

/// A single enemy neighbour is not enough.
#[test]
fn test_no_capture_with_one_neighbour() {
    let mut state = common::board(5, 5, 2, 11);
    let target = NodeCoord::new(4, 4, false);
    play(&mut state, NodeCoord::new(4, 4, true), target);

    assert_eq!(owner(&state, target), NodeOwner::Player(P1));
    assert_eq!(owner(&state, NodeCoord::new(4, 4, true)), NodeOwner::Player(P0));
    assert_eq!(state.capture_count().as_slice(), &[0, 0]);
}

/// Resolving empty slots changes nothing at all.
#[test]
fn test_empty_resolve_is_noop() {
    let mut state = common::board(5, 5, 2, 11);
    play(&mut state, NodeCoord::new(2, 2, true), NodeCoord::new(6, 6, false));
    state.set_turn_validated(P1, true);
    let before = state.clone();

    let changed = state.resolve(&PlayerMap::with_value(2, None));

    assert!(changed.is_empty());
    assert_eq!(state, before);
}

/// Commits are cleared by a resolution.
#[test]
fn test_resolution_clears_commits() {
    let mut state = common::board(5, 5, 2, 11);
    state.set_turn_validated(P0, true);
    state.set_turn_validated(P1, true);

    play(&mut state, NodeCoord::new(2, 2, true), NodeCoord::new(6, 6, false));

    assert_eq!(state.turn_validated().as_slice(), &[false, false]);
}

/// Tile owners always reflect a strict corner majority.
#[test]
fn test_majority_holds_after_every_turn() {
    let mut state = common::board(5, 5, 2, 11);
    let turns = [
        (NodeCoord::new(4, 4, true), NodeCoord::new(4, 4, false)),
        (NodeCoord::new(4, 3, false), NodeCoord::new(3, 5, true)),
        (NodeCoord::new(3, 4, true), NodeCoord::new(4, 5, false)),
    ];
    for (a0, a1) in turns {
        play(&mut state, a0, a1);
        for (coord, tile) in state.tiles() {
            assert_eq!(tile.owner(), tile.majority_owner(), "tile {coord}");
        }
        let owned: u32 = state.owned_tile_count().values().sum();
        assert!(owned as usize <= state.tile_count());
    }
}
