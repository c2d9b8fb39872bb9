//! Simultaneous turn resolution.
//!
//! Every player picks one node per turn without seeing the others' picks.
//! Once all picks are in, [`GameLogicState::resolve`] applies them together:
//!
//! 1. Players are visited in index order. A node picked by two or more
//!    players becomes a permanent neutral stone and nobody gets it.
//! 2. Every uncontested pick is claimed, and the claimed node plus its
//!    neighbours are queued for a capture check.
//! 3. Capture sweep: a queued node whose neighbours include at least two
//!    nodes of one opponent is captured by that opponent. All captures are
//!    decided against the same board and applied afterwards.
//! 4. Victory points are recomputed and turn commits are reset.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use crate::core::{Action, ChangeSet, GameLogicState, NodeCoord, NodeOwner, PlayerId, PlayerMap};
use crate::error::RuleViolation;

/// Neighbours of a single opponent needed to capture a node.
pub const CAPTURE_THRESHOLD: u32 = 2;

impl GameLogicState {
    /// Check whether `player` may take `action` now.
    ///
    /// # Panics
    ///
    /// On `TurnDone` or `Resolved`: those are handshake markers, not board
    /// actions, and reaching here with one is a caller bug.
    pub fn check_perform(&self, player: PlayerId, action: &Action) -> Result<(), RuleViolation> {
        let node = match action {
            Action::Conquer(node) => *node,
            Action::TurnDone | Action::Resolved => {
                panic!("{action:?} is not a board action and cannot be performed")
            }
        };

        let target = self.node(node).ok_or(RuleViolation::UnknownNode(node))?;
        if !target.owner.is_empty() {
            return Err(RuleViolation::Occupied(node));
        }

        // Opening move: a player without tiles may start anywhere.
        if self.owned_tile_count[player] == 0 {
            return Ok(());
        }

        let connected = self
            .adjacent_tiles(node)
            .iter()
            .any(|t| self.tile(*t).and_then(|tile| tile.owner()) == Some(player));
        if connected {
            Ok(())
        } else {
            Err(RuleViolation::NotConnected { node, player })
        }
    }

    /// Boolean form of [`check_perform`](Self::check_perform).
    #[must_use]
    pub fn can_perform(&self, player: PlayerId, action: &Action) -> bool {
        self.check_perform(player, action).is_ok()
    }

    /// Hand `node` to `new_owner`, updating corner counts and tile owners.
    ///
    /// Returns the node and every tile whose owner changed.
    pub(crate) fn change_node_owner(&mut self, node: NodeCoord, new_owner: NodeOwner) -> ChangeSet {
        let mut changed = ChangeSet::new();
        let Some(entry) = self.nodes.get_mut(&node) else {
            return changed;
        };
        let old_owner = std::mem::replace(&mut entry.owner, new_owner);
        changed.insert(node);

        let (from, to) = (old_owner.player(), new_owner.player());
        for coord in self.adjacent_tiles(node) {
            let Some(tile) = self.tiles.get_mut(&coord) else {
                continue;
            };
            let before = tile.owner();
            tile.transfer_corner(from, to);
            let after = tile.owner();

            if before != after {
                if let Some(p) = before {
                    self.owned_tile_count[p] -= 1;
                }
                if let Some(p) = after {
                    self.owned_tile_count[p] += 1;
                }
                changed.insert(coord);
            }
        }
        changed
    }

    /// Resolve one turn of simultaneous actions, one slot per player.
    ///
    /// Returns every coordinate whose owner changed. When no slot holds an
    /// action the state is left untouched, turn commits included.
    pub fn resolve(&mut self, actions: &PlayerMap<Option<Action>>) -> ChangeSet {
        if actions.values().all(Option::is_none) {
            return ChangeSet::new();
        }

        let mut slots: Vec<Option<Action>> = actions.values().copied().collect();
        let mut changed = ChangeSet::new();
        let mut check_capture: FxHashSet<NodeCoord> = FxHashSet::default();

        for index in 0..slots.len() {
            let player = PlayerId::new(index as u8);
            let node = match slots[index] {
                None | Some(Action::Resolved) => continue,
                Some(Action::TurnDone) => {
                    warn!(%player, "turn-done marker left in an action slot, ignoring");
                    continue;
                }
                Some(Action::Conquer(node)) => node,
            };

            let mut conflict = false;
            for later in slots.iter_mut().skip(index + 1) {
                if *later == Some(Action::Conquer(node)) {
                    *later = Some(Action::Resolved);
                    conflict = true;
                }
            }

            if conflict {
                debug!(%node, "conflicting claims, node becomes neutral");
                changed.extend(self.change_node_owner(node, NodeOwner::Neutral));
            } else {
                changed.extend(self.change_node_owner(node, NodeOwner::Player(player)));
                check_capture.insert(node);
                check_capture.extend(self.adjacent_nodes(node));
            }
        }

        let mut captured: Vec<NodeCoord> = Vec::new();
        for &node in &check_capture {
            if let Some(captor) = self.captor_of(node) {
                self.capture_count[captor] += 1;
                captured.push(node);
            }
        }
        captured.sort_unstable();
        for node in captured {
            debug!(%node, "node captured");
            changed.extend(self.change_node_owner(node, NodeOwner::Empty));
        }

        self.recompute_victory_points();
        self.turn_validated.fill(false);

        debug!(
            changed = changed.len(),
            points = ?self.victory_points.as_slice(),
            "turn resolved"
        );
        changed
    }

    /// The opponent that surrounds `node` strongly enough to capture it.
    ///
    /// Counts neighbouring nodes per opponent; the most frequent opponent
    /// captures when it reaches [`CAPTURE_THRESHOLD`]. Equal counts go to
    /// the lowest player index.
    #[must_use]
    pub fn captor_of(&self, node: NodeCoord) -> Option<PlayerId> {
        let owner = self.node(node)?.owner.player()?;

        let mut tally: FxHashMap<PlayerId, u32> = FxHashMap::default();
        for neighbour in self.adjacent_nodes(node) {
            if let Some(p) = self.node(neighbour).and_then(|n| n.owner.player()) {
                if p != owner {
                    *tally.entry(p).or_insert(0) += 1;
                }
            }
        }

        let (captor, count) = tally
            .into_iter()
            .max_by(|(pa, ca), (pb, cb)| ca.cmp(cb).then(pb.cmp(pa)))?;
        (count >= CAPTURE_THRESHOLD).then_some(captor)
    }
}
