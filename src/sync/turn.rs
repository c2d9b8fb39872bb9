//! Commit-then-reveal turn handshake.
//!
//! Each player first picks an action locally, then announces only that the
//! turn is done (`TurnDone`). Actions are revealed once every player has
//! committed, so no client can learn a peer's choice while it can still
//! change its own. The last reveal to arrive triggers resolution.
//!
//! ```text
//! WaitingForLocalAction --select--> LocalActionChosen --end_turn--> WaitingForPeers
//!          ^                                                              |
//!          |                                             all committed, reveal sent
//!          +------------------ resolve ------------------- Revealed <-----+
//! ```

use tracing::{debug, warn};

use crate::core::{Action, GameLogicState, PlayerId};
use crate::error::{ProtocolViolation, RuleViolation};
use crate::rules::{PendingActions, PerformOutcome};

/// Where the local player is in the current turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TurnPhase {
    WaitingForLocalAction,
    LocalActionChosen,
    WaitingForPeers,
    Revealed,
}

/// Handshake state for one client.
#[derive(Clone, Debug)]
pub struct TurnSync {
    local: PlayerId,
    pending: PendingActions,
    revealed: bool,
}

impl TurnSync {
    #[must_use]
    pub fn new(local: PlayerId, player_count: usize) -> Self {
        Self {
            local,
            pending: PendingActions::new(player_count),
            revealed: false,
        }
    }

    #[must_use]
    pub fn local_player(&self) -> PlayerId {
        self.local
    }

    #[must_use]
    pub fn pending(&self) -> &PendingActions {
        &self.pending
    }

    #[must_use]
    pub fn phase(&self, state: &GameLogicState) -> TurnPhase {
        if self.revealed {
            TurnPhase::Revealed
        } else if state.is_turn_validated(self.local) {
            TurnPhase::WaitingForPeers
        } else if self.pending.slot(self.local).is_some() {
            TurnPhase::LocalActionChosen
        } else {
            TurnPhase::WaitingForLocalAction
        }
    }

    /// Can the local player end the turn right now?
    #[must_use]
    pub fn can_end_turn(&self, state: &GameLogicState) -> bool {
        self.pending.slot(self.local).is_some() && !state.is_turn_validated(self.local)
    }

    /// Choose (or re-choose) the local action for this turn.
    pub fn select(
        &mut self,
        state: &mut GameLogicState,
        action: Action,
    ) -> Result<PerformOutcome, RuleViolation> {
        if state.is_turn_validated(self.local) {
            return Err(RuleViolation::TurnEnded(self.local));
        }
        self.pending.perform(state, self.local, action)
    }

    /// Commit the local player's turn.
    ///
    /// Returns the actions to broadcast in order: `TurnDone`, followed by
    /// the local reveal if this commit was the last one missing. Empty when
    /// the turn cannot end yet.
    pub fn end_turn(&mut self, state: &mut GameLogicState) -> Vec<Action> {
        if !self.can_end_turn(state) {
            return Vec::new();
        }
        state.set_turn_validated(self.local, true);
        debug!(player = %self.local, "local turn committed");

        let mut outgoing = vec![Action::TurnDone];
        outgoing.extend(self.reveal_if_ready(state));
        outgoing
    }

    /// Record a peer's `TurnDone`. Returns the local reveal if it is now due.
    pub fn remote_turn_done(&mut self, state: &mut GameLogicState, player: PlayerId) -> Option<Action> {
        if state.set_turn_validated(player, true) {
            warn!(%player, "turn validated twice");
        }
        self.reveal_if_ready(state)
    }

    /// Record a peer's revealed action, resolving the turn if it was the last.
    pub fn remote_action(
        &mut self,
        state: &mut GameLogicState,
        player: PlayerId,
        action: Action,
    ) -> Result<PerformOutcome, ProtocolViolation> {
        if !matches!(action, Action::Conquer(_)) {
            return Err(ProtocolViolation::MalformedAction { player });
        }
        if !state.all_validated() {
            return Err(ProtocolViolation::RevealBeforeCommit { player });
        }
        if self.pending.slot(player).is_some() {
            return Err(ProtocolViolation::DuplicateReveal { player });
        }

        let outcome = self
            .pending
            .perform(state, player, action)
            .map_err(|reason| ProtocolViolation::IllegalAction { player, reason })?;
        if matches!(outcome, PerformOutcome::Resolved(_)) {
            self.revealed = false;
        }
        Ok(outcome)
    }

    /// Void a departed peer's commit and choice for this turn.
    ///
    /// The local reveal is re-armed so a returning peer receives it again
    /// once everyone has committed. With more than two players, peers who
    /// stayed already hold that reveal and will report the resend as a duplicate.
    pub fn disconnect(&mut self, state: &mut GameLogicState, player: PlayerId) {
        state.set_turn_validated(player, false);
        self.pending.clear_player(player);
        self.revealed = false;
    }

    /// Forget everything about the current turn, e.g. after adopting a snapshot.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.revealed = false;
    }

    fn reveal_if_ready(&mut self, state: &GameLogicState) -> Option<Action> {
        if self.revealed || !state.all_validated() {
            return None;
        }
        let action = self.pending.slot(self.local)?;
        self.revealed = true;
        debug!(player = %self.local, ?action, "local action revealed");
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{NodeCoord, NodeOwner, NodeTypeId, TileCoord, TileTypeId};

    fn board() -> GameLogicState {
        let mut state = GameLogicState::new(2);
        let tile = TileCoord::new(0, 0);
        state.add_tile(tile, TileTypeId(0), None);
        for corner in tile.corners() {
            state.add_node(corner, NodeTypeId(0), NodeOwner::Empty);
        }
        state
    }

    const A: NodeCoord = NodeCoord::new(0, 0, false);
    const B: NodeCoord = NodeCoord::new(1, 1, true);

    #[test]
    fn test_phases_through_a_turn() {
        let mut state = board();
        let p1 = PlayerId::new(1);
        let mut sync = TurnSync::new(PlayerId::new(0), 2);
        assert_eq!(sync.phase(&state), TurnPhase::WaitingForLocalAction);
        assert!(sync.end_turn(&mut state).is_empty());

        assert!(sync.select(&mut state, Action::Conquer(A)).is_ok());
        assert_eq!(sync.phase(&state), TurnPhase::LocalActionChosen);

        assert_eq!(sync.end_turn(&mut state), vec![Action::TurnDone]);
        assert_eq!(sync.phase(&state), TurnPhase::WaitingForPeers);
        assert_eq!(
            sync.select(&mut state, Action::Conquer(B)),
            Err(RuleViolation::TurnEnded(PlayerId::new(0)))
        );

        assert_eq!(sync.remote_turn_done(&mut state, p1), Some(Action::Conquer(A)));
        assert_eq!(sync.phase(&state), TurnPhase::Revealed);
        // Revealed exactly once.
        assert_eq!(sync.remote_turn_done(&mut state, p1), None);

        let outcome = sync.remote_action(&mut state, p1, Action::Conquer(B)).unwrap();
        assert!(matches!(outcome, PerformOutcome::Resolved(_)));
        assert_eq!(sync.phase(&state), TurnPhase::WaitingForLocalAction);
        assert!(!state.all_validated());
    }

    #[test]
    fn test_reveal_when_local_commits_last() {
        let mut state = board();
        let mut sync = TurnSync::new(PlayerId::new(0), 2);
        sync.select(&mut state, Action::Conquer(A)).unwrap();

        assert_eq!(sync.remote_turn_done(&mut state, PlayerId::new(1)), None);
        assert_eq!(
            sync.end_turn(&mut state),
            vec![Action::TurnDone, Action::Conquer(A)]
        );
    }

    #[test]
    fn test_reveal_before_commit_is_rejected() {
        let mut state = board();
        let p1 = PlayerId::new(1);
        let mut sync = TurnSync::new(PlayerId::new(0), 2);

        let err = sync.remote_action(&mut state, p1, Action::Conquer(B)).unwrap_err();
        assert!(matches!(err, ProtocolViolation::RevealBeforeCommit { player } if player == p1));
        assert_eq!(sync.pending().slot(p1), None);
    }

    #[test]
    fn test_disconnect_voids_commit() {
        let mut state = board();
        let p1 = PlayerId::new(1);
        let mut sync = TurnSync::new(PlayerId::new(0), 2);
        sync.select(&mut state, Action::Conquer(A)).unwrap();
        sync.end_turn(&mut state);
        assert!(sync.remote_turn_done(&mut state, p1).is_some());

        sync.disconnect(&mut state, p1);
        assert!(!state.is_turn_validated(p1));
        assert_eq!(sync.phase(&state), TurnPhase::WaitingForPeers);

        // The returning peer commits again and gets the reveal again.
        assert_eq!(sync.remote_turn_done(&mut state, p1), Some(Action::Conquer(A)));
    }
}
