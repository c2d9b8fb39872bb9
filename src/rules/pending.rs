//! Per-player action slots for the turn in progress.

use tracing::debug;

use crate::core::{Action, ChangeSet, GameLogicState, PlayerId, PlayerMap};
use crate::error::RuleViolation;

/// What `perform` did with an accepted action.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub enum PerformOutcome {
    /// Stored; other players still have to act.
    Recorded,
    /// This action filled the last slot and the turn was resolved.
    Resolved(ChangeSet),
}

/// One optional action per player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingActions {
    slots: PlayerMap<Option<Action>>,
}

impl PendingActions {
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        Self {
            slots: PlayerMap::with_default(player_count),
        }
    }

    /// Validate and store `player`'s action, resolving once every slot is filled.
    ///
    /// A rejected action leaves both the slots and the state untouched. An
    /// accepted one replaces whatever the player chose earlier this turn.
    pub fn perform(
        &mut self,
        state: &mut GameLogicState,
        player: PlayerId,
        action: Action,
    ) -> Result<PerformOutcome, RuleViolation> {
        state.check_perform(player, &action)?;
        self.slots[player] = Some(action);
        debug!(%player, ?action, "action recorded");

        if !self.is_filled() {
            return Ok(PerformOutcome::Recorded);
        }
        let changed = state.resolve(&self.slots);
        self.clear();
        Ok(PerformOutcome::Resolved(changed))
    }

    /// The action `player` has recorded this turn.
    #[must_use]
    pub fn slot(&self, player: PlayerId) -> Option<Action> {
        self.slots[player]
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.slots.values().all(Option::is_some)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.values().all(Option::is_none)
    }

    /// Void `player`'s choice, e.g. after a disconnect.
    pub fn clear_player(&mut self, player: PlayerId) -> Option<Action> {
        self.slots[player].take()
    }

    pub fn clear(&mut self) {
        self.slots.fill(None);
    }

    #[must_use]
    pub fn as_map(&self) -> &PlayerMap<Option<Action>> {
        &self.slots
    }
}
