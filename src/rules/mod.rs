//! Game rules: legality checks, simultaneous resolution and capture.
//!
//! The board model in [`crate::core::state`] only stores ownership. This
//! module decides how it changes: [`PendingActions`] collects one action per
//! player, and once every player has acted the turn is resolved in one batch
//! by `GameLogicState::resolve`.

pub mod pending;
pub mod resolve;

pub use pending::{PendingActions, PerformOutcome};
pub use resolve::CAPTURE_THRESHOLD;
