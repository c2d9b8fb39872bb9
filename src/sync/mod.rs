//! Keeping independently running clients in step.
//!
//! - [`turn`]: commit-then-reveal handshake for each turn.
//! - [`snapshot`]: versioned board encoding for the initial layout and
//!   reconnections.
//! - [`message`]: what the transport carries.
//! - [`timer`]: disconnect grace period.
//! - [`session`]: ties the above to one client's board.

pub mod message;
pub mod session;
pub mod snapshot;
pub mod timer;
pub mod turn;

pub use message::{BoardState, ConnectionInfo, InboundMessage, OutboundMessage, PlayerAction, RoomInfo};
pub use session::{PumpReport, Session, SessionEvent, StateSummary};
pub use timer::GraceTimer;
pub use turn::{TurnPhase, TurnSync};
