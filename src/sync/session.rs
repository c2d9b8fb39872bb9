//! The single mutation boundary between the game and the outside world.
//!
//! A `Session` owns the board, the turn handshake and the grace timer for
//! one client. The transport feeds it [`InboundMessage`]s (directly through
//! [`Session::handle`] or from another thread via [`Session::pump`]); the
//! UI calls [`Session::select`] and [`Session::end_turn`]; everything the
//! session wants to send is queued and drained with
//! [`Session::take_outbound`].
//!
//! Protocol violations are logged and returned, never panicked on. The host
//! is expected to end the game when it sees one.

use std::collections::BTreeSet;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::message::{BoardState, ConnectionInfo, InboundMessage, OutboundMessage, PlayerAction, RoomInfo};
use super::snapshot;
use super::timer::GraceTimer;
use super::turn::{TurnPhase, TurnSync};
use crate::core::{Action, ChangeSet, GameConfig, GameLogicState, GameRng, PlayerId, PlayerMap};
use crate::error::{ProtocolViolation, RuleViolation, SessionError};
use crate::layout;
use crate::rules::PerformOutcome;

/// Read-only scoreboard for the renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateSummary {
    pub owned_tile_count: PlayerMap<u32>,
    pub capture_count: PlayerMap<u32>,
    pub victory_points: PlayerMap<u32>,
    pub local_turn_can_end: bool,
}

/// What a handled message means for the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// Nothing to redraw.
    Idle,
    /// A turn was resolved; these coordinates changed owner.
    TurnResolved(ChangeSet),
    /// A snapshot replaced the whole board.
    BoardReplaced,
    PeerConnected(PlayerId),
    /// A peer left; the grace timer is running.
    PeerDisconnected(PlayerId),
    /// Every seat is taken again.
    RoomFull,
}

/// Result of draining the inbound queue with [`Session::pump`].
#[derive(Debug, Default)]
#[must_use]
pub struct PumpReport {
    /// One event per message applied, in arrival order.
    pub events: Vec<SessionEvent>,
    /// The violation that stopped the drain, if any.
    pub violation: Option<ProtocolViolation>,
}

impl PumpReport {
    /// `Ok` with the events if every message was accepted.
    pub fn into_result(self) -> Result<Vec<SessionEvent>, ProtocolViolation> {
        match self.violation {
            None => Ok(self.events),
            Some(violation) => Err(violation),
        }
    }
}

/// One client's view of a game.
#[derive(Debug)]
pub struct Session {
    config: Arc<GameConfig>,
    local: PlayerId,
    reconnecting: bool,
    state: Option<GameLogicState>,
    turn: TurnSync,
    grace: GraceTimer,
    departed: BTreeSet<PlayerId>,
    outbox: Vec<OutboundMessage>,
}

impl Session {
    /// Create a session for `local`.
    ///
    /// # Panics
    ///
    /// If `local` is not a seat in `config`.
    #[must_use]
    pub fn new(config: Arc<GameConfig>, local: PlayerId) -> Self {
        assert!(
            local.index() < config.player_count(),
            "{local} is not a seat in a {}-player game",
            config.player_count()
        );
        Self {
            turn: TurnSync::new(local, config.player_count()),
            grace: GraceTimer::new(config.grace_period()),
            config,
            local,
            reconnecting: false,
            state: None,
            departed: BTreeSet::new(),
            outbox: Vec::new(),
        }
    }

    /// Mark this session as rejoining a game already in progress.
    ///
    /// A reconnecting client accepts its board from whichever player sends
    /// it, not only from the authority.
    #[must_use]
    pub fn with_reconnecting(mut self, reconnecting: bool) -> Self {
        self.reconnecting = reconnecting;
        self
    }

    /// Set up the board.
    ///
    /// The authority of a fresh game generates the layout from `seed` and
    /// broadcasts it. Everyone else waits for a snapshot.
    pub fn start(&mut self, seed: u64) -> Result<(), SessionError> {
        if !self.local.is_authority() || self.reconnecting || self.state.is_some() {
            debug!(player = %self.local, "waiting for board snapshot");
            return Ok(());
        }
        let state = layout::distribute(&self.config, &mut GameRng::new(seed))?;
        self.outbox.push(OutboundMessage::BoardState(snapshot::serialize(&state)?));
        self.state = Some(state);
        Ok(())
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn local_player(&self) -> PlayerId {
        self.local
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    #[must_use]
    pub fn state(&self) -> Option<&GameLogicState> {
        self.state.as_ref()
    }

    #[must_use]
    pub fn turn_phase(&self) -> Option<TurnPhase> {
        self.state.as_ref().map(|s| self.turn.phase(s))
    }

    #[must_use]
    pub fn summary(&self) -> Option<StateSummary> {
        let state = self.state.as_ref()?;
        Some(StateSummary {
            owned_tile_count: state.owned_tile_count().clone(),
            capture_count: state.capture_count().clone(),
            victory_points: state.victory_points().clone(),
            local_turn_can_end: self.turn.can_end_turn(state),
        })
    }

    /// Choose the local action. Rejections are plain rule violations for
    /// the UI to ignore.
    ///
    /// # Panics
    ///
    /// If `action` is not a `Conquer`.
    pub fn select(&mut self, action: Action) -> Result<ChangeSet, RuleViolation> {
        let state = self.state.as_mut().ok_or(RuleViolation::NotInitialized)?;
        match self.turn.select(state, action)? {
            PerformOutcome::Recorded => Ok(ChangeSet::new()),
            PerformOutcome::Resolved(changed) => Ok(changed),
        }
    }

    /// End the local turn. Returns `false` when the turn cannot end yet.
    pub fn end_turn(&mut self) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        let outgoing = self.turn.end_turn(state);
        let ended = !outgoing.is_empty();
        for action in outgoing {
            self.send_action(action);
        }
        ended
    }

    /// Queued messages for the transport, oldest first.
    pub fn take_outbound(&mut self) -> Vec<OutboundMessage> {
        std::mem::take(&mut self.outbox)
    }

    /// Advance the grace timer. Returns `true` on the tick it expires.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let expired = self.grace.tick(dt);
        if expired {
            info!("grace period over, session may be abandoned");
        }
        expired
    }

    /// Has a departed peer stayed away for the whole grace period?
    #[must_use]
    pub fn can_abandon(&self) -> bool {
        self.grace.is_expired()
    }

    #[must_use]
    pub fn grace_timer(&self) -> &GraceTimer {
        &self.grace
    }

    /// Apply every message already waiting on `inbound`, without blocking.
    ///
    /// Stops at the first protocol violation; messages after it stay queued.
    /// Events from messages applied before the violation are still returned.
    pub fn pump(&mut self, inbound: &Receiver<InboundMessage>) -> PumpReport {
        let mut report = PumpReport::default();
        loop {
            match inbound.try_recv() {
                Ok(message) => match self.handle(message) {
                    Ok(event) => report.events.push(event),
                    Err(violation) => {
                        report.violation = Some(violation);
                        return report;
                    }
                },
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return report,
            }
        }
    }

    /// Apply one message from the transport.
    pub fn handle(&mut self, message: InboundMessage) -> Result<SessionEvent, ProtocolViolation> {
        let result = match message {
            InboundMessage::Action(action) => self.handle_action(action),
            InboundMessage::Connection(info) => self.handle_connection(info),
            InboundMessage::RoomFull(info) => self.handle_room_full(&info),
            InboundMessage::BoardState(board) => self.handle_board_state(board),
        };
        if let Err(violation) = &result {
            warn!(player = %self.local, %violation, "suspected tampering");
        }
        result
    }

    /// Reject issuers that hold no seat in this room.
    fn seated(&self, player: PlayerId) -> Result<PlayerId, ProtocolViolation> {
        PlayerId::from_index(player.index(), self.config.player_count())
            .ok_or(ProtocolViolation::UnknownPlayer(player))
    }

    fn check_peer(&self, player: PlayerId) -> Result<(), ProtocolViolation> {
        let player = self.seated(player)?;
        if player == self.local {
            return Err(ProtocolViolation::ForgedIssuer(player));
        }
        Ok(())
    }

    fn handle_action(&mut self, wire: PlayerAction) -> Result<SessionEvent, ProtocolViolation> {
        let player = wire.issuer;
        self.check_peer(player)?;
        let state = self
            .state
            .as_mut()
            .ok_or(ProtocolViolation::NotInitialized { player })?;
        let action = wire.action().ok_or(ProtocolViolation::MalformedAction { player })?;
        self.grace.cancel();

        match action {
            Action::TurnDone => {
                if let Some(reveal) = self.turn.remote_turn_done(state, player) {
                    self.send_action(reveal);
                }
                Ok(SessionEvent::Idle)
            }
            _ => match self.turn.remote_action(state, player, action)? {
                PerformOutcome::Recorded => Ok(SessionEvent::Idle),
                PerformOutcome::Resolved(changed) => Ok(SessionEvent::TurnResolved(changed)),
            },
        }
    }

    fn handle_connection(&mut self, info: ConnectionInfo) -> Result<SessionEvent, ProtocolViolation> {
        let player = self.seated(info.player)?;
        if player == self.local {
            return Ok(SessionEvent::Idle);
        }

        if info.connected {
            info!(%player, "player connected");
            self.grace.cancel();
            return Ok(SessionEvent::PeerConnected(player));
        }

        warn!(%player, "player disconnected");
        if let Some(state) = self.state.as_mut() {
            self.turn.disconnect(state, player);
        }
        self.departed.insert(player);
        self.grace.start();
        Ok(SessionEvent::PeerDisconnected(player))
    }

    fn handle_room_full(&mut self, info: &RoomInfo) -> Result<SessionEvent, ProtocolViolation> {
        if info.room_size != self.config.player_count() {
            warn!(
                room_size = info.room_size,
                players = self.config.player_count(),
                "room size does not match the configured player count"
            );
        }
        self.grace.cancel();

        // The lowest seat that stayed sends the board to whoever came back.
        let departed = std::mem::take(&mut self.departed);
        let resender = PlayerId::all(self.config.player_count()).find(|p| !departed.contains(p));
        if !departed.is_empty() && resender == Some(self.local) {
            if let Some(state) = self.state.as_ref() {
                match snapshot::serialize(state) {
                    Ok(bytes) => {
                        info!(returning = ?departed, "resending board snapshot");
                        self.outbox.push(OutboundMessage::BoardState(bytes));
                    }
                    Err(error) => warn!(%error, "could not encode board snapshot"),
                }
            }
        }
        Ok(SessionEvent::RoomFull)
    }

    fn handle_board_state(&mut self, board: BoardState) -> Result<SessionEvent, ProtocolViolation> {
        let issuer = board.issuer;
        self.check_peer(issuer)?;
        if self.state.is_some() || !(issuer.is_authority() || self.reconnecting) {
            return Err(ProtocolViolation::UnexpectedSnapshot { issuer });
        }

        let state = snapshot::deserialize(&board.state, &self.config)?;
        info!(%issuer, tiles = state.tile_count(), "board snapshot adopted");
        self.turn.reset();
        self.state = Some(state);
        Ok(SessionEvent::BoardReplaced)
    }

    fn send_action(&mut self, action: Action) {
        self.outbox
            .push(OutboundMessage::Action(PlayerAction::new(self.local, action)));
    }
}
