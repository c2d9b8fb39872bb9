//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use trigon::core::{ConfigFile, GameConfig, GameLogicState, GameRng, TileDef};
use trigon::layout::distribute;
use trigon::sync::{BoardState, InboundMessage, OutboundMessage, Session};

/// `rows` x `cols` board with two equally weighted tile types.
pub fn config(rows: u32, cols: u32, players: usize) -> GameConfig {
    let file = ConfigFile::new(rows, cols, "lake", "stone")
        .with_players(players)
        .with_tile(TileDef::new("forest").with_resource("wood"))
        .with_tile(TileDef::new("field").with_resource("grain"))
        .with_tile(TileDef::new("lake"))
        .with_node("stone")
        .with_init("forest", 1.0)
        .with_init("field", 1.0);
    GameConfig::from_file(file).expect("fixture config is valid")
}

/// Freshly distributed board.
pub fn board(rows: u32, cols: u32, players: usize, seed: u64) -> GameLogicState {
    distribute(&config(rows, cols, players), &mut GameRng::new(seed)).expect("layout succeeds")
}

/// Everything `from` has queued, as its peers would receive it.
pub fn relay(from: &mut Session) -> Vec<InboundMessage> {
    let issuer = from.local_player();
    from.take_outbound()
        .into_iter()
        .map(|message| match message {
            OutboundMessage::Action(action) => InboundMessage::Action(action),
            OutboundMessage::BoardState(state) => InboundMessage::BoardState(BoardState { issuer, state }),
        })
        .collect()
}

/// Relay and apply, panicking on any protocol violation.
pub fn deliver(from: &mut Session, to: &mut Session) {
    for message in relay(from) {
        to.handle(message).expect("peer message accepted");
    }
}

pub fn sessions(players: usize) -> Vec<Session> {
    let config = Arc::new(config(5, 5, players));
    (0..players as u8)
        .map(|p| Session::new(Arc::clone(&config), trigon::PlayerId::new(p)))
        .collect()
}

/// Authority and guest for a two-player 5x5 game, board already shared.
pub fn started_pair(seed: u64) -> (Session, Session) {
    let mut seats = sessions(2).into_iter();
    let (mut host, mut guest) = match (seats.next(), seats.next()) {
        (Some(host), Some(guest)) => (host, guest),
        _ => unreachable!("two seats requested"),
    };
    host.start(seed).expect("authority start");
    guest.start(seed).expect("guest start");
    deliver(&mut host, &mut guest);
    (host, guest)
}
