//! Initial board layout.

pub mod distributor;

pub use distributor::{distribute, stock, BoardSide};
