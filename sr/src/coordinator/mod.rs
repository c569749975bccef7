//! Round coordinator
//!
//! Owns the deck, drives the round life-cycle (deal, play, judge claims,
//! replace cards, end round, restart or finish) and is the only writer of
//! the board's card layout.

mod core;

pub use core::{GameOutcome, RoundCoordinator};
