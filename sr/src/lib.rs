//! SetRace - concurrent round engine for the Set card game
//!
//! Several independent actors race over a shared, mutable board: one
//! coordinator deals cards and judges claims, N player agents place tokens
//! and submit claims, and a round clock drives the countdown. Everything
//! runs as parallel tokio tasks communicating over channels.
//!
//! # Core guarantees
//!
//! - **Writer priority**: token toggles are reader operations on the board;
//!   the coordinator's deal/clear/remove operations take the write side and
//!   can never be starved by a stream of toggles.
//! - **Claim fairness**: claims are judged strictly in the order their
//!   enqueue completed, never reordered by contention.
//! - **Judgment-time staleness**: a claim whose cards left the board before
//!   judgment resolves as a silent no-op, not a penalty.
//! - **Cooperative shutdown**: every blocking point also observes the stop
//!   signal, so no actor is left waiting forever.
//!
//! # Modules
//!
//! - [`board`] - slot/card/token state under a write-preferring lock
//! - [`claims`] - the fair FIFO claim queue
//! - [`player`] - per-player agent task, handle and state machine
//! - [`clock`] - round countdown and expiry signalling
//! - [`coordinator`] - deck ownership and the round life-cycle
//! - [`game`] - wiring and task spawning
//! - [`bots`] - automated input drivers
//! - [`ui`] - one-way display notification seam
//! - [`config`] - configuration types and loading

pub mod board;
pub mod bots;
pub mod claims;
pub mod cli;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod game;
pub mod player;
pub mod ui;

// Re-export commonly used types
pub use board::{Board, BoardSnapshot, TokenToggle};
pub use claims::{Claim, ClaimError, ClaimQueue, Pick, Verdict};
pub use clock::RoundClock;
pub use config::Config;
pub use coordinator::{GameOutcome, RoundCoordinator};
pub use game::{Game, GameHandle};
pub use player::{Phase, PlayerAgent, PlayerHandle, PlayerMsg, PlayerSnapshot};
pub use setrules::{CardId, Classic, Rules};
pub use ui::{LogUi, NullUi, Ui};

/// Index of a player (0-based).
pub type PlayerId = usize;

/// Index of a board slot (0-based).
pub type SlotId = usize;
