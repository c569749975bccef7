//! Shared board: slot/card layout and per-player tokens
//!
//! Players toggle tokens under the read side of a write-preferring lock;
//! the coordinator's deal/clear/remove operations take the write side, so
//! it is never starved by a continuous stream of toggles.

mod core;

pub use core::{Board, BoardSnapshot, TokenToggle};
