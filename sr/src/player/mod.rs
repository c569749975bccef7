//! Player agents
//!
//! One tokio task per player. The task owns the state machine; everything
//! outside (input source, coordinator) mutates a player only through the
//! narrow [`PlayerHandle`] message interface.

mod core;
mod handle;
mod messages;

pub use core::PlayerAgent;
pub use handle::PlayerHandle;
pub use messages::PlayerMsg;

/// Player state machine phases.
///
/// Transitions are driven only by the coordinator (verdict, round reset)
/// or by the player's own third-token threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Outside active play (waiting for the board to be dealt).
    Idle,
    /// Consuming input, placing and removing tokens.
    Playing,
    /// Third token placed, claim enqueued, blocked on the verdict.
    AwaitingVerdict,
    /// Counting down a reward or penalty freeze; not eligible to move.
    Frozen,
}

/// Published view of a player for display and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerSnapshot {
    pub phase: Phase,
    pub score: u32,
}
