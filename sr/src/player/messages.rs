//! Message types for player agents

use crate::SlotId;
use crate::claims::Verdict;

/// Everything that can happen to a player from outside its task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerMsg {
    /// Input event: toggle a token on a slot. Dropped unless Playing.
    Move { slot: SlotId },

    /// The coordinator resolved this player's pending claim.
    Verdict(Verdict),

    /// Round started: leave Idle and play. Carries the round tag that the
    /// player stamps on its claims.
    Resume { round: u64 },

    /// Round ended: abandon any pending claim or freeze and go Idle.
    ForceIdle,

    /// Whole-game stop; the task unwinds.
    Stop,
}
