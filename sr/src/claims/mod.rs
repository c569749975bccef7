//! Claim types and the fair FIFO claim queue
//!
//! A claim is born when a player's third token lands and dies when the
//! coordinator judges it. The queue guarantees submission-order fairness:
//! claims are received strictly in the order their enqueue completed.

mod queue;

pub use queue::{Claim, ClaimError, ClaimQueue, Pick, Verdict};
