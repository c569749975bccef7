//! Fair FIFO holding area for completed three-token claims

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

use crate::{CardId, PlayerId, SlotId};

/// One (slot, card) pair captured atomically with a token toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pick {
    pub slot: SlotId,
    pub card: CardId,
}

/// A submitted triple of tokened cards awaiting judgment.
///
/// `seq` increases monotonically in enqueue order. `round` tags the round
/// the claim was submitted in; the coordinator discards claims that cross a
/// round boundary, since their submitters were already returned to Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    pub player: PlayerId,
    pub round: u64,
    pub seq: u64,
    pub picks: [Pick; 3],
}

impl Claim {
    pub fn slots(&self) -> [SlotId; 3] {
        [self.picks[0].slot, self.picks[1].slot, self.picks[2].slot]
    }

    pub fn cards(&self) -> [CardId; 3] {
        [self.picks[0].card, self.picks[1].card, self.picks[2].card]
    }
}

/// The coordinator's answer to a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Valid group: score +1, short freeze.
    Point,
    /// Invalid group: longer freeze, no score change.
    Penalty,
    /// A claimed card left the board before judgment: silent no-op,
    /// the player simply returns to play.
    Stale,
}

#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("claim queue closed")]
    Closed,
}

/// Sending side of the claim queue, cloned into every player agent.
///
/// The queue is a bounded channel (one outstanding claim per player is
/// structurally possible, so capacity = player count). An async mutex
/// serialises sequence assignment with the enqueue itself, so seq order,
/// channel order and judgment order all agree even when several players
/// complete their third token at the same instant. Waiters on a tokio
/// mutex are queued fairly, so no submitter can starve another.
#[derive(Clone)]
pub struct ClaimQueue {
    tx: mpsc::Sender<Claim>,
    order: Arc<Mutex<()>>,
    seq: Arc<AtomicU64>,
}

impl ClaimQueue {
    /// Create the queue. The receiver goes to the coordinator, which is
    /// woken by each successful enqueue.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Claim>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let queue = Self {
            tx,
            order: Arc::new(Mutex::new(())),
            seq: Arc::new(AtomicU64::new(0)),
        };
        (queue, rx)
    }

    /// Enqueue a claim. Returns its sequence number.
    pub async fn submit(&self, player: PlayerId, round: u64, picks: [Pick; 3]) -> Result<u64, ClaimError> {
        let _order = self.order.lock().await;
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        let claim = Claim {
            player,
            round,
            seq,
            picks,
        };
        self.tx.send(claim).await.map_err(|_| ClaimError::Closed)?;
        debug!(player, round, seq, "claim enqueued");
        Ok(seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picks(base: usize) -> [Pick; 3] {
        [
            Pick { slot: base, card: base },
            Pick { slot: base + 1, card: base + 1 },
            Pick { slot: base + 2, card: base + 2 },
        ]
    }

    #[tokio::test]
    async fn claims_arrive_in_submission_order() {
        let (queue, mut rx) = ClaimQueue::new(4);

        for player in 0..4 {
            queue.submit(player, 1, picks(player)).await.expect("submit");
        }

        for expected in 0..4u64 {
            let claim = rx.recv().await.expect("claim");
            assert_eq!(claim.seq, expected);
            assert_eq!(claim.player, expected as usize);
        }
    }

    #[tokio::test]
    async fn concurrent_submissions_never_reorder() {
        let (queue, mut rx) = ClaimQueue::new(8);

        let mut tasks = Vec::new();
        for player in 0..8 {
            let queue = queue.clone();
            tasks.push(tokio::spawn(async move {
                queue.submit(player, 1, picks(player)).await.expect("submit")
            }));
        }
        for task in tasks {
            task.await.expect("join");
        }

        let mut last = None;
        for _ in 0..8 {
            let claim = rx.recv().await.expect("claim");
            if let Some(prev) = last {
                assert!(claim.seq > prev, "seq {} after {}", claim.seq, prev);
            }
            last = Some(claim.seq);
        }
    }

    #[tokio::test]
    async fn submit_after_receiver_dropped_is_closed() {
        let (queue, rx) = ClaimQueue::new(2);
        drop(rx);
        let err = queue.submit(0, 1, picks(0)).await.unwrap_err();
        assert!(matches!(err, ClaimError::Closed));
    }

    #[test]
    fn claim_accessors_project_picks() {
        let claim = Claim {
            player: 1,
            round: 3,
            seq: 7,
            picks: [
                Pick { slot: 0, card: 10 },
                Pick { slot: 1, card: 20 },
                Pick { slot: 2, card: 30 },
            ],
        };
        assert_eq!(claim.slots(), [0, 1, 2]);
        assert_eq!(claim.cards(), [10, 20, 30]);
    }
}
