//! PlayerHandle - the narrow mutation interface into a player agent

use std::sync::{Arc, Mutex};

use eyre::{Result, eyre};
use tokio::sync::mpsc;
use tracing::debug;

use super::messages::PlayerMsg;
use super::{Phase, PlayerSnapshot};
use crate::claims::Verdict;
use crate::{PlayerId, SlotId};

/// Shared between the agent task (writer) and its handles (readers).
pub(crate) struct PlayerShared {
    pub(crate) snapshot: Mutex<PlayerSnapshot>,
}

impl PlayerShared {
    pub(crate) fn new() -> Self {
        Self {
            snapshot: Mutex::new(PlayerSnapshot {
                phase: Phase::Idle,
                score: 0,
            }),
        }
    }
}

/// Handle to one player agent.
///
/// Cloneable; the input source and the coordinator each hold one. These
/// methods are the sole mutation entry points into a player from outside.
#[derive(Clone)]
pub struct PlayerHandle {
    id: PlayerId,
    tx: mpsc::Sender<PlayerMsg>,
    shared: Arc<PlayerShared>,
}

impl PlayerHandle {
    pub(crate) fn new(id: PlayerId, tx: mpsc::Sender<PlayerMsg>, shared: Arc<PlayerShared>) -> Self {
        Self { id, tx, shared }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Deliver an input event. Never blocks the input source: if the
    /// player's mailbox is full the move is dropped, which is fine - a
    /// player that cannot keep up is not eligible to act on it anyway.
    pub fn submit_move(&self, slot: SlotId) -> Result<()> {
        match self.tx.try_send(PlayerMsg::Move { slot }) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(player = self.id, slot, "mailbox full, move dropped");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(eyre!("player {} channel closed", self.id)),
        }
    }

    /// Resolve the player's pending claim. Coordinator only.
    pub async fn resolve_claim(&self, verdict: Verdict) -> Result<()> {
        self.tx
            .send(PlayerMsg::Verdict(verdict))
            .await
            .map_err(|_| eyre!("player {} channel closed", self.id))
    }

    /// Release the player into the new round.
    pub async fn resume(&self, round: u64) -> Result<()> {
        self.tx
            .send(PlayerMsg::Resume { round })
            .await
            .map_err(|_| eyre!("player {} channel closed", self.id))
    }

    /// Round ended: return the player to Idle, abandoning any pending
    /// claim or freeze without a score change.
    pub async fn force_idle(&self) -> Result<()> {
        self.tx
            .send(PlayerMsg::ForceIdle)
            .await
            .map_err(|_| eyre!("player {} channel closed", self.id))
    }

    /// Stop the agent task.
    pub async fn stop(&self) -> Result<()> {
        self.tx
            .send(PlayerMsg::Stop)
            .await
            .map_err(|_| eyre!("player {} channel closed", self.id))
    }

    pub fn score(&self) -> u32 {
        self.shared.snapshot.lock().expect("player snapshot lock").score
    }

    pub fn phase(&self) -> Phase {
        self.shared.snapshot.lock().expect("player snapshot lock").phase
    }
}
