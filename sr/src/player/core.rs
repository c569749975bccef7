//! Player agent task: the state machine driving token placement and claims

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info};

use super::handle::{PlayerHandle, PlayerShared};
use super::messages::PlayerMsg;
use super::Phase;
use crate::board::{Board, TokenToggle};
use crate::claims::{ClaimError, ClaimQueue, Verdict};
use crate::ui::Ui;
use crate::{PlayerId, SlotId};

/// Mailbox depth per player. Small on purpose: a player can only act on a
/// handful of queued moves, and the coordinator's control messages always
/// use the blocking send path so they are never dropped.
const MAILBOX: usize = 8;

/// One player's agent. Owns the state machine; runs as its own task.
pub struct PlayerAgent {
    id: PlayerId,
    rx: mpsc::Receiver<PlayerMsg>,
    shared: Arc<PlayerShared>,
    board: Arc<Board>,
    claims: ClaimQueue,
    ui: Arc<dyn Ui>,
    point_freeze: Duration,
    penalty_freeze: Duration,
    phase: Phase,
    round: u64,
    score: u32,
}

impl PlayerAgent {
    /// Spawn the agent task and return its handle.
    pub fn spawn(
        id: PlayerId,
        board: Arc<Board>,
        claims: ClaimQueue,
        ui: Arc<dyn Ui>,
        point_freeze: Duration,
        penalty_freeze: Duration,
    ) -> (PlayerHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(MAILBOX);
        let shared = Arc::new(PlayerShared::new());
        let handle = PlayerHandle::new(id, tx, Arc::clone(&shared));
        let agent = Self {
            id,
            rx,
            shared,
            board,
            claims,
            ui,
            point_freeze,
            penalty_freeze,
            phase: Phase::Idle,
            round: 0,
            score: 0,
        };
        let task = tokio::spawn(agent.run());
        (handle, task)
    }

    async fn run(mut self) {
        debug!(player = self.id, "player agent started");
        while let Some(msg) = self.rx.recv().await {
            if !self.handle_msg(msg).await {
                break;
            }
        }
        debug!(player = self.id, "player agent terminated");
    }

    /// Returns false when the task should unwind.
    async fn handle_msg(&mut self, msg: PlayerMsg) -> bool {
        match msg {
            PlayerMsg::Stop => return false,
            PlayerMsg::Resume { round } => {
                self.round = round;
                self.set_phase(Phase::Playing);
            }
            PlayerMsg::ForceIdle => self.set_phase(Phase::Idle),
            PlayerMsg::Verdict(verdict) => {
                if self.phase == Phase::AwaitingVerdict {
                    return self.apply_verdict(verdict).await;
                }
                debug!(player = self.id, ?verdict, "verdict outside AwaitingVerdict, ignored");
            }
            PlayerMsg::Move { slot } => {
                if self.phase == Phase::Playing {
                    return self.play(slot).await;
                }
                debug!(player = self.id, slot, phase = ?self.phase, "move dropped");
            }
        }
        true
    }

    async fn play(&mut self, slot: SlotId) -> bool {
        match self.board.toggle_token(self.id, slot).await {
            TokenToggle::Third(picks) => {
                // Freeze ourselves before the enqueue: from here on only a
                // verdict or a round reset can move us.
                self.set_phase(Phase::AwaitingVerdict);
                match self.claims.submit(self.id, self.round, picks).await {
                    Ok(seq) => debug!(player = self.id, seq, "claim submitted"),
                    Err(ClaimError::Closed) => {
                        // Coordinator is gone; nothing left to wait for.
                        self.set_phase(Phase::Idle);
                        return false;
                    }
                }
            }
            TokenToggle::Placed | TokenToggle::Removed | TokenToggle::NoCard | TokenToggle::AtLimit => {}
        }
        true
    }

    async fn apply_verdict(&mut self, verdict: Verdict) -> bool {
        match verdict {
            Verdict::Point => {
                self.score += 1;
                self.shared.snapshot.lock().expect("player snapshot lock").score = self.score;
                self.ui.score_updated(self.id, self.score);
                info!(player = self.id, score = self.score, "point");
                self.freeze(self.point_freeze).await
            }
            Verdict::Penalty => {
                info!(player = self.id, "penalty");
                self.freeze(self.penalty_freeze).await
            }
            Verdict::Stale => {
                debug!(player = self.id, "claim went stale, back to play");
                self.set_phase(Phase::Playing);
                true
            }
        }
    }

    /// Count down a freeze in ~1s ticks. Moves arriving while frozen are
    /// drained and dropped; a round reset or stop cuts the freeze short.
    async fn freeze(&mut self, total: Duration) -> bool {
        if total.is_zero() {
            self.set_phase(Phase::Playing);
            return true;
        }
        self.set_phase(Phase::Frozen);
        let deadline = Instant::now() + total;
        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let left = deadline - now;
            self.ui.freeze_updated(self.id, left);
            let tick = left.min(Duration::from_secs(1));
            tokio::select! {
                _ = time::sleep(tick) => {}
                msg = self.rx.recv() => match msg {
                    None | Some(PlayerMsg::Stop) => return false,
                    Some(PlayerMsg::ForceIdle) => {
                        self.set_phase(Phase::Idle);
                        return true;
                    }
                    Some(PlayerMsg::Resume { round }) => self.round = round,
                    Some(PlayerMsg::Move { .. }) | Some(PlayerMsg::Verdict(_)) => {}
                }
            }
        }
        self.ui.freeze_updated(self.id, Duration::ZERO);
        self.set_phase(Phase::Playing);
        true
    }

    fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.shared.snapshot.lock().expect("player snapshot lock").phase = phase;
    }
}
