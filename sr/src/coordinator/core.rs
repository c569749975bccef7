//! Coordinator task implementation

use std::sync::Arc;
use std::time::Duration;

use eyre::{Result, eyre};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info};

use setrules::Rules;

use crate::board::Board;
use crate::claims::{Claim, Verdict};
use crate::player::PlayerHandle;
use crate::ui::Ui;
use crate::{CardId, PlayerId};

/// Final result of a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOutcome {
    /// Players with the maximal score (ties all reported).
    pub winners: Vec<PlayerId>,
    /// Final score per player, indexed by player id.
    pub scores: Vec<u32>,
}

/// The coordinator. Runs the round life-cycle until no valid group remains
/// in play or an external stop is requested.
pub struct RoundCoordinator {
    board: Arc<Board>,
    rules: Arc<dyn Rules>,
    ui: Arc<dyn Ui>,
    players: Vec<PlayerHandle>,
    claims_rx: mpsc::Receiver<Claim>,
    deadline_tx: watch::Sender<Option<Instant>>,
    expired_rx: mpsc::Receiver<()>,
    shutdown: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
    deck: Vec<CardId>,
    rng: StdRng,
    round_len: Duration,
    hints: bool,
    round: u64,
}

impl RoundCoordinator {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        board: Arc<Board>,
        rules: Arc<dyn Rules>,
        ui: Arc<dyn Ui>,
        players: Vec<PlayerHandle>,
        claims_rx: mpsc::Receiver<Claim>,
        deadline_tx: watch::Sender<Option<Instant>>,
        expired_rx: mpsc::Receiver<()>,
        shutdown: Arc<watch::Sender<bool>>,
        rng: StdRng,
        round_len: Duration,
        hints: bool,
    ) -> Self {
        let deck = (0..rules.deck_size()).collect();
        let shutdown_rx = shutdown.subscribe();
        Self {
            board,
            rules,
            ui,
            players,
            claims_rx,
            deadline_tx,
            expired_rx,
            shutdown,
            shutdown_rx,
            deck,
            rng,
            round_len,
            hints,
            round: 0,
        }
    }

    /// Run rounds until the game ends, then report winners.
    pub async fn run(mut self) -> Result<GameOutcome> {
        info!(players = self.players.len(), deck = self.deck.len(), "coordinator started");
        while !self.should_finish().await {
            self.prepare_round().await;
            self.round_loop().await?;
            self.end_round().await?;
        }
        self.finish().await
    }

    /// The game is over when stop was requested or when no valid group can
    /// be formed from the cards still in play. Checked between rounds, when
    /// the board is clear and every live card sits in the deck.
    async fn should_finish(&mut self) -> bool {
        if *self.shutdown_rx.borrow() {
            return true;
        }
        let mut in_play = self.deck.clone();
        in_play.extend(self.board.cards().await);
        self.rules.enumerate_groups(&in_play, 1).is_empty()
    }

    async fn prepare_round(&mut self) {
        self.round += 1;
        self.discard_leftover_claims();

        self.deck.shuffle(&mut self.rng);
        let dealt = self.board.deal(&mut self.deck).await;
        info!(round = self.round, dealt, deck_left = self.deck.len(), "round dealt");

        if self.hints {
            for slots in self.board.current_sets(self.rules.as_ref(), usize::MAX).await {
                info!(round = self.round, ?slots, "hint: valid group on board");
            }
        }

        let deadline = Instant::now() + self.round_len;
        let _ = self.deadline_tx.send(Some(deadline));
        for player in &self.players {
            let _ = player.resume(self.round).await;
        }
    }

    /// The single suspension point of the round: wait for a claim, the
    /// deadline, or shutdown - whichever comes first - without ever losing
    /// a late-arriving claim.
    async fn round_loop(&mut self) -> Result<()> {
        loop {
            tokio::select! {
                claim = self.claims_rx.recv() => {
                    let claim = claim.ok_or_else(|| eyre!("claim queue closed"))?;
                    self.judge(claim).await?;
                }
                expired = self.expired_rx.recv() => {
                    if expired.is_none() {
                        return Err(eyre!("round clock channel closed"));
                    }
                    debug!(round = self.round, "deadline passed");
                    return Ok(());
                }
                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        debug!(round = self.round, "stop requested");
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Close the round: judge the claims that were already queued when the
    /// deadline fired (none is silently skipped), then idle the players and
    /// return the board's cards to the deck.
    async fn end_round(&mut self) -> Result<()> {
        while let Ok(claim) = self.claims_rx.try_recv() {
            self.judge(claim).await?;
        }
        for player in &self.players {
            let _ = player.force_idle().await;
        }
        let _ = self.deadline_tx.send(None);
        self.board.clear_into(&mut self.deck).await;
        info!(round = self.round, "round over");
        Ok(())
    }

    /// Judge one claim, strictly in arrival order.
    ///
    /// Staleness is decided here, at judgment time: if any claimed card has
    /// left its slot (another player's group matched it first), the claim
    /// resolves as a silent no-op and the player returns to play.
    async fn judge(&mut self, claim: Claim) -> Result<()> {
        if claim.round != self.round {
            // its submitter was already returned to Idle at the boundary
            debug!(player = claim.player, seq = claim.seq, "discarding claim from a previous round");
            return Ok(());
        }

        let player = self
            .players
            .get(claim.player)
            .ok_or_else(|| eyre!("claim from unknown player {}", claim.player))?;

        if !self.board.holds(&claim.picks).await {
            debug!(player = claim.player, seq = claim.seq, "stale claim");
            player.resolve_claim(Verdict::Stale).await?;
            return Ok(());
        }

        if self.rules.is_valid_group(claim.cards()) {
            info!(player = claim.player, seq = claim.seq, slots = ?claim.slots(), "valid group claimed");
            self.board.replace_group(claim.slots(), &mut self.deck).await;
            player.resolve_claim(Verdict::Point).await?;
        } else {
            info!(player = claim.player, seq = claim.seq, slots = ?claim.slots(), "invalid group claimed");
            self.board.remove_tokens(claim.player, claim.slots()).await;
            player.resolve_claim(Verdict::Penalty).await?;
        }
        Ok(())
    }

    fn discard_leftover_claims(&mut self) {
        while let Ok(claim) = self.claims_rx.try_recv() {
            debug!(player = claim.player, seq = claim.seq, "discarding claim from a previous round");
        }
    }

    /// Stop every actor, compute winners, report them.
    async fn finish(self) -> Result<GameOutcome> {
        let _ = self.deadline_tx.send(None);
        let _ = self.shutdown.send(true);
        for player in &self.players {
            let _ = player.stop().await;
        }

        let scores: Vec<u32> = self.players.iter().map(|p| p.score()).collect();
        let top = scores.iter().copied().max().unwrap_or(0);
        let winners: Vec<PlayerId> = scores
            .iter()
            .enumerate()
            .filter(|&(_, &score)| score == top)
            .map(|(id, _)| id)
            .collect();

        self.ui.winners_announced(&winners);
        info!(?winners, ?scores, "game over");
        Ok(GameOutcome { winners, scores })
    }
}
