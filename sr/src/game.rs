//! Game wiring
//!
//! Builds the board, channels and actor tasks for one full game and hands
//! back a [`GameHandle`] for external control plus the game task itself.

use std::sync::Arc;

use eyre::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::info;

use setrules::Rules;

use crate::board::Board;
use crate::bots::BotDriver;
use crate::claims::ClaimQueue;
use crate::clock::RoundClock;
use crate::config::Config;
use crate::coordinator::{GameOutcome, RoundCoordinator};
use crate::player::{PlayerAgent, PlayerHandle};
use crate::ui::Ui;

/// A configured, not-yet-running game.
pub struct Game {
    config: Config,
    rules: Arc<dyn Rules>,
    ui: Arc<dyn Ui>,
}

/// External control surface of a running game.
#[derive(Clone)]
pub struct GameHandle {
    players: Vec<PlayerHandle>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl GameHandle {
    /// Request termination. The game finishes its bookkeeping and reports
    /// winners from the scores accumulated so far.
    pub fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    pub fn players(&self) -> &[PlayerHandle] {
        &self.players
    }
}

impl Game {
    pub fn new(config: Config, rules: Arc<dyn Rules>, ui: Arc<dyn Ui>) -> Self {
        Self { config, rules, ui }
    }

    /// Spawn every actor and return the control handle plus the game task.
    /// The task resolves with the outcome once the deck is exhausted or
    /// [`GameHandle::stop`] is called.
    pub fn spawn(self) -> (GameHandle, JoinHandle<Result<GameOutcome>>) {
        let player_count = self.config.players.count;
        let slots = self.config.game.board_size;

        let board = Arc::new(Board::new(
            slots,
            self.rules.deck_size(),
            player_count,
            self.config.game.table_delay(),
            Arc::clone(&self.ui),
        ));
        let (claims, claims_rx) = ClaimQueue::new(player_count);
        let (deadline_tx, deadline_rx) = watch::channel(None);
        let (expired_tx, expired_rx) = mpsc::channel(1);
        let shutdown = Arc::new(watch::channel(false).0);

        let mut rng: StdRng = match self.config.players.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut handles = Vec::with_capacity(player_count);
        let mut tasks = Vec::new();
        for id in 0..player_count {
            let (handle, agent_task) = PlayerAgent::spawn(
                id,
                Arc::clone(&board),
                claims.clone(),
                Arc::clone(&self.ui),
                self.config.freeze.point(),
                self.config.freeze.penalty(),
            );
            tasks.push(agent_task);
            tasks.push(BotDriver::spawn(
                handle.clone(),
                slots,
                self.config.players.bot_delay(),
                StdRng::seed_from_u64(rng.random()),
                shutdown.subscribe(),
            ));
            handles.push(handle);
        }

        let clock = RoundClock::new(
            deadline_rx,
            expired_tx,
            shutdown.subscribe(),
            self.config.round.warning(),
            Arc::clone(&self.ui),
        );
        tasks.push(tokio::spawn(clock.run()));

        let coordinator = RoundCoordinator::new(
            board,
            self.rules,
            self.ui,
            handles.clone(),
            claims_rx,
            deadline_tx,
            expired_rx,
            Arc::clone(&shutdown),
            rng,
            self.config.round.timeout(),
            self.config.game.hints,
        );

        let game_task = tokio::spawn(async move {
            let outcome = coordinator.run().await?;
            // the coordinator flipped the shutdown flag; wait for everyone
            for task in tasks {
                let _ = task.await;
            }
            info!("all game tasks joined");
            Ok(outcome)
        });

        let handle = GameHandle {
            players: handles,
            shutdown,
        };
        (handle, game_task)
    }
}
