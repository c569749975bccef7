//! Automated input drivers
//!
//! A bot is just an input source: it presses random slots at a configured
//! pace through the same [`PlayerHandle`] a human input loop would use.
//! All game intelligence stays in the agent and the coordinator.

use std::time::Duration;

use rand::Rng;
use rand::rngs::StdRng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::debug;

use crate::player::PlayerHandle;

/// Random-press input driver for one player.
pub struct BotDriver;

impl BotDriver {
    /// Spawn the driver task. It stops when the shutdown flag flips or the
    /// player's channel closes.
    pub fn spawn(
        player: PlayerHandle,
        slots: usize,
        delay: Duration,
        mut rng: StdRng,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            debug!(player = player.id(), "bot driver started");
            loop {
                if *shutdown_rx.borrow() {
                    break;
                }
                tokio::select! {
                    _ = time::sleep(delay) => {
                        let slot = rng.random_range(0..slots);
                        if player.submit_move(slot).is_err() {
                            break;
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!(player = player.id(), "bot driver terminated");
        })
    }
}
