//! Round clock task

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};
use tracing::debug;

use crate::ui::Ui;

/// Tick granularity away from the deadline.
const COARSE_TICK: Duration = Duration::from_secs(1);
/// Tick granularity inside the warning window.
const FINE_TICK: Duration = Duration::from_millis(1);

/// The countdown task.
///
/// The coordinator arms a deadline through the watch channel (`None`
/// disarms it between rounds). While armed, the clock emits countdown
/// updates - coarse ticks ordinarily, fine ticks inside the warning window -
/// and on reaching the deadline sends exactly one expiry message, then waits
/// for the next round to be armed. Every wait also observes the shutdown
/// flag, so the clock unblocks promptly on termination.
pub struct RoundClock {
    deadline_rx: watch::Receiver<Option<Instant>>,
    expired_tx: mpsc::Sender<()>,
    shutdown_rx: watch::Receiver<bool>,
    warning: Duration,
    ui: Arc<dyn Ui>,
}

impl RoundClock {
    pub fn new(
        deadline_rx: watch::Receiver<Option<Instant>>,
        expired_tx: mpsc::Sender<()>,
        shutdown_rx: watch::Receiver<bool>,
        warning: Duration,
        ui: Arc<dyn Ui>,
    ) -> Self {
        Self {
            deadline_rx,
            expired_tx,
            shutdown_rx,
            warning,
            ui,
        }
    }

    pub async fn run(mut self) {
        debug!("round clock started");
        loop {
            // wait for a deadline to be armed
            let deadline = loop {
                if *self.shutdown_rx.borrow() {
                    debug!("round clock terminated");
                    return;
                }
                if let Some(deadline) = *self.deadline_rx.borrow_and_update() {
                    break deadline;
                }
                tokio::select! {
                    changed = self.deadline_rx.changed() => {
                        if changed.is_err() {
                            debug!("deadline channel closed, round clock terminated");
                            return;
                        }
                    }
                    changed = self.shutdown_rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                }
            };

            if !self.countdown(deadline).await {
                debug!("round clock terminated");
                return;
            }
        }
    }

    /// Count down to the deadline. Returns false when the clock should
    /// terminate, true when the outer loop should look for the next round.
    async fn countdown(&mut self, deadline: Instant) -> bool {
        loop {
            if *self.shutdown_rx.borrow() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                self.ui.countdown_updated(Duration::ZERO, true);
                debug!("round expired");
                if self.expired_tx.send(()).await.is_err() {
                    return false;
                }
                // stay quiet until the coordinator re-arms or disarms
                tokio::select! {
                    changed = self.deadline_rx.changed() => return changed.is_ok(),
                    changed = self.shutdown_rx.changed() => {
                        return changed.is_ok() && !*self.shutdown_rx.borrow();
                    }
                }
            }

            let left = deadline - now;
            let warning = left <= self.warning;
            self.ui.countdown_updated(left, warning);

            // a coarse tick never overshoots the warning window edge
            let tick = if warning {
                FINE_TICK.min(left)
            } else {
                COARSE_TICK.min(left - self.warning)
            };
            tokio::select! {
                _ = time::sleep(tick) => {}
                changed = self.deadline_rx.changed() => {
                    // re-armed or disarmed mid-round; re-evaluate from the top
                    return changed.is_ok();
                }
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() {
                        return false;
                    }
                }
            }
        }
    }
}
