//! Display notification seam
//!
//! The engine reports every board/score/countdown mutation through this
//! one-way interface. Implementations must never block the core; the only
//! pacing the engine itself applies is the fixed table delay tied to card
//! placement and removal.

use std::time::Duration;

use tracing::{debug, info};

use crate::{CardId, PlayerId, SlotId};

/// One-way display notifications fired by the engine.
pub trait Ui: Send + Sync {
    fn card_placed(&self, card: CardId, slot: SlotId);
    fn card_removed(&self, slot: SlotId);
    fn token_placed(&self, player: PlayerId, slot: SlotId);
    fn token_removed(&self, player: PlayerId, slot: SlotId);
    fn score_updated(&self, player: PlayerId, score: u32);
    fn countdown_updated(&self, remaining: Duration, warning: bool);
    fn freeze_updated(&self, player: PlayerId, remaining: Duration);
    fn winners_announced(&self, winners: &[PlayerId]);
}

/// Ui that forwards everything to tracing.
///
/// Countdown and freeze ticks go to `debug` (they fire every millisecond
/// inside the warning window); the rest is `info`.
pub struct LogUi;

impl Ui for LogUi {
    fn card_placed(&self, card: CardId, slot: SlotId) {
        info!(card, slot, "card placed");
    }

    fn card_removed(&self, slot: SlotId) {
        info!(slot, "card removed");
    }

    fn token_placed(&self, player: PlayerId, slot: SlotId) {
        info!(player, slot, "token placed");
    }

    fn token_removed(&self, player: PlayerId, slot: SlotId) {
        info!(player, slot, "token removed");
    }

    fn score_updated(&self, player: PlayerId, score: u32) {
        info!(player, score, "score updated");
    }

    fn countdown_updated(&self, remaining: Duration, warning: bool) {
        debug!(remaining_ms = remaining.as_millis() as u64, warning, "countdown");
    }

    fn freeze_updated(&self, player: PlayerId, remaining: Duration) {
        debug!(player, remaining_ms = remaining.as_millis() as u64, "freeze");
    }

    fn winners_announced(&self, winners: &[PlayerId]) {
        info!(?winners, "winners announced");
    }
}

/// Ui that ignores everything. Used by tests and headless runs.
pub struct NullUi;

impl Ui for NullUi {
    fn card_placed(&self, _card: CardId, _slot: SlotId) {}
    fn card_removed(&self, _slot: SlotId) {}
    fn token_placed(&self, _player: PlayerId, _slot: SlotId) {}
    fn token_removed(&self, _player: PlayerId, _slot: SlotId) {}
    fn score_updated(&self, _player: PlayerId, _score: u32) {}
    fn countdown_updated(&self, _remaining: Duration, _warning: bool) {}
    fn freeze_updated(&self, _player: PlayerId, _remaining: Duration) {}
    fn winners_announced(&self, _winners: &[PlayerId]) {}
}
