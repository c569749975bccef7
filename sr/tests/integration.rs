//! Integration tests for SetRace
//!
//! These tests run the full actor wiring (coordinator, players, bots,
//! clock) through the public API and verify end-to-end round behavior.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use setrace::config::Config;
use setrace::game::Game;
use setrace::ui::{NullUi, Ui};
use setrace::{CardId, PlayerId, Rules, SlotId};
use tokio::time;

// =============================================================================
// Rules stubs
// =============================================================================

/// Any three cards form a group; the game runs until fewer than three cards
/// remain in play.
struct EveryTriple {
    deck: usize,
}

impl Rules for EveryTriple {
    fn is_valid_group(&self, _cards: [CardId; 3]) -> bool {
        true
    }
    fn enumerate_groups(&self, cards: &[CardId], limit: usize) -> Vec<[CardId; 3]> {
        if cards.len() < 3 || limit == 0 {
            return Vec::new();
        }
        vec![[cards[0], cards[1], cards[2]]]
    }
    fn deck_size(&self) -> usize {
        self.deck
    }
    fn features_of(&self, _card: CardId) -> Vec<usize> {
        Vec::new()
    }
}

/// No three cards ever form a group.
struct NoTriple {
    deck: usize,
}

impl Rules for NoTriple {
    fn is_valid_group(&self, _cards: [CardId; 3]) -> bool {
        false
    }
    fn enumerate_groups(&self, _cards: &[CardId], _limit: usize) -> Vec<[CardId; 3]> {
        Vec::new()
    }
    fn deck_size(&self) -> usize {
        self.deck
    }
    fn features_of(&self, _card: CardId) -> Vec<usize> {
        Vec::new()
    }
}

/// Groups exist, but no claim is ever valid: every round runs to its
/// deadline and the game never ends on its own.
struct NeverValid {
    deck: usize,
}

impl Rules for NeverValid {
    fn is_valid_group(&self, _cards: [CardId; 3]) -> bool {
        false
    }
    fn enumerate_groups(&self, cards: &[CardId], limit: usize) -> Vec<[CardId; 3]> {
        if cards.len() < 3 || limit == 0 {
            return Vec::new();
        }
        vec![[cards[0], cards[1], cards[2]]]
    }
    fn deck_size(&self) -> usize {
        self.deck
    }
    fn features_of(&self, _card: CardId) -> Vec<usize> {
        Vec::new()
    }
}

// =============================================================================
// Counting display
// =============================================================================

#[derive(Default)]
struct CountingUi {
    cards_placed: AtomicUsize,
    expiries: AtomicUsize,
}

impl Ui for CountingUi {
    fn card_placed(&self, _: CardId, _: SlotId) {
        self.cards_placed.fetch_add(1, Ordering::SeqCst);
    }
    fn card_removed(&self, _: SlotId) {}
    fn token_placed(&self, _: PlayerId, _: SlotId) {}
    fn token_removed(&self, _: PlayerId, _: SlotId) {}
    fn score_updated(&self, _: PlayerId, _: u32) {}
    fn countdown_updated(&self, remaining: Duration, warning: bool) {
        if warning && remaining.is_zero() {
            self.expiries.fetch_add(1, Ordering::SeqCst);
        }
    }
    fn freeze_updated(&self, _: PlayerId, _: Duration) {}
    fn winners_announced(&self, _: &[PlayerId]) {}
}

fn quiet_config() -> Config {
    let mut config = Config::default();
    config.game.table_delay_ms = 0;
    config.freeze.point_ms = 0;
    config.freeze.penalty_ms = 0;
    config.players.count = 2;
    config.players.seed = Some(99);
    config
}

// =============================================================================
// Round life-cycle
// =============================================================================

#[tokio::test(start_paused = true)]
async fn expiry_with_no_claims_redeals_without_scoring() {
    let mut config = quiet_config();
    config.game.board_size = 6;
    config.round.timeout_ms = 200;
    config.round.warning_ms = 50;
    // bots far slower than the round: every round expires with no claims
    config.players.bot_delay_ms = 3_600_000;

    let ui = Arc::new(CountingUi::default());
    let game = Game::new(
        config,
        Arc::new(NeverValid { deck: 30 }),
        Arc::clone(&ui) as Arc<dyn Ui>,
    );
    let (handle, task) = game.spawn();

    // let at least three rounds expire
    time::sleep(Duration::from_secs(1)).await;
    handle.stop();
    let outcome = task.await.expect("game task joins").expect("game ran");

    assert!(ui.expiries.load(Ordering::SeqCst) >= 3, "rounds kept expiring");
    // each round deals the 6 slots afresh
    assert!(ui.cards_placed.load(Ordering::SeqCst) >= 18, "board was redealt");
    assert_eq!(outcome.scores, vec![0, 0], "an expired round scores nobody");
}

#[tokio::test(start_paused = true)]
async fn game_without_any_group_ends_with_tied_winners() {
    let config = quiet_config();
    let game = Game::new(config, Arc::new(NoTriple { deck: 81 }), Arc::new(NullUi));
    let (_handle, task) = game.spawn();

    let outcome = task.await.expect("game task joins").expect("game ran");
    assert_eq!(outcome.scores, vec![0, 0]);
    assert_eq!(outcome.winners, vec![0, 1], "score ties are all reported");
}

#[tokio::test(start_paused = true)]
async fn every_card_is_scored_exactly_once_over_a_full_game() {
    let mut config = quiet_config();
    config.game.board_size = 6;
    config.round.timeout_ms = 2_000;
    config.round.warning_ms = 100;
    config.players.bot_delay_ms = 5;

    // 15 cards, every triple valid: exactly five groups leave the game
    let game = Game::new(config, Arc::new(EveryTriple { deck: 15 }), Arc::new(NullUi));
    let (_handle, task) = game.spawn();

    let outcome = time::timeout(Duration::from_secs(600), task)
        .await
        .expect("game ends on its own")
        .expect("game task joins")
        .expect("game ran");

    let total: u32 = outcome.scores.iter().sum();
    assert_eq!(total, 5, "one point per removed group, no double rewards");
    assert!(!outcome.winners.is_empty());
}

// =============================================================================
// Termination liveness
// =============================================================================

#[tokio::test(start_paused = true)]
async fn stop_unblocks_every_actor_mid_round() {
    let mut config = quiet_config();
    config.round.timeout_ms = 3_600_000;
    config.players.bot_delay_ms = 10;
    // long freezes so some player is likely mid-freeze at stop time
    config.freeze.point_ms = 1_000;
    config.freeze.penalty_ms = 3_000;

    let game = Game::new(config, Arc::new(EveryTriple { deck: 81 }), Arc::new(NullUi));
    let (handle, task) = game.spawn();

    time::sleep(Duration::from_secs(2)).await;
    handle.stop();

    // every task joins: coordinator, players, bots and the clock
    let outcome = time::timeout(Duration::from_secs(30), task)
        .await
        .expect("stop unblocks the game promptly")
        .expect("game task joins")
        .expect("game ran");
    assert_eq!(outcome.scores.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn a_stopped_game_still_reports_accumulated_scores() {
    let mut config = quiet_config();
    config.round.timeout_ms = 3_600_000;
    config.players.bot_delay_ms = 5;

    let ui = Arc::new(CountingUi::default());
    let game = Game::new(
        config,
        Arc::new(EveryTriple { deck: 81 }),
        Arc::clone(&ui) as Arc<dyn Ui>,
    );
    let (handle, task) = game.spawn();

    // with every triple valid and instant freezes, points accumulate fast
    time::sleep(Duration::from_secs(5)).await;
    handle.stop();
    let outcome = task.await.expect("game task joins").expect("game ran");

    let total: u32 = outcome.scores.iter().sum();
    assert!(total > 0, "bots scored before the stop");
    let top = *outcome.scores.iter().max().expect("two players");
    for &winner in &outcome.winners {
        assert_eq!(outcome.scores[winner], top);
    }
}
