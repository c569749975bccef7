//! Board state and its access arbitration

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use setrules::Rules;
use tokio::sync::RwLock;
use tracing::debug;

use crate::claims::Pick;
use crate::ui::Ui;
use crate::{CardId, PlayerId, SlotId};

/// Outcome of a token toggle, decided under a single read acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenToggle {
    /// Token placed (first or second).
    Placed,
    /// Token removed from a slot the player already held.
    Removed,
    /// Third token placed; the three (slot, card) picks were captured
    /// atomically with the toggle.
    Third([Pick; 3]),
    /// The slot holds no card; nothing happened.
    NoCard,
    /// The player already holds three tokens; nothing happened.
    AtLimit,
}

struct Layout {
    slot_to_card: Vec<Option<CardId>>,
    card_to_slot: Vec<Option<SlotId>>,
    // tokens[player * slots + slot]. Players flip only their own flags and
    // only under the read guard; the coordinator clears flags under the
    // write guard. The lock provides the cross-task ordering.
    tokens: Vec<AtomicBool>,
}

impl Layout {
    fn token(&self, players_slots: usize, player: PlayerId, slot: SlotId) -> &AtomicBool {
        &self.tokens[player * players_slots + slot]
    }
}

/// The shared board. All card/token access goes through here.
///
/// `tokio::sync::RwLock` is write-preferring: once the coordinator queues
/// for the write side, new read acquisitions wait behind it. That is the
/// writer-priority contract the round life-cycle depends on.
pub struct Board {
    inner: RwLock<Layout>,
    ui: Arc<dyn Ui>,
    slots: usize,
    pacing: Duration,
}

/// Copy of the board state for hints, tests and invariant checks.
#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    pub slot_to_card: Vec<Option<CardId>>,
    pub card_to_slot: Vec<Option<SlotId>>,
    pub tokens: Vec<Vec<bool>>,
}

impl BoardSnapshot {
    /// The slot->card and card->slot maps must be mutual inverses over the
    /// placed subset at every observation point.
    pub fn is_bijective(&self) -> bool {
        let forward = self
            .slot_to_card
            .iter()
            .enumerate()
            .filter_map(|(slot, card)| card.map(|c| (slot, c)))
            .all(|(slot, card)| self.card_to_slot.get(card).copied().flatten() == Some(slot));
        let backward = self
            .card_to_slot
            .iter()
            .enumerate()
            .filter_map(|(card, slot)| slot.map(|s| (card, s)))
            .all(|(card, slot)| self.slot_to_card.get(slot).copied().flatten() == Some(card));
        forward && backward
    }

    /// Number of tokens a player currently holds.
    pub fn held(&self, player: PlayerId) -> usize {
        self.tokens[player].iter().filter(|&&t| t).count()
    }
}

impl Board {
    pub fn new(slots: usize, deck_size: usize, players: usize, pacing: Duration, ui: Arc<dyn Ui>) -> Self {
        let tokens = (0..players * slots).map(|_| AtomicBool::new(false)).collect();
        Self {
            inner: RwLock::new(Layout {
                slot_to_card: vec![None; slots],
                card_to_slot: vec![None; deck_size],
                tokens,
            }),
            ui,
            slots,
            pacing,
        }
    }

    /// Toggle a player's token on a slot (reader operation).
    ///
    /// Under one read acquisition: no-op if the slot is empty or the player
    /// is at the three-token limit; otherwise place or remove. On the third
    /// placement the player's three (slot, card) pairs are captured before
    /// the guard drops, so the claim always describes a consistent board.
    pub async fn toggle_token(&self, player: PlayerId, slot: SlotId) -> TokenToggle {
        let layout = self.inner.read().await;
        if layout.slot_to_card[slot].is_none() {
            return TokenToggle::NoCard;
        }

        let flag = layout.token(self.slots, player, slot);
        if flag.load(Ordering::SeqCst) {
            flag.store(false, Ordering::SeqCst);
            self.ui.token_removed(player, slot);
            return TokenToggle::Removed;
        }

        let held = self.held_picks(&layout, player);
        if held.len() >= 3 {
            return TokenToggle::AtLimit;
        }
        flag.store(true, Ordering::SeqCst);
        self.ui.token_placed(player, slot);

        if held.len() == 2 {
            let card = layout.slot_to_card[slot].expect("checked above");
            let mut picks = [held[0], held[1], Pick { slot, card }];
            picks.sort_by_key(|p| p.slot);
            debug!(player, ?picks, "third token placed");
            return TokenToggle::Third(picks);
        }
        TokenToggle::Placed
    }

    /// Place a single card (writer operation). The pacing delay elapses
    /// with the write guard held.
    pub async fn place_card(&self, card: CardId, slot: SlotId) {
        let mut layout = self.inner.write().await;
        self.place_card_locked(&mut layout, card, slot).await;
    }

    /// Remove the card at a slot along with any tokens resting on it
    /// (writer operation). Returns the removed card.
    pub async fn remove_card(&self, slot: SlotId) -> Option<CardId> {
        let mut layout = self.inner.write().await;
        self.remove_card_locked(&mut layout, slot).await
    }

    /// Fill every empty slot from the front of the deck, under one write
    /// guard. Returns the number of cards placed.
    pub async fn deal(&self, deck: &mut Vec<CardId>) -> usize {
        let mut layout = self.inner.write().await;
        self.deal_locked(&mut layout, deck).await
    }

    /// Remove a matched group and deal replacements, all under one write
    /// guard: no reader can observe the gap between removal and refill.
    /// Tokens resting on the removed slots are stripped (cascade).
    pub async fn replace_group(&self, slots: [SlotId; 3], deck: &mut Vec<CardId>) {
        let mut layout = self.inner.write().await;
        for slot in slots {
            self.remove_card_locked(&mut layout, slot).await;
        }
        self.deal_locked(&mut layout, deck).await;
    }

    /// Return every card on the board to the deck, stripping all tokens
    /// (writer operation, one guard for the whole sweep).
    pub async fn clear_into(&self, deck: &mut Vec<CardId>) {
        let mut layout = self.inner.write().await;
        for slot in 0..self.slots {
            if let Some(card) = self.remove_card_locked(&mut layout, slot).await {
                deck.push(card);
            }
        }
    }

    /// Strip a player's tokens from the given slots (writer operation).
    /// Used when a claim earns a penalty.
    pub async fn remove_tokens(&self, player: PlayerId, slots: [SlotId; 3]) {
        let layout = self.inner.write().await;
        for slot in slots {
            let flag = layout.token(self.slots, player, slot);
            if flag.swap(false, Ordering::SeqCst) {
                self.ui.token_removed(player, slot);
            }
        }
    }

    /// True iff every pick's card is still in its captured slot.
    pub async fn holds(&self, picks: &[Pick; 3]) -> bool {
        let layout = self.inner.read().await;
        picks.iter().all(|p| layout.slot_to_card[p.slot] == Some(p.card))
    }

    /// Enumerate up to `limit` currently valid groups, as sorted slot
    /// triples. Used for hinting.
    pub async fn current_sets(&self, rules: &dyn Rules, limit: usize) -> Vec<[SlotId; 3]> {
        let layout = self.inner.read().await;
        let cards: Vec<CardId> = layout.slot_to_card.iter().copied().flatten().collect();
        rules
            .enumerate_groups(&cards, limit)
            .into_iter()
            .map(|group| {
                let mut slots = group.map(|card| layout.card_to_slot[card].expect("card is on the board"));
                slots.sort_unstable();
                slots
            })
            .collect()
    }

    /// Cards currently on the board.
    pub async fn cards(&self) -> Vec<CardId> {
        let layout = self.inner.read().await;
        layout.slot_to_card.iter().copied().flatten().collect()
    }

    /// Snapshot for tests and invariant checks.
    pub async fn snapshot(&self) -> BoardSnapshot {
        let layout = self.inner.read().await;
        let players = layout.tokens.len() / self.slots.max(1);
        BoardSnapshot {
            slot_to_card: layout.slot_to_card.clone(),
            card_to_slot: layout.card_to_slot.clone(),
            tokens: (0..players)
                .map(|p| {
                    (0..self.slots)
                        .map(|s| layout.token(self.slots, p, s).load(Ordering::SeqCst))
                        .collect()
                })
                .collect(),
        }
    }

    fn held_picks(&self, layout: &Layout, player: PlayerId) -> Vec<Pick> {
        (0..self.slots)
            .filter(|&slot| layout.token(self.slots, player, slot).load(Ordering::SeqCst))
            .filter_map(|slot| layout.slot_to_card[slot].map(|card| Pick { slot, card }))
            .collect()
    }

    async fn place_card_locked(&self, layout: &mut Layout, card: CardId, slot: SlotId) {
        // The pacing contract with the display: the delay elapses while the
        // write guard is held, so no reader sees a half-updated board.
        tokio::time::sleep(self.pacing).await;
        layout.card_to_slot[card] = Some(slot);
        layout.slot_to_card[slot] = Some(card);
        self.ui.card_placed(card, slot);
    }

    async fn remove_card_locked(&self, layout: &mut Layout, slot: SlotId) -> Option<CardId> {
        let card = layout.slot_to_card[slot]?;
        tokio::time::sleep(self.pacing).await;
        let players = layout.tokens.len() / self.slots.max(1);
        for player in 0..players {
            if layout.token(self.slots, player, slot).swap(false, Ordering::SeqCst) {
                self.ui.token_removed(player, slot);
            }
        }
        layout.slot_to_card[slot] = None;
        layout.card_to_slot[card] = None;
        self.ui.card_removed(slot);
        Some(card)
    }

    async fn deal_locked(&self, layout: &mut Layout, deck: &mut Vec<CardId>) -> usize {
        let mut placed = 0;
        for slot in 0..self.slots {
            if layout.slot_to_card[slot].is_some() {
                continue;
            }
            let Some(card) = deck.pop() else { break };
            self.place_card_locked(layout, card, slot).await;
            placed += 1;
        }
        placed
    }
}
