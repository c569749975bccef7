//! SetRules - pure rule engine for the Set card game
//!
//! A card is an integer id in `0..values^features`, read as `features`
//! base-`values` digits; digit `i` is the value of feature `i`. Three cards
//! form a valid group iff, for every feature, the three values are either
//! all the same or all different.
//!
//! This crate is deterministic and synchronization-free. The concurrent
//! engine consumes it through the [`Rules`] trait so tests can substitute
//! their own validity function.

/// Identifier of a card in the deck.
pub type CardId = usize;

/// The validity seam consumed by the round engine.
///
/// `is_valid_group` must be pure and deterministic. `enumerate_groups` is
/// used for hinting and for the no-groups-remain termination check, so it
/// must find a group whenever one exists (up to `limit`).
pub trait Rules: Send + Sync {
    /// Decide whether three cards form a valid group.
    fn is_valid_group(&self, cards: [CardId; 3]) -> bool;

    /// Enumerate up to `limit` valid groups among the given cards.
    fn enumerate_groups(&self, cards: &[CardId], limit: usize) -> Vec<[CardId; 3]>;

    /// Total number of distinct cards.
    fn deck_size(&self) -> usize;

    /// Decode a card id into its feature values (for hints and logs).
    fn features_of(&self, card: CardId) -> Vec<usize>;
}

/// The classic rules: `features` base-`values` digits per card.
///
/// The standard game is 4 features x 3 values = 81 cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classic {
    features: usize,
    values: usize,
}

impl Classic {
    pub fn new(features: usize, values: usize) -> Self {
        assert!(features > 0, "at least one feature");
        assert!(values > 1, "at least two values per feature");
        Self { features, values }
    }

    /// The standard 4x3 deck of 81 cards.
    pub fn standard() -> Self {
        Self::new(4, 3)
    }

    fn feature(&self, card: CardId, i: usize) -> usize {
        card / self.values.pow(i as u32) % self.values
    }
}

impl Default for Classic {
    fn default() -> Self {
        Self::standard()
    }
}

impl Rules for Classic {
    fn is_valid_group(&self, cards: [CardId; 3]) -> bool {
        (0..self.features).all(|i| {
            let a = self.feature(cards[0], i);
            let b = self.feature(cards[1], i);
            let c = self.feature(cards[2], i);
            (a == b && b == c) || (a != b && b != c && a != c)
        })
    }

    fn enumerate_groups(&self, cards: &[CardId], limit: usize) -> Vec<[CardId; 3]> {
        let mut found = Vec::new();
        if limit == 0 {
            return found;
        }
        for i in 0..cards.len() {
            for j in i + 1..cards.len() {
                for k in j + 1..cards.len() {
                    let group = [cards[i], cards[j], cards[k]];
                    if self.is_valid_group(group) {
                        found.push(group);
                        if found.len() == limit {
                            return found;
                        }
                    }
                }
            }
        }
        found
    }

    fn deck_size(&self) -> usize {
        self.values.pow(self.features as u32)
    }

    fn features_of(&self, card: CardId) -> Vec<usize> {
        (0..self.features).map(|i| self.feature(card, i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn standard_deck_has_81_cards() {
        assert_eq!(Classic::standard().deck_size(), 81);
        assert_eq!(Classic::new(2, 3).deck_size(), 9);
    }

    #[test]
    fn all_same_and_all_different_features_are_valid() {
        let rules = Classic::standard();
        // 0, 1, 2 differ only in feature 0, which takes all three values.
        assert!(rules.is_valid_group([0, 1, 2]));
        // 0, 3, 6 differ only in feature 1.
        assert!(rules.is_valid_group([0, 3, 6]));
        // 0, 13, 26: features 0-2 take all three values, feature 3 is all zero.
        assert!(rules.is_valid_group([0, 13, 26]));
    }

    #[test]
    fn two_equal_one_different_is_invalid() {
        let rules = Classic::standard();
        // Feature 0 values are 0, 1, 0.
        assert!(!rules.is_valid_group([0, 1, 3]));
        assert!(!rules.is_valid_group([0, 1, 4]));
    }

    #[test]
    fn enumerate_respects_limit_and_finds_known_group() {
        let rules = Classic::standard();
        let cards = [0, 1, 2, 3, 4, 5];
        let one = rules.enumerate_groups(&cards, 1);
        assert_eq!(one.len(), 1);
        let all = rules.enumerate_groups(&cards, usize::MAX);
        assert!(all.contains(&[0, 1, 2]));
        assert!(all.iter().all(|&g| rules.is_valid_group(g)));
        assert!(rules.enumerate_groups(&cards, 0).is_empty());
    }

    #[test]
    fn fewer_than_three_cards_has_no_group() {
        let rules = Classic::standard();
        assert!(rules.enumerate_groups(&[0, 1], usize::MAX).is_empty());
        assert!(rules.enumerate_groups(&[], usize::MAX).is_empty());
    }

    #[test]
    fn features_of_decodes_base_digits() {
        let rules = Classic::standard();
        assert_eq!(rules.features_of(0), vec![0, 0, 0, 0]);
        assert_eq!(rules.features_of(26), vec![2, 2, 2, 0]);
        assert_eq!(rules.features_of(80), vec![2, 2, 2, 2]);
    }

    /// The card completing a pair: per feature, the shared value if equal,
    /// otherwise the one value neither card has.
    fn completion(rules: &Classic, a: CardId, b: CardId) -> CardId {
        let (fa, fb) = (rules.features_of(a), rules.features_of(b));
        let mut card = 0;
        for i in (0..fa.len()).rev() {
            let v = if fa[i] == fb[i] { fa[i] } else { 3 - fa[i] - fb[i] };
            card = card * 3 + v;
        }
        card
    }

    proptest! {
        #[test]
        fn every_pair_has_a_unique_valid_completion(a in 0usize..81, b in 0usize..81) {
            prop_assume!(a != b);
            let rules = Classic::standard();
            let c = completion(&rules, a, b);
            prop_assert!(rules.is_valid_group([a, b, c]));
            // and it is the only one
            for other in 0..81 {
                if other != a && other != b && other != c {
                    prop_assert!(!rules.is_valid_group([a, b, other]));
                }
            }
        }

        #[test]
        fn validity_is_order_independent(a in 0usize..81, b in 0usize..81, c in 0usize..81) {
            let rules = Classic::standard();
            let v = rules.is_valid_group([a, b, c]);
            prop_assert_eq!(rules.is_valid_group([c, a, b]), v);
            prop_assert_eq!(rules.is_valid_group([b, a, c]), v);
        }
    }
}
