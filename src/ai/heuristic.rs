//! 确定性启发式出牌：不含随机性，同样的手牌与桌面组合总是给出同样的结果。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::game::{
    classify, is_legal, sort_hand, Card, ComboKind, Combination, GameState, PassAction,
    PlayAction, PlayerId,
};

/// At or below this many cards a leading AI sheds its lowest pair first.
const ENDGAME_HAND_SIZE: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameAction {
    Play { action: PlayAction },
    Pass { action: PassAction },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiDecision {
    pub player_id: PlayerId,
    pub action: GameAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combination: Option<Combination>,
}

fn sorted(hand: &[Card]) -> Vec<Card> {
    let mut cards = hand.to_vec();
    sort_hand(&mut cards);
    cards
}

fn group_by_value(hand: &[Card]) -> BTreeMap<u8, Vec<Card>> {
    let mut groups: BTreeMap<u8, Vec<Card>> = BTreeMap::new();
    for card in sorted(hand) {
        groups.entry(card.value).or_default().push(card);
    }
    groups
}

fn lowest_group_above(hand: &[Card], kind: ComboKind, floor: Option<u8>) -> Option<Combination> {
    let size = kind.size();
    group_by_value(hand)
        .into_iter()
        .filter(|(value, cards)| cards.len() >= size && floor.is_none_or(|floor| *value > floor))
        .find_map(|(_, cards)| classify(&cards[..size]))
}

fn opening_move(hand: &[Card]) -> Option<Combination> {
    if hand.len() <= ENDGAME_HAND_SIZE {
        if let Some(pair) = lowest_group_above(hand, ComboKind::Pair, None) {
            return Some(pair);
        }
    }
    sorted(hand).first().and_then(|card| classify(std::slice::from_ref(card)))
}

/// `None` means pass.
pub fn choose_move(hand: &[Card], active: Option<&Combination>) -> Option<Combination> {
    if hand.is_empty() {
        return None;
    }
    match active {
        None => opening_move(hand),
        Some(active) => lowest_group_above(hand, active.kind(), Some(active.rank_value())),
    }
}

/// Wraps `choose_move` for the seat whose turn it is.
#[derive(Debug, Default, Clone, Copy)]
pub struct AiAgent;

impl AiAgent {
    pub fn new() -> Self {
        Self
    }

    pub fn decide_action(&self, state: &GameState, player_id: PlayerId) -> AiDecision {
        let active = state.active_combination();
        let choice = state
            .get_player(player_id)
            .and_then(|player| choose_move(&player.hand, active))
            .filter(|combination| is_legal(combination, active));

        match choice {
            Some(combination) => AiDecision {
                player_id,
                action: GameAction::Play {
                    action: PlayAction {
                        player_id,
                        card_ids: combination.card_ids(),
                    },
                },
                combination: Some(combination),
            },
            None => AiDecision {
                player_id,
                action: GameAction::Pass {
                    action: PassAction { player_id },
                },
                combination: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{CardId, Player, PlayerKind, Rank, Role, Suit};

    fn card(id: CardId, rank: Rank, suit: Suit) -> Card {
        Card::standard(id, rank, suit)
    }

    fn active(cards: &[Card]) -> Combination {
        classify(cards).expect("active combination")
    }

    #[test]
    fn leads_lowest_single_with_a_large_hand() {
        let hand = vec![
            card(10, Rank::Queen, Suit::Spades),
            card(14, Rank::Three, Suit::Hearts),
            card(1, Rank::Three, Suit::Spades),
            card(5, Rank::Seven, Suit::Spades),
            card(18, Rank::Seven, Suit::Hearts),
        ];
        let choice = choose_move(&hand, None).expect("must lead");
        assert_eq!(choice.kind(), ComboKind::Single);
        assert_eq!(choice.card_ids(), vec![1]);
    }

    #[test]
    fn sheds_lowest_pair_in_the_endgame() {
        let hand = vec![
            card(1, Rank::Three, Suit::Spades),
            card(5, Rank::Seven, Suit::Spades),
            card(18, Rank::Seven, Suit::Hearts),
            card(44, Rank::Seven, Suit::Diamonds),
        ];
        let choice = choose_move(&hand, None).expect("must lead");
        assert_eq!(choice.kind(), ComboKind::Pair);
        assert_eq!(choice.card_ids(), vec![5, 18]);

        let no_pair = vec![card(1, Rank::Three, Suit::Spades), card(2, Rank::Four, Suit::Spades)];
        assert_eq!(
            choose_move(&no_pair, None).map(|combo| combo.kind()),
            Some(ComboKind::Single)
        );
    }

    #[test]
    fn beats_single_with_lowest_higher_card() {
        let hand = vec![
            card(13, Rank::Two, Suit::Spades),
            card(3, Rank::Five, Suit::Spades),
            card(8, Rank::Ten, Suit::Spades),
        ];
        let on_table = active(&[card(20, Rank::Nine, Suit::Hearts)]);
        let choice = choose_move(&hand, Some(&on_table)).expect("ten beats nine");
        assert_eq!(choice.card_ids(), vec![8]);

        let big = active(&[Card::joker(54, Rank::BigJoker)]);
        assert!(choose_move(&hand, Some(&big)).is_none());
    }

    #[test]
    fn beats_pair_and_triple_by_rank_groups() {
        let hand = vec![
            card(2, Rank::Four, Suit::Spades),
            card(15, Rank::Four, Suit::Hearts),
            card(6, Rank::Eight, Suit::Spades),
            card(19, Rank::Eight, Suit::Hearts),
            card(32, Rank::Eight, Suit::Clubs),
            card(11, Rank::King, Suit::Spades),
        ];
        let pair_fives = active(&[
            card(3, Rank::Five, Suit::Clubs),
            card(16, Rank::Five, Suit::Diamonds),
        ]);
        let pair = choose_move(&hand, Some(&pair_fives)).expect("eights beat fives");
        assert_eq!(pair.kind(), ComboKind::Pair);
        assert_eq!(pair.card_ids(), vec![6, 19]);

        let triple_sixes = active(&[
            card(4, Rank::Six, Suit::Spades),
            card(17, Rank::Six, Suit::Hearts),
            card(30, Rank::Six, Suit::Clubs),
        ]);
        let triple = choose_move(&hand, Some(&triple_sixes)).expect("eights beat sixes");
        assert_eq!(triple.size(), 3);

        let triple_nines = active(&[
            card(7, Rank::Nine, Suit::Spades),
            card(20, Rank::Nine, Suit::Hearts),
            card(33, Rank::Nine, Suit::Clubs),
        ]);
        assert!(choose_move(&hand, Some(&triple_nines)).is_none());
    }

    #[test]
    fn same_input_gives_same_answer() {
        let hand = vec![
            card(2, Rank::Four, Suit::Spades),
            card(15, Rank::Four, Suit::Hearts),
            card(11, Rank::King, Suit::Spades),
        ];
        let on_table = active(&[
            card(1, Rank::Three, Suit::Spades),
            card(14, Rank::Three, Suit::Hearts),
        ]);
        let first = choose_move(&hand, Some(&on_table));
        for _ in 0..10 {
            assert_eq!(choose_move(&hand, Some(&on_table)), first);
        }
        assert!(choose_move(&[], None).is_none());
    }

    #[test]
    fn agent_passes_when_nothing_beats() {
        let players = vec![
            Player::new(
                0,
                "left",
                "Luna (AI)",
                PlayerKind::Ai,
                Role::Landlord,
                vec![card(1, Rank::Three, Suit::Spades)],
            ),
            Player::new(1, "player", "You", PlayerKind::Human, Role::Farmer, Vec::new()),
            Player::new(2, "right", "Orion (AI)", PlayerKind::Ai, Role::Farmer, Vec::new()),
        ];
        let mut state = GameState::new(players, 0);
        let lead = AiAgent::new().decide_action(&state, 0);
        assert!(matches!(lead.action, GameAction::Play { .. }));

        state.active = Some(crate::game::ActiveCombination {
            combination: active(&[card(13, Rank::Two, Suit::Spades)]),
            owner_id: 2,
            owner_name: "Orion (AI)".into(),
        });
        let decision = AiAgent::new().decide_action(&state, 0);
        assert_eq!(
            decision.action,
            GameAction::Pass {
                action: PassAction { player_id: 0 }
            }
        );
        assert!(decision.combination.is_none());
    }
}
