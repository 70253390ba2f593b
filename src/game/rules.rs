use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{
    cards::{sort_hand, Card, CardId},
    combo::{classify, is_legal, Combination},
    state::{ActiveCombination, GameEvent, GameState, HistoryEntry, PlayerId},
    view::GameSnapshot,
};

/// 轮到人类座位时的状态提示。
pub const HUMAN_TURN_PROMPT: &str = "Select cards to play or pass if you cannot beat the combo.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayAction {
    pub player_id: PlayerId,
    #[serde(default)]
    pub card_ids: Vec<CardId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PassAction {
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[serde(tag = "type")]
pub enum PlayRejection {
    #[error("it is not this player's turn")]
    NotPlayerTurn,
    #[error("no cards selected")]
    EmptySelection,
    #[error("card {card_id} is not in hand")]
    CardNotInHand { card_id: CardId },
    #[error("card {card_id} was selected twice")]
    DuplicateCard { card_id: CardId },
    #[error("the selected cards do not form a single, pair or triple")]
    UnrecognizedCombination,
    #[error("that combination can't be played right now")]
    DoesNotBeat,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[serde(tag = "type")]
pub enum PassRejection {
    #[error("it is not this player's turn")]
    NotPlayerTurn,
    #[error("there is no active combination to pass on")]
    NothingToPass,
}

/// 所有错误都可恢复：请求被拒绝，状态保持不变。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[serde(tag = "type")]
pub enum RuleError {
    #[error("illegal play: {reason}")]
    IllegalPlay { reason: PlayRejection },
    #[error("invalid pass: {reason}")]
    InvalidPass { reason: PassRejection },
    #[error("the game is already over")]
    GameAlreadyOver,
    #[error("deck holds {actual} cards, expected {expected}")]
    InvalidDeckSize { expected: usize, actual: usize },
}

impl RuleError {
    fn illegal(reason: PlayRejection) -> Self {
        RuleError::IllegalPlay { reason }
    }

    fn invalid_pass(reason: PassRejection) -> Self {
        RuleError::InvalidPass { reason }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResolution {
    pub snapshot: GameSnapshot,
    pub events: Vec<GameEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<PlayerId>,
}

impl RuleResolution {
    pub fn new(state: &GameState, events: Vec<GameEvent>) -> Self {
        Self {
            snapshot: state.snapshot(),
            events,
            winner: state.winner,
        }
    }
}

/// What the presentation needs to enable or disable its play button.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionPreview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combination: Option<Combination>,
    pub playable: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RuleEngine;

impl RuleEngine {
    fn ensure_not_finished(state: &GameState) -> Result<(), RuleError> {
        if state.is_finished() {
            return Err(RuleError::GameAlreadyOver);
        }
        Ok(())
    }

    /// 未知座位与非当前回合同样处理。
    fn ensure_turn_owner(state: &GameState, player_id: PlayerId) -> Option<usize> {
        state
            .player_index(player_id)
            .filter(|&index| Self::is_turn_owner(state, index))
    }

    fn is_turn_owner(state: &GameState, index: usize) -> bool {
        state.turn_index == index
    }

    /// Looks the requested ids up in the player's hand and classifies them.
    pub fn resolve_selection(
        state: &GameState,
        player_id: PlayerId,
        card_ids: &[CardId],
    ) -> Result<Combination, RuleError> {
        let index = state
            .player_index(player_id)
            .ok_or(RuleError::illegal(PlayRejection::NotPlayerTurn))?;
        if card_ids.is_empty() {
            return Err(RuleError::illegal(PlayRejection::EmptySelection));
        }

        let player = &state.players[index];
        let mut seen = HashSet::new();
        let mut cards: Vec<Card> = Vec::with_capacity(card_ids.len());
        for &card_id in card_ids {
            if !seen.insert(card_id) {
                return Err(RuleError::illegal(PlayRejection::DuplicateCard { card_id }));
            }
            let position = player
                .find_card_in_hand_index(card_id)
                .ok_or(RuleError::illegal(PlayRejection::CardNotInHand { card_id }))?;
            cards.push(player.hand[position].clone());
        }

        classify(&cards).ok_or(RuleError::illegal(PlayRejection::UnrecognizedCombination))
    }

    /// Read-only check that mirrors `play` without touching state.
    pub fn preview_selection(
        state: &GameState,
        player_id: PlayerId,
        card_ids: &[CardId],
    ) -> SelectionPreview {
        let combination = Self::resolve_selection(state, player_id, card_ids).ok();
        let playable = match (&combination, state.player_index(player_id)) {
            (Some(combination), Some(index)) => {
                !state.is_finished()
                    && Self::is_turn_owner(state, index)
                    && is_legal(combination, state.active_combination())
            }
            _ => false,
        };
        SelectionPreview {
            combination,
            playable,
        }
    }

    pub fn can_pass(state: &GameState, player_id: PlayerId) -> bool {
        match state.player_index(player_id) {
            Some(index) => {
                !state.is_finished() && Self::is_turn_owner(state, index) && state.active.is_some()
            }
            None => false,
        }
    }

    pub fn play(state: &mut GameState, action: PlayAction) -> Result<Vec<GameEvent>, RuleError> {
        Self::ensure_not_finished(state)?;
        let index = Self::ensure_turn_owner(state, action.player_id)
            .ok_or(RuleError::illegal(PlayRejection::NotPlayerTurn))?;

        let combination = Self::resolve_selection(state, action.player_id, &action.card_ids)?;
        if !is_legal(&combination, state.active_combination()) {
            return Err(RuleError::illegal(PlayRejection::DoesNotBeat));
        }

        // 校验全部通过后才修改状态。
        let player = &mut state.players[index];
        player.remove_cards_from_hand(&combination.card_ids());
        sort_hand(&mut player.hand);
        let player_id = player.id;
        let player_name = player.name.clone();
        let hand_empty = player.hand.is_empty();
        let role = player.role;

        log::debug!(
            "{player_name} plays {} ({} left)",
            combination.label(),
            state.players[index].hand.len()
        );

        state.active = Some(ActiveCombination {
            combination: combination.clone(),
            owner_id: player_id,
            owner_name: player_name.clone(),
        });
        state.consecutive_passes = 0;
        state.log_history(
            HistoryEntry::new(player_name.clone(), combination.label())
                .with_cards(combination.cards().to_vec()),
        );
        state.set_status(format!("{player_name} plays {}.", combination.label()));

        let mut events = vec![GameEvent::CombinationPlayed {
            player_id,
            combination,
        }];

        if hand_empty {
            state.winner = Some(player_id);
            state.log_history(
                HistoryEntry::new("Game", format!("{player_name} wins the game!"))
                    .with_result(format!("{} triumphs!", role.label())),
            );
            state.set_status(format!("{player_name} wins! {} prevails.", role.label()));
            log::info!("{player_name} wins as {:?}", role);
            events.push(GameEvent::GameWon {
                winner: player_id,
                role,
            });
            return Ok(events);
        }

        events.extend(Self::advance_turn(state));
        Ok(events)
    }

    pub fn pass(state: &mut GameState, action: PassAction) -> Result<Vec<GameEvent>, RuleError> {
        Self::ensure_not_finished(state)?;
        let index = Self::ensure_turn_owner(state, action.player_id)
            .ok_or(RuleError::invalid_pass(PassRejection::NotPlayerTurn))?;
        if state.active.is_none() {
            return Err(RuleError::invalid_pass(PassRejection::NothingToPass));
        }

        let player_name = state.players[index].name.clone();
        state.consecutive_passes += 1;
        state.log_history(HistoryEntry::new(player_name.clone(), "Pass"));
        state.set_status(format!("{player_name} passes."));
        log::debug!(
            "{player_name} passes ({} in a row)",
            state.consecutive_passes
        );

        let mut events = vec![GameEvent::Passed {
            player_id: action.player_id,
            consecutive_passes: state.consecutive_passes,
        }];

        if state.consecutive_passes >= state.seat_count().saturating_sub(1) {
            state.active = None;
            state.consecutive_passes = 0;
            state.set_status(format!("{player_name} passes. Fresh round!"));
            let next_leader = state.players[(index + 1) % state.seat_count()].id;
            log::info!("round closed, seat {next_leader} leads");
            events.push(GameEvent::RoundReset { next_leader });
        }

        events.extend(Self::advance_turn(state));
        Ok(events)
    }

    /// Hands the turn to the next seat. Does nothing once the game is over.
    pub fn advance_turn(state: &mut GameState) -> Option<GameEvent> {
        if state.is_finished() || state.players.is_empty() {
            return None;
        }
        state.turn_index = (state.turn_index + 1) % state.seat_count();
        let (player_id, human) = state
            .current_player()
            .map(|player| (player.id, !player.is_ai()))?;
        if human {
            state.set_status(HUMAN_TURN_PROMPT);
        }
        Some(GameEvent::TurnAdvanced { player_id })
    }
}
