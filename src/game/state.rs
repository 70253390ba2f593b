use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

use super::cards::{Card, CardId, DECK_SIZE, SEAT_COUNT};
use super::combo::Combination;

/// 历史记录最多保留的条数。
pub const HISTORY_LIMIT: usize = 30;

/// 座位编号（0..3）。
pub type PlayerId = u8;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    Human,
    Ai,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Landlord,
    Farmer,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Landlord => "Landlord 👑",
            Role::Farmer => "Farmer 🌾",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Farmer
    }
}

/// 玩家状态。手牌只会在发牌时增加、出牌时减少。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub key: String,
    pub name: String,
    pub kind: PlayerKind,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub hand: Vec<Card>,
}

impl Player {
    pub fn new(
        id: PlayerId,
        key: impl Into<String>,
        name: impl Into<String>,
        kind: PlayerKind,
        role: Role,
        hand: Vec<Card>,
    ) -> Self {
        Self {
            id,
            key: key.into(),
            name: name.into(),
            kind,
            role,
            hand,
        }
    }

    pub fn find_card_in_hand_index(&self, card_id: CardId) -> Option<usize> {
        self.hand.iter().position(|card| card.id == card_id)
    }

    pub fn remove_cards_from_hand(&mut self, card_ids: &[CardId]) {
        self.hand.retain(|card| !card_ids.contains(&card.id));
    }

    pub fn is_ai(&self) -> bool {
        self.kind == PlayerKind::Ai
    }
}

/// The combination on the table together with whoever played it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActiveCombination {
    pub combination: Combination,
    pub owner_id: PlayerId,
    pub owner_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub actor: String,
    pub action: String,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub result: String,
}

impl HistoryEntry {
    pub fn new(actor: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            action: action.into(),
            cards: Vec::new(),
            result: String::new(),
        }
    }

    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        self.cards = cards;
        self
    }

    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result = result.into();
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoundPhase {
    AwaitingLead,
    AwaitingBeat,
    GameOver,
}

/// 引擎对外发出的事件流。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    LandlordAssigned {
        player_id: PlayerId,
    },
    CombinationPlayed {
        player_id: PlayerId,
        combination: Combination,
    },
    Passed {
        player_id: PlayerId,
        consecutive_passes: usize,
    },
    RoundReset {
        next_leader: PlayerId,
    },
    TurnAdvanced {
        player_id: PlayerId,
    },
    GameWon {
        winner: PlayerId,
        role: Role,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum IntegrityError {
    WrongSeatCount { count: usize },
    SeatIdMismatch { index: usize, player_id: PlayerId },
    InvalidTurnIndex { turn_index: usize },
    LandlordCount { count: usize },
    DuplicateCardId { card_id: CardId },
    TooManyCards { count: usize },
    WinnerHoldsCards { player_id: PlayerId },
}

/// 一局游戏的完整状态。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    pub players: Vec<Player>,
    pub turn_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<ActiveCombination>,
    #[serde(default)]
    pub consecutive_passes: usize,
    #[serde(default)]
    pub history: VecDeque<HistoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<PlayerId>,
    #[serde(default)]
    pub status_message: String,
}

impl GameState {
    pub fn new(players: Vec<Player>, turn_index: usize) -> Self {
        Self {
            players,
            turn_index,
            active: None,
            consecutive_passes: 0,
            history: VecDeque::new(),
            winner: None,
            status_message: String::new(),
        }
    }

    pub fn seat_count(&self) -> usize {
        self.players.len()
    }

    pub fn phase(&self) -> RoundPhase {
        if self.winner.is_some() {
            RoundPhase::GameOver
        } else if self.active.is_some() {
            RoundPhase::AwaitingBeat
        } else {
            RoundPhase::AwaitingLead
        }
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    pub fn active_combination(&self) -> Option<&Combination> {
        self.active.as_ref().map(|active| &active.combination)
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.turn_index)
    }

    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    pub fn player_index(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|player| player.id == id)
    }

    pub fn landlord(&self) -> Option<&Player> {
        self.players
            .iter()
            .find(|player| player.role == Role::Landlord)
    }

    pub fn winner_player(&self) -> Option<&Player> {
        self.winner.and_then(|id| self.get_player(id))
    }

    pub fn log_history(&mut self, entry: HistoryEntry) {
        self.history.push_back(entry);
        while self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    /// Cards still held by anyone; played cards leave the game.
    pub fn cards_in_hands(&self) -> usize {
        self.players.iter().map(|player| player.hand.len()).sum()
    }

    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        if self.players.len() != SEAT_COUNT {
            return Err(IntegrityError::WrongSeatCount {
                count: self.players.len(),
            });
        }
        for (index, player) in self.players.iter().enumerate() {
            if player.id as usize != index {
                return Err(IntegrityError::SeatIdMismatch {
                    index,
                    player_id: player.id,
                });
            }
        }
        if self.turn_index >= self.players.len() {
            return Err(IntegrityError::InvalidTurnIndex {
                turn_index: self.turn_index,
            });
        }

        let landlords = self
            .players
            .iter()
            .filter(|player| player.role == Role::Landlord)
            .count();
        if landlords != 1 {
            return Err(IntegrityError::LandlordCount { count: landlords });
        }

        let mut seen = HashSet::new();
        for card in self.players.iter().flat_map(|player| player.hand.iter()) {
            if !seen.insert(card.id) {
                return Err(IntegrityError::DuplicateCardId { card_id: card.id });
            }
        }
        if seen.len() > DECK_SIZE {
            return Err(IntegrityError::TooManyCards { count: seen.len() });
        }

        if let Some(winner) = self.winner_player() {
            if !winner.hand.is_empty() {
                return Err(IntegrityError::WinnerHoldsCards {
                    player_id: winner.id,
                });
            }
        }

        Ok(())
    }
}
