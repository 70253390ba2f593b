use serde::{Deserialize, Serialize};

use super::cards::{sort_hand, Card, CardId, Rank};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ComboKind {
    Single,
    Pair,
    Triple,
}

impl ComboKind {
    pub fn size(self) -> usize {
        match self {
            ComboKind::Single => 1,
            ComboKind::Pair => 2,
            ComboKind::Triple => 3,
        }
    }

    fn from_size(size: usize) -> Option<Self> {
        match size {
            1 => Some(ComboKind::Single),
            2 => Some(ComboKind::Pair),
            3 => Some(ComboKind::Triple),
            _ => None,
        }
    }

    pub fn describe(self, rank: Rank) -> String {
        let name = rank.friendly_name();
        match self {
            ComboKind::Single => format!("Single {name}"),
            ComboKind::Pair => format!("Pair of {name}s"),
            ComboKind::Triple => format!("Triple {name}s"),
        }
    }
}

/// 已识别的出牌组合。字段只读，保证构造后不可变。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Combination {
    kind: ComboKind,
    cards: Vec<Card>,
    rank_value: u8,
    label: String,
}

impl Combination {
    /// Caller guarantees `cards` is non-empty and shares one rank value.
    fn build(kind: ComboKind, mut cards: Vec<Card>) -> Self {
        sort_hand(&mut cards);
        let rank = cards[0].rank;
        Self {
            kind,
            rank_value: rank.value(),
            label: kind.describe(rank),
            cards,
        }
    }

    pub fn kind(&self) -> ComboKind {
        self.kind
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn rank_value(&self) -> u8 {
        self.rank_value
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn size(&self) -> usize {
        self.cards.len()
    }

    pub fn card_ids(&self) -> Vec<CardId> {
        self.cards.iter().map(|card| card.id).collect()
    }

    /// Same kind, same size, strictly higher rank value.
    pub fn beats(&self, other: &Combination) -> bool {
        self.kind == other.kind && self.size() == other.size() && self.rank_value > other.rank_value
    }
}

pub fn classify(cards: &[Card]) -> Option<Combination> {
    let first = cards.first()?;
    let kind = ComboKind::from_size(cards.len())?;
    if cards.iter().any(|card| card.value != first.value) {
        return None;
    }
    Some(Combination::build(kind, cards.to_vec()))
}

pub fn is_legal(candidate: &Combination, active: Option<&Combination>) -> bool {
    match active {
        None => true,
        Some(active) => candidate.beats(active),
    }
}
