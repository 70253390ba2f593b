use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rules::RuleError;

/// 一副牌内唯一的卡牌标识。
pub type CardId = u32;

pub const SEAT_COUNT: usize = 3;
pub const DECK_SIZE: usize = 54;
pub const HAND_SIZE: usize = 17;
pub const KITTY_SIZE: usize = DECK_SIZE - HAND_SIZE * SEAT_COUNT;

/// Suit order doubles as the tie-break when two cards share a rank.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Suit {
    Spades,
    Hearts,
    Clubs,
    Diamonds,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Clubs, Suit::Diamonds];

    pub fn order(self) -> u8 {
        match self {
            Suit::Spades => 0,
            Suit::Hearts => 1,
            Suit::Clubs => 2,
            Suit::Diamonds => 3,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Spades => "♠",
            Suit::Hearts => "♥",
            Suit::Clubs => "♣",
            Suit::Diamonds => "♦",
        }
    }

    pub fn color(self) -> CardColor {
        match self {
            Suit::Hearts | Suit::Diamonds => CardColor::Red,
            Suit::Spades | Suit::Clubs => CardColor::Black,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Rank {
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
    Two,
    SmallJoker,
    BigJoker,
}

impl Rank {
    pub const STANDARD: [Rank; 13] = [
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
        Rank::Two,
    ];

    /// 牌力：3 最小，大王最大。
    pub fn value(self) -> u8 {
        match self {
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten => 10,
            Rank::Jack => 11,
            Rank::Queen => 12,
            Rank::King => 13,
            Rank::Ace => 14,
            Rank::Two => 15,
            Rank::SmallJoker => 16,
            Rank::BigJoker => 17,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::SmallJoker => "SJ",
            Rank::BigJoker => "BJ",
        }
    }

    /// Name used in combination labels ("Pair of Aces", "Single 7").
    pub fn friendly_name(self) -> &'static str {
        match self {
            Rank::Jack => "Jack",
            Rank::Queen => "Queen",
            Rank::King => "King",
            Rank::Ace => "Ace",
            Rank::Two => "Two",
            Rank::SmallJoker => "Small Joker",
            Rank::BigJoker => "Big Joker",
            other => other.symbol(),
        }
    }

    pub fn is_joker(self) -> bool {
        matches!(self, Rank::SmallJoker | Rank::BigJoker)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CardColor {
    Red,
    Black,
}

/// 一张牌。构造后不再修改。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Card {
    pub id: CardId,
    pub rank: Rank,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suit: Option<Suit>,
    pub value: u8,
    pub label: String,
    pub color: CardColor,
    #[serde(default)]
    pub is_joker: bool,
}

impl Card {
    pub fn standard(id: CardId, rank: Rank, suit: Suit) -> Self {
        Self {
            id,
            rank,
            suit: Some(suit),
            value: rank.value(),
            label: format!("{}{}", rank.symbol(), suit.symbol()),
            color: suit.color(),
            is_joker: false,
        }
    }

    pub fn joker(id: CardId, rank: Rank) -> Self {
        let color = if rank == Rank::BigJoker {
            CardColor::Red
        } else {
            CardColor::Black
        };
        Self {
            id,
            rank,
            suit: None,
            value: rank.value(),
            label: rank.friendly_name().to_string(),
            color,
            is_joker: rank.is_joker(),
        }
    }

    /// Jokers carry no suit and sort after every suited card of equal value.
    pub fn sort_key(&self) -> (u8, u8) {
        (self.value, self.suit.map(Suit::order).unwrap_or(4))
    }
}

/// 生成 54 张牌：四种花色各 13 张，外加小王、大王。
pub fn build_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    let mut next_id: CardId = 0;
    for suit in Suit::ALL {
        for rank in Rank::STANDARD {
            next_id += 1;
            deck.push(Card::standard(next_id, rank, suit));
        }
    }
    for rank in [Rank::SmallJoker, Rank::BigJoker] {
        next_id += 1;
        deck.push(Card::joker(next_id, rank));
    }
    deck
}

/// Uniform Fisher-Yates permutation in place.
pub fn shuffle<R: Rng + ?Sized>(deck: &mut [Card], rng: &mut R) {
    deck.shuffle(rng);
}

pub fn sort_hand(hand: &mut [Card]) {
    hand.sort_by_key(Card::sort_key);
}

/// Result of dealing a full deck to the three seats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deal {
    pub hands: Vec<Vec<Card>>,
    pub landlord: usize,
}

/// 轮流发牌，每人 17 张；随机选出地主并将底牌交给地主。
pub fn deal_and_assign_landlord<R: Rng + ?Sized>(
    mut deck: Vec<Card>,
    rng: &mut R,
) -> Result<Deal, RuleError> {
    if deck.len() != DECK_SIZE {
        return Err(RuleError::InvalidDeckSize {
            expected: DECK_SIZE,
            actual: deck.len(),
        });
    }

    let mut hands: Vec<Vec<Card>> = (0..SEAT_COUNT)
        .map(|_| Vec::with_capacity(HAND_SIZE + KITTY_SIZE))
        .collect();
    for _ in 0..HAND_SIZE {
        for hand in hands.iter_mut() {
            if let Some(card) = deck.pop() {
                hand.push(card);
            }
        }
    }

    let landlord = rng.gen_range(0..SEAT_COUNT);
    hands[landlord].append(&mut deck);

    for hand in hands.iter_mut() {
        sort_hand(hand);
    }

    Ok(Deal { hands, landlord })
}
