//! 游戏核心逻辑模块（牌组、牌型、状态机）。

pub mod cards;
pub mod combo;
pub mod rules;
pub mod state;
pub mod view;

pub use cards::{
    build_deck, deal_and_assign_landlord, shuffle, sort_hand, Card, CardColor, CardId, Deal, Rank,
    Suit, DECK_SIZE, HAND_SIZE, KITTY_SIZE, SEAT_COUNT,
};
pub use combo::{classify, is_legal, ComboKind, Combination};
pub use rules::{
    PassAction, PassRejection, PlayAction, PlayRejection, RuleEngine, RuleError, RuleResolution,
    SelectionPreview, HUMAN_TURN_PROMPT,
};
pub use state::{
    ActiveCombination, GameEvent, GameState, HistoryEntry, IntegrityError, Player, PlayerId,
    PlayerKind, Role, RoundPhase, HISTORY_LIMIT,
};
pub use view::{GameSnapshot, PlayerView, WinnerView};
