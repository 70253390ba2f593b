//! AI 算法模块（启发式出牌策略）。

pub mod heuristic;

pub use heuristic::{choose_move, AiAgent, AiDecision, GameAction};
