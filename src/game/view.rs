//! 供前端渲染的只读快照。人类座位可见完整手牌，AI 座位只暴露张数。

use serde::{Deserialize, Serialize};

use super::cards::Card;
use super::state::{
    ActiveCombination, GameState, HistoryEntry, Player, PlayerId, PlayerKind, Role, RoundPhase,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerView {
    pub id: PlayerId,
    pub key: String,
    pub name: String,
    pub kind: PlayerKind,
    pub role: Role,
    pub role_label: String,
    pub card_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hand: Option<Vec<Card>>,
}

impl PlayerView {
    fn from_player(player: &Player) -> Self {
        let hand = match player.kind {
            PlayerKind::Human => Some(player.hand.clone()),
            PlayerKind::Ai => None,
        };
        Self {
            id: player.id,
            key: player.key.clone(),
            name: player.name.clone(),
            kind: player.kind,
            role: player.role,
            role_label: player.role.label().to_string(),
            card_count: player.hand.len(),
            hand,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WinnerView {
    pub player_id: PlayerId,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSnapshot {
    pub players: Vec<PlayerView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<ActiveCombination>,
    pub turn_index: usize,
    pub current_kind: Option<PlayerKind>,
    pub phase: RoundPhase,
    pub consecutive_passes: usize,
    pub history: Vec<HistoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<WinnerView>,
    pub status_message: String,
}

impl GameState {
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            players: self.players.iter().map(PlayerView::from_player).collect(),
            active: self.active.clone(),
            turn_index: self.turn_index,
            current_kind: self.current_player().map(|player| player.kind),
            phase: self.phase(),
            consecutive_passes: self.consecutive_passes,
            history: self.history.iter().cloned().collect(),
            winner: self.winner_player().map(|player| WinnerView {
                player_id: player.id,
                name: player.name.clone(),
                role: player.role,
            }),
            status_message: self.status_message.clone(),
        }
    }
}
