//! 会话控制器：持有一局游戏的全部状态，并负责 AI 回合的调度与取消。
//!
//! AI "thinking time" is modelled as an [`AiTicket`]: the caller waits
//! `delay_ms` and then hands the ticket back to [`GameSession::run_ai_turn`].
//! Any mutation in between (a new game, an explicit cancel, another move)
//! makes the ticket stale and it resolves to nothing.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::ai::{AiAgent, AiDecision, GameAction};
use crate::config::{ConfigError, GameConfig};
use crate::game::{
    build_deck, deal_and_assign_landlord, shuffle, CardId, GameEvent, GameSnapshot, GameState,
    HistoryEntry, IntegrityError, PassAction, PlayAction, Player, PlayerId, PlayerKind,
    RuleEngine, RuleError, RuleResolution, Role, SelectionPreview,
};

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "type")]
pub enum SessionError {
    #[error("invalid config: {reason}")]
    InvalidConfig {
        #[from]
        reason: ConfigError,
    },
    #[error("state failed integrity check: {error:?}")]
    IntegrityViolation { error: IntegrityError },
    #[error(transparent)]
    Rule {
        #[from]
        error: RuleError,
    },
}

/// Permission for one AI seat to act once, valid until the game moves on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiTicket {
    pub generation: u64,
    pub ply: u64,
    pub player_id: PlayerId,
    pub delay_ms: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiTurn {
    pub decision: AiDecision,
    pub resolution: RuleResolution,
}

pub struct GameSession {
    config: GameConfig,
    state: GameState,
    rng: SmallRng,
    generation: u64,
    ply: u64,
}

impl GameSession {
    fn make_rng(config: &GameConfig) -> SmallRng {
        match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        }
    }

    pub fn new(config: GameConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let rng = Self::make_rng(&config);
        let mut session = Self {
            config,
            state: GameState::new(Vec::new(), 0),
            rng,
            generation: 0,
            ply: 0,
        };
        session.start_new_game()?;
        Ok(session)
    }

    /// Adopts a prepared mid-game state, e.g. a table with a fixed landlord.
    pub fn with_state(config: GameConfig, state: GameState) -> Result<Self, SessionError> {
        config.validate()?;
        state
            .integrity_check()
            .map_err(|error| SessionError::IntegrityViolation { error })?;
        let rng = Self::make_rng(&config);
        Ok(Self {
            config,
            state,
            rng,
            generation: 1,
            ply: 0,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.state.snapshot()
    }

    /// Cancels pending AI work, then reshuffles and deals a fresh game.
    pub fn start_new_game(&mut self) -> Result<RuleResolution, RuleError> {
        self.cancel_pending_ai();
        self.ply = 0;

        let mut deck = build_deck();
        shuffle(&mut deck, &mut self.rng);
        let deal = deal_and_assign_landlord(deck, &mut self.rng)?;

        let players: Vec<Player> = self
            .config
            .seats
            .iter()
            .zip(deal.hands)
            .enumerate()
            .map(|(index, (seat, hand))| {
                let role = if index == deal.landlord {
                    Role::Landlord
                } else {
                    Role::Farmer
                };
                Player::new(
                    index as PlayerId,
                    seat.id.clone(),
                    seat.name.clone(),
                    seat.kind,
                    role,
                    hand,
                )
            })
            .collect();

        let mut state = GameState::new(players, deal.landlord);
        let landlord = &state.players[deal.landlord];
        let landlord_id = landlord.id;
        let landlord_name = landlord.name.clone();
        let pronoun = match landlord.kind {
            PlayerKind::Human => "You",
            PlayerKind::Ai => "They",
        };
        state.log_history(HistoryEntry::new(
            "Game",
            format!("{landlord_name} becomes the landlord."),
        ));
        state.set_status(format!(
            "{landlord_name} is the landlord. {pronoun} will lead the opening move."
        ));
        self.state = state;

        log::info!(
            "new game #{}: {landlord_name} is the landlord",
            self.generation
        );
        Ok(RuleResolution::new(
            &self.state,
            vec![GameEvent::LandlordAssigned {
                player_id: landlord_id,
            }],
        ))
    }

    fn applied(&mut self, events: Vec<GameEvent>) -> RuleResolution {
        self.ply += 1;
        RuleResolution::new(&self.state, events)
    }

    pub fn request_play(
        &mut self,
        player_id: PlayerId,
        card_ids: &[CardId],
    ) -> Result<RuleResolution, RuleError> {
        let action = PlayAction {
            player_id,
            card_ids: card_ids.to_vec(),
        };
        match RuleEngine::play(&mut self.state, action) {
            Ok(events) => Ok(self.applied(events)),
            Err(error) => {
                log::warn!("seat {player_id} play rejected: {error}");
                Err(error)
            }
        }
    }

    pub fn request_pass(&mut self, player_id: PlayerId) -> Result<RuleResolution, RuleError> {
        match RuleEngine::pass(&mut self.state, PassAction { player_id }) {
            Ok(events) => Ok(self.applied(events)),
            Err(error) => {
                log::warn!("seat {player_id} pass rejected: {error}");
                Err(error)
            }
        }
    }

    pub fn preview_selection(&self, player_id: PlayerId, card_ids: &[CardId]) -> SelectionPreview {
        RuleEngine::preview_selection(&self.state, player_id, card_ids)
    }

    pub fn can_pass(&self, player_id: PlayerId) -> bool {
        RuleEngine::can_pass(&self.state, player_id)
    }

    pub fn cancel_pending_ai(&mut self) {
        self.generation += 1;
    }

    /// Issues a ticket when an AI seat is due to act.
    pub fn schedule_ai_turn(&mut self) -> Option<AiTicket> {
        if self.state.is_finished() {
            return None;
        }
        let player = self.state.current_player()?;
        if !player.is_ai() {
            return None;
        }
        let player_id = player.id;

        let (min, max) = (self.config.ai_delay_min_ms, self.config.ai_delay_max_ms);
        let delay_ms = if min < max {
            self.rng.gen_range(min..max)
        } else {
            min
        };

        Some(AiTicket {
            generation: self.generation,
            ply: self.ply,
            player_id,
            delay_ms,
        })
    }

    pub fn is_ticket_current(&self, ticket: &AiTicket) -> bool {
        ticket.generation == self.generation
            && ticket.ply == self.ply
            && !self.state.is_finished()
            && self
                .state
                .current_player()
                .is_some_and(|player| player.id == ticket.player_id && player.is_ai())
    }

    /// Plays the AI seat named by `ticket`. Stale tickets yield `Ok(None)`.
    pub fn run_ai_turn(&mut self, ticket: &AiTicket) -> Result<Option<AiTurn>, RuleError> {
        if !self.is_ticket_current(ticket) {
            log::debug!("dropping stale ai ticket for seat {}", ticket.player_id);
            return Ok(None);
        }

        let decision = AiAgent::new().decide_action(&self.state, ticket.player_id);
        let events = match &decision.action {
            GameAction::Play { action } => RuleEngine::play(&mut self.state, action.clone())?,
            GameAction::Pass { action } => RuleEngine::pass(&mut self.state, action.clone())?,
        };
        let resolution = self.applied(events);
        Ok(Some(AiTurn {
            decision,
            resolution,
        }))
    }

    /// Schedules and immediately runs the pending AI turn, skipping the delay.
    pub fn step_ai(&mut self) -> Result<Option<AiTurn>, RuleError> {
        match self.schedule_ai_turn() {
            Some(ticket) => self.run_ai_turn(&ticket),
            None => Ok(None),
        }
    }
}
