use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::game::{PlayerKind, SEAT_COUNT};

const DEFAULT_AI_DELAY_MIN_MS: u32 = 600;
const DEFAULT_AI_DELAY_MAX_MS: u32 = 1300;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatConfig {
    pub id: String,
    pub name: String,
    pub kind: PlayerKind,
}

impl SeatConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: PlayerKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "type")]
pub enum ConfigError {
    #[error("expected {expected} seats, got {actual}")]
    SeatCount { expected: usize, actual: usize },
    #[error("exactly one human seat is required, found {count}")]
    HumanSeats { count: usize },
    #[error("seat id `{id}` is used twice")]
    DuplicateSeatId { id: String },
    #[error("ai delay range {min}..{max} ms is empty")]
    DelayRange { min: u32, max: u32 },
    #[error("config is not valid JSON: {message}")]
    Parse { message: String },
}

/// Table setup. Rule constants are fixed and intentionally absent here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    pub seats: Vec<SeatConfig>,
    pub ai_delay_min_ms: u32,
    pub ai_delay_max_ms: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seats: vec![
                SeatConfig::new("left", "Luna (AI)", PlayerKind::Ai),
                SeatConfig::new("player", "You", PlayerKind::Human),
                SeatConfig::new("right", "Orion (AI)", PlayerKind::Ai),
            ],
            ai_delay_min_ms: DEFAULT_AI_DELAY_MIN_MS,
            ai_delay_max_ms: DEFAULT_AI_DELAY_MAX_MS,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json).map_err(|error| ConfigError::Parse {
            message: error.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seats.len() != SEAT_COUNT {
            return Err(ConfigError::SeatCount {
                expected: SEAT_COUNT,
                actual: self.seats.len(),
            });
        }

        let humans = self
            .seats
            .iter()
            .filter(|seat| seat.kind == PlayerKind::Human)
            .count();
        if humans != 1 {
            return Err(ConfigError::HumanSeats { count: humans });
        }

        let mut ids = HashSet::new();
        for seat in &self.seats {
            if !ids.insert(seat.id.as_str()) {
                return Err(ConfigError::DuplicateSeatId {
                    id: seat.id.clone(),
                });
            }
        }

        if self.ai_delay_min_ms > self.ai_delay_max_ms {
            return Err(ConfigError::DelayRange {
                min: self.ai_delay_min_ms,
                max: self.ai_delay_max_ms,
            });
        }

        Ok(())
    }
}
