pub mod ai;
pub mod config;
pub mod game;
pub mod logging;
pub mod session;

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{choose_move, AiAgent, AiDecision, GameAction};
pub use config::{ConfigError, GameConfig, SeatConfig};
pub use game::{
    build_deck, classify, deal_and_assign_landlord, is_legal, shuffle, sort_hand, ActiveCombination,
    Card, CardColor, CardId, ComboKind, Combination, Deal, GameEvent, GameSnapshot, GameState,
    HistoryEntry, IntegrityError, PassAction, PassRejection, PlayAction, PlayRejection, Player,
    PlayerId, PlayerKind, PlayerView, Rank, Role, RoundPhase, RuleEngine, RuleError,
    RuleResolution, SelectionPreview, Suit, WinnerView, HUMAN_TURN_PROMPT,
};
pub use session::{AiTicket, AiTurn, GameSession, SessionError};

#[cfg(all(feature = "wee_alloc", target_arch = "wasm32"))]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    logging::init(level);
}

fn to_js_error<E: Serialize + Display>(error: E) -> JsValue {
    to_value(&error).unwrap_or_else(|_| JsValue::from_str(&error.to_string()))
}

fn serde_to_js_error<E: Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn busy_error<E: Display>(error: E) -> JsValue {
    JsValue::from_str(&format!("engine is busy: {error}"))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(serde_to_js_error)
}

/// JS 侧持有的游戏引擎句柄。界面只读快照并调用下列方法。
#[wasm_bindgen]
pub struct DouDizhuEngine {
    session: Rc<RefCell<GameSession>>,
}

#[wasm_bindgen]
impl DouDizhuEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<DouDizhuEngine, JsValue> {
        let config = match config_json {
            Some(json) => GameConfig::from_json(&json).map_err(to_js_error)?,
            None => GameConfig::default(),
        };
        let session = GameSession::new(config).map_err(to_js_error)?;
        Ok(DouDizhuEngine {
            session: Rc::new(RefCell::new(session)),
        })
    }

    #[wasm_bindgen(js_name = "startNewGame")]
    pub fn start_new_game(&self) -> Result<String, JsValue> {
        let mut session = self.session.try_borrow_mut().map_err(busy_error)?;
        let resolution = session.start_new_game().map_err(to_js_error)?;
        to_json(&resolution)
    }

    #[wasm_bindgen(js_name = "requestPlay")]
    pub fn request_play(&self, player_id: u8, card_ids: Vec<u32>) -> Result<String, JsValue> {
        let mut session = self.session.try_borrow_mut().map_err(busy_error)?;
        let resolution = session
            .request_play(player_id, &card_ids)
            .map_err(to_js_error)?;
        to_json(&resolution)
    }

    #[wasm_bindgen(js_name = "requestPass")]
    pub fn request_pass(&self, player_id: u8) -> Result<String, JsValue> {
        let mut session = self.session.try_borrow_mut().map_err(busy_error)?;
        let resolution = session.request_pass(player_id).map_err(to_js_error)?;
        to_json(&resolution)
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let session = self.session.try_borrow().map_err(busy_error)?;
        to_value(&session.snapshot()).map_err(JsValue::from)
    }

    #[wasm_bindgen(js_name = "snapshotJson")]
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        let session = self.session.try_borrow().map_err(busy_error)?;
        to_json(&session.snapshot())
    }

    #[wasm_bindgen(js_name = "previewSelection")]
    pub fn preview_selection(&self, player_id: u8, card_ids: Vec<u32>) -> Result<JsValue, JsValue> {
        let session = self.session.try_borrow().map_err(busy_error)?;
        to_value(&session.preview_selection(player_id, &card_ids)).map_err(JsValue::from)
    }

    #[wasm_bindgen(js_name = "canPass")]
    pub fn can_pass(&self, player_id: u8) -> bool {
        self.session
            .try_borrow()
            .map(|session| session.can_pass(player_id))
            .unwrap_or(false)
    }

    #[wasm_bindgen(js_name = "cancelPendingAi")]
    pub fn cancel_pending_ai(&self) -> Result<(), JsValue> {
        self.session
            .try_borrow_mut()
            .map_err(busy_error)?
            .cancel_pending_ai();
        Ok(())
    }

    /// Resolves to the AI turn as JSON after the thinking delay, or `null`
    /// when no AI seat is due or the game moved on while waiting.
    #[wasm_bindgen(js_name = "scheduleAiTurn")]
    pub fn schedule_ai_turn(&self) -> Promise {
        let ticket = match self.session.try_borrow_mut() {
            Ok(mut session) => session.schedule_ai_turn(),
            Err(error) => return Promise::reject(&busy_error(error)),
        };
        let session = Rc::clone(&self.session);

        future_to_promise(async move {
            let Some(ticket) = ticket else {
                return Ok(JsValue::NULL);
            };
            if ticket.delay_ms > 0 {
                TimeoutFuture::new(ticket.delay_ms).await;
            }
            let turn = session
                .try_borrow_mut()
                .map_err(busy_error)?
                .run_ai_turn(&ticket)
                .map_err(to_js_error)?;
            match turn {
                Some(turn) => Ok(JsValue::from_str(&to_json(&turn)?)),
                None => Ok(JsValue::NULL),
            }
        })
    }
}

/// 对一组牌进行牌型识别，无法识别时返回 `null`。
#[wasm_bindgen(js_name = "classifyCards")]
pub fn classify_cards(cards: JsValue) -> Result<JsValue, JsValue> {
    let cards: Vec<Card> = from_value(cards).map_err(JsValue::from)?;
    to_value(&classify(&cards)).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "chooseAiMove")]
pub fn choose_ai_move(hand: JsValue, active: JsValue) -> Result<JsValue, JsValue> {
    let hand: Vec<Card> = from_value(hand).map_err(JsValue::from)?;
    let active: Option<Combination> = from_value(active).map_err(JsValue::from)?;
    to_value(&choose_move(&hand, active.as_ref())).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "buildDeck")]
pub fn build_deck_js() -> Result<JsValue, JsValue> {
    to_value(&build_deck()).map_err(JsValue::from)
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
