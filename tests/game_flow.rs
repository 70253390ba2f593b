use std::collections::HashSet;

use happy_doudizhu::{
    choose_move, AiAgent, Card, CardId, ComboKind, GameAction, GameConfig, GameEvent,
    GameSession, GameState, Player, PlayerId, PlayerKind, Rank, Role, RoundPhase, RuleError,
    RuleResolution, SeatConfig, Suit,
};

const DECK_SIZE: usize = 54;

/// Lets the heuristic drive every seat, the human one included.
fn step(session: &mut GameSession) -> RuleResolution {
    if let Some(turn) = session.step_ai().expect("ai move should be legal") {
        return turn.resolution;
    }
    let player_id = session.state().turn_index as PlayerId;
    let decision = AiAgent::new().decide_action(session.state(), player_id);
    match decision.action {
        GameAction::Play { action } => session
            .request_play(action.player_id, &action.card_ids)
            .expect("heuristic play should be accepted"),
        GameAction::Pass { action } => session
            .request_pass(action.player_id)
            .expect("heuristic pass should be accepted"),
    }
}

fn played_card_count(events: &[GameEvent]) -> usize {
    events
        .iter()
        .map(|event| match event {
            GameEvent::CombinationPlayed { combination, .. } => combination.size(),
            _ => 0,
        })
        .sum()
}

#[test]
fn seeded_games_run_to_a_single_winner_without_losing_cards() {
    for seed in 0..12 {
        let mut session =
            GameSession::new(GameConfig::default().with_seed(seed)).expect("valid config");
        let mut played = 0;
        let mut steps = 0;

        while !session.state().is_finished() {
            let resolution = step(&mut session);
            played += played_card_count(&resolution.events);
            steps += 1;

            let state = session.state();
            state.integrity_check().expect("state stays consistent");
            assert_eq!(state.cards_in_hands() + played, DECK_SIZE, "seed {seed}");
            assert!(state.history.len() <= 30);
            assert!(steps < 500, "seed {seed} did not finish");
        }

        let winner_id = {
            let state = session.state();
            let winner = state.winner_player().expect("winner recorded");
            assert!(winner.hand.is_empty());
            assert_eq!(state.phase(), RoundPhase::GameOver);
            winner.id
        };
        assert!(matches!(
            session.request_pass(winner_id),
            Err(RuleError::GameAlreadyOver)
        ));
        assert!(session.schedule_ai_turn().is_none());

        let snapshot = session.snapshot();
        assert_eq!(
            snapshot.winner.map(|winner| winner.player_id),
            Some(winner_id)
        );
    }
}

#[test]
fn starting_over_reshuffles_and_clears_the_winner() {
    let mut session = GameSession::new(GameConfig::default().with_seed(77)).expect("valid config");
    while !session.state().is_finished() {
        step(&mut session);
    }

    let resolution = session.start_new_game().expect("new game");
    let state = session.state();
    assert!(state.winner.is_none());
    assert!(state.active.is_none());
    assert_eq!(state.consecutive_passes, 0);
    assert_eq!(state.history.len(), 1);
    assert_eq!(state.cards_in_hands(), DECK_SIZE);
    assert!(matches!(
        resolution.events.as_slice(),
        [GameEvent::LandlordAssigned { .. }]
    ));
}

fn card(id: CardId, rank: Rank, suit: Suit) -> Card {
    Card::standard(id, rank, suit)
}

/// Seat 0 is the human landlord holding 3♠ 3♥ 4♠; both AI seats lack pairs.
fn scripted_table() -> (GameConfig, GameState) {
    let config = GameConfig {
        seats: vec![
            SeatConfig::new("player", "You", PlayerKind::Human),
            SeatConfig::new("left", "Luna (AI)", PlayerKind::Ai),
            SeatConfig::new("right", "Orion (AI)", PlayerKind::Ai),
        ],
        ai_delay_min_ms: 0,
        ai_delay_max_ms: 0,
        seed: Some(1),
    };
    let players = vec![
        Player::new(
            0,
            "player",
            "You",
            PlayerKind::Human,
            Role::Landlord,
            vec![
                card(1, Rank::Three, Suit::Spades),
                card(14, Rank::Three, Suit::Hearts),
                card(2, Rank::Four, Suit::Spades),
            ],
        ),
        Player::new(
            1,
            "left",
            "Luna (AI)",
            PlayerKind::Ai,
            Role::Farmer,
            vec![
                card(3, Rank::Five, Suit::Spades),
                card(20, Rank::Nine, Suit::Hearts),
                card(37, Rank::King, Suit::Clubs),
            ],
        ),
        Player::new(
            2,
            "right",
            "Orion (AI)",
            PlayerKind::Ai,
            Role::Farmer,
            vec![card(43, Rank::Six, Suit::Diamonds), card(32, Rank::Eight, Suit::Clubs)],
        ),
    ];
    (config, GameState::new(players, 0))
}

#[test]
fn pass_out_returns_the_lead_to_the_landlord() {
    let (config, state) = scripted_table();
    let mut session = GameSession::with_state(config, state).expect("scripted table is valid");

    let opening = session.request_play(0, &[1, 14]).expect("pair of threes leads");
    let active = opening.snapshot.active.expect("pair on the table");
    assert_eq!(active.combination.kind(), ComboKind::Pair);
    assert_eq!(active.combination.rank_value(), 3);

    let first = session
        .step_ai()
        .expect("seat 1 acts")
        .expect("seat 1 ticket");
    assert!(matches!(first.decision.action, GameAction::Pass { .. }));
    assert_eq!(session.state().consecutive_passes, 1);

    let second = session
        .step_ai()
        .expect("seat 2 acts")
        .expect("seat 2 ticket");
    assert!(matches!(second.decision.action, GameAction::Pass { .. }));
    assert!(second
        .resolution
        .events
        .iter()
        .any(|event| matches!(event, GameEvent::RoundReset { next_leader: 0 })));

    let state = session.state();
    assert!(state.active.is_none());
    assert_eq!(state.consecutive_passes, 0);
    assert_eq!(state.turn_index, 0);
    assert!(!session.can_pass(0));

    let preview = session.preview_selection(0, &[2]);
    assert!(preview.playable);

    let last = session.request_play(0, &[2]).expect("singleton four leads the fresh round");
    assert_eq!(last.winner, Some(0));
    assert!(matches!(
        session.request_play(1, &[3]),
        Err(RuleError::GameAlreadyOver)
    ));

    let actions: Vec<&str> = session
        .state()
        .history
        .iter()
        .map(|entry| entry.action.as_str())
        .collect();
    assert_eq!(
        actions,
        vec![
            "Pair of 3s",
            "Pass",
            "Pass",
            "Single 4",
            "You wins the game!"
        ]
    );
}

#[test]
fn heuristic_agrees_with_the_engine_on_every_turn() {
    let mut session =
        GameSession::new(GameConfig::default().with_seed(4242)).expect("valid config");
    let mut seen_kinds = HashSet::new();
    while !session.state().is_finished() {
        let state = session.state();
        let player = state.current_player().expect("seat at turn");
        if let Some(choice) = choose_move(&player.hand, state.active_combination()) {
            seen_kinds.insert(choice.kind());
            let preview = session.preview_selection(player.id, &choice.card_ids());
            assert!(preview.playable, "heuristic picked an unplayable {}", choice.label());
        } else {
            assert!(session.can_pass(player.id));
        }
        step(&mut session);
    }
    assert!(seen_kinds.contains(&ComboKind::Single));
}
