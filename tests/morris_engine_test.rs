//! Tests for the morris session engine through the public API.

use std::sync::Arc;
use strictly_morris::{
    GameType, MoveError, MovePayload, Outcome, Phase, Position, ResumePhase, RuleSet, Session,
    SessionStatus, Side,
};

fn place(x: i32, y: i32) -> MovePayload {
    MovePayload::Place {
        to: Position::new(x, y),
    }
}

fn relocate(from: (i32, i32), to: (i32, i32)) -> MovePayload {
    MovePayload::Relocate {
        from: Position::new(from.0, from.1),
        to: Position::new(to.0, to.1),
    }
}

fn remove(x: i32, y: i32) -> MovePayload {
    MovePayload::Remove {
        at: Position::new(x, y),
    }
}

fn active(rules: RuleSet) -> Session {
    Session::new(
        "engine-test".to_string(),
        "alice".to_string(),
        "bob".to_string(),
        GameType::Friendly,
        Arc::new(rules),
    )
    .mark_ready(Side::Red)
    .expect("red ready")
    .mark_ready(Side::Blue)
    .expect("blue ready")
}

fn play(mut session: Session, moves: &[(Side, MovePayload)]) -> Session {
    for (side, payload) in moves {
        session = session
            .submit_move(*side, *payload)
            .unwrap_or_else(|e| panic!("{} {} rejected: {}", side, payload, e));
    }
    session
}

#[test]
fn test_first_placement() {
    let session = active(RuleSet::default());
    let next = session.submit_move(Side::Red, place(0, 0)).unwrap();

    assert_eq!(next.placed().red, 1);
    assert_eq!(next.phase(), Phase::Placing);
    assert_eq!(next.current_turn(), Some(Side::Blue));
    assert!(session.board().is_empty_at(Position::new(0, 0)));
}

#[test]
fn test_place_on_occupied_vertex() {
    let session = play(active(RuleSet::default()), &[(Side::Red, place(0, 0))]);
    let err = session.submit_move(Side::Blue, place(0, 0)).unwrap_err();

    assert_eq!(err, MoveError::Occupied(Position::new(0, 0)));
    assert_eq!(session.current_turn(), Some(Side::Blue));
    assert_eq!(session.board().count(Side::Blue), 0);
}

#[test]
fn test_place_off_grid() {
    let session = active(RuleSet::default());
    let err = session.submit_move(Side::Red, place(3, 3)).unwrap_err();
    assert_eq!(err, MoveError::OutOfBounds(Position::new(3, 3)));
}

#[test]
fn test_out_of_turn() {
    let session = active(RuleSet::default());
    let err = session.submit_move(Side::Blue, place(0, 0)).unwrap_err();
    assert_eq!(err, MoveError::IllegalTurn(Side::Blue));
    assert_eq!(err.kind().to_string(), "not your turn");
}

#[test]
fn test_pending_session_rejects_moves() {
    let session = Session::new(
        "pending".to_string(),
        "alice".to_string(),
        "bob".to_string(),
        GameType::Staked,
        Arc::new(RuleSet::default()),
    );
    let err = session.submit_move(Side::Red, place(0, 0)).unwrap_err();
    assert!(matches!(err, MoveError::InvalidPhase(_)));
}

#[test]
fn test_mark_ready_idempotent() {
    let session = Session::new(
        "ready".to_string(),
        "alice".to_string(),
        "bob".to_string(),
        GameType::Friendly,
        Arc::new(RuleSet::default()),
    );
    let once = session.mark_ready(Side::Red).unwrap();
    let twice = once.mark_ready(Side::Red).unwrap();

    assert!(twice.ready().red);
    assert!(!twice.ready().blue);
    assert_eq!(twice.status(), SessionStatus::Pending);
    assert_eq!(twice.current_turn(), None);

    let started = twice.mark_ready(Side::Blue).unwrap();
    assert_eq!(started.status(), SessionStatus::Active);
    assert_eq!(started.current_turn(), Some(Side::Red));
    assert_eq!(
        started.mark_ready(Side::Red).unwrap_err(),
        MoveError::AlreadyActive
    );
}

#[test]
fn test_configured_first_side() {
    let session = active(RuleSet::default().with_first_side(Side::Blue));
    assert_eq!(session.current_turn(), Some(Side::Blue));
}

fn red_mill() -> Session {
    play(
        active(RuleSet::default()),
        &[
            (Side::Red, place(0, 0)),
            (Side::Blue, place(6, 6)),
            (Side::Red, place(3, 0)),
            (Side::Blue, place(6, 3)),
            (Side::Red, place(6, 0)),
        ],
    )
}

#[test]
fn test_mill_on_placement_enters_removing() {
    let session = red_mill();
    assert_eq!(
        session.phase(),
        Phase::Removing {
            resume: ResumePhase::Placing,
            pending: 1
        }
    );
    assert_eq!(session.current_turn(), Some(Side::Red));
}

#[test]
fn test_removing_rejects_other_moves() {
    let session = red_mill();

    let err = session.submit_move(Side::Red, place(1, 1)).unwrap_err();
    assert!(matches!(err, MoveError::InvalidPhase(_)));

    let err = session.submit_move(Side::Blue, remove(0, 0)).unwrap_err();
    assert_eq!(err, MoveError::IllegalTurn(Side::Blue));

    let err = session.submit_move(Side::Red, remove(3, 0)).unwrap_err();
    assert_eq!(err, MoveError::OwnPiece(Position::new(3, 0)));

    let err = session.submit_move(Side::Red, remove(1, 1)).unwrap_err();
    assert_eq!(err, MoveError::EmptyPosition(Position::new(1, 1)));
}

#[test]
fn test_removal_resumes_placing() {
    let session = red_mill().submit_move(Side::Red, remove(6, 6)).unwrap();

    assert_eq!(session.phase(), Phase::Placing);
    assert_eq!(session.current_turn(), Some(Side::Blue));
    assert_eq!(session.board().count(Side::Blue), 1);
    assert_eq!(session.board().removed_count(Side::Blue), 1);
    // Removal never gives the piece back to its owner's hand.
    assert_eq!(session.placed().blue, 2);
}

#[test]
fn test_capture_below_minimum_ends_game() {
    let session = play(
        active(RuleSet::three_mens_morris()),
        &[
            (Side::Red, place(0, 0)),
            (Side::Blue, place(2, 0)),
            (Side::Red, place(0, 1)),
            (Side::Blue, place(2, 1)),
            (Side::Red, place(0, 2)),
        ],
    );
    assert!(matches!(session.phase(), Phase::Removing { .. }));

    let over = session.submit_move(Side::Red, remove(2, 0)).unwrap();
    assert_eq!(over.phase(), Phase::GameOver(Outcome::Winner(Side::Red)));
    assert_eq!(over.status(), SessionStatus::Completed);
    assert_eq!(over.winner(), Some(Side::Red));
    assert_eq!(over.current_turn(), None);
}

#[test]
fn test_game_over_rejects_every_move() {
    let over = active(RuleSet::default()).resign(Side::Blue).unwrap();
    for side in [Side::Red, Side::Blue] {
        for payload in [place(0, 0), relocate((0, 0), (3, 0)), remove(0, 0)] {
            let err = over.submit_move(side, payload).unwrap_err();
            assert!(matches!(err, MoveError::InvalidPhase(_)), "{}", err);
        }
    }
}

fn three_mens_moving() -> Session {
    play(
        active(RuleSet::three_mens_morris().with_draw_after_quiet_moves(2)),
        &[
            (Side::Red, place(0, 0)),
            (Side::Blue, place(1, 1)),
            (Side::Red, place(1, 0)),
            (Side::Blue, place(2, 0)),
            (Side::Red, place(2, 1)),
            (Side::Blue, place(0, 1)),
        ],
    )
}

#[test]
fn test_placing_ends_when_all_pieces_placed() {
    let session = three_mens_moving();
    assert_eq!(session.phase(), Phase::Moving);
    assert_eq!(session.current_turn(), Some(Side::Red));

    let err = session.submit_move(Side::Red, place(2, 2)).unwrap_err();
    assert!(matches!(err, MoveError::InvalidPhase(_)));
}

#[test]
fn test_relocation_geometry() {
    let session = three_mens_moving();

    let err = session
        .submit_move(Side::Red, relocate((0, 0), (2, 2)))
        .unwrap_err();
    assert!(matches!(err, MoveError::NotAdjacent { .. }));

    let err = session
        .submit_move(Side::Red, relocate((1, 1), (1, 2)))
        .unwrap_err();
    assert!(matches!(err, MoveError::NotOwned { .. }));

    let err = session
        .submit_move(Side::Red, relocate((0, 2), (1, 2)))
        .unwrap_err();
    assert_eq!(err, MoveError::EmptyPosition(Position::new(0, 2)));
}

#[test]
fn test_quiet_moves_end_in_draw() {
    let session = three_mens_moving();
    let once = session
        .submit_move(Side::Red, relocate((2, 1), (2, 2)))
        .unwrap();
    assert_eq!(once.quiet_moves(), 1);
    assert_eq!(once.phase(), Phase::Moving);

    let drawn = once
        .submit_move(Side::Blue, relocate((1, 1), (1, 2)))
        .unwrap();
    assert_eq!(drawn.phase(), Phase::GameOver(Outcome::Draw));
    assert!(drawn.is_draw());
    assert_eq!(drawn.winner(), None);
}

#[test]
fn test_complete_requires_result() {
    let session = active(RuleSet::default());
    assert_eq!(
        session.complete(None).unwrap_err(),
        MoveError::InconsistentCompletion
    );

    let done = session.complete(Some(Outcome::Draw)).unwrap();
    assert_eq!(done.status(), SessionStatus::Completed);
    assert!(done.is_draw());
}

#[test]
fn test_decline_only_while_pending() {
    let pending = Session::new(
        "decline".to_string(),
        "alice".to_string(),
        "bob".to_string(),
        GameType::Friendly,
        Arc::new(RuleSet::default()),
    );
    let declined = pending.decline().unwrap();
    assert_eq!(declined.status(), SessionStatus::Declined);
    assert!(matches!(
        declined.mark_ready(Side::Red).unwrap_err(),
        MoveError::AlreadyActive
    ));

    let started = active(RuleSet::default());
    assert_eq!(started.decline().unwrap_err(), MoveError::AlreadyActive);
}

#[test]
fn test_evaluate_terminal_idempotent() {
    let session = red_mill();
    assert_eq!(session.evaluate_terminal(), session);

    let over = active(RuleSet::default()).resign(Side::Red).unwrap();
    let once = over.evaluate_terminal();
    assert_eq!(once, over);
    assert_eq!(once.evaluate_terminal(), once);
}

/// Plays a deterministic game by cycling through the legal moves.
fn scripted_game(rules: RuleSet, max_moves: usize) -> Session {
    let mut session = active(rules);
    for step in 0..max_moves {
        let legal = session.legal_moves();
        if legal.is_empty() {
            break;
        }
        let side = session.current_turn().expect("active session has a turn");
        let payload = legal[(step * 7 + 3) % legal.len()];

        let before = session.clone();
        session = session.submit_move(side, payload).unwrap();

        assert!(session.placed().red >= before.placed().red);
        assert!(session.placed().blue >= before.placed().blue);
        assert!(session.placed().red <= 9 && session.placed().blue <= 9);

        let entered_removal = matches!(session.phase(), Phase::Removing { .. });
        let was_removal = matches!(payload, MovePayload::Remove { .. });
        if !entered_removal && !was_removal && !session.phase().is_game_over() {
            assert_eq!(session.current_turn(), Some(side.opponent()));
        }
    }
    session
}

#[test]
fn test_replay_reproduces_board() {
    let rules = RuleSet::default().with_flying_threshold(Some(3));
    let session = scripted_game(rules.clone(), 120);
    assert!(!session.moves().is_empty());

    let replayed = Session::replay(
        session.id().to_string(),
        session.initiator().to_string(),
        session.opponent().to_string(),
        session.game_type(),
        Arc::new(rules),
        session.created_at(),
        session.moves(),
    )
    .unwrap();

    assert_eq!(replayed.board(), session.board());
    assert_eq!(replayed.phase(), session.phase());
    assert_eq!(replayed.placed(), session.placed());
}

#[test]
fn test_legal_moves_are_accepted() {
    let session = scripted_game(RuleSet::default(), 30);
    if let Some(side) = session.current_turn() {
        for payload in session.legal_moves() {
            assert!(
                session.submit_move(side, payload).is_ok(),
                "{} should be legal",
                payload
            );
        }
    }
}

#[test]
fn test_minimum_checked_while_removals_owed() {
    let rules = RuleSet::default()
        .with_removals_per_capturing_move(2)
        .with_min_pieces(9);
    let session = play(
        active(rules),
        &[
            (Side::Red, place(3, 0)),
            (Side::Blue, place(1, 1)),
            (Side::Red, place(6, 0)),
            (Side::Blue, place(5, 1)),
            (Side::Red, place(0, 3)),
            (Side::Blue, place(1, 5)),
            (Side::Red, place(0, 6)),
            (Side::Blue, place(5, 5)),
            (Side::Red, place(0, 0)),
        ],
    );
    assert_eq!(
        session.phase(),
        Phase::Removing {
            resume: ResumePhase::Placing,
            pending: 2
        }
    );

    let over = session.submit_move(Side::Red, remove(1, 1)).unwrap();
    assert_eq!(over.phase(), Phase::GameOver(Outcome::Winner(Side::Red)));
    assert_eq!(over.status(), SessionStatus::Completed);
    assert_eq!(over.current_turn(), None);
}

#[test]
fn test_blocked_side_to_move_loses() {
    let rules = RuleSet::from_toml("pieces_per_side = 4\n").unwrap();
    let session = play(
        active(rules),
        &[
            (Side::Red, place(2, 2)),
            (Side::Blue, place(3, 2)),
            (Side::Red, place(4, 2)),
            (Side::Blue, place(2, 3)),
            (Side::Red, place(2, 4)),
            (Side::Blue, place(4, 3)),
            (Side::Red, place(4, 4)),
        ],
    );
    assert_eq!(session.phase(), Phase::Placing);

    // Blue's last placement walls in every red piece as moving begins.
    let over = session.submit_move(Side::Blue, place(3, 4)).unwrap();
    assert_eq!(over.phase(), Phase::GameOver(Outcome::Winner(Side::Blue)));
    assert_eq!(over.winner(), Some(Side::Blue));
    assert!(over.legal_moves().is_empty());
}

#[test]
fn test_flying_allows_distant_relocation() {
    let session = play(
        active(RuleSet::three_mens_morris().with_flying_threshold(Some(3))),
        &[
            (Side::Red, place(0, 0)),
            (Side::Blue, place(1, 1)),
            (Side::Red, place(1, 0)),
            (Side::Blue, place(2, 0)),
            (Side::Red, place(2, 1)),
            (Side::Blue, place(0, 1)),
        ],
    );
    assert_eq!(session.phase(), Phase::Moving);

    let next = session
        .submit_move(Side::Red, relocate((0, 0), (2, 2)))
        .unwrap();
    assert!(next.board().is_empty_at(Position::new(0, 0)));
    assert!(!next.board().is_empty_at(Position::new(2, 2)));
    assert_eq!(next.current_turn(), Some(Side::Blue));
}

#[test]
fn test_decline_at_stamps_given_time() {
    let pending = Session::new(
        "decline-at".to_string(),
        "alice".to_string(),
        "bob".to_string(),
        GameType::Friendly,
        Arc::new(RuleSet::default()),
    );
    let at = pending.created_at() + chrono::Duration::minutes(5);
    let declined = pending.decline_at(at).unwrap();
    assert_eq!(declined.status(), SessionStatus::Declined);
    assert_eq!(declined.updated_at(), at);
    assert_eq!(declined.created_at(), pending.created_at());
}
