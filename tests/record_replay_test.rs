//! Tests for restoring sessions from persisted records.

use std::sync::Arc;
use strictly_morris::{
    GameType, MovePayload, Outcome, Phase, PhaseName, Position, ResumePhase, RuleSet, Session,
    SessionRecord, SessionStatus, Side,
};

fn place(x: i32, y: i32) -> MovePayload {
    MovePayload::Place {
        to: Position::new(x, y),
    }
}

fn mid_removal() -> Session {
    let mut session = Session::new(
        "rec-1".to_string(),
        "alice".to_string(),
        "bob".to_string(),
        GameType::Staked,
        Arc::new(RuleSet::default()),
    )
    .mark_ready(Side::Red)
    .unwrap()
    .mark_ready(Side::Blue)
    .unwrap();

    for (side, payload) in [
        (Side::Red, place(0, 0)),
        (Side::Blue, place(6, 6)),
        (Side::Red, place(3, 0)),
        (Side::Blue, place(6, 3)),
        (Side::Red, place(6, 0)),
    ] {
        session = session.submit_move(side, payload).unwrap();
    }
    session
}

#[test]
fn test_removing_phase_survives_json() {
    let session = mid_removal();
    let json = serde_json::to_string(&session.to_record()).unwrap();
    let record: SessionRecord = serde_json::from_str(&json).unwrap();

    assert_eq!(record.phase, PhaseName::Removing);
    assert_eq!(record.resume_phase, Some(ResumePhase::Placing));
    assert_eq!(record.pending_removals, 1);

    let restored = Session::from_record(&record).unwrap();
    assert_eq!(restored, session);
    assert_eq!(
        restored.phase(),
        Phase::Removing {
            resume: ResumePhase::Placing,
            pending: 1
        }
    );
}

#[test]
fn test_resigned_game_restores() {
    let session = mid_removal().resign(Side::Red).unwrap();
    let restored = Session::from_record(&session.to_record()).unwrap();

    assert_eq!(restored.phase(), Phase::GameOver(Outcome::Winner(Side::Blue)));
    assert_eq!(restored.status(), SessionStatus::Completed);
    assert_eq!(restored.current_turn(), None);
}

#[test]
fn test_unreplayable_log_rejected() {
    let mut record = mid_removal().to_record();
    record.moves[1].encoded_move = "place 0,0".to_string();
    let err = Session::from_record(&record).unwrap_err();
    assert!(err.message.contains("does not replay"), "{}", err);
}

#[test]
fn test_undecodable_move_rejected() {
    let mut record = mid_removal().to_record();
    record.moves[0].encoded_move = "jump 0,0".to_string();
    assert!(Session::from_record(&record).is_err());
}

#[test]
fn test_phase_disagreeing_with_log_rejected() {
    let mut record = mid_removal().to_record();
    record.phase = PhaseName::Placing;
    record.resume_phase = None;
    record.pending_removals = 0;
    let err = Session::from_record(&record).unwrap_err();
    assert!(err.message.contains("phase"), "{}", err);
}

#[test]
fn test_invalid_rules_rejected() {
    let mut record = mid_removal().to_record();
    record.rules = RuleSet::default().with_removals_per_capturing_move(0);
    assert!(Session::from_record(&record).is_err());
}

#[test]
fn test_empty_log_phase_must_match() {
    let started = Session::new(
        "rec-2".to_string(),
        "alice".to_string(),
        "bob".to_string(),
        GameType::Friendly,
        Arc::new(RuleSet::default()),
    )
    .mark_ready(Side::Red)
    .unwrap()
    .mark_ready(Side::Blue)
    .unwrap();

    let restored = Session::from_record(&started.to_record()).unwrap();
    assert_eq!(restored, started);

    let mut record = started.to_record();
    record.phase = PhaseName::Moving;
    let err = Session::from_record(&record).unwrap_err();
    assert!(err.message.contains("phase"), "{}", err);
}

#[test]
fn test_quiet_move_counter_must_match_log() {
    let mut record = mid_removal().to_record();
    record.quiet_moves = 49;
    let err = Session::from_record(&record).unwrap_err();
    assert!(err.message.contains("quiet-move"), "{}", err);
}
