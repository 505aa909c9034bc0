//! The session snapshot: aggregate root of one game.

use super::{Board, GameType, MoveRecord, Outcome, PerSide, Phase, SessionStatus, Side};
use crate::config::RuleSet;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Opaque identifier of a participant, issued by the identity collaborator.
pub type ParticipantId = String;

/// Immutable state of one game between two participants.
///
/// Transitions never modify a snapshot; they return a new one (see the
/// operations in the engine module).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub(super) id: SessionId,
    pub(super) initiator: ParticipantId,
    pub(super) opponent: ParticipantId,
    pub(super) players: PerSide<ParticipantId>,
    pub(super) game_type: GameType,
    pub(super) rules: Arc<RuleSet>,
    pub(super) status: SessionStatus,
    pub(super) phase: Phase,
    pub(super) current_turn: Option<Side>,
    pub(super) placed: PerSide<u8>,
    pub(super) ready: PerSide<bool>,
    pub(super) board: Board,
    pub(super) moves: Vec<MoveRecord>,
    pub(super) quiet_moves: u32,
    pub(super) created_at: DateTime<Utc>,
    pub(super) updated_at: DateTime<Utc>,
}

impl Session {
    /// Creates a pending session. The initiator plays red, the opponent blue.
    #[instrument(skip(rules))]
    pub fn new(
        id: SessionId,
        initiator: ParticipantId,
        opponent: ParticipantId,
        game_type: GameType,
        rules: Arc<RuleSet>,
    ) -> Self {
        Self::new_at(id, initiator, opponent, game_type, rules, Utc::now())
    }

    /// Creates a pending session with an explicit creation time.
    #[instrument(skip(rules))]
    pub fn new_at(
        id: SessionId,
        initiator: ParticipantId,
        opponent: ParticipantId,
        game_type: GameType,
        rules: Arc<RuleSet>,
        created_at: DateTime<Utc>,
    ) -> Self {
        info!(session_id = %id, %initiator, %opponent, %game_type, "Creating new game session");
        let board = Board::new(Arc::new(rules.grid().build()));
        Self {
            players: PerSide::new(initiator.clone(), opponent.clone()),
            id,
            initiator,
            opponent,
            game_type,
            rules,
            status: SessionStatus::Pending,
            phase: Phase::Placing,
            current_turn: None,
            placed: PerSide::default(),
            ready: PerSide::default(),
            board,
            moves: Vec::new(),
            quiet_moves: 0,
            created_at,
            updated_at: created_at,
        }
    }

    /// Returns the session id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the participant who created the session.
    pub fn initiator(&self) -> &str {
        &self.initiator
    }

    /// Returns the invited participant.
    pub fn opponent(&self) -> &str {
        &self.opponent
    }

    /// Returns the participant playing `side`.
    pub fn player(&self, side: Side) -> &str {
        self.players.of(side)
    }

    /// Returns the side played by `participant`, if they take part.
    pub fn side_of(&self, participant: &str) -> Option<Side> {
        if self.players.red == participant {
            Some(Side::Red)
        } else if self.players.blue == participant {
            Some(Side::Blue)
        } else {
            None
        }
    }

    /// Returns the stake type.
    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    /// Returns the rules in force.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Returns the lifecycle status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Returns the in-game phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the side that must act next, once active.
    pub fn current_turn(&self) -> Option<Side> {
        self.current_turn
    }

    /// Returns how many pieces each side has placed.
    pub fn placed(&self) -> &PerSide<u8> {
        &self.placed
    }

    /// Returns which sides have marked themselves ready.
    pub fn ready(&self) -> &PerSide<bool> {
        &self.ready
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the accepted moves, oldest first.
    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    /// Returns consecutive relocations since the last removal.
    pub fn quiet_moves(&self) -> u32 {
        self.quiet_moves
    }

    /// Returns the outcome once the game is over.
    pub fn outcome(&self) -> Option<Outcome> {
        self.phase.outcome()
    }

    /// Returns the winner of a decisive game.
    pub fn winner(&self) -> Option<Side> {
        self.outcome().and_then(|o| o.winner())
    }

    /// Returns true if the game ended in a draw.
    pub fn is_draw(&self) -> bool {
        self.outcome().is_some_and(|o| o.is_draw())
    }

    /// Returns when the session was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the session last changed.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
