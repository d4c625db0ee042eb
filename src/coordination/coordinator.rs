//! Turn coordination: the gatekeeping between a submitted move and the
//! session it mutates.

use std::sync::Arc;

use crate::{
    rules::{RulesEngine, Terminal},
    session::{
        entities::{GameSession, Outcome, Player, SessionStatus},
        errors::{SessionError, SessionResult},
    },
};

/// Enforces turn order and session status before a move reaches the rules
/// engine, and applies the accepted result as a single session mutation.
///
/// All chess legality is delegated; this layer never inspects notation or
/// positions beyond passing them through.
#[derive(Clone)]
pub struct TurnCoordinator {
    rules: Arc<dyn RulesEngine>,
}

impl TurnCoordinator {
    pub fn new(rules: Arc<dyn RulesEngine>) -> Self {
        Self { rules }
    }

    /// Submit a move on behalf of `player`.
    ///
    /// Validation order matters for callers: a finished session is a hard
    /// stop, a not-yet-active one means "wait", then participation, then
    /// turn order, then legality. A failure at any step leaves the session
    /// untouched.
    ///
    /// # Errors
    ///
    /// * `SessionError::SessionFinished` - The game is already over
    /// * `SessionError::SessionNotActive` - Both seats not yet filled
    /// * `SessionError::PlayerNotInSession` - Submitter holds no seat
    /// * `SessionError::WrongTurn` - Not the submitter's turn
    /// * `SessionError::IllegalMove` / `SessionError::MalformedMove` -
    ///   Rejected by the rules engine
    pub fn submit_move(
        &self,
        session: &mut GameSession,
        player: &Player,
        notation: &str,
    ) -> SessionResult<()> {
        match session.status() {
            SessionStatus::Finished => return Err(SessionError::SessionFinished),
            SessionStatus::Active => {}
            status => return Err(SessionError::SessionNotActive { status }),
        }

        let seat = session
            .seat_of(player.id)
            .ok_or_else(|| SessionError::PlayerNotInSession {
                name: player.name.clone(),
            })?;

        let turn = session.current_turn_seat()?;
        if seat != turn {
            let holder = session
                .player_at(turn)
                .map_or_else(|| turn.to_string(), |p| p.name.clone());
            return Err(SessionError::WrongTurn { seat: turn, holder });
        }

        let position = session
            .position()
            .ok_or(SessionError::InternalState("active session without a position"))?;
        let applied = self.rules.apply(position, notation)?;

        // Checkmate always names the mover as winner; every other terminal
        // collapses to a draw at this layer.
        let outcome = applied.terminal.as_ref().map(|terminal| match terminal {
            Terminal::Checkmate => Outcome::Win(seat),
            Terminal::Stalemate | Terminal::Draw { .. } => Outcome::Draw,
        });

        session.apply_move_result(applied.position, seat.opponent(), outcome)
    }
}
