//! Session lifecycle rules.
//!
//! Transitions: `Created` → `AwaitingStart` on the first seat fill,
//! `AwaitingStart` → `Active` when play begins (position and turn set
//! together, never one without the other), `Active` → `Finished` atomically
//! with the move that caused the terminal condition. Once finished, the
//! session is frozen.
//!
//! Filling the second seat does not start play directly; it yields
//! [`SeatEvent::SeatsFilled`] and the orchestrator reacts by calling
//! [`GameSession::begin`] with data from the rules engine. This keeps the
//! lifecycle module free of any rules-engine dependency.

use super::{
    entities::{GameSession, Outcome, Player, Seat, SessionStatus},
    errors::{SessionError, SessionResult},
};
use crate::rules::Position;

/// What a seat assignment did to the session.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SeatEvent {
    /// Player seated; the other seat is still open.
    Seated { seat: Seat },
    /// Player seated and both seats are now occupied; the session is
    /// ready to begin.
    SeatsFilled { seat: Seat },
}

impl SeatEvent {
    #[must_use]
    pub fn seat(self) -> Seat {
        match self {
            Self::Seated { seat } | Self::SeatsFilled { seat } => seat,
        }
    }
}

impl GameSession {
    /// Assign `player` to an empty seat.
    ///
    /// Takes `preferred_seat` when it is free, otherwise the first empty
    /// seat. Seats are never reassigned once filled.
    ///
    /// # Errors
    ///
    /// * `SessionError::SessionFull` - Both seats already occupied
    /// * `SessionError::DuplicateSeat` - Player already seated here
    pub fn seat(
        &mut self,
        player: &Player,
        preferred_seat: Option<Seat>,
    ) -> SessionResult<SeatEvent> {
        if self.seat_of(player.id).is_some() {
            return Err(SessionError::DuplicateSeat {
                name: player.name.clone(),
            });
        }
        let open = [Seat::First, Seat::Second]
            .into_iter()
            .filter(|&s| self.player_at(s).is_none())
            .collect::<Vec<_>>();
        let seat = match preferred_seat {
            Some(preferred) if open.contains(&preferred) => preferred,
            _ => *open.first().ok_or(SessionError::SessionFull)?,
        };

        let occupant = Some(player.into());
        match seat {
            Seat::First => self.first_seat = occupant,
            Seat::Second => self.second_seat = occupant,
        }
        if self.status == SessionStatus::Created {
            self.status = SessionStatus::AwaitingStart;
        }
        self.touch();

        if self.is_full() {
            Ok(SeatEvent::SeatsFilled { seat })
        } else {
            Ok(SeatEvent::Seated { seat })
        }
    }

    /// Begin play: `AwaitingStart` → `Active` with the starting position
    /// and first turn set in the same mutation.
    ///
    /// # Errors
    ///
    /// * `SessionError::InternalState` - Called on a session that is not
    ///   full and awaiting start
    pub fn begin(&mut self, position: Position, first_to_move: Seat) -> SessionResult<()> {
        if self.status != SessionStatus::AwaitingStart || !self.is_full() {
            return Err(SessionError::InternalState(
                "begin requires a full session awaiting start",
            ));
        }
        self.position = Some(position);
        self.turn = Some(first_to_move);
        self.status = SessionStatus::Active;
        self.touch();
        Ok(())
    }

    /// Seat to move.
    ///
    /// # Errors
    ///
    /// * `SessionError::SessionNotActive` - Status is not `Active`
    pub fn current_turn_seat(&self) -> SessionResult<Seat> {
        if self.status != SessionStatus::Active {
            return Err(SessionError::SessionNotActive {
                status: self.status,
            });
        }
        self.turn
            .ok_or(SessionError::InternalState("active session without a turn"))
    }

    /// Record the result of an accepted move in a single mutation.
    ///
    /// Sets the new position and either hands the turn to `next_turn` or,
    /// when `outcome` is terminal, freezes the session as `Finished`. The
    /// turn is cleared on finish; it is defined only while active.
    ///
    /// Only the turn coordinator calls this, after the rules engine has
    /// accepted the move.
    pub(crate) fn apply_move_result(
        &mut self,
        new_position: Position,
        next_turn: Seat,
        outcome: Option<Outcome>,
    ) -> SessionResult<()> {
        if self.status != SessionStatus::Active {
            return Err(SessionError::InternalState(
                "moves can only be applied to an active session",
            ));
        }
        self.position = Some(new_position);
        match outcome {
            Some(outcome) => {
                self.turn = None;
                self.outcome = Some(outcome);
                self.status = SessionStatus::Finished;
            }
            None => self.turn = Some(next_turn),
        }
        self.touch();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::chess;

    fn full_session() -> (GameSession, Player, Player) {
        let mut session = GameSession::new();
        let ann = Player::new("ann");
        let bo = Player::new("bo");
        session.seat(&ann, None).unwrap();
        session.seat(&bo, None).unwrap();
        (session, ann, bo)
    }

    #[test]
    fn first_seat_moves_to_awaiting_start() {
        let mut session = GameSession::new();
        let ann = Player::new("ann");
        let event = session.seat(&ann, None).unwrap();
        assert_eq!(event, SeatEvent::Seated { seat: Seat::First });
        assert_eq!(session.status(), SessionStatus::AwaitingStart);
        assert_eq!(session.seat_of(ann.id), Some(Seat::First));
    }

    #[test]
    fn second_seat_reports_seats_filled_without_starting() {
        let (session, _, bo) = full_session();
        // begin() is the orchestrator's reaction, not a side effect of seat()
        assert_eq!(session.status(), SessionStatus::AwaitingStart);
        assert_eq!(session.seat_of(bo.id), Some(Seat::Second));
        assert!(session.position().is_none());
    }

    #[test]
    fn preferred_seat_is_honored_when_free() {
        let mut session = GameSession::new();
        let ann = Player::new("ann");
        let event = session.seat(&ann, Some(Seat::Second)).unwrap();
        assert_eq!(event.seat(), Seat::Second);
        assert!(session.player_at(Seat::First).is_none());
    }

    #[test]
    fn occupied_preferred_seat_falls_back_to_open_seat() {
        let mut session = GameSession::new();
        let ann = Player::new("ann");
        let bo = Player::new("bo");
        session.seat(&ann, Some(Seat::First)).unwrap();
        let event = session.seat(&bo, Some(Seat::First)).unwrap();
        assert_eq!(event.seat(), Seat::Second);
    }

    #[test]
    fn duplicate_seating_is_rejected() {
        let mut session = GameSession::new();
        let ann = Player::new("ann");
        session.seat(&ann, None).unwrap();
        let err = session.seat(&ann, Some(Seat::Second)).unwrap_err();
        assert!(matches!(err, SessionError::DuplicateSeat { .. }));
    }

    #[test]
    fn third_player_finds_session_full() {
        let (mut session, ..) = full_session();
        let carol = Player::new("carol");
        let err = session.seat(&carol, None).unwrap_err();
        assert!(matches!(err, SessionError::SessionFull));
    }

    #[test]
    fn begin_sets_position_and_turn_together() {
        let (mut session, ..) = full_session();
        session
            .begin(chess::starting_position(), Seat::First)
            .unwrap();
        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(session.position().unwrap().as_str(), chess::STARTING_FEN);
        assert_eq!(session.current_turn_seat().unwrap(), Seat::First);
    }

    #[test]
    fn begin_requires_a_full_session() {
        let mut session = GameSession::new();
        let ann = Player::new("ann");
        session.seat(&ann, None).unwrap();
        let err = session
            .begin(chess::starting_position(), Seat::First)
            .unwrap_err();
        assert!(matches!(err, SessionError::InternalState(_)));
    }

    #[test]
    fn turn_is_undefined_before_activation() {
        let (session, ..) = full_session();
        let err = session.current_turn_seat().unwrap_err();
        assert!(matches!(
            err,
            SessionError::SessionNotActive {
                status: SessionStatus::AwaitingStart
            }
        ));
    }

    #[test]
    fn applying_a_move_hands_over_the_turn() {
        let (mut session, ..) = full_session();
        session
            .begin(chess::starting_position(), Seat::First)
            .unwrap();
        session
            .apply_move_result(Position::new("after-e4"), Seat::Second, None)
            .unwrap();
        assert_eq!(session.current_turn_seat().unwrap(), Seat::Second);
        assert_eq!(session.position().unwrap().as_str(), "after-e4");
        assert_eq!(session.status(), SessionStatus::Active);
    }

    #[test]
    fn terminal_move_finishes_in_the_same_mutation() {
        let (mut session, ..) = full_session();
        session
            .begin(chess::starting_position(), Seat::First)
            .unwrap();
        session
            .apply_move_result(
                Position::new("mate"),
                Seat::Second,
                Some(Outcome::Win(Seat::First)),
            )
            .unwrap();
        assert_eq!(session.status(), SessionStatus::Finished);
        assert_eq!(session.outcome(), Some(Outcome::Win(Seat::First)));
        assert!(session.turn().is_none());
    }

    #[test]
    fn finished_session_rejects_further_mutation() {
        let (mut session, ..) = full_session();
        session
            .begin(chess::starting_position(), Seat::First)
            .unwrap();
        session
            .apply_move_result(Position::new("mate"), Seat::Second, Some(Outcome::Draw))
            .unwrap();
        let err = session
            .apply_move_result(Position::new("x"), Seat::First, None)
            .unwrap_err();
        assert!(matches!(err, SessionError::InternalState(_)));
        assert_eq!(session.position().unwrap().as_str(), "mate");
    }
}
