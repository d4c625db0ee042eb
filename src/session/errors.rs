//! Session error taxonomy.
//!
//! One tagged enum covers every failure a caller can see, so transports
//! can branch on kind without string matching. Infrastructure failures
//! (`Storage`, `Conflict`, `Timeout`) are the only retryable kinds;
//! domain errors are surfaced immediately and never retried.

use std::time::Duration;
use thiserror::Error;

use super::entities::{Seat, SessionId, SessionStatus};
use crate::{db::StoreError, rules::RulesError};

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Unknown session identifier
    #[error("no session found with id {0}")]
    SessionNotFound(SessionId),

    /// Both seats already occupied
    #[error("session is already full")]
    SessionFull,

    /// Player already holds a seat in this session
    #[error("{name} already occupies a seat in this session")]
    DuplicateSeat { name: String },

    /// Move submitted before the session became active
    #[error("session is not active (status: {status})")]
    SessionNotActive { status: SessionStatus },

    /// Move submitted after a terminal condition
    #[error("session is already over")]
    SessionFinished,

    /// Submitting identity holds neither seat
    #[error("{name} is not a participant in this session")]
    PlayerNotInSession { name: String },

    /// Out-of-order move; names whose turn it actually is
    #[error("not your turn: {holder} ({seat} seat) is to move")]
    WrongTurn { seat: Seat, holder: String },

    /// Rejected by the rules engine
    #[error("illegal move: {reason}")]
    IllegalMove { reason: String },

    /// Unparseable move notation
    #[error("malformed move: {reason}")]
    MalformedMove { reason: String },

    /// Unknown player name or identifier
    #[error("no player found: {0}")]
    PlayerNotFound(String),

    /// Case-insensitive name collision at registration
    #[error("a player named {0} already exists")]
    NameTaken(String),

    /// Player removal blocked by an unfinished session
    #[error("{name} is still seated in an unfinished session")]
    PlayerStillSeated { name: String },

    /// Concurrent writer won the version check; retry from the top
    #[error("session was modified concurrently: {0}")]
    Conflict(String),

    /// Repository failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Repository call exceeded its deadline
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Internal invariant violated; indicates a bug, not caller error
    #[error("invalid session state: {0}")]
    InternalState(&'static str),
}

impl SessionError {
    /// Whether retrying the whole gated operation can succeed.
    ///
    /// Retrying is safe for infrastructure failures because every gated
    /// operation reloads state before validating. Domain errors cannot
    /// change outcome without caller intervention.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Conflict(_) | Self::Storage(_) | Self::Timeout(_)
        )
    }
}

impl From<RulesError> for SessionError {
    fn from(err: RulesError) -> Self {
        match err {
            RulesError::IllegalMove { reason } => Self::IllegalMove { reason },
            RulesError::MalformedMove { reason } => Self::MalformedMove { reason },
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SessionNotFound(id) => Self::SessionNotFound(id),
            StoreError::PlayerNotFound(who) => Self::PlayerNotFound(who),
            StoreError::NameTaken(name) => Self::NameTaken(name),
            StoreError::Conflict { detail } => Self::Conflict(detail),
            StoreError::Timeout(duration) => Self::Timeout(duration),
            StoreError::Database(e) => Self::Storage(e.to_string()),
            StoreError::Serialization(e) => Self::Storage(e.to_string()),
        }
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn only_infrastructure_errors_are_retryable() {
        assert!(SessionError::Conflict("version mismatch".into()).is_retryable());
        assert!(SessionError::Storage("connection reset".into()).is_retryable());
        assert!(SessionError::Timeout(Duration::from_secs(5)).is_retryable());

        assert!(!SessionError::SessionNotFound(Uuid::new_v4()).is_retryable());
        assert!(!SessionError::SessionFinished.is_retryable());
        assert!(
            !SessionError::WrongTurn {
                seat: Seat::First,
                holder: "ann".into(),
            }
            .is_retryable()
        );
        assert!(
            !SessionError::IllegalMove {
                reason: "king in check".into(),
            }
            .is_retryable()
        );
    }

    #[test]
    fn rules_errors_map_to_distinct_kinds() {
        let illegal: SessionError = RulesError::IllegalMove {
            reason: "blocked".into(),
        }
        .into();
        assert!(matches!(illegal, SessionError::IllegalMove { .. }));

        let malformed: SessionError = RulesError::MalformedMove {
            reason: "not SAN".into(),
        }
        .into();
        assert!(matches!(malformed, SessionError::MalformedMove { .. }));
    }

    #[test]
    fn wrong_turn_message_names_the_turn_holder() {
        let err = SessionError::WrongTurn {
            seat: Seat::Second,
            holder: "bo".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("bo"));
        assert!(msg.contains("second"));
    }
}
