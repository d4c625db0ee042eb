//! Core session and player entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt};
use uuid::Uuid;

use crate::rules::Position;

/// Session identifier, generated at creation.
pub type SessionId = Uuid;

/// Player identifier.
pub type PlayerId = Uuid;

/// One of the two fixed turn-order slots in a session.
///
/// Seats are color-neutral; the chess binding maps `First` to white
/// and `Second` to black.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    /// The other seat.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::First => "first",
            Self::Second => "second",
        };
        write!(f, "{repr}")
    }
}

/// Session lifecycle status.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SessionStatus {
    /// Freshly created, no seats filled.
    Created,
    /// At least one seat filled, not yet playable.
    AwaitingStart,
    /// Both seats filled, position and turn initialized.
    Active,
    /// A terminal condition was reached; state is frozen.
    Finished,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Created => "created",
            Self::AwaitingStart => "awaiting start",
            Self::Active => "active",
            Self::Finished => "finished",
        };
        write!(f, "{repr}")
    }
}

/// How a finished session ended.
///
/// Stalemate and insufficient material both collapse to [`Outcome::Draw`];
/// any distinguishing reason is a display concern of the rules engine, not
/// part of session state.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Outcome {
    Win(Seat),
    Draw,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Win(seat) => write!(f, "{seat} seat wins"),
            Self::Draw => write!(f, "draw"),
        }
    }
}

/// A registered player.
///
/// Names are unique case-insensitively and immutable after registration.
/// `active_sessions` holds back-references to sessions the player has been
/// seated in; finished sessions are retained as history until the session
/// itself is deleted.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub active_sessions: HashSet<SessionId>,
    pub created_at: DateTime<Utc>,
}

impl Player {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            active_sessions: HashSet::new(),
            created_at: Utc::now(),
        }
    }
}

// Player equality is identity, never value comparison of mutable fields.
impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Player {}

/// Snapshot of the player occupying a seat.
///
/// Sessions store this instead of the full [`Player`] record so that
/// registry-side mutations (back-reference updates) never alter persisted
/// session state.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SeatedPlayer {
    pub id: PlayerId,
    pub name: String,
}

impl PartialEq for SeatedPlayer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SeatedPlayer {}

impl From<&Player> for SeatedPlayer {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
        }
    }
}

/// One two-player game session and its mutable state.
///
/// Fields are crate-private; all mutation goes through the lifecycle
/// methods so no partially-updated state is ever observable.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GameSession {
    pub(crate) id: SessionId,
    pub(crate) first_seat: Option<SeatedPlayer>,
    pub(crate) second_seat: Option<SeatedPlayer>,
    pub(crate) status: SessionStatus,
    pub(crate) position: Option<Position>,
    pub(crate) turn: Option<Seat>,
    pub(crate) outcome: Option<Outcome>,
    /// Optimistic concurrency version, bumped on every persisted write.
    pub(crate) version: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl GameSession {
    /// Create a fresh, unseated session.
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            first_seat: None,
            second_seat: None,
            status: SessionStatus::Created,
            position: None,
            turn: None,
            outcome: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Current position; `None` until the session is active.
    #[must_use]
    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    /// Seat to move; `None` unless the session is active.
    #[must_use]
    pub fn turn(&self) -> Option<Seat> {
        self.turn
    }

    /// Final outcome; `None` until the session is finished.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    #[must_use]
    pub fn version(&self) -> i64 {
        self.version
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Occupant of a seat, if any.
    #[must_use]
    pub fn player_at(&self, seat: Seat) -> Option<&SeatedPlayer> {
        match seat {
            Seat::First => self.first_seat.as_ref(),
            Seat::Second => self.second_seat.as_ref(),
        }
    }

    /// Which seat a player occupies, by identifier.
    #[must_use]
    pub fn seat_of(&self, player_id: PlayerId) -> Option<Seat> {
        [Seat::First, Seat::Second]
            .into_iter()
            .find(|&seat| self.player_at(seat).is_some_and(|p| p.id == player_id))
    }

    /// Both seated players, in seat order.
    pub fn players(&self) -> impl Iterator<Item = &SeatedPlayer> {
        self.first_seat.iter().chain(self.second_seat.iter())
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.first_seat.is_some() && self.second_seat.is_some()
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
