//! Rules engine interface.
//!
//! The session layer treats the rules engine as the sole authority on
//! move legality, position transitions, and terminal conditions. It never
//! performs chess-specific validation itself, and it recognizes exactly
//! two failure kinds from an engine: illegal and malformed moves.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::session::entities::Seat;

pub mod chess;
pub mod scripted;

pub use scripted::ScriptedEngine;

/// Opaque serialized board state (a FEN string for the chess binding).
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Position(String);

impl Position {
    #[must_use]
    pub fn new(repr: impl Into<String>) -> Self {
        Self(repr.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Position {
    fn from(repr: &str) -> Self {
        Self(repr.to_string())
    }
}

/// A condition that ends the session.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Terminal {
    /// The mover delivered mate; the mover's seat wins.
    Checkmate,
    Stalemate,
    /// Any other draw (insufficient material, repetition, ...). The reason
    /// is descriptive only and never stored in session state.
    Draw { reason: Option<String> },
}

/// Result of applying a legal move.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MoveOutcome {
    pub position: Position,
    pub terminal: Option<Terminal>,
}

/// Errors a rules engine may report.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum RulesError {
    /// Well-formed notation, but the move is not legal in this position
    #[error("illegal move: {reason}")]
    IllegalMove { reason: String },

    /// The notation could not be parsed at all
    #[error("malformed move: {reason}")]
    MalformedMove { reason: String },
}

/// External authority for move legality and terminal-condition detection.
///
/// Engines are expected to be pure and fast; all methods are synchronous
/// and suspension happens only at repository I/O boundaries.
pub trait RulesEngine: Send + Sync {
    /// Starting position for a fresh game.
    fn initial_position(&self) -> Position;

    /// Seat defined as moving first.
    fn first_seat_to_move(&self) -> Seat;

    /// Validate `notation` against `position` and produce the resulting
    /// position plus any terminal condition it creates.
    fn apply(&self, position: &Position, notation: &str) -> Result<MoveOutcome, RulesError>;
}
