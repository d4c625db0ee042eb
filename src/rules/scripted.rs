//! Table-driven rules engine for tests and benches.
//!
//! Real deployments bind a full chess engine behind [`RulesEngine`]; this
//! implementation replays a fixed script of position/move pairs, which is
//! enough to exercise every session-layer path (acceptance, rejection,
//! checkmate, draws) without dragging chess legality into scope.

use std::collections::HashMap;

use super::{MoveOutcome, Position, RulesEngine, RulesError, Terminal, chess};
use crate::session::entities::Seat;

/// A rules engine that answers from a prebuilt script.
///
/// Unknown moves at a known position are reported as illegal; input that
/// does not look like move notation at all is reported as malformed.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    initial: Option<Position>,
    first_to_move: Option<Seat>,
    script: HashMap<(String, String), MoveOutcome>,
}

impl ScriptedEngine {
    /// Engine over the standard chess opening position, white to move.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the initial position.
    #[must_use]
    pub fn with_initial(mut self, position: impl Into<String>) -> Self {
        self.initial = Some(Position::new(position));
        self
    }

    /// Override the seat that moves first.
    #[must_use]
    pub fn with_first_to_move(mut self, seat: Seat) -> Self {
        self.first_to_move = Some(seat);
        self
    }

    /// Script a legal, non-terminal move.
    #[must_use]
    pub fn legal(self, position: &str, notation: &str, next: &str) -> Self {
        self.on(position, notation, next, None)
    }

    /// Script a mating move.
    #[must_use]
    pub fn mate(self, position: &str, notation: &str, next: &str) -> Self {
        self.on(position, notation, next, Some(Terminal::Checkmate))
    }

    /// Script a stalemating move.
    #[must_use]
    pub fn stalemate(self, position: &str, notation: &str, next: &str) -> Self {
        self.on(position, notation, next, Some(Terminal::Stalemate))
    }

    /// Script a drawing move with a descriptive reason.
    #[must_use]
    pub fn draw(self, position: &str, notation: &str, next: &str, reason: &str) -> Self {
        self.on(
            position,
            notation,
            next,
            Some(Terminal::Draw {
                reason: Some(reason.to_string()),
            }),
        )
    }

    #[must_use]
    pub fn on(
        mut self,
        position: &str,
        notation: &str,
        next: &str,
        terminal: Option<Terminal>,
    ) -> Self {
        self.script.insert(
            (position.to_string(), notation.to_string()),
            MoveOutcome {
                position: Position::new(next),
                terminal,
            },
        );
        self
    }

    fn looks_like_notation(notation: &str) -> bool {
        !notation.trim().is_empty()
            && notation
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '=' | '+' | '#' | 'x'))
    }
}

impl RulesEngine for ScriptedEngine {
    fn initial_position(&self) -> Position {
        self.initial
            .clone()
            .unwrap_or_else(chess::starting_position)
    }

    fn first_seat_to_move(&self) -> Seat {
        self.first_to_move.unwrap_or(chess::FIRST_TO_MOVE)
    }

    fn apply(&self, position: &Position, notation: &str) -> Result<MoveOutcome, RulesError> {
        if !Self::looks_like_notation(notation) {
            return Err(RulesError::MalformedMove {
                reason: format!("{notation:?} is not move notation"),
            });
        }
        self.script
            .get(&(position.as_str().to_string(), notation.to_string()))
            .cloned()
            .ok_or_else(|| RulesError::IllegalMove {
                reason: format!("{notation} is not legal in the current position"),
            })
    }
}
