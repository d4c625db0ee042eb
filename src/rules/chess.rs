//! Chess binding for the seat-neutral session model.

use super::Position;
use crate::session::entities::Seat;

/// Standard chess starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// White moves first.
pub const FIRST_TO_MOVE: Seat = Seat::First;

/// Starting position as a [`Position`].
#[must_use]
pub fn starting_position() -> Position {
    Position::new(STARTING_FEN)
}

/// Color name for a seat under the chess binding.
#[must_use]
pub const fn seat_color(seat: Seat) -> &'static str {
    match seat {
        Seat::First => "white",
        Seat::Second => "black",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_seat_is_white() {
        assert_eq!(seat_color(FIRST_TO_MOVE), "white");
        assert_eq!(seat_color(Seat::Second), "black");
    }

    #[test]
    fn starting_fen_has_white_to_move() {
        assert!(STARTING_FEN.contains(" w "));
    }
}
