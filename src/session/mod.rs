//! Session entities, lifecycle rules, and the error taxonomy.

pub mod entities;
pub mod errors;
pub mod lifecycle;

pub use entities::{
    GameSession, Outcome, Player, PlayerId, Seat, SeatedPlayer, SessionId, SessionStatus,
};
pub use errors::{SessionError, SessionResult};
pub use lifecycle::SeatEvent;
