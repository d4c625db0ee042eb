//! # Chess Arbiter
//!
//! Session lifecycle and turn coordination for two-player chess games.
//!
//! The crate tracks whose turn it is, accepts move submissions, delegates
//! legality checking to a rules engine, and advances the session lifecycle
//! consistently under concurrent access. At most one move or lifecycle
//! mutation is ever applied at a time per session.
//!
//! ## Lifecycle
//!
//! A session moves through four statuses:
//!
//! - **Created**: fresh, no seats filled
//! - **AwaitingStart**: first seat filled
//! - **Active**: both seats filled; position and turn initialized together
//! - **Finished**: a terminal condition (checkmate, stalemate, draw) froze
//!   the session atomically with the move that caused it
//!
//! ## Core Modules
//!
//! - [`session`]: entities, lifecycle rules, and the error taxonomy
//! - [`coordination`]: turn coordinator, per-session gate, and the
//!   [`SessionManager`] orchestrator
//! - [`rules`]: the consumed rules-engine interface and its chess binding
//! - [`db`]: repository traits with PostgreSQL and in-memory
//!   implementations
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use chess_arbiter::{
//!     MemoryRegistry, MemoryStore, ScriptedEngine, SessionManager,
//!     rules::chess::STARTING_FEN,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = ScriptedEngine::new().legal(STARTING_FEN, "e4", "fen-after-e4");
//!     let manager = SessionManager::new(
//!         Arc::new(MemoryStore::new()),
//!         Arc::new(MemoryRegistry::new()),
//!         Arc::new(engine),
//!     );
//!
//!     manager.register_player("ann").await?;
//!     manager.register_player("bo").await?;
//!
//!     let session = manager.create_session().await?;
//!     manager.join_session(session.id(), "ann", None).await?;
//!     let active = manager.join_session(session.id(), "bo", None).await?;
//!     assert!(active.turn().is_some());
//!
//!     manager.submit_move(session.id(), "ann", "e4").await?;
//!     Ok(())
//! }
//! ```

/// Session entities, lifecycle rules, and errors.
pub mod session;
pub use session::{
    GameSession, Outcome, Player, PlayerId, Seat, SeatEvent, SeatedPlayer, SessionError,
    SessionId, SessionResult, SessionStatus,
};

/// Turn coordination and orchestration.
pub mod coordination;
pub use coordination::{CoordinationConfig, SessionGate, SessionManager, TurnCoordinator};

/// Rules engine interface.
pub mod rules;
pub use rules::{MoveOutcome, Position, RulesEngine, RulesError, ScriptedEngine, Terminal};

/// Persistence.
pub mod db;
pub use db::{
    Database, DatabaseConfig, MemoryRegistry, MemoryStore, PgPlayerRegistry, PgSessionStore,
    PlayerRegistry, SessionStore, StoreError,
};
