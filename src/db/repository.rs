//! Repository trait definitions and their PostgreSQL implementations.
//!
//! Trait-based abstractions keep the coordination layer storage-agnostic
//! and testable; [`crate::db::memory`] provides in-memory implementations
//! of the same traits.
//!
//! The PostgreSQL schema:
//!
//! ```sql
//! CREATE TABLE chess_sessions (
//!     id         UUID PRIMARY KEY,
//!     state      JSONB NOT NULL,
//!     version    BIGINT NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//!
//! CREATE TABLE chess_players (
//!     id         UUID PRIMARY KEY,
//!     name       TEXT NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT now()
//! );
//! CREATE UNIQUE INDEX chess_players_name_key ON chess_players (lower(name));
//!
//! CREATE TABLE chess_player_sessions (
//!     player_id  UUID NOT NULL REFERENCES chess_players (id) ON DELETE CASCADE,
//!     session_id UUID NOT NULL,
//!     PRIMARY KEY (player_id, session_id)
//! );
//! ```

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{
    errors::{StoreError, StoreResult},
    timeouts::with_default_timeout,
};
use crate::session::entities::{GameSession, Player, PlayerId, SessionId};

/// Durable storage for session records, atomic per session identifier.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a fresh, empty session and return it.
    async fn create(&self) -> StoreResult<GameSession>;

    /// Load the latest persisted state of a session.
    async fn load(&self, id: SessionId) -> StoreResult<GameSession>;

    /// Persist `session`, enforcing the optimistic version check; returns
    /// the record as persisted (version bumped).
    async fn save(&self, session: &GameSession) -> StoreResult<GameSession>;

    /// Remove a session record.
    async fn delete(&self, id: SessionId) -> StoreResult<()>;

    /// All session records.
    async fn list(&self) -> StoreResult<Vec<GameSession>>;
}

/// Player roster: registration, case-insensitive lookup, and the
/// session back-reference set.
#[async_trait]
pub trait PlayerRegistry: Send + Sync {
    /// Register a new player; names are unique case-insensitively.
    async fn register(&self, name: &str) -> StoreResult<Player>;

    /// Look up a player by name, case-insensitively.
    async fn resolve(&self, name: &str) -> StoreResult<Player>;

    /// Delete a player record. Callers are responsible for checking that
    /// the player is not seated in an unfinished session first.
    async fn remove(&self, id: PlayerId) -> StoreResult<()>;

    /// Record that a player was seated in a session.
    async fn add_active_session(&self, player: PlayerId, session: SessionId) -> StoreResult<()>;

    /// Drop a session back-reference (session deleted).
    async fn remove_active_session(&self, player: PlayerId, session: SessionId)
    -> StoreResult<()>;

    /// All registered players.
    async fn list(&self) -> StoreResult<Vec<Player>>;
}

/// PostgreSQL implementation of [`SessionStore`].
///
/// Session state is stored as a JSONB document next to an integer version
/// column; the version is checked on every update so a concurrent writer
/// in another process surfaces as [`StoreError::Conflict`].
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn decode(state: serde_json::Value) -> StoreResult<GameSession> {
        Ok(serde_json::from_value(state)?)
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self) -> StoreResult<GameSession> {
        let session = GameSession::new();
        let state = serde_json::to_value(&session)?;
        with_default_timeout(
            sqlx::query(
                "INSERT INTO chess_sessions (id, state, version, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(session.id())
            .bind(&state)
            .bind(session.version())
            .bind(session.created_at())
            .bind(session.updated_at())
            .execute(&self.pool),
        )
        .await?;
        Ok(session)
    }

    async fn load(&self, id: SessionId) -> StoreResult<GameSession> {
        let row = with_default_timeout(
            sqlx::query("SELECT state FROM chess_sessions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await?
        .ok_or(StoreError::SessionNotFound(id))?;
        Self::decode(row.get("state"))
    }

    async fn save(&self, session: &GameSession) -> StoreResult<GameSession> {
        let mut next = session.clone();
        next.bump_version();
        let state = serde_json::to_value(&next)?;

        let result = with_default_timeout(
            sqlx::query(
                "UPDATE chess_sessions
                 SET state = $2, version = $3, updated_at = now()
                 WHERE id = $1 AND version = $4",
            )
            .bind(next.id())
            .bind(&state)
            .bind(next.version())
            .bind(session.version())
            .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            let exists = with_default_timeout(
                sqlx::query("SELECT 1 FROM chess_sessions WHERE id = $1")
                    .bind(next.id())
                    .fetch_optional(&self.pool),
            )
            .await?;
            return match exists {
                Some(_) => Err(StoreError::Conflict {
                    detail: format!(
                        "session {} version {} is stale",
                        session.id(),
                        session.version()
                    ),
                }),
                None => Err(StoreError::SessionNotFound(next.id())),
            };
        }
        Ok(next)
    }

    async fn delete(&self, id: SessionId) -> StoreResult<()> {
        let result = with_default_timeout(
            sqlx::query("DELETE FROM chess_sessions WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::SessionNotFound(id));
        }
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<GameSession>> {
        let rows = with_default_timeout(
            sqlx::query("SELECT state FROM chess_sessions ORDER BY created_at ASC")
                .fetch_all(&self.pool),
        )
        .await?;
        rows.into_iter()
            .map(|row| Self::decode(row.get("state")))
            .collect()
    }
}

/// PostgreSQL implementation of [`PlayerRegistry`].
pub struct PgPlayerRegistry {
    pool: PgPool,
}

impl PgPlayerRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn active_sessions(&self, player: PlayerId) -> StoreResult<Vec<SessionId>> {
        let rows = with_default_timeout(
            sqlx::query("SELECT session_id FROM chess_player_sessions WHERE player_id = $1")
                .bind(player)
                .fetch_all(&self.pool),
        )
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| row.get::<Uuid, _>("session_id"))
            .collect())
    }

    fn player_from_row(row: &sqlx::postgres::PgRow) -> Player {
        Player {
            id: row.get("id"),
            name: row.get("name"),
            active_sessions: Default::default(),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl PlayerRegistry for PgPlayerRegistry {
    async fn register(&self, name: &str) -> StoreResult<Player> {
        let player = Player::new(name);
        let result = with_default_timeout(
            sqlx::query("INSERT INTO chess_players (id, name, created_at) VALUES ($1, $2, $3)")
                .bind(player.id)
                .bind(&player.name)
                .bind(player.created_at)
                .execute(&self.pool),
        )
        .await;
        match result {
            Ok(_) => Ok(player),
            Err(StoreError::Database(e))
                if e.as_database_error()
                    .is_some_and(|db| db.is_unique_violation()) =>
            {
                Err(StoreError::NameTaken(name.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn resolve(&self, name: &str) -> StoreResult<Player> {
        let row = with_default_timeout(
            sqlx::query(
                "SELECT id, name, created_at FROM chess_players WHERE lower(name) = lower($1)",
            )
            .bind(name)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| StoreError::PlayerNotFound(name.to_string()))?;

        let mut player = Self::player_from_row(&row);
        player.active_sessions = self.active_sessions(player.id).await?.into_iter().collect();
        Ok(player)
    }

    async fn remove(&self, id: PlayerId) -> StoreResult<()> {
        let result = with_default_timeout(
            sqlx::query("DELETE FROM chess_players WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::PlayerNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn add_active_session(&self, player: PlayerId, session: SessionId) -> StoreResult<()> {
        with_default_timeout(
            sqlx::query(
                "INSERT INTO chess_player_sessions (player_id, session_id)
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(player)
            .bind(session)
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn remove_active_session(
        &self,
        player: PlayerId,
        session: SessionId,
    ) -> StoreResult<()> {
        with_default_timeout(
            sqlx::query(
                "DELETE FROM chess_player_sessions WHERE player_id = $1 AND session_id = $2",
            )
            .bind(player)
            .bind(session)
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Player>> {
        let rows = with_default_timeout(
            sqlx::query("SELECT id, name, created_at FROM chess_players ORDER BY created_at ASC")
                .fetch_all(&self.pool),
        )
        .await?;
        let mut players = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut player = Self::player_from_row(row);
            player.active_sessions = self.active_sessions(player.id).await?.into_iter().collect();
            players.push(player);
        }
        Ok(players)
    }
}
