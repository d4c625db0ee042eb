//! In-memory implementations of the repository traits.
//!
//! These back the test suite and single-process deployments. They keep the
//! same semantics as the PostgreSQL implementations, including the
//! optimistic version check, so concurrency behavior is identical under
//! test. State lives in instances, never in process-wide globals.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{
    errors::{StoreError, StoreResult},
    repository::{PlayerRegistry, SessionStore},
};
use crate::session::entities::{GameSession, Player, PlayerId, SessionId};

/// In-memory [`SessionStore`].
#[derive(Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<SessionId, GameSession>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create(&self) -> StoreResult<GameSession> {
        let session = GameSession::new();
        self.sessions
            .write()
            .await
            .insert(session.id(), session.clone());
        Ok(session)
    }

    async fn load(&self, id: SessionId) -> StoreResult<GameSession> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::SessionNotFound(id))
    }

    async fn save(&self, session: &GameSession) -> StoreResult<GameSession> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get(&session.id())
            .ok_or(StoreError::SessionNotFound(session.id()))?;
        if stored.version() != session.version() {
            return Err(StoreError::Conflict {
                detail: format!(
                    "session {} version {} is stale",
                    session.id(),
                    session.version()
                ),
            });
        }
        let mut next = session.clone();
        next.bump_version();
        sessions.insert(next.id(), next.clone());
        Ok(next)
    }

    async fn delete(&self, id: SessionId) -> StoreResult<()> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::SessionNotFound(id))
    }

    async fn list(&self) -> StoreResult<Vec<GameSession>> {
        let mut sessions: Vec<_> = self.sessions.read().await.values().cloned().collect();
        sessions.sort_by_key(GameSession::created_at);
        Ok(sessions)
    }
}

/// In-memory [`PlayerRegistry`].
#[derive(Default)]
pub struct MemoryRegistry {
    players: RwLock<HashMap<PlayerId, Player>>,
}

impl MemoryRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// Same folding as the SQL `lower()` lookups in the Pg registry, so both
// backends agree on which non-ASCII names collide.
fn fold(name: &str) -> String {
    name.to_lowercase()
}

#[async_trait]
impl PlayerRegistry for MemoryRegistry {
    async fn register(&self, name: &str) -> StoreResult<Player> {
        let mut players = self.players.write().await;
        let folded = fold(name);
        if players.values().any(|p| fold(&p.name) == folded) {
            return Err(StoreError::NameTaken(name.to_string()));
        }
        let player = Player::new(name);
        players.insert(player.id, player.clone());
        Ok(player)
    }

    async fn resolve(&self, name: &str) -> StoreResult<Player> {
        let folded = fold(name);
        self.players
            .read()
            .await
            .values()
            .find(|p| fold(&p.name) == folded)
            .cloned()
            .ok_or_else(|| StoreError::PlayerNotFound(name.to_string()))
    }

    async fn remove(&self, id: PlayerId) -> StoreResult<()> {
        self.players
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::PlayerNotFound(id.to_string()))
    }

    async fn add_active_session(&self, player: PlayerId, session: SessionId) -> StoreResult<()> {
        let mut players = self.players.write().await;
        let player = players
            .get_mut(&player)
            .ok_or_else(|| StoreError::PlayerNotFound(player.to_string()))?;
        player.active_sessions.insert(session);
        Ok(())
    }

    async fn remove_active_session(
        &self,
        player: PlayerId,
        session: SessionId,
    ) -> StoreResult<()> {
        let mut players = self.players.write().await;
        let player = players
            .get_mut(&player)
            .ok_or_else(|| StoreError::PlayerNotFound(player.to_string()))?;
        player.active_sessions.remove(&session);
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<Player>> {
        let mut players: Vec<_> = self.players.read().await.values().cloned().collect();
        players.sort_by_key(|p| p.created_at);
        Ok(players)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_bumps_version_and_detects_stale_writers() {
        let store = MemoryStore::new();
        let session = store.create().await.unwrap();
        assert_eq!(session.version(), 0);

        let saved = store.save(&session).await.unwrap();
        assert_eq!(saved.version(), 1);

        // the original copy is now stale
        let err = store.save(&session).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn load_of_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        let err = store.load(uuid::Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn registration_is_case_insensitive() {
        let registry = MemoryRegistry::new();
        registry.register("Ann").await.unwrap();
        let err = registry.register("ann").await.unwrap_err();
        assert!(matches!(err, StoreError::NameTaken(_)));

        let resolved = registry.resolve("ANN").await.unwrap();
        assert_eq!(resolved.name, "Ann");
    }

    #[tokio::test]
    async fn name_folding_handles_non_ascii_like_sql_lower() {
        let registry = MemoryRegistry::new();
        registry.register("Ötzi").await.unwrap();
        let err = registry.register("ötzi").await.unwrap_err();
        assert!(matches!(err, StoreError::NameTaken(_)));

        let resolved = registry.resolve("ÖTZI").await.unwrap();
        assert_eq!(resolved.name, "Ötzi");
    }

    #[tokio::test]
    async fn back_references_follow_adds_and_removes() {
        let registry = MemoryRegistry::new();
        let player = registry.register("ann").await.unwrap();
        let session_id = uuid::Uuid::new_v4();

        registry
            .add_active_session(player.id, session_id)
            .await
            .unwrap();
        assert!(
            registry
                .resolve("ann")
                .await
                .unwrap()
                .active_sessions
                .contains(&session_id)
        );

        registry
            .remove_active_session(player.id, session_id)
            .await
            .unwrap();
        assert!(
            registry
                .resolve("ann")
                .await
                .unwrap()
                .active_sessions
                .is_empty()
        );
    }
}
